//! Deterministic hashing. The hashing data structures in the standard library are randomly
//! seeded per process, which would make iteration order, and anything seeded from a hash,
//! differ between runs. Everything in this crate uses the `FxHash` variants instead.
//!
//! `HashMap<K, V, S>` has no `new` method for a non-default hasher; use `HashMap::default()`.

use rustc_hash::FxHasher;
use std::hash::Hasher;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Hash of a `&str`, stable across runs. Country and random stream names are mixed into
/// seeds with it.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_bytes());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings_deterministically() {
        assert_eq!(hash_str("Chile"), hash_str("Chile"));
        assert_ne!(hash_str("Chile"), hash_str("Peru"));
    }
}
