/*!

A `Context` is the container for everything a single country's simulation owns: its people,
its random number generators, and its bookkeeping. Each kind of data lives in its own
*data plugin*, a type that knows how to construct itself and is created the first time it is
requested.

```rust
use disease_progression::{Context, DataPlugin};

#[derive(Default)]
struct Tally(u32);

impl DataPlugin for Tally {
    const new: &'static dyn Fn() -> Self = &Tally::default;
}

let mut context = Context::new();
context.get_data_container_mut::<Tally>().0 += 1;
assert_eq!(context.get_data_container::<Tally>().unwrap().0, 1);
```

*/

use crate::hashing::HashMap;
use crate::{type_of, TypeId};
use std::any::Any;

/// A type that can be stored once per `Context` and constructs itself on first access.
pub trait DataPlugin: Any {
    /// A constant reference to a constructor
    #[allow(non_upper_case_globals)]
    const new: &'static dyn Fn() -> Self;
}

pub struct Context {
    // This is actually a `HashMap<TypeId, Box<dyn DataPlugin>>`, but `DataPlugin` is not
    // object safe because of its associated constant.
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Context {
            data_plugins: HashMap::default(),
        }
    }

    /// The data container for `T`, created on first access.
    pub fn get_data_container_mut<T: DataPlugin>(&mut self) -> &mut T {
        let boxed = self
            .data_plugins
            .entry(type_of::<T>())
            .or_insert_with(|| Box::new((T::new)()));
        // SAFETY: only a `Box<T>` is ever stored under `type_of::<T>()`.
        unsafe { boxed.downcast_mut::<T>().unwrap_unchecked() }
    }

    /// The data container for `T`, or `None` if it was never created.
    #[must_use]
    pub fn get_data_container<T: DataPlugin>(&self) -> Option<&T> {
        self.data_plugins
            .get(&type_of::<T>())
            .and_then(|data| data.downcast_ref::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        count: usize,
    }

    impl DataPlugin for Counter {
        const new: &'static dyn Fn() -> Self = &|| Counter { count: 7 };
    }

    #[test]
    fn containers_are_created_lazily() {
        let mut context = Context::new();
        assert!(context.get_data_container::<Counter>().is_none());

        context.get_data_container_mut::<Counter>().count += 1;
        assert_eq!(context.get_data_container::<Counter>().unwrap().count, 8);
    }

    #[derive(Default)]
    struct DeathLog(Vec<u64>);

    impl DataPlugin for DeathLog {
        const new: &'static dyn Fn() -> Self = &DeathLog::default;
    }

    #[test]
    fn containers_are_keyed_by_type() {
        let mut context = Context::new();
        context.get_data_container_mut::<DeathLog>().0.extend([3, 5]);
        {
            // The generic type can be inferred from the binding.
            let counter: &mut Counter = context.get_data_container_mut();
            counter.count = 0;
        }

        assert_eq!(context.get_data_container::<DeathLog>().unwrap().0, vec![3, 5]);
        assert_eq!(context.get_data_container::<Counter>().unwrap().count, 0);
    }
}
