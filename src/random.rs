/*!

Named, seeded random number streams stored in a [`Context`].

A stream is declared with [`define_rng!`] and drawn from with [`ContextRandomExt::sample`].
Its generator is created on first use from [`stream_seed`] of the context's base seed and
the stream's name, so streams never share state and declaring a new stream leaves the
draws of existing ones untouched.

*/

use crate::{
    context::{Context, DataPlugin},
    hashing::{hash_str, HashMap},
    type_of, TypeId,
};
use log::trace;
use rand::{distr::Distribution, Rng, SeedableRng};
use std::any::Any;

pub trait RngId: Any {
    /// The stream's name; it is part of the generator's seed.
    const NAME: &'static str;
    type RngType: SeedableRng;

    fn from_seed(seed: u64) -> Self;
    fn rng(&mut self) -> &mut Self::RngType;
}

/// The seed of the generator behind the stream `name`.
#[must_use]
pub fn stream_seed(base_seed: u64, name: &str) -> u64 {
    base_seed.wrapping_add(hash_str(name))
}

#[derive(Default)]
struct RandomStreams {
    base_seed: u64,
    /// Holds an `R` under `type_of::<R>()` for every stream used so far.
    streams: HashMap<TypeId, Box<dyn Any>>,
}

impl DataPlugin for RandomStreams {
    #[allow(non_upper_case_globals)]
    const new: &'static dyn Fn() -> Self = &RandomStreams::default;
}

impl RandomStreams {
    fn stream<R: RngId>(&mut self) -> &mut R::RngType {
        let seed = stream_seed(self.base_seed, R::NAME);
        let stream = self.streams.entry(type_of::<R>()).or_insert_with(|| {
            trace!("seeding random stream {} with {seed}", R::NAME);
            Box::new(R::from_seed(seed))
        });

        // SAFETY: the entry for `type_of::<R>()` is only ever created above, as an `R`.
        unsafe { stream.downcast_mut::<R>().unwrap_unchecked() }.rng()
    }
}

pub trait ContextRandomExt {
    /// Sets the base seed. Streams already in use restart from their new seeds.
    fn init_random(&mut self, base_seed: u64);

    /// The base seed last passed to `init_random`, or 0.
    fn get_base_seed(&self) -> u64;

    /// Applies `sampler` to the generator of stream `R`.
    fn sample<R: RngId, T>(&mut self, sampler: impl FnOnce(&mut R::RngType) -> T) -> T;

    /// Draws one value of `distribution` from stream `R`.
    fn sample_distr<R: RngId, T>(&mut self, distribution: impl Distribution<T>) -> T
    where
        R::RngType: Rng;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        let streams = self.get_data_container_mut::<RandomStreams>();
        streams.base_seed = base_seed;
        streams.streams.clear();
    }

    fn get_base_seed(&self) -> u64 {
        self.get_data_container::<RandomStreams>()
            .map_or(0, |streams| streams.base_seed)
    }

    fn sample<R: RngId, T>(&mut self, sampler: impl FnOnce(&mut R::RngType) -> T) -> T {
        sampler(self.get_data_container_mut::<RandomStreams>().stream::<R>())
    }

    fn sample_distr<R: RngId, T>(&mut self, distribution: impl Distribution<T>) -> T
    where
        R::RngType: Rng,
    {
        distribution.sample(self.get_data_container_mut::<RandomStreams>().stream::<R>())
    }
}

/// Declares a random stream named after the type. The generator defaults to `StdRng`.
///
/// ```
/// use disease_progression::{define_rng, random::ContextRandomExt, Context};
/// use rand::Rng;
///
/// define_rng!(ExposureRng);
///
/// let mut context = Context::new();
/// context.init_random(3);
/// let exposed: bool = context.sample::<ExposureRng, _>(|rng| rng.random_bool(0.25));
/// # let _ = exposed;
/// ```
#[macro_export]
macro_rules! define_rng {
    ($stream:ident) => {
        $crate::define_rng!($stream, $crate::rand::rngs::StdRng);
    };
    ($stream:ident, $generator:ty) => {
        struct $stream($generator);

        impl $crate::random::RngId for $stream {
            const NAME: &'static str = stringify!($stream);
            type RngType = $generator;

            fn from_seed(seed: u64) -> Self {
                $stream(<$generator as $crate::rand::SeedableRng>::seed_from_u64(seed))
            }

            fn rng(&mut self) -> &mut Self::RngType {
                &mut self.0
            }
        }
    };
}
pub use define_rng;
