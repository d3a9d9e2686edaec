use crate::{type_of, TypeId};
use std::{any::type_name, fmt::Debug, hash::Hash};

/// Basic metadata about a property, a record in a property metadata database:
///     `(Name, TypeId, IsRequired)`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo(pub &'static str, pub TypeId, pub bool);

impl PropertyInfo {
    #[must_use]
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.0
    }

    #[must_use]
    #[inline(always)]
    pub fn type_id(&self) -> TypeId {
        self.1
    }

    #[must_use]
    #[inline(always)]
    pub fn is_required(&self) -> bool {
        self.2
    }
}

/// A per-person value stored in its own column of `PeopleData`.
pub trait Property: Copy + Debug + PartialEq + Hash + 'static {
    #[must_use]
    #[inline]
    fn name() -> &'static str {
        type_name::<Self>()
    }

    /// A required property must be supplied when a person is added.
    #[must_use]
    #[inline]
    fn is_required() -> bool {
        false
    }

    #[must_use]
    #[inline]
    fn property_info() -> PropertyInfo {
        PropertyInfo(Self::name(), type_of::<Self>(), Self::is_required())
    }
}

/// Defines a newtype person property wrapping `$value`.
///
/// ```
/// # use disease_progression::define_property;
/// define_property!(DaysVaccinated, u32);
/// let days = DaysVaccinated(3);
/// assert_eq!(days.0, 3);
/// ```
#[macro_export]
macro_rules! define_property {
    ($property:ident, $value:ty) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $property(pub $value);

        impl $crate::property::Property for $property {
            fn name() -> &'static str {
                stringify!($property)
            }
        }
    };
}
pub use define_property;
