/*!

Struct-of-arrays storage for person properties. Each property type `T` has one
`PropertyStore<T>` column indexed by `PersonId`, and `PropertyMap` holds the columns of every
property type, keyed by `TypeId`.

*/

use crate::{hashing::HashMap, property::Property, type_of, TypeId};
use std::any::Any;

pub struct PropertyStore<T: Property> {
    pub values: Vec<Option<T>>,
}

impl<T: Property> PropertyStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `idx`, or `None` if it was never set.
    #[inline]
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<T> {
        self.values.get(idx).copied().flatten()
    }

    /// Sets the value at `idx`, growing the column with unset entries if needed.
    #[inline]
    pub fn set(&mut self, idx: usize, value: T) {
        if idx >= self.values.len() {
            self.values.resize_with(idx + 1, || None);
        }
        self.values[idx] = Some(value);
    }
}

impl<T: Property> Default for PropertyStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct PropertyMap {
    // A `PropertyStore<T>` under `type_of::<T>()` for each property type.
    columns: HashMap<TypeId, Box<dyn Any>>,
}

impl PropertyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The column for `T`, created empty on first access.
    pub fn column_mut<T: Property>(&mut self) -> &mut PropertyStore<T> {
        let column = self
            .columns
            .entry(type_of::<T>())
            .or_insert_with(|| Box::new(PropertyStore::<T>::new()));
        // SAFETY: the entry for `type_of::<T>()` is only ever created above, as a
        // `PropertyStore<T>`.
        unsafe { column.downcast_mut().unwrap_unchecked() }
    }

    #[must_use]
    pub fn column<T: Property>(&self) -> Option<&PropertyStore<T>> {
        self.columns
            .get(&type_of::<T>())
            .and_then(|column| column.downcast_ref())
    }

    #[must_use]
    pub fn has_column<T: Property>(&self) -> bool {
        self.columns.contains_key(&type_of::<T>())
    }
}
