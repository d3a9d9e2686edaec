use crate::{
    context::DataPlugin,
    error::SimulationError,
    people::{InitializationList, PersonId},
    property::{Property, PropertyInfo},
    property_map::PropertyMap,
    type_of,
};

/// Stores all data associated to people and their properties.
pub(crate) struct PeopleData {
    /// How many people exist.
    pub(crate) current_population: usize,
    /// One `PropertyStore` column per property type
    pub(crate) properties_map: PropertyMap,
    /// A database of basic information about registered properties:
    ///     `PropertyInfo(Name, TypeId, IsRequired)`
    pub(crate) property_metadata: Vec<PropertyInfo>,
}

impl Default for PeopleData {
    fn default() -> Self {
        PeopleData {
            current_population: 0,
            properties_map: PropertyMap::new(),
            property_metadata: vec![],
        }
    }
}

impl DataPlugin for PeopleData {
    #[allow(non_upper_case_globals)]
    const new: &'static dyn Fn() -> Self = &PeopleData::default;
}

impl PeopleData {
    pub fn add_person(&mut self) -> PersonId {
        let person_id = PersonId(self.current_population);
        self.current_population += 1;
        person_id
    }

    pub fn get_property<T: Property>(&self, person_id: PersonId) -> Option<T> {
        self.properties_map
            .column::<T>()
            .and_then(|property_store| property_store.get(person_id.0))
    }

    pub fn set_property<T: Property>(&mut self, person_id: PersonId, value: T) {
        self.properties_map
            .column_mut::<T>()
            .set(person_id.0, value);
    }

    pub fn is_registered<T: Property>(&self) -> bool {
        let type_id = type_of::<T>();
        self.property_metadata
            .iter()
            .any(|info| info.type_id() == type_id)
    }

    pub fn register_property<T: Property>(&mut self) {
        if !self.is_registered::<T>() {
            self.property_metadata.push(T::property_info());
            // Materialize the column so an empty population still reports the property.
            self.properties_map.column_mut::<T>();
        }
    }

    pub(super) fn check_initialization_list<T: InitializationList>(
        &self,
        initialization: &T,
    ) -> Result<(), SimulationError> {
        for property_info in &self.property_metadata {
            if property_info.is_required() && !initialization.has_property(property_info.type_id())
            {
                return Err(SimulationError::ConfigError(format!(
                    "Missing initial value {}",
                    property_info.name()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_property;

    define_property!(Score, u8);

    #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
    struct Badge(u8);
    impl Property for Badge {
        fn is_required() -> bool {
            true
        }
    }

    #[test]
    fn people_are_numbered_consecutively() {
        let mut people_data = PeopleData::default();
        assert_eq!(people_data.add_person(), PersonId(0));
        assert_eq!(people_data.add_person(), PersonId(1));
        assert_eq!(people_data.current_population, 2);
    }

    #[test]
    fn unset_property_is_none() {
        let mut people_data = PeopleData::default();
        let first = people_data.add_person();
        let second = people_data.add_person();
        people_data.set_property(second, Score(4));

        assert_eq!(people_data.get_property::<Score>(first), None);
        assert_eq!(people_data.get_property::<Score>(second), Some(Score(4)));
    }

    #[test]
    fn registration_is_idempotent() {
        let mut people_data = PeopleData::default();
        people_data.register_property::<Score>();
        people_data.register_property::<Score>();
        assert_eq!(people_data.property_metadata.len(), 1);
    }

    #[test]
    fn required_property_must_be_initialized() {
        let mut people_data = PeopleData::default();
        people_data.register_property::<Badge>();

        assert!(people_data.check_initialization_list(&(Score(1),)).is_err());
        assert!(people_data.check_initialization_list(&(Badge(1), Score(1))).is_ok());
    }
}
