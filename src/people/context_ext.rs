use crate::{
    context::Context,
    error::SimulationError,
    people::{InitializationList, PeopleData, PersonId},
    property::Property,
};

pub trait ContextPeopleExt {
    fn get_current_population(&self) -> usize;

    /// Adds a new person with the given list of properties.
    ///
    /// # Errors
    /// Returns `SimulationError::ConfigError` if a required property is missing from
    /// `properties`.
    fn add_person<T: InitializationList>(&mut self, properties: T)
        -> Result<PersonId, SimulationError>;

    /// Gets a copy of the value of the property for the given person, if it has been set.
    fn get_person_property<T: Property>(&self, person_id: PersonId) -> Option<T>;

    /// Like `get_person_property`, but an unset value is an error.
    ///
    /// # Errors
    /// Returns `SimulationError::ConfigError` naming the person and property.
    fn try_get_person_property<T: Property>(
        &self,
        person_id: PersonId,
    ) -> Result<T, SimulationError>;

    fn set_person_property<T: Property>(&mut self, person_id: PersonId, value: T);

    /// Registers the property with `PeopleData`. Required properties must be registered
    /// before people are added for `add_person` to enforce them.
    fn register_property<T: Property>(&mut self);

    /// Iterates over everyone currently in the population, in `PersonId` order.
    fn people_iter(&self) -> impl Iterator<Item = PersonId> + 'static;
}

impl ContextPeopleExt for Context {
    fn get_current_population(&self) -> usize {
        match self.get_data_container::<PeopleData>() {
            None => 0,
            Some(people_data) => people_data.current_population,
        }
    }

    fn add_person<T: InitializationList>(
        &mut self,
        properties: T,
    ) -> Result<PersonId, SimulationError> {
        let people_data = self.get_data_container_mut::<PeopleData>();
        people_data.check_initialization_list(&properties)?;

        let person_id = people_data.add_person();
        properties.set_properties(people_data, person_id);

        Ok(person_id)
    }

    fn get_person_property<T: Property>(&self, person_id: PersonId) -> Option<T> {
        self.get_data_container::<PeopleData>()
            .and_then(|people_data| people_data.get_property::<T>(person_id))
    }

    fn try_get_person_property<T: Property>(
        &self,
        person_id: PersonId,
    ) -> Result<T, SimulationError> {
        self.get_person_property::<T>(person_id).ok_or_else(|| {
            SimulationError::ConfigError(format!("{person_id} has no {} value", T::name()))
        })
    }

    fn set_person_property<T: Property>(&mut self, person_id: PersonId, value: T) {
        self.get_data_container_mut::<PeopleData>()
            .set_property(person_id, value);
    }

    fn register_property<T: Property>(&mut self) {
        self.get_data_container_mut::<PeopleData>()
            .register_property::<T>();
    }

    fn people_iter(&self) -> impl Iterator<Item = PersonId> + 'static {
        (0..self.get_current_population()).map(PersonId)
    }
}
