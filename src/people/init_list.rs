use crate::{
    people::{PeopleData, PersonId},
    property::Property,
    type_of, TypeId,
};
use seq_macro::seq;

/// The initial property values of a new individual: a single property or a tuple of
/// distinct properties, e.g. `(AgeGroup::Over65, DiseaseState::Healthy)`.
pub trait InitializationList {
    fn has_property(&self, type_id: TypeId) -> bool;

    #[doc(hidden)]
    #[allow(private_interfaces)]
    fn set_properties(self, people_data: &mut PeopleData, person_id: PersonId);
}

impl InitializationList for () {
    fn has_property(&self, _: TypeId) -> bool {
        false
    }

    #[allow(private_interfaces)]
    fn set_properties(self, _: &mut PeopleData, _: PersonId) {}
}

impl<P: Property> InitializationList for P {
    fn has_property(&self, type_id: TypeId) -> bool {
        type_id == type_of::<P>()
    }

    #[allow(private_interfaces)]
    fn set_properties(self, people_data: &mut PeopleData, person_id: PersonId) {
        people_data.set_property(person_id, self);
    }
}

macro_rules! impl_tuple_initialization_list {
    ($len:tt) => {
        seq!(N in 0..$len {
            impl<#(P~N: Property,)*> InitializationList for (#(P~N,)*) {
                fn has_property(&self, type_id: TypeId) -> bool {
                    [#(type_of::<P~N>(),)*].contains(&type_id)
                }

                #[allow(private_interfaces)]
                fn set_properties(self, people_data: &mut PeopleData, person_id: PersonId) {
                    #(people_data.set_property(person_id, self.N);)*
                }
            }
        });
    };
}

// Tuples of one to eight properties.
seq!(LEN in 1..=8 {
    impl_tuple_initialization_list!(LEN);
});
