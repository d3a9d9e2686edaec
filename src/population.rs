/*!

The synthetic cohort of one country. Every individual is a `PersonId` in the country's
`Context` carrying four properties: `AgeGroup`, `DiseaseState`, `DaysInState` and
`PreviousState`. The country name and the offset that turns a `PersonId` into a globally
unique id are stored once per context in `CohortData`.

*/

use crate::{
    age_group::AgeGroup,
    context::{Context, DataPlugin},
    define_property,
    demographics::CountryDemographics,
    error::SimulationError,
    people::{ContextPeopleExt, PersonId},
    state::DiseaseState,
};
use log::debug;

define_property!(DaysInState, u32);
define_property!(PreviousState, DiseaseState);

/// A snapshot of one individual's properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Individual {
    pub unique_id: u64,
    pub age_group: AgeGroup,
    pub state: DiseaseState,
    pub days_in_state: u32,
    pub previous_state: DiseaseState,
}

#[derive(Default)]
struct CohortData {
    country: String,
    id_offset: u64,
}

impl DataPlugin for CohortData {
    #[allow(non_upper_case_globals)]
    const new: &'static dyn Fn() -> Self = &CohortData::default;
}

pub trait ContextCohortExt {
    /// Names the country this context simulates and sets the first unique id its
    /// individuals receive.
    fn init_cohort(&mut self, country: &str, id_offset: u64);

    /// The country set by `init_cohort`, or `""`.
    fn get_country(&self) -> &str;

    fn get_unique_id(&self, person_id: PersonId) -> u64;

    /// Adds one Healthy individual of the given age group who has just entered that state.
    ///
    /// # Errors
    /// Propagates errors from `ContextPeopleExt::add_person`.
    fn add_individual(&mut self, age_group: AgeGroup) -> Result<PersonId, SimulationError>;

    /// Reads all of an individual's properties at once.
    ///
    /// # Errors
    /// Returns `SimulationError::ConfigError` if any property was never set.
    fn get_individual(&self, person_id: PersonId) -> Result<Individual, SimulationError>;
}

impl ContextCohortExt for Context {
    fn init_cohort(&mut self, country: &str, id_offset: u64) {
        let cohort_data = self.get_data_container_mut::<CohortData>();
        cohort_data.country = country.to_string();
        cohort_data.id_offset = id_offset;

        self.register_property::<AgeGroup>();
        self.register_property::<DiseaseState>();
        self.register_property::<DaysInState>();
        self.register_property::<PreviousState>();
    }

    fn get_country(&self) -> &str {
        self.get_data_container::<CohortData>()
            .map_or("", |cohort_data| cohort_data.country.as_str())
    }

    fn get_unique_id(&self, person_id: PersonId) -> u64 {
        let id_offset = self
            .get_data_container::<CohortData>()
            .map_or(0, |cohort_data| cohort_data.id_offset);
        id_offset + person_id.index() as u64
    }

    fn add_individual(&mut self, age_group: AgeGroup) -> Result<PersonId, SimulationError> {
        self.add_person((
            age_group,
            DiseaseState::Healthy,
            DaysInState(0),
            PreviousState(DiseaseState::Healthy),
        ))
    }

    fn get_individual(&self, person_id: PersonId) -> Result<Individual, SimulationError> {
        Ok(Individual {
            unique_id: self.get_unique_id(person_id),
            age_group: self.try_get_person_property::<AgeGroup>(person_id)?,
            state: self.try_get_person_property::<DiseaseState>(person_id)?,
            days_in_state: self.try_get_person_property::<DaysInState>(person_id)?.0,
            previous_state: self.try_get_person_property::<PreviousState>(person_id)?.0,
        })
    }
}

/// Populates the context with the country's scaled-down cohort, age group by age group,
/// and returns the number of individuals added. An age group that rounds to zero simply
/// contributes nobody.
///
/// # Errors
/// Returns `SimulationError::InvalidSampleRatio` for a non-positive or non-finite ratio.
pub fn sample_cohort(
    context: &mut Context,
    demographics: &CountryDemographics,
    sample_ratio: f64,
) -> Result<usize, SimulationError> {
    let cohort_sizes = demographics.cohort_sizes(sample_ratio)?;
    let mut added = 0;

    for (age_group, count) in cohort_sizes {
        debug!("{}: {count} individuals aged {age_group}", context.get_country());
        for _ in 0..count {
            context.add_individual(age_group)?;
        }
        added += count;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chile() -> CountryDemographics {
        CountryDemographics::new(19_000_000, [6.0, 13.0, 14.0, 54.0, 13.0]).unwrap()
    }

    #[test]
    fn cohort_matches_age_proportions() {
        let mut context = Context::new();
        context.init_cohort("Chile", 0);
        let added = sample_cohort(&mut context, &chile(), 1_000_000.0).unwrap();

        assert_eq!(added, 1900);
        assert_eq!(context.get_current_population(), 1900);

        let mut per_group = [0usize; 5];
        for person_id in context.people_iter().collect::<Vec<_>>() {
            let age_group = context.get_person_property::<AgeGroup>(person_id).unwrap();
            per_group[age_group.index()] += 1;
        }
        assert_eq!(per_group, [114, 247, 266, 1026, 247]);
    }

    #[test]
    fn individuals_start_healthy() {
        let mut context = Context::new();
        context.init_cohort("Chile", 100);
        sample_cohort(&mut context, &chile(), 10_000_000.0).unwrap();

        let first = context.get_individual(PersonId(0)).unwrap();
        assert_eq!(
            first,
            Individual {
                unique_id: 100,
                age_group: AgeGroup::Under5,
                state: DiseaseState::Healthy,
                days_in_state: 0,
                previous_state: DiseaseState::Healthy,
            }
        );
    }

    #[test]
    fn empty_cohort_is_not_an_error() {
        let mut context = Context::new();
        context.init_cohort("Tuvalu", 0);
        let tiny = CountryDemographics::new(11_000, [10.0, 20.0, 20.0, 40.0, 10.0]).unwrap();
        assert_eq!(sample_cohort(&mut context, &tiny, 1_000_000.0).unwrap(), 0);
        assert_eq!(context.get_current_population(), 0);
    }

    #[test]
    fn age_group_is_required() {
        let mut context = Context::new();
        context.init_cohort("Chile", 0);
        assert!(context.add_person(DiseaseState::Healthy).is_err());
    }

    #[test]
    fn country_defaults_to_empty() {
        let context = Context::new();
        assert_eq!(context.get_country(), "");
        assert_eq!(context.get_unique_id(PersonId(4)), 4);
    }
}
