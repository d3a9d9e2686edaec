/*!

Daily stepping of a cohort through the disease state machine and the trajectory records it
produces.

Each simulated day every individual's `DaysInState` is incremented first. If the individual is
in a terminal state, or has not yet stayed the state's minimum dwell time, nothing else
happens. Otherwise the next state is drawn from the transition table using the
`ProgressionRng` stream of the country's context. Drawing the current state again counts as
staying, so `DaysInState` keeps growing.

A country has a single `ProgressionRng` stream and individuals draw from it in `PersonId`
order, so one individual's draws depend on how many draws the individuals before them made
that day. Trajectories are reproducible for a fixed seed and cohort, not per individual.

*/

use crate::{
    age_group::AgeGroup,
    context::Context,
    define_rng,
    error::SimulationError,
    people::{ContextPeopleExt, PersonId},
    population::{ContextCohortExt, DaysInState, PreviousState},
    random::ContextRandomExt,
    state::DiseaseState,
    transitions::TransitionTable,
};
use chrono::NaiveDate;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

define_rng!(ProgressionRng);

/// One individual on one date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    pub unique_id: u64,
    pub country: String,
    pub age_group: AgeGroup,
    pub date: NaiveDate,
    pub state: DiseaseState,
    pub days_in_state: u32,
    pub previous_state: DiseaseState,
}

/// Advances one individual by one day and returns the state they end the day in.
///
/// # Errors
/// Returns `SimulationError::MissingTransition` if the individual is due for a transition
/// the table has no entry for, and `SimulationError::ConfigError` if one of their properties
/// was never set.
pub fn advance_person(
    context: &mut Context,
    table: &TransitionTable,
    person_id: PersonId,
) -> Result<DiseaseState, SimulationError> {
    let age_group = context.try_get_person_property::<AgeGroup>(person_id)?;
    let state = context.try_get_person_property::<DiseaseState>(person_id)?;
    let days_in_state = context
        .try_get_person_property::<DaysInState>(person_id)?
        .0
        .saturating_add(1);

    let next_state = if state.is_terminal() || days_in_state < table.min_dwell(state) {
        state
    } else {
        context.sample::<ProgressionRng, _>(|rng| table.sample_next_state(age_group, state, rng))?
    };

    context.set_person_property(person_id, PreviousState(state));
    if next_state == state {
        context.set_person_property(person_id, DaysInState(days_in_state));
    } else {
        trace!("{person_id}: {state} -> {next_state} after {days_in_state} days");
        context.set_person_property(person_id, next_state);
        context.set_person_property(person_id, DaysInState(0));
    }

    Ok(next_state)
}

/// Advances every individual in the context by one day, in `PersonId` order.
///
/// # Errors
/// The first error from `advance_person`.
pub fn advance_population(
    context: &mut Context,
    table: &TransitionTable,
) -> Result<(), SimulationError> {
    for person_id in context.people_iter().collect::<Vec<_>>() {
        advance_person(context, table, person_id)?;
    }
    Ok(())
}

/// # Errors
/// Returns `SimulationError::ConfigError` if one of the individual's properties was never set.
pub fn record_person(
    context: &Context,
    person_id: PersonId,
    date: NaiveDate,
) -> Result<TrajectoryRecord, SimulationError> {
    let individual = context.get_individual(person_id)?;
    Ok(TrajectoryRecord {
        unique_id: individual.unique_id,
        country: context.get_country().to_string(),
        age_group: individual.age_group,
        date,
        state: individual.state,
        days_in_state: individual.days_in_state,
        previous_state: individual.previous_state,
    })
}

/// Appends one record per individual for `date`.
///
/// # Errors
/// See `record_person`.
pub fn record_population(
    context: &Context,
    date: NaiveDate,
    records: &mut Vec<TrajectoryRecord>,
) -> Result<(), SimulationError> {
    for person_id in context.people_iter() {
        records.push(record_person(context, person_id, date)?);
    }
    Ok(())
}

/// Runs the cohort from `start_date` to `end_date` inclusive. The records for `start_date`
/// hold the initial state; each later date holds the state after that day's step.
///
/// # Errors
/// Returns `SimulationError::InvalidDateRange` if `end_date` is before `start_date`, and any
/// error raised while stepping.
pub fn simulate_cohort(
    context: &mut Context,
    table: &TransitionTable,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<TrajectoryRecord>, SimulationError> {
    if end_date < start_date {
        return Err(SimulationError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let population = context.get_current_population();
    let days = usize::try_from((end_date - start_date).num_days()).unwrap_or(0) + 1;
    let mut records = Vec::with_capacity(population.saturating_mul(days));

    record_population(context, start_date, &mut records)?;
    for date in start_date.iter_days().skip(1).take_while(|date| *date <= end_date) {
        advance_population(context, table)?;
        record_population(context, date, &mut records)?;
    }

    debug!(
        "{}: simulated {population} individuals over {days} days",
        context.get_country()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn setup(age_group: AgeGroup, count: usize, seed: u64) -> Context {
        let mut context = Context::new();
        context.init_random(seed);
        context.init_cohort("Chile", 0);
        for _ in 0..count {
            context.add_individual(age_group).unwrap();
        }
        context
    }

    fn always_infected() -> TransitionTable {
        TransitionTable::builder()
            .min_dwell(DiseaseState::Infected, 4)
            .transition_all_ages(DiseaseState::Healthy, &[(DiseaseState::Infected, 1.0)])
            .transition_all_ages(DiseaseState::Infected, &[(DiseaseState::MildImmune, 1.0)])
            .transition_all_ages(DiseaseState::Serious, &[(DiseaseState::Serious, 1.0)])
            .transition_all_ages(DiseaseState::MildImmune, &[(DiseaseState::MildImmune, 1.0)])
            .build()
            .unwrap()
    }

    #[test]
    fn first_day_is_initial_state() {
        let mut context = setup(AgeGroup::Over65, 3, 0);
        let records =
            simulate_cohort(&mut context, &TransitionTable::default_table(), date(1), date(1))
                .unwrap();
        assert_eq!(records.len(), 3);
        for record in records {
            assert_eq!(record.state, DiseaseState::Healthy);
            assert_eq!(record.days_in_state, 0);
            assert_eq!(record.country, "Chile");
        }
    }

    #[test]
    fn dwell_time_delays_transition() {
        let mut context = setup(AgeGroup::From25To64, 1, 7);
        let records = simulate_cohort(&mut context, &always_infected(), date(1), date(10)).unwrap();
        let states: Vec<_> = records.iter().map(|r| (r.state, r.days_in_state)).collect();
        assert_eq!(
            states,
            vec![
                (DiseaseState::Healthy, 0),
                (DiseaseState::Infected, 0),
                (DiseaseState::Infected, 1),
                (DiseaseState::Infected, 2),
                (DiseaseState::Infected, 3),
                (DiseaseState::MildImmune, 0),
                (DiseaseState::MildImmune, 1),
                (DiseaseState::MildImmune, 2),
                (DiseaseState::MildImmune, 3),
                (DiseaseState::MildImmune, 4),
            ]
        );
        assert_eq!(records[5].previous_state, DiseaseState::Infected);
        assert_eq!(records[6].previous_state, DiseaseState::MildImmune);
    }

    #[test]
    fn deceased_is_absorbing() {
        let mut context = setup(AgeGroup::Over65, 2, 0);
        context.set_person_property(PersonId(0), DiseaseState::Deceased);
        let records =
            simulate_cohort(&mut context, &always_infected(), date(1), date(5)).unwrap();
        let deceased: Vec<_> = records.iter().filter(|r| r.unique_id == 0).collect();
        assert_eq!(deceased.len(), 5);
        for (day, record) in deceased.into_iter().enumerate() {
            assert_eq!(record.state, DiseaseState::Deceased);
            assert_eq!(record.days_in_state as usize, day);
        }
    }

    #[test]
    fn missing_entry_fails_when_reached() {
        let table = TransitionTable::builder()
            .transition_all_ages(DiseaseState::Healthy, &[(DiseaseState::Infected, 1.0)])
            .build()
            .unwrap();
        let mut context = setup(AgeGroup::Under5, 1, 0);
        let result = simulate_cohort(&mut context, &table, date(1), date(5));
        assert!(matches!(
            result,
            Err(SimulationError::MissingTransition {
                age_group: AgeGroup::Under5,
                state: DiseaseState::Infected,
            })
        ));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let mut context = setup(AgeGroup::Under5, 1, 0);
        let result = simulate_cohort(&mut context, &always_infected(), date(5), date(1));
        assert!(matches!(result, Err(SimulationError::InvalidDateRange { .. })));
    }

    #[test]
    fn same_seed_same_trajectories() {
        let table = TransitionTable::default_table();
        let mut first = setup(AgeGroup::Over65, 50, 42);
        let mut second = setup(AgeGroup::Over65, 50, 42);
        assert_eq!(
            simulate_cohort(&mut first, &table, date(1), date(31)).unwrap(),
            simulate_cohort(&mut second, &table, date(1), date(31)).unwrap()
        );
    }
}
