/*!

A discrete-time, age-stratified Markov simulation of individual disease-state trajectories.

Each selected country gets its own [`Context`]. A synthetic cohort is sampled from the
country's demographics, every individual is advanced one day at a time through the
[`TransitionTable`], and the resulting [`TrajectoryRecord`]s are summarized into daily
per-state counts.

```rust,no_run
use chrono::NaiveDate;
use disease_progression::{
    demographics::load_demographics, run_simulation, SimulationConfig, TransitionTable,
};

# fn main() -> Result<(), disease_progression::SimulationError> {
let demographics = load_demographics("demographics.csv")?;
let config = SimulationConfig {
    countries: vec!["Chile".to_string()],
    sample_ratio: 1_000_000.0,
    start_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
    end_date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
    seed: 42,
};
let output = run_simulation(&config, &demographics, &TransitionTable::default_table())?;
println!("{} rows", output.trajectories.len());
# Ok(())
# }
```

*/

pub mod age_group;
pub mod aggregate;
pub mod context;
pub mod demographics;
pub mod error;
pub mod hashing;
pub mod log;
pub mod parameters;
pub mod people;
pub mod population;
pub mod progression;
pub mod property;
pub mod property_map;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod state;
pub mod transitions;

// Re-exported so `define_rng!` can name the generator types.
pub use rand;

// All modules import `crate::TypeId` in case we want to change the underlying type of `TypeId`.
pub(crate) use std::any::TypeId;

pub use age_group::AgeGroup;
pub use aggregate::SummaryRecord;
pub use context::{Context, DataPlugin};
pub use demographics::{CountryDemographics, Demographics};
pub use error::SimulationError;
pub use people::{ContextPeopleExt, PersonId};
pub use progression::TrajectoryRecord;
pub use property::Property;
pub use random::ContextRandomExt;
pub use simulation::{run_simulation, SimulationConfig, SimulationOutput};
pub use state::DiseaseState;
pub use transitions::TransitionTable;

// Replace with `typeid::of as type_of` if necessary.
#[inline(always)]
pub fn type_of<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}
