/*!

Runs the selected countries and assembles the two output tables.

Every country is simulated in its own [`Context`] on its own scoped thread. The threads
borrow the transition table and demographics read-only and share nothing else. A country's
random streams are seeded from the run seed and the country name, so the output does not
depend on thread scheduling or on which other countries were selected.

*/

use crate::{
    aggregate::{summarize_selection, SummaryRecord},
    context::Context,
    demographics::{validate_sample_ratio, CountryDemographics, Demographics},
    error::SimulationError,
    hashing::{hash_str, HashSet},
    population::{sample_cohort, ContextCohortExt},
    progression::{simulate_cohort, TrajectoryRecord},
    random::ContextRandomExt,
    transitions::TransitionTable,
};
use chrono::NaiveDate;
use log::info;
use std::thread;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Countries to simulate, in the order unique ids are assigned.
    pub countries: Vec<String>,
    /// Number of real people represented by one synthetic individual.
    pub sample_ratio: f64,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub seed: u64,
}

impl SimulationConfig {
    /// Checks everything that can be checked before a run starts.
    ///
    /// # Errors
    /// - `SimulationError::ConfigError` for an empty or repeated country selection
    /// - `SimulationError::UnknownCountry` for a country missing from `demographics`
    /// - `SimulationError::InvalidDateRange` if `end_date` is before `start_date`
    /// - `SimulationError::InvalidSampleRatio` unless the ratio is positive and finite
    pub fn validate(&self, demographics: &Demographics) -> Result<(), SimulationError> {
        if self.countries.is_empty() {
            return Err(SimulationError::ConfigError(
                "no countries selected".to_string(),
            ));
        }

        let mut seen = HashSet::default();
        for country in &self.countries {
            if !demographics.contains_key(country) {
                return Err(SimulationError::UnknownCountry(country.clone()));
            }
            if !seen.insert(country.as_str()) {
                return Err(SimulationError::ConfigError(format!(
                    "{country} is selected more than once"
                )));
            }
        }

        if self.end_date < self.start_date {
            return Err(SimulationError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        validate_sample_ratio(self.sample_ratio)
    }

    /// The seed for one country's random streams.
    #[must_use]
    pub fn country_seed(&self, country: &str) -> u64 {
        self.seed.wrapping_add(hash_str(country))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationOutput {
    /// Sorted by date, then country, then unique id.
    pub trajectories: Vec<TrajectoryRecord>,
    /// One row per date and selected country, sorted by date then country.
    pub summaries: Vec<SummaryRecord>,
}

/// Samples and simulates one country from a fresh `Context`.
///
/// # Errors
/// Anything raised while sampling or stepping the cohort.
pub fn simulate_country(
    config: &SimulationConfig,
    country: &str,
    demographics: &CountryDemographics,
    table: &TransitionTable,
    id_offset: u64,
) -> Result<Vec<TrajectoryRecord>, SimulationError> {
    let mut context = Context::new();
    context.init_random(config.country_seed(country));
    context.init_cohort(country, id_offset);

    let cohort_size = sample_cohort(&mut context, demographics, config.sample_ratio)?;
    info!("{country}: sampled {cohort_size} individuals");

    simulate_cohort(&mut context, table, config.start_date, config.end_date)
}

/// Validates the configuration and the table, simulates every selected country in parallel
/// and returns the merged trajectories with their daily summaries.
///
/// # Errors
/// Validation errors from `SimulationConfig::validate` and `TransitionTable::ensure_complete`,
/// and the first error any country raised while running.
pub fn run_simulation(
    config: &SimulationConfig,
    demographics: &Demographics,
    table: &TransitionTable,
) -> Result<SimulationOutput, SimulationError> {
    config.validate(demographics)?;
    table.ensure_complete()?;

    // Each country's unique ids follow on from the previous country's.
    let mut jobs = Vec::with_capacity(config.countries.len());
    let mut id_offset = 0u64;
    for country in &config.countries {
        let country_demographics = demographics
            .get(country)
            .ok_or_else(|| SimulationError::UnknownCountry(country.clone()))?;
        jobs.push((country.as_str(), country_demographics, id_offset));
        id_offset += country_demographics.cohort_size(config.sample_ratio)? as u64;
    }

    let results: Vec<Result<Vec<TrajectoryRecord>, SimulationError>> = thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|(country, country_demographics, id_offset)| {
                scope.spawn(move || {
                    simulate_country(config, country, country_demographics, table, id_offset)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut trajectories = Vec::new();
    for result in results {
        trajectories.extend(result?);
    }
    trajectories.sort_by(|a, b| {
        (a.date, &a.country, a.unique_id).cmp(&(b.date, &b.country, b.unique_id))
    });

    let summaries = summarize_selection(
        &trajectories,
        &config.countries,
        config.start_date,
        config.end_date,
    );

    info!(
        "simulated {} countries: {} trajectory rows, {} summary rows",
        config.countries.len(),
        trajectories.len(),
        summaries.len()
    );

    Ok(SimulationOutput {
        trajectories,
        summaries,
    })
}
