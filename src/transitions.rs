/*!

The transition model: for every `(AgeGroup, DiseaseState)` pair, the probability of each
possible next state, plus the minimum number of days an individual must spend in a state
before a transition is evaluated at all.

A `TransitionTable` is immutable once built. Every distribution is validated at construction
and its weighted sampler is prepared once, so a simulation only ever reads from the table and
any number of threads can share it by reference.

*/

use crate::{age_group::AgeGroup, error::SimulationError, state::DiseaseState};
use log::debug;
use rand::{
    distr::{weighted::WeightedIndex, Distribution},
    Rng,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

/// How far a distribution's probabilities may drift from summing to exactly 1.0.
pub const PROBABILITY_EPSILON: f64 = 1e-6;

/// The next-state distribution for one `(AgeGroup, DiseaseState)` pair.
#[derive(Clone, Debug)]
pub struct TransitionDistribution {
    outcomes: Vec<(DiseaseState, f64)>,
    sampler: WeightedIndex<f64>,
}

impl TransitionDistribution {
    /// # Errors
    /// Returns `SimulationError::InvalidTransitionTable` if the list is empty, contains a
    /// negative or non-finite probability, or does not sum to 1.0 within
    /// `PROBABILITY_EPSILON`.
    pub fn new(outcomes: Vec<(DiseaseState, f64)>) -> Result<Self, SimulationError> {
        if outcomes.is_empty() {
            return Err(SimulationError::InvalidTransitionTable(
                "distribution has no outcomes".to_string(),
            ));
        }
        if let Some((state, p)) = outcomes
            .iter()
            .find(|(_, p)| !p.is_finite() || *p < 0.0)
        {
            return Err(SimulationError::InvalidTransitionTable(format!(
                "probability {p} for {state} is not a non-negative number"
            )));
        }
        let total: f64 = outcomes.iter().map(|(_, p)| p).sum();
        if (total - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(SimulationError::InvalidTransitionTable(format!(
                "probabilities sum to {total}, expected 1.0"
            )));
        }

        let sampler = WeightedIndex::new(outcomes.iter().map(|(_, p)| *p))
            .map_err(|e| SimulationError::InvalidTransitionTable(e.to_string()))?;

        Ok(TransitionDistribution { outcomes, sampler })
    }

    #[must_use]
    pub fn outcomes(&self) -> &[(DiseaseState, f64)] {
        &self.outcomes
    }

    /// A single weighted draw over the outcomes.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DiseaseState {
        self.outcomes[self.sampler.sample(rng)].0
    }
}

/// Age-stratified next-state distributions and per-state minimum dwell times.
#[derive(Clone, Debug)]
pub struct TransitionTable {
    // Indexed by `[AgeGroup::index()][DiseaseState::index()]`
    distributions: [[Option<TransitionDistribution>; 5]; 5],
    // Indexed by `DiseaseState::index()`
    min_dwell: [u32; 5],
}

impl TransitionTable {
    #[must_use]
    pub fn builder() -> TransitionTableBuilder {
        TransitionTableBuilder::default()
    }

    /// The ordered `(next state, probability)` list for an age group in a state.
    ///
    /// # Errors
    /// Returns `SimulationError::MissingTransition` if the table has no entry for the pair.
    pub fn next_state_distribution(
        &self,
        age_group: AgeGroup,
        state: DiseaseState,
    ) -> Result<&[(DiseaseState, f64)], SimulationError> {
        self.distribution(age_group, state)
            .map(TransitionDistribution::outcomes)
    }

    /// Minimum number of days in `state` before a transition may be evaluated.
    #[must_use]
    pub fn min_dwell(&self, state: DiseaseState) -> u32 {
        self.min_dwell[state.index()]
    }

    /// Draws the next state for an individual of `age_group` currently in `state`.
    /// Terminal states are returned unchanged without a draw.
    ///
    /// # Errors
    /// Returns `SimulationError::MissingTransition` if the table has no entry for the pair.
    pub fn sample_next_state<R: Rng + ?Sized>(
        &self,
        age_group: AgeGroup,
        state: DiseaseState,
        rng: &mut R,
    ) -> Result<DiseaseState, SimulationError> {
        if state.is_terminal() {
            return Ok(state);
        }
        Ok(self.distribution(age_group, state)?.sample(rng))
    }

    /// Every non-terminal `(AgeGroup, DiseaseState)` pair with no entry.
    #[must_use]
    pub fn missing_entries(&self) -> Vec<(AgeGroup, DiseaseState)> {
        AgeGroup::ALL
            .into_iter()
            .flat_map(|age_group| DiseaseState::ALL.map(|state| (age_group, state)))
            .filter(|(age_group, state)| {
                !state.is_terminal()
                    && self.distributions[age_group.index()][state.index()].is_none()
            })
            .collect()
    }

    /// Checks that every non-terminal pair has an entry, so a run cannot reach a gap.
    ///
    /// # Errors
    /// Returns `SimulationError::MissingTransition` for the first missing pair, youngest age
    /// group first.
    pub fn ensure_complete(&self) -> Result<(), SimulationError> {
        match self.missing_entries().first() {
            Some(&(age_group, state)) => {
                Err(SimulationError::MissingTransition { age_group, state })
            }
            None => Ok(()),
        }
    }

    fn distribution(
        &self,
        age_group: AgeGroup,
        state: DiseaseState,
    ) -> Result<&TransitionDistribution, SimulationError> {
        self.distributions[age_group.index()][state.index()]
            .as_ref()
            .ok_or(SimulationError::MissingTransition { age_group, state })
    }

    /// Builds a table from its serialized form.
    ///
    /// # Errors
    /// Any validation error from `TransitionTableBuilder::build`.
    pub fn from_config(config: TransitionConfig) -> Result<Self, SimulationError> {
        let mut builder = TransitionTable::builder();
        for (state, days) in config.min_dwell {
            builder = builder.min_dwell(state, days);
        }
        for entry in config.transitions {
            builder = builder.transition(entry.age_group, entry.state, entry.next);
        }
        builder.build()
    }

    /// Loads a table from a JSON file in the `TransitionConfig` format.
    ///
    /// # Errors
    /// I/O and JSON errors, or any validation error from `TransitionTableBuilder::build`.
    pub fn load(file_path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let file_path = file_path.as_ref();
        debug!("loading transition table from {}", file_path.display());
        let reader = BufReader::new(File::open(file_path)?);
        let config: TransitionConfig = serde_json::from_reader(reader)?;
        TransitionTable::from_config(config)
    }

    /// The shipped parameter set. Healthy individuals are infected at a small daily rate,
    /// older individuals are more likely to become seriously ill and to die, and immunity
    /// wanes slowly so reinfection is possible.
    #[must_use]
    pub fn default_table() -> Self {
        use AgeGroup::*;
        use DiseaseState::*;

        // (age group, P(infection), P(Infected -> Serious), P(Infected -> MildImmune),
        //  P(Serious -> Deceased), P(Serious -> Healthy))
        let rates: [(AgeGroup, f64, f64, f64, f64, f64); 5] = [
            (Under5, 0.004, 0.02, 0.48, 0.005, 0.195),
            (From5To14, 0.006, 0.01, 0.49, 0.002, 0.198),
            (From15To24, 0.008, 0.02, 0.48, 0.005, 0.195),
            (From25To64, 0.006, 0.05, 0.45, 0.020, 0.180),
            (Over65, 0.005, 0.15, 0.35, 0.080, 0.120),
        ];

        let mut builder = TransitionTable::builder()
            .min_dwell(Healthy, 0)
            .min_dwell(Infected, 4)
            .min_dwell(Serious, 7)
            .min_dwell(MildImmune, 30)
            .min_dwell(Deceased, 0);

        for (age_group, infection, serious, mild, death, recovery) in rates {
            builder = builder
                .transition(
                    age_group,
                    Healthy,
                    vec![(Healthy, 1.0 - infection), (Infected, infection)],
                )
                .transition(
                    age_group,
                    Infected,
                    vec![(Infected, 1.0 - serious - mild), (Serious, serious), (MildImmune, mild)],
                )
                .transition(
                    age_group,
                    Serious,
                    vec![(Serious, 1.0 - death - recovery), (Deceased, death), (Healthy, recovery)],
                )
                .transition(age_group, MildImmune, vec![(MildImmune, 0.99), (Healthy, 0.01)]);
        }

        match builder.build() {
            Ok(table) => table,
            Err(error) => unreachable!("the default transition table is invalid: {error}"),
        }
    }
}

/// Accumulates dwell times and distributions; `build` validates everything at once.
#[derive(Default, Debug)]
pub struct TransitionTableBuilder {
    min_dwell: [u32; 5],
    transitions: Vec<(AgeGroup, DiseaseState, Vec<(DiseaseState, f64)>)>,
}

impl TransitionTableBuilder {
    #[must_use]
    pub fn min_dwell(mut self, state: DiseaseState, days: u32) -> Self {
        self.min_dwell[state.index()] = days;
        self
    }

    /// Sets the distribution for one pair. A later call for the same pair replaces it.
    #[must_use]
    pub fn transition(
        mut self,
        age_group: AgeGroup,
        state: DiseaseState,
        next: Vec<(DiseaseState, f64)>,
    ) -> Self {
        self.transitions.push((age_group, state, next));
        self
    }

    /// Sets the same distribution for `state` in every age group.
    #[must_use]
    pub fn transition_all_ages(self, state: DiseaseState, next: &[(DiseaseState, f64)]) -> Self {
        AgeGroup::ALL
            .into_iter()
            .fold(self, |builder, age_group| {
                builder.transition(age_group, state, next.to_vec())
            })
    }

    /// # Errors
    /// Returns `SimulationError::InvalidTransitionTable` for an invalid distribution or for
    /// outgoing transitions from a terminal state.
    pub fn build(self) -> Result<TransitionTable, SimulationError> {
        let mut distributions: [[Option<TransitionDistribution>; 5]; 5] = Default::default();

        for (age_group, state, next) in self.transitions {
            if state.is_terminal() && next.iter().any(|(to, p)| *to != state && *p > 0.0) {
                return Err(SimulationError::InvalidTransitionTable(format!(
                    "{state} is terminal and cannot have outgoing transitions"
                )));
            }
            let distribution = TransitionDistribution::new(next).map_err(|error| match error {
                SimulationError::InvalidTransitionTable(message) => {
                    SimulationError::InvalidTransitionTable(format!(
                        "({age_group}, {state}): {message}"
                    ))
                }
                other => other,
            })?;
            distributions[age_group.index()][state.index()] = Some(distribution);
        }

        Ok(TransitionTable {
            distributions,
            min_dwell: self.min_dwell,
        })
    }
}

/// The on-disk form of a `TransitionTable`.
///
/// ```json
/// {
///   "min_dwell": { "Infected": 4 },
///   "transitions": [
///     { "age_group": "25to64", "state": "Healthy", "next": [["Healthy", 0.9], ["Infected", 0.1]] }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default)]
    pub min_dwell: BTreeMap<DiseaseState, u32>,
    pub transitions: Vec<TransitionEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub age_group: AgeGroup,
    pub state: DiseaseState,
    pub next: Vec<(DiseaseState, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Write;

    #[test]
    fn default_table_is_complete_and_normalized() {
        let table = TransitionTable::default_table();
        assert!(table.missing_entries().is_empty());

        for age_group in AgeGroup::ALL {
            for state in DiseaseState::ALL.into_iter().filter(|s| !s.is_terminal()) {
                let total: f64 = table
                    .next_state_distribution(age_group, state)
                    .unwrap()
                    .iter()
                    .map(|(_, p)| p)
                    .sum();
                assert!((total - 1.0).abs() <= PROBABILITY_EPSILON, "{age_group} {state}");
            }
        }
    }

    #[test]
    fn default_table_allows_reinfection() {
        let table = TransitionTable::default_table();
        let healthy = table
            .next_state_distribution(AgeGroup::From25To64, DiseaseState::Healthy)
            .unwrap();
        assert!(healthy
            .iter()
            .any(|(s, p)| *s == DiseaseState::Infected && *p > 0.0));
        assert_eq!(table.min_dwell(DiseaseState::Infected), 4);
    }

    #[test]
    fn deceased_needs_no_entry() {
        let table = TransitionTable::default_table();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            table
                .sample_next_state(AgeGroup::Over65, DiseaseState::Deceased, &mut rng)
                .unwrap(),
            DiseaseState::Deceased
        );
    }

    #[test]
    fn missing_entry_is_reported() {
        let table = TransitionTable::builder()
            .transition_all_ages(DiseaseState::Healthy, &[(DiseaseState::Healthy, 1.0)])
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let error = table
            .sample_next_state(AgeGroup::Under5, DiseaseState::Serious, &mut rng)
            .unwrap_err();
        assert!(matches!(
            error,
            SimulationError::MissingTransition {
                age_group: AgeGroup::Under5,
                state: DiseaseState::Serious
            }
        ));
        assert_eq!(table.missing_entries().len(), 15);
        assert!(matches!(
            table.ensure_complete(),
            Err(SimulationError::MissingTransition {
                age_group: AgeGroup::Under5,
                state: DiseaseState::Infected
            })
        ));
        assert!(TransitionTable::default_table().ensure_complete().is_ok());
    }

    #[test]
    fn rejects_unnormalized_distribution() {
        let result = TransitionTable::builder()
            .transition(
                AgeGroup::Over65,
                DiseaseState::Infected,
                vec![(DiseaseState::Serious, 0.5), (DiseaseState::MildImmune, 0.4)],
            )
            .build();
        assert!(matches!(result, Err(SimulationError::InvalidTransitionTable(_))));
    }

    #[test]
    fn tolerates_rounding_drift() {
        let result = TransitionTable::builder()
            .transition_all_ages(
                DiseaseState::Infected,
                &[
                    (DiseaseState::Serious, 0.1),
                    (DiseaseState::MildImmune, 0.2),
                    (DiseaseState::Infected, 0.7000000001),
                ],
            )
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_negative_probability() {
        let result = TransitionDistribution::new(vec![
            (DiseaseState::Healthy, 1.5),
            (DiseaseState::Infected, -0.5),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_transition_out_of_deceased() {
        let result = TransitionTable::builder()
            .transition_all_ages(DiseaseState::Deceased, &[(DiseaseState::Healthy, 1.0)])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn certain_outcome_is_always_drawn() {
        let table = TransitionTable::builder()
            .transition_all_ages(
                DiseaseState::Healthy,
                &[(DiseaseState::Healthy, 0.0), (DiseaseState::Infected, 1.0)],
            )
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            assert_eq!(
                table
                    .sample_next_state(AgeGroup::From5To14, DiseaseState::Healthy, &mut rng)
                    .unwrap(),
                DiseaseState::Infected
            );
        }
    }

    #[test]
    fn loads_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "min_dwell": {{ "Infected": 3 }},
                "transitions": [
                    {{ "age_group": "25_to_64", "state": "Healthy",
                       "next": [["Healthy", 0.75], ["Infected", 0.25]] }}
                ]
            }}"#
        )
        .unwrap();

        let table = TransitionTable::load(file.path()).unwrap();
        assert_eq!(table.min_dwell(DiseaseState::Infected), 3);
        assert_eq!(table.min_dwell(DiseaseState::Serious), 0);
        assert_eq!(
            table
                .next_state_distribution(AgeGroup::From25To64, DiseaseState::Healthy)
                .unwrap(),
            &[(DiseaseState::Healthy, 0.75), (DiseaseState::Infected, 0.25)]
        );
    }
}
