use crate::error::SimulationError;
use crate::property::Property;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// An individual's disease state. Ordering only matters for display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiseaseState {
    Healthy,
    Infected,
    Serious,
    MildImmune,
    Deceased,
}

impl DiseaseState {
    pub const ALL: [DiseaseState; 5] = [
        DiseaseState::Healthy,
        DiseaseState::Infected,
        DiseaseState::Serious,
        DiseaseState::MildImmune,
        DiseaseState::Deceased,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DiseaseState::Healthy => "Healthy",
            DiseaseState::Infected => "Infected",
            DiseaseState::Serious => "Serious",
            DiseaseState::MildImmune => "MildImmune",
            DiseaseState::Deceased => "Deceased",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// A terminal state is never left, so no transition is ever evaluated for it.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == DiseaseState::Deceased
    }
}

impl FromStr for DiseaseState {
    type Err = SimulationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        DiseaseState::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| SimulationError::UnknownState(name.to_string()))
    }
}

impl Display for DiseaseState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Property for DiseaseState {
    fn name() -> &'static str {
        "DiseaseState"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_deceased_is_terminal() {
        let terminal: Vec<_> = DiseaseState::ALL
            .into_iter()
            .filter(|state| state.is_terminal())
            .collect();
        assert_eq!(terminal, vec![DiseaseState::Deceased]);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("mildimmune".parse::<DiseaseState>().unwrap(), DiseaseState::MildImmune);
        assert!("Recovered".parse::<DiseaseState>().is_err());
    }
}
