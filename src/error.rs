use std::fmt::{self, Debug, Display};
use std::io;

use chrono::NaiveDate;

use crate::age_group::AgeGroup;
use crate::state::DiseaseState;

/// Provides `SimulationError` and maps other errors to
/// convert to a `SimulationError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimulationError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    UnknownCountry(String),
    UnknownAgeGroup(String),
    UnknownState(String),
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    InvalidSampleRatio(f64),
    InvalidDemographics(String),
    InvalidTransitionTable(String),
    MissingTransition { age_group: AgeGroup, state: DiseaseState },
    ReportError(String),
    ConfigError(String),
}

impl From<io::Error> for SimulationError {
    fn from(error: io::Error) -> Self {
        SimulationError::IoError(error)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::JsonError(error)
    }
}

impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        SimulationError::CSVError(error)
    }
}

impl From<String> for SimulationError {
    fn from(error: String) -> Self {
        SimulationError::ConfigError(error)
    }
}

impl From<&str> for SimulationError {
    fn from(error: &str) -> Self {
        SimulationError::ConfigError(error.to_string())
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::IoError(error) => Some(error),
            SimulationError::JsonError(error) => Some(error),
            SimulationError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::IoError(error) => write!(f, "I/O error: {error}"),
            SimulationError::JsonError(error) => write!(f, "JSON error: {error}"),
            SimulationError::CSVError(error) => write!(f, "CSV error: {error}"),
            SimulationError::UnknownCountry(name) => write!(f, "unknown country: {name}"),
            SimulationError::UnknownAgeGroup(name) => write!(f, "unknown age group: {name}"),
            SimulationError::UnknownState(name) => write!(f, "unknown disease state: {name}"),
            SimulationError::InvalidDateRange { start, end } => {
                write!(f, "end date {end} is before start date {start}")
            }
            SimulationError::InvalidSampleRatio(ratio) => {
                write!(f, "sample ratio must be a positive finite number, got {ratio}")
            }
            SimulationError::InvalidDemographics(message) => {
                write!(f, "invalid demographics: {message}")
            }
            SimulationError::InvalidTransitionTable(message) => {
                write!(f, "invalid transition table: {message}")
            }
            SimulationError::MissingTransition { age_group, state } => {
                write!(f, "no transition entry for ({age_group}, {state})")
            }
            SimulationError::ReportError(message) => write!(f, "report error: {message}"),
            SimulationError::ConfigError(message) => write!(f, "configuration error: {message}"),
        }
    }
}
