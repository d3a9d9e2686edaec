use crate::{error::SimulationError, simulation::SimulationConfig};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

fn default_sample_ratio() -> f64 {
    1_000_000.0
}

/// Everything a run needs, as read from a JSON parameters file.
///
/// ```json
/// {
///   "countries": ["Chile", "Peru"],
///   "start_date": "2020-03-01",
///   "end_date": "2020-06-01",
///   "demographics_file": "data/demographics.csv"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub countries: Vec<String>,
    #[serde(default = "default_sample_ratio")]
    pub sample_ratio: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub seed: u64,
    pub demographics_file: PathBuf,
    /// Uses `TransitionTable::default_table()` when absent.
    #[serde(default)]
    pub transitions_file: Option<PathBuf>,
    /// Reports are written only when set.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl SimulationParameters {
    #[must_use]
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            countries: self.countries.clone(),
            sample_ratio: self.sample_ratio,
            start_date: self.start_date,
            end_date: self.end_date,
            seed: self.seed,
        }
    }
}

/// # Errors
/// I/O errors reading the file and JSON errors parsing it.
pub fn load_parameters(
    file_path: impl AsRef<Path>,
) -> Result<SimulationParameters, SimulationError> {
    let file_path = file_path.as_ref();
    let parameters: SimulationParameters = serde_json::from_str(&fs::read_to_string(file_path)?)?;
    debug!("loaded parameters from {}", file_path.display());
    Ok(parameters)
}
