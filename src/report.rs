use crate::{
    aggregate::SummaryRecord, error::SimulationError, progression::TrajectoryRecord,
    simulation::SimulationOutput,
};
use csv::Writer;
use log::info;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

pub const TRAJECTORIES_FILE: &str = "trajectories.csv";
pub const SUMMARY_FILE: &str = "summary.csv";

// Checks that the path is a CSV file. Creates the file and all parent directories if
// they do not exist.
fn generate_validate_filepath(path: &Path) -> Result<File, SimulationError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(SimulationError::ReportError(format!(
            "report output files must be CSVs: {}",
            path.display()
        ))),
    }
}

/// Writes `records` to a CSV file at `path`, one row per record, with a header row.
///
/// # Errors
/// `SimulationError::ReportError` for a non-CSV path, and any I/O or CSV error.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), SimulationError> {
    let mut writer = Writer::from_writer(generate_validate_filepath(path)?);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// # Errors
/// See `write_records`.
pub fn write_trajectories(
    path: &Path,
    records: &[TrajectoryRecord],
) -> Result<(), SimulationError> {
    write_records(path, records)
}

/// # Errors
/// See `write_records`.
pub fn write_summaries(path: &Path, records: &[SummaryRecord]) -> Result<(), SimulationError> {
    write_records(path, records)
}

/// Writes `trajectories.csv` and `summary.csv` into `directory` and returns their paths.
///
/// # Errors
/// See `write_records`.
pub fn write_output(
    directory: &Path,
    output: &SimulationOutput,
) -> Result<(PathBuf, PathBuf), SimulationError> {
    let trajectories_path = directory.join(TRAJECTORIES_FILE);
    let summary_path = directory.join(SUMMARY_FILE);

    write_trajectories(&trajectories_path, &output.trajectories)?;
    write_summaries(&summary_path, &output.summaries)?;

    info!(
        "wrote {} and {}",
        trajectories_path.display(),
        summary_path.display()
    );
    Ok((trajectories_path, summary_path))
}
