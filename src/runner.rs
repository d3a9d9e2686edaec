use crate::{
    demographics::load_demographics,
    error::SimulationError,
    log::{info, set_log_level, LevelFilter},
    parameters::{load_parameters, SimulationParameters},
    report::write_output,
    simulation::{run_simulation, SimulationOutput},
    transitions::TransitionTable,
};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments. Anything given here overrides the parameters file.
#[derive(Parser, Debug, Default)]
#[command(
    name = "disease-progression",
    about = "Simulates age-stratified disease-state trajectories for a selection of countries"
)]
pub struct Args {
    /// Optional path to a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Demographics CSV file
    #[arg(long)]
    pub demographics: Option<PathBuf>,

    /// Transition table JSON file; the built-in table is used when absent
    #[arg(long)]
    pub transitions: Option<PathBuf>,

    /// Comma-separated country names
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// First simulated date, YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last simulated date (inclusive), YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Real people per synthetic individual
    #[arg(long)]
    pub sample_ratio: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Directory for trajectories.csv and summary.csv
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Logging level: off, error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<LevelFilter>,
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, SimulationError> {
    value.ok_or_else(|| SimulationError::ConfigError(format!("{name} is required")))
}

/// Merges the parameters file named by `--config`, if any, with the other arguments.
///
/// # Errors
/// Errors loading the parameters file, or `SimulationError::ConfigError` when a required value
/// is given neither on the command line nor in the file.
pub fn resolve_parameters(args: &Args) -> Result<SimulationParameters, SimulationError> {
    let base = match &args.config {
        Some(path) => {
            info!("loading parameters from {}", path.display());
            Some(load_parameters(path)?)
        }
        None => None,
    };

    let countries = if args.countries.is_empty() {
        base.as_ref().map(|p| p.countries.clone()).unwrap_or_default()
    } else {
        args.countries.clone()
    };
    if countries.is_empty() {
        return Err(SimulationError::ConfigError(
            "countries is required".to_string(),
        ));
    }

    Ok(SimulationParameters {
        countries,
        sample_ratio: args
            .sample_ratio
            .or(base.as_ref().map(|p| p.sample_ratio))
            .unwrap_or(1_000_000.0),
        start_date: required(
            args.start_date.or(base.as_ref().map(|p| p.start_date)),
            "start date",
        )?,
        end_date: required(
            args.end_date.or(base.as_ref().map(|p| p.end_date)),
            "end date",
        )?,
        seed: args
            .random_seed
            .or(base.as_ref().map(|p| p.seed))
            .unwrap_or_default(),
        demographics_file: required(
            args.demographics
                .clone()
                .or_else(|| base.as_ref().map(|p| p.demographics_file.clone())),
            "demographics file",
        )?,
        transitions_file: args
            .transitions
            .clone()
            .or_else(|| base.as_ref().and_then(|p| p.transitions_file.clone())),
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| base.as_ref().and_then(|p| p.output_dir.clone())),
    })
}

/// Loads the inputs, runs the simulation and writes the reports if an output directory was
/// given.
///
/// # Errors
/// Any configuration, input, simulation or report error.
pub fn run_with_args(args: &Args) -> Result<SimulationOutput, SimulationError> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let parameters = resolve_parameters(args)?;
    let demographics = load_demographics(&parameters.demographics_file)?;

    let table = match &parameters.transitions_file {
        Some(path) => TransitionTable::load(path)?,
        None => TransitionTable::default_table(),
    };
    table.ensure_complete()?;

    let output = run_simulation(&parameters.simulation_config(), &demographics, &table)?;

    if let Some(output_dir) = &parameters.output_dir {
        write_output(output_dir, &output)?;
    }
    Ok(output)
}

/// Parses the process arguments and runs.
///
/// # Errors
/// See `run_with_args`.
pub fn run() -> Result<SimulationOutput, SimulationError> {
    run_with_args(&Args::parse())
}
