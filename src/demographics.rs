/*!

Country demographics and the arithmetic that scales them down to a synthetic cohort.

A country is described by its total population and the percentage of that population in each
of the five age groups. The cohort for an age group has
`round(population × percentage / sample_ratio)` members, which keeps the relative age
structure while making the cohort small enough to simulate person by person.

*/

use crate::{age_group::AgeGroup, error::SimulationError};
use log::{debug, warn};
use serde::Deserialize;
use std::{collections::BTreeMap, io, path::Path};

/// Country name to demographics. Ordered so that iteration is deterministic.
pub type Demographics = BTreeMap<String, CountryDemographics>;

/// How far the age percentages may stray from 100 before a warning is logged.
const PERCENTAGE_SUM_TOLERANCE: f64 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct CountryDemographics {
    pub population: u64,
    /// Percentage of the population in each age group, indexed by `AgeGroup::index()`.
    pub age_distribution: [f64; 5],
}

impl CountryDemographics {
    /// # Errors
    /// Returns `SimulationError::InvalidDemographics` if a percentage is negative or not
    /// finite.
    pub fn new(population: u64, age_distribution: [f64; 5]) -> Result<Self, SimulationError> {
        for (age_group, percentage) in AgeGroup::ALL.into_iter().zip(age_distribution) {
            if !percentage.is_finite() || percentage < 0.0 {
                return Err(SimulationError::InvalidDemographics(format!(
                    "percentage {percentage} for {age_group} is not a non-negative number"
                )));
            }
        }

        let total: f64 = age_distribution.iter().sum();
        if (total - 100.0).abs() > PERCENTAGE_SUM_TOLERANCE {
            warn!("age distribution sums to {total}%, not 100%");
        }

        Ok(CountryDemographics {
            population,
            age_distribution,
        })
    }

    #[must_use]
    pub fn percentage(&self, age_group: AgeGroup) -> f64 {
        self.age_distribution[age_group.index()]
    }

    /// The number of synthetic individuals in each age group, youngest first.
    ///
    /// # Errors
    /// Returns `SimulationError::InvalidSampleRatio` unless `sample_ratio` is positive and
    /// finite.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn cohort_sizes(
        &self,
        sample_ratio: f64,
    ) -> Result<[(AgeGroup, usize); 5], SimulationError> {
        validate_sample_ratio(sample_ratio)?;
        let population = self.population as f64;

        Ok(AgeGroup::ALL.map(|age_group| {
            let scaled = (population * self.percentage(age_group) / sample_ratio).round();
            (age_group, scaled as usize)
        }))
    }

    /// Total cohort size across all age groups.
    ///
    /// # Errors
    /// See `cohort_sizes`.
    pub fn cohort_size(&self, sample_ratio: f64) -> Result<usize, SimulationError> {
        Ok(self
            .cohort_sizes(sample_ratio)?
            .iter()
            .map(|(_, count)| count)
            .sum())
    }
}

/// # Errors
/// Returns `SimulationError::InvalidSampleRatio` unless `sample_ratio` is positive and finite.
pub fn validate_sample_ratio(sample_ratio: f64) -> Result<(), SimulationError> {
    if sample_ratio.is_finite() && sample_ratio > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidSampleRatio(sample_ratio))
    }
}

/// One row of a demographics CSV file.
#[derive(Debug, Deserialize)]
struct DemographicsRecord {
    country: String,
    population: u64,
    under5: f64,
    #[serde(rename = "5to14")]
    from_5_to_14: f64,
    #[serde(rename = "15to24")]
    from_15_to_24: f64,
    #[serde(rename = "25to64")]
    from_25_to_64: f64,
    over65: f64,
}

/// Reads demographics from CSV with the header
/// `country,population,under5,5to14,15to24,25to64,over65`.
///
/// # Errors
/// CSV errors, invalid percentages, or a country listed twice.
pub fn read_demographics<R: io::Read>(reader: R) -> Result<Demographics, SimulationError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut demographics = Demographics::new();

    for result in reader.deserialize() {
        let record: DemographicsRecord = result?;
        let country = CountryDemographics::new(
            record.population,
            [
                record.under5,
                record.from_5_to_14,
                record.from_15_to_24,
                record.from_25_to_64,
                record.over65,
            ],
        )
        .map_err(|error| match error {
            SimulationError::InvalidDemographics(message) => {
                SimulationError::InvalidDemographics(format!("{}: {message}", record.country))
            }
            other => other,
        })?;

        if demographics.insert(record.country.clone(), country).is_some() {
            return Err(SimulationError::InvalidDemographics(format!(
                "{} is listed more than once",
                record.country
            )));
        }
    }

    debug!("loaded demographics for {} countries", demographics.len());
    Ok(demographics)
}

/// Loads demographics from a CSV file. See `read_demographics` for the format.
///
/// # Errors
/// I/O errors opening the file, and everything `read_demographics` reports.
pub fn load_demographics(file_path: impl AsRef<Path>) -> Result<Demographics, SimulationError> {
    let file = std::fs::File::open(file_path.as_ref())?;
    read_demographics(io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
country,population,under5,5to14,15to24,25to64,over65
Chile,19000000,6.0,13.0,14.0,54.0,13.0
Peru, 33000000, 8.0, 17.0, 16.0, 50.0, 9.0
";

    #[test]
    fn cohort_preserves_proportions() {
        let chile = CountryDemographics::new(19_000_000, [6.0, 13.0, 14.0, 54.0, 13.0]).unwrap();
        let sizes = chile.cohort_sizes(1_000_000.0).unwrap();
        let counts: Vec<usize> = sizes.iter().map(|(_, n)| *n).collect();
        // 19 × percentage, rounded
        assert_eq!(counts, vec![114, 247, 266, 1026, 247]);
        assert_eq!(sizes[3].0, AgeGroup::From25To64);
        assert_eq!(chile.cohort_size(1_000_000.0).unwrap(), 1900);
    }

    #[test]
    fn ratio_equal_to_population_gives_rounded_percentages() {
        let country = CountryDemographics::new(5_000_000, [5.4, 12.5, 15.6, 51.0, 15.5]).unwrap();
        let counts: Vec<usize> = country
            .cohort_sizes(5_000_000.0)
            .unwrap()
            .iter()
            .map(|(_, n)| *n)
            .collect();
        assert_eq!(counts, vec![5, 13, 16, 51, 16]);
    }

    #[test]
    fn tiny_population_rounds_to_empty_cohort() {
        let country = CountryDemographics::new(800, [6.0, 13.0, 14.0, 54.0, 13.0]).unwrap();
        assert_eq!(country.cohort_size(1_000_000.0).unwrap(), 0);
    }

    #[test]
    fn rejects_bad_sample_ratio() {
        let country = CountryDemographics::new(800, [20.0; 5]).unwrap();
        assert!(matches!(
            country.cohort_sizes(0.0),
            Err(SimulationError::InvalidSampleRatio(_))
        ));
        assert!(country.cohort_sizes(-3.0).is_err());
        assert!(country.cohort_sizes(f64::NAN).is_err());
    }

    #[test]
    fn rejects_negative_percentage() {
        assert!(CountryDemographics::new(10, [50.0, 50.0, 10.0, -10.0, 0.0]).is_err());
    }

    #[test]
    fn reads_csv() {
        let demographics = read_demographics(CSV.as_bytes()).unwrap();
        assert_eq!(demographics.len(), 2);
        let peru = &demographics["Peru"];
        assert_eq!(peru.population, 33_000_000);
        assert!((peru.percentage(AgeGroup::Over65) - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn csv_rows_are_validated() {
        let csv = format!("{CSV}Atlantis,1000,-5.0,25,20,40,20\n");
        assert!(matches!(
            read_demographics(csv.as_bytes()),
            Err(SimulationError::InvalidDemographics(message)) if message.starts_with("Atlantis")
        ));
    }

    #[test]
    fn duplicate_country_is_an_error() {
        let csv = format!("{CSV}Chile,1,20,20,20,20,20\n");
        assert!(matches!(
            read_demographics(csv.as_bytes()),
            Err(SimulationError::InvalidDemographics(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demographics.csv");
        std::fs::write(&path, CSV).unwrap();
        let demographics = load_demographics(&path).unwrap();
        assert!(demographics.contains_key("Chile"));
    }
}
