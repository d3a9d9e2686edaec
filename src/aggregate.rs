//! Daily per-country state counts derived from trajectory records.

use crate::{progression::TrajectoryRecord, state::DiseaseState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The number of individuals of one country in each state on one date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub date: NaiveDate,
    pub country: String,
    pub healthy: usize,
    pub infected: usize,
    pub serious: usize,
    pub mild_immune: usize,
    pub deceased: usize,
}

impl SummaryRecord {
    #[must_use]
    pub fn empty(date: NaiveDate, country: &str) -> Self {
        SummaryRecord {
            date,
            country: country.to_string(),
            healthy: 0,
            infected: 0,
            serious: 0,
            mild_immune: 0,
            deceased: 0,
        }
    }

    #[must_use]
    pub fn count(&self, state: DiseaseState) -> usize {
        match state {
            DiseaseState::Healthy => self.healthy,
            DiseaseState::Infected => self.infected,
            DiseaseState::Serious => self.serious,
            DiseaseState::MildImmune => self.mild_immune,
            DiseaseState::Deceased => self.deceased,
        }
    }

    pub fn increment(&mut self, state: DiseaseState) {
        let count = match state {
            DiseaseState::Healthy => &mut self.healthy,
            DiseaseState::Infected => &mut self.infected,
            DiseaseState::Serious => &mut self.serious,
            DiseaseState::MildImmune => &mut self.mild_immune,
            DiseaseState::Deceased => &mut self.deceased,
        };
        *count += 1;
    }

    /// Sum over all five states; equals the country's cohort size.
    #[must_use]
    pub fn total(&self) -> usize {
        DiseaseState::ALL.iter().map(|state| self.count(*state)).sum()
    }
}

fn count_records<'a>(
    records: impl IntoIterator<Item = &'a TrajectoryRecord>,
    rows: &mut BTreeMap<(NaiveDate, String), SummaryRecord>,
) {
    for record in records {
        rows.entry((record.date, record.country.clone()))
            .or_insert_with(|| SummaryRecord::empty(record.date, &record.country))
            .increment(record.state);
    }
}

/// One row per `(date, country)` that appears in `records`, ordered by date then country.
#[must_use]
pub fn summarize(records: &[TrajectoryRecord]) -> Vec<SummaryRecord> {
    let mut rows = BTreeMap::new();
    count_records(records, &mut rows);
    rows.into_values().collect()
}

/// Like `summarize`, but every selected country gets a row for every date from `start_date`
/// to `end_date`, with zero counts where its cohort is empty.
#[must_use]
pub fn summarize_selection(
    records: &[TrajectoryRecord],
    countries: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<SummaryRecord> {
    let mut rows = BTreeMap::new();
    for date in start_date.iter_days().take_while(|date| *date <= end_date) {
        for country in countries {
            rows.insert(
                (date, country.clone()),
                SummaryRecord::empty(date, country),
            );
        }
    }
    count_records(records, &mut rows);
    rows.into_values().collect()
}
