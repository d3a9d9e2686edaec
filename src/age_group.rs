use crate::error::SimulationError;
use crate::property::Property;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The five fixed age buckets of the demographic data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeGroup {
    Under5,
    From5To14,
    From15To24,
    From25To64,
    Over65,
}

impl AgeGroup {
    /// All age groups, youngest first.
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Under5,
        AgeGroup::From5To14,
        AgeGroup::From15To24,
        AgeGroup::From25To64,
        AgeGroup::Over65,
    ];

    /// The canonical name, as used in demographic files and reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AgeGroup::Under5 => "under5",
            AgeGroup::From5To14 => "5to14",
            AgeGroup::From15To24 => "15to24",
            AgeGroup::From25To64 => "25to64",
            AgeGroup::Over65 => "over65",
        }
    }

    /// Position in `AgeGroup::ALL`.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for AgeGroup {
    type Err = SimulationError;

    /// Looks up an age group by name. Underscores and ASCII case are ignored, so
    /// `25_to_64`, `25to64` and `Over_65` all resolve.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        AgeGroup::ALL
            .into_iter()
            .find(|age_group| age_group.name() == normalized)
            .ok_or_else(|| SimulationError::UnknownAgeGroup(name.to_string()))
    }
}

impl Display for AgeGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for AgeGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AgeGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl Property for AgeGroup {
    fn name() -> &'static str {
        "AgeGroup"
    }

    fn is_required() -> bool {
        true
    }
}
