//! Investment stages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FundError;

/// Investment round category
///
/// The set is closed; iteration order follows `Stage::ALL`, which is also the
/// order capital is drawn down within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "Pre-seed")]
    PreSeed,
    #[serde(rename = "Seed")]
    Seed,
    #[serde(rename = "Post-seed")]
    PostSeed,
    #[serde(rename = "Series A")]
    SeriesA,
}

impl Stage {
    /// All stages in investment order
    pub const ALL: [Stage; 4] = [Stage::PreSeed, Stage::Seed, Stage::PostSeed, Stage::SeriesA];

    /// Display name, also used as the CSV column header
    pub fn name(self) -> &'static str {
        match self {
            Stage::PreSeed => "Pre-seed",
            Stage::Seed => "Seed",
            Stage::PostSeed => "Post-seed",
            Stage::SeriesA => "Series A",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pre-seed" => Ok(Stage::PreSeed),
            "Seed" => Ok(Stage::Seed),
            "Post-seed" => Ok(Stage::PostSeed),
            "Series A" => Ok(Stage::SeriesA),
            other => Err(FundError::UnknownStage(other.to_string())),
        }
    }
}
