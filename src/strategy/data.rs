//! Allocation plan data structures

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::assumptions::Stage;
use crate::error::{FundError, FundResult};

/// Fractions of free capital committed to each stage in one year
///
/// Stages without an entry allocate nothing. Fractions are applied in
/// `Stage::ALL` order against the capital left after the previous stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearAllocation {
    fractions: BTreeMap<Stage, f64>,
}

impl YearAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Even split across all stages, summing to 1
    pub fn even() -> Self {
        let share = 1.0 / Stage::ALL.len() as f64;
        Stage::ALL.iter().fold(Self::new(), |row, &stage| row.with(stage, share))
    }

    /// Set a stage's fraction, replacing any previous value
    pub fn with(mut self, stage: Stage, fraction: f64) -> Self {
        self.fractions.insert(stage, fraction);
        self
    }

    pub fn fraction(&self, stage: Stage) -> f64 {
        self.fractions.get(&stage).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.fractions.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, f64)> + '_ {
        self.fractions.iter().map(|(s, f)| (*s, *f))
    }
}

/// Year-indexed allocation plan
///
/// Fractions are trusted as given: negative values or rows summing above 1 are
/// kept as-is and only logged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    years: Vec<YearAllocation>,
}

impl AllocationPlan {
    pub fn new(years: Vec<YearAllocation>) -> Self {
        for (year, row) in years.iter().enumerate() {
            let total = row.total();
            if total > 1.0 + 1e-9 {
                warn!("Allocation for year {} sums to {:.4} (above 1)", year, total);
            }
            if row.iter().any(|(_, f)| f < 0.0) {
                warn!("Allocation for year {} contains negative fractions", year);
            }
        }
        Self { years }
    }

    /// Even allocation across all stages for each year
    pub fn even(years: usize) -> Self {
        Self {
            years: vec![YearAllocation::even(); years],
        }
    }

    /// Allocation row for a year
    pub fn year(&self, year: u32) -> FundResult<&YearAllocation> {
        self.years
            .get(year as usize)
            .ok_or(FundError::YearOutOfRange {
                year,
                plan_years: self.years.len(),
            })
    }

    /// Fraction allocated to a stage in a year
    pub fn fraction(&self, year: u32, stage: Stage) -> FundResult<f64> {
        Ok(self.year(year)?.fraction(stage))
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &YearAllocation> {
        self.years.iter()
    }
}
