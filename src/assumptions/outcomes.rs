//! Stage outcome distributions and holding periods

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Stage;
use crate::error::{FundError, FundResult};

/// Normal distribution of the return multiple for one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    /// Mean multiple on invested capital
    pub mean: f64,
    /// Standard deviation of the multiple
    pub stddev: f64,
}

impl OutcomeDistribution {
    pub fn new(mean: f64, stddev: f64) -> Self {
        Self { mean, stddev }
    }

    /// Multiple realized for a standard normal draw
    pub fn multiple(&self, draw: f64) -> f64 {
        self.mean + self.stddev * draw
    }
}

/// Outcome distribution per stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTable {
    distributions: BTreeMap<Stage, OutcomeDistribution>,
}

impl OutcomeTable {
    /// Build from (stage, distribution) pairs, validating each entry
    pub fn from_entries<I>(entries: I) -> FundResult<Self>
    where
        I: IntoIterator<Item = (Stage, OutcomeDistribution)>,
    {
        let mut distributions = BTreeMap::new();
        for (stage, dist) in entries {
            if !dist.mean.is_finite() {
                return Err(FundError::InvalidDistribution {
                    stage,
                    reason: format!("mean must be finite, got {}", dist.mean),
                });
            }
            if !dist.stddev.is_finite() || dist.stddev < 0.0 {
                return Err(FundError::InvalidDistribution {
                    stage,
                    reason: format!("stddev must be finite and non-negative, got {}", dist.stddev),
                });
            }
            distributions.insert(stage, dist);
        }
        Ok(Self { distributions })
    }

    /// Default venture table
    pub fn default_venture() -> Self {
        let mut distributions = BTreeMap::new();
        distributions.insert(Stage::PreSeed, OutcomeDistribution::new(0.8, 0.5));
        distributions.insert(Stage::Seed, OutcomeDistribution::new(1.2, 0.6));
        distributions.insert(Stage::PostSeed, OutcomeDistribution::new(1.6, 0.7));
        distributions.insert(Stage::SeriesA, OutcomeDistribution::new(2.0, 0.8));
        Self { distributions }
    }

    /// Look up a stage's distribution
    pub fn get(&self, stage: Stage) -> FundResult<&OutcomeDistribution> {
        self.distributions
            .get(&stage)
            .ok_or(FundError::MissingDistribution(stage))
    }

    /// Fails on the first stage with no distribution
    pub fn ensure_complete(&self) -> FundResult<()> {
        for stage in Stage::ALL {
            self.get(stage)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &OutcomeDistribution)> {
        self.distributions.iter().map(|(s, d)| (*s, d))
    }
}

impl Default for OutcomeTable {
    fn default() -> Self {
        Self::default_venture()
    }
}

/// Range of holding periods in years, drawn uniformly from `min_years..max_years_exclusive`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingPeriod {
    pub min_years: u32,
    pub max_years_exclusive: u32,
}

impl HoldingPeriod {
    pub fn new(min_years: u32, max_years_exclusive: u32) -> FundResult<Self> {
        if max_years_exclusive <= min_years {
            return Err(FundError::InvalidInput {
                field: "holding_period".into(),
                reason: format!(
                    "empty range {}..{}",
                    min_years, max_years_exclusive
                ),
            });
        }
        Ok(Self { min_years, max_years_exclusive })
    }

    pub fn contains(&self, years: u32) -> bool {
        years >= self.min_years && years < self.max_years_exclusive
    }
}

impl Default for HoldingPeriod {
    fn default() -> Self {
        Self { min_years: 4, max_years_exclusive: 7 }
    }
}
