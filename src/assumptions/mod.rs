//! Fund assumptions: stage outcome distributions and holding periods

mod outcomes;
mod stage;
pub mod loader;

pub use outcomes::{HoldingPeriod, OutcomeDistribution, OutcomeTable};
pub use stage::Stage;

use std::path::Path;

use crate::error::FundResult;

/// Container for all simulation assumptions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assumptions {
    pub outcomes: OutcomeTable,
    pub holding: HoldingPeriod,
}

impl Assumptions {
    /// Built-in venture assumptions (four stages, 4 to 6 year holds)
    pub fn default_venture() -> Self {
        Self {
            outcomes: OutcomeTable::default_venture(),
            holding: HoldingPeriod::default(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> FundResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> FundResult<Self> {
        Ok(Self {
            outcomes: loader::load_outcome_table(path)?,
            holding: HoldingPeriod::default(),
        })
    }
}
