//! CSV-based assumption loader
//!
//! Loads stage outcome distributions from data/assumptions/

use std::fs::File;
use std::path::Path;

use super::{OutcomeDistribution, OutcomeTable, Stage};
use crate::error::FundResult;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// File holding one `stage,mean,stddev` row per stage
pub const OUTCOME_DISTRIBUTIONS_FILE: &str = "outcome_distributions.csv";

#[derive(Debug, serde::Deserialize)]
struct OutcomeRow {
    stage: String,
    mean: f64,
    stddev: f64,
}

/// Load outcome distributions from any reader
pub fn load_outcome_table_from_reader<R: std::io::Read>(reader: R) -> FundResult<OutcomeTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();

    for result in csv_reader.deserialize() {
        let row: OutcomeRow = result?;
        let stage: Stage = row.stage.parse()?;
        entries.push((stage, OutcomeDistribution::new(row.mean, row.stddev)));
    }

    let table = OutcomeTable::from_entries(entries)?;
    table.ensure_complete()?;
    Ok(table)
}

/// Load outcome distributions from `outcome_distributions.csv` in the given directory
pub fn load_outcome_table(path: &Path) -> FundResult<OutcomeTable> {
    let file = File::open(path.join(OUTCOME_DISTRIBUTIONS_FILE))?;
    load_outcome_table_from_reader(file)
}
