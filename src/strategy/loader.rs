//! Load allocation plans from CSV
//!
//! Expected layout: a `year` column followed by one column per stage, e.g.
//! `year,Pre-seed,Seed,Post-seed,Series A`. Rows must be in year order starting at 0.

use std::path::Path;

use csv::Reader;

use super::{AllocationPlan, YearAllocation};
use crate::assumptions::Stage;
use crate::error::{FundError, FundResult};

const YEAR_COLUMN: &str = "year";

fn read_plan<R: std::io::Read>(mut reader: Reader<R>) -> FundResult<AllocationPlan> {
    let headers = reader.headers()?.clone();

    let mut year_idx = None;
    let mut stage_columns = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if header.trim().eq_ignore_ascii_case(YEAR_COLUMN) {
            year_idx = Some(idx);
        } else {
            stage_columns.push((idx, header.parse::<Stage>()?));
        }
    }

    let year_idx = year_idx.ok_or_else(|| FundError::InvalidInput {
        field: YEAR_COLUMN.into(),
        reason: "allocation plan has no year column".into(),
    })?;

    let mut years = Vec::new();
    for result in reader.records() {
        let record = result?;
        let year: usize = parse_field(&record[year_idx], YEAR_COLUMN)?;
        if year != years.len() {
            return Err(FundError::InvalidInput {
                field: YEAR_COLUMN.into(),
                reason: format!("expected year {} but found {}", years.len(), year),
            });
        }

        let mut row = YearAllocation::new();
        for &(idx, stage) in &stage_columns {
            let fraction: f64 = parse_field(&record[idx], stage.name())?;
            row = row.with(stage, fraction);
        }
        years.push(row);
    }

    Ok(AllocationPlan::new(years))
}

fn parse_field<T: std::str::FromStr>(raw: &str, field: &str) -> FundResult<T> {
    raw.trim().parse().map_err(|_| FundError::InvalidInput {
        field: field.to_string(),
        reason: format!("cannot parse {:?}", raw),
    })
}

/// Load an allocation plan from a CSV file
pub fn load_plan<P: AsRef<Path>>(path: P) -> FundResult<AllocationPlan> {
    read_plan(Reader::from_path(path)?)
}

/// Load an allocation plan from any reader
pub fn load_plan_from_reader<R: std::io::Read>(reader: R) -> FundResult<AllocationPlan> {
    read_plan(Reader::from_reader(reader))
}
