//! Error types for fund simulation

use thiserror::Error;

use crate::assumptions::Stage;

/// Configuration and input errors raised by the simulator
///
/// Randomness-driven outcomes (losses, negative capital) are never errors;
/// only malformed inputs end up here.
#[derive(Debug, Error)]
pub enum FundError {
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("No outcome distribution configured for stage {0}")]
    MissingDistribution(Stage),

    #[error("Invalid outcome distribution for {stage}: {reason}")]
    InvalidDistribution { stage: Stage, reason: String },

    #[error("Allocation year {year} is outside the plan (plan covers {plan_years} years)")]
    YearOutOfRange { year: u32, plan_years: usize },

    #[error("Horizon must be at least one year, got {0}")]
    InvalidHorizon(u32),

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FundResult<T> = Result<T, FundError>;
