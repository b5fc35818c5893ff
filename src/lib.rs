//! Venture fund simulator - year-by-year fund model with a European distribution waterfall
//!
//! This library provides:
//! - Stage outcome distributions and holding-period assumptions
//! - Year-indexed allocation plans (built-in even split or CSV)
//! - The fund engine: invest, mature positions, deduct management fees
//! - Per-return waterfall: return of capital, preferred return, catch-up, carry split
//! - Seeded single runs and parallel multi-seed batches

pub mod assumptions;
pub mod error;
pub mod projection;
pub mod scenario;
pub mod strategy;

// Re-export commonly used types
pub use assumptions::{Assumptions, OutcomeDistribution, OutcomeTable, Stage};
pub use error::{FundError, FundResult};
pub use projection::{
    FundConfig, FundEngine, FundState, InvestmentRecord, RandomSource, ReturnRecord,
    SeededRandom, SimulationResult,
};
pub use scenario::ScenarioRunner;
pub use strategy::AllocationPlan;
