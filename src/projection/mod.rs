//! Fund projection: engine, waterfall, outcome model and records

mod state;
mod engine;
mod records;
pub mod irr;
pub mod outcome;
pub mod random;
pub mod waterfall;

pub use state::{FundState, PendingInvestment};
pub use engine::{FundConfig, FundEngine};
pub use records::{InvestmentRecord, ReturnRecord, SimulationResult, SimulationSummary, YearRow};
pub use irr::{calculate_irr, calculate_lp_irr};
pub use outcome::{draw_maturity, realize, schedule_maturity};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use waterfall::{distribute, WaterfallDistribution, WaterfallTerms};
