//! Allocation plans and plan loading

mod data;
pub mod loader;

pub use data::{AllocationPlan, YearAllocation};
pub use loader::{load_plan, load_plan_from_reader};
