//! Outcome model and maturity scheduling

use crate::assumptions::{HoldingPeriod, OutcomeTable, Stage};
use crate::error::FundResult;
use super::random::RandomSource;

/// Realized gross return for an investment given a standard normal draw
///
/// `principal * (mean + stddev * draw)`. Not floored at zero: draws deep in the
/// left tail lose more than the principal.
pub fn realize(outcomes: &OutcomeTable, stage: Stage, principal: f64, draw: f64) -> FundResult<f64> {
    let dist = outcomes.get(stage)?;
    Ok(principal * dist.multiple(draw))
}

/// Maturity year for an investment made in `investment_year`
pub fn schedule_maturity(investment_year: u32, holding_years: u32) -> u32 {
    investment_year + holding_years
}

/// Draw a holding period and schedule the maturity year
pub fn draw_maturity<R: RandomSource + ?Sized>(
    holding: &HoldingPeriod,
    investment_year: u32,
    rng: &mut R,
) -> u32 {
    let years = rng.next_int_in_range(holding.min_years, holding.max_years_exclusive);
    debug_assert!(holding.contains(years), "hold of {} years outside {:?}", years, holding);
    schedule_maturity(investment_year, years)
}
