//! European distribution waterfall applied to each realized return
//!
//! Tiers run in order, each consuming what the previous one left:
//!
//! 1. Return of capital: `min(gross, principal)`
//! 2. Preferred return: `min(remaining, principal * preferred_rate)`
//! 3. Catch-up: while the LP running total is below `fund_capital * (1 - carry)`,
//!    `min(remaining, target - running_total)`. Credited to LPs, not the GP.
//! 4. Profit split: `(1 - carry)` of what is left to LPs, `carry` to the GP.
//!
//! The running total used by the catch-up gate already includes this return's
//! tier 1 and 2 payments. A non-positive gross return lands entirely in tier 1,
//! so losses reduce the LP total and the GP receives nothing.

use serde::{Deserialize, Serialize};

/// Carry and hurdle terms of the fund
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterfallTerms {
    /// GP share of residual profit
    pub carry_rate: f64,
    /// LP hurdle as a fraction of principal
    pub preferred_return_rate: f64,
}

impl Default for WaterfallTerms {
    fn default() -> Self {
        Self {
            carry_rate: 0.20,
            preferred_return_rate: 0.08,
        }
    }
}

/// Per-tier breakdown of one distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterfallDistribution {
    pub return_of_capital: f64,
    pub preferred_return: f64,
    pub catch_up: f64,
    /// LP share of the residual profit split
    pub lp_profit_share: f64,
    /// GP share of the residual profit split
    pub gp_carry: f64,
}

impl WaterfallDistribution {
    /// Amount added to cumulative LP distributions
    pub fn lp_delta(&self) -> f64 {
        self.return_of_capital + self.preferred_return + self.catch_up + self.lp_profit_share
    }

    /// Amount credited to fund capital
    pub fn gp_delta(&self) -> f64 {
        self.gp_carry
    }

    /// Everything distributed; equals the gross return
    pub fn total(&self) -> f64 {
        self.lp_delta() + self.gp_delta()
    }
}

/// Run the waterfall for one realized return
///
/// Pure: the caller applies `lp_delta` to its LP total and `gp_delta` to fund capital.
pub fn distribute(
    gross_return: f64,
    principal: f64,
    cumulative_lp_distributions: f64,
    fund_capital: f64,
    terms: &WaterfallTerms,
) -> WaterfallDistribution {
    let carry = terms.carry_rate;
    let mut remaining = gross_return;
    let mut lp_running = cumulative_lp_distributions;

    let return_of_capital = remaining.min(principal);
    remaining -= return_of_capital;
    lp_running += return_of_capital;

    let preferred_return = remaining.min(principal * terms.preferred_return_rate);
    remaining -= preferred_return;
    lp_running += preferred_return;

    let catch_up_target = fund_capital * (1.0 - carry);
    let catch_up = if lp_running < catch_up_target {
        remaining.min(catch_up_target - lp_running)
    } else {
        0.0
    };
    remaining -= catch_up;

    WaterfallDistribution {
        return_of_capital,
        preferred_return,
        catch_up,
        lp_profit_share: remaining * (1.0 - carry),
        gp_carry: remaining * carry,
    }
}
