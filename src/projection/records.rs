//! Output records for fund simulations

use serde::{Deserialize, Serialize};

use crate::assumptions::Stage;
use super::irr::calculate_lp_irr;

/// Capital committed to one stage in one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    pub year: u32,
    pub stage: Stage,
    pub amount: f64,
    pub investment_id: u64,
}

/// Gross return realized when an investment matures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub year: u32,
    pub gross_return: f64,
    pub investment_id: u64,
    pub stage: Stage,
    pub principal: f64,
}

/// Fund ledger for one simulated year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    pub year: u32,
    pub bop_capital: f64,
    pub invested: f64,
    pub maturities: u32,
    pub gross_returns: f64,
    pub lp_distributions: f64,
    pub gp_carry: f64,
    pub management_fee: f64,
    pub eop_capital: f64,
    pub cumulative_lp_distributions: f64,
    pub pending_count: u32,
}

impl YearRow {
    pub fn new(year: u32) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }
}

/// Complete simulation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_capital: f64,

    /// One record per stage per year, in investment order
    pub investments: Vec<InvestmentRecord>,

    /// One record per matured investment, in maturation order
    pub returns: Vec<ReturnRecord>,

    /// Yearly ledger
    pub years: Vec<YearRow>,

    /// Positions still pending when the horizon ended
    pub unrealized_positions: u32,
    pub unrealized_principal: f64,
}

impl SimulationResult {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            investments: Vec::new(),
            returns: Vec::new(),
            years: Vec::new(),
            unrealized_positions: 0,
            unrealized_principal: 0.0,
        }
    }

    pub fn add_investment(&mut self, record: InvestmentRecord) {
        self.investments.push(record);
    }

    pub fn add_return(&mut self, record: ReturnRecord) {
        self.returns.push(record);
    }

    pub fn add_year(&mut self, row: YearRow) {
        self.years.push(row);
    }

    /// Split into the investment and return tables
    pub fn into_records(self) -> (Vec<InvestmentRecord>, Vec<ReturnRecord>) {
        (self.investments, self.returns)
    }

    /// Get summary statistics
    pub fn summary(&self) -> SimulationSummary {
        let total_invested: f64 = self.investments.iter().map(|r| r.amount).sum();
        let total_gross_returns: f64 = self.returns.iter().map(|r| r.gross_return).sum();
        let total_lp_distributions: f64 = self.years.iter().map(|r| r.lp_distributions).sum();
        let total_gp_carry: f64 = self.years.iter().map(|r| r.gp_carry).sum();
        let total_management_fees: f64 = self.years.iter().map(|r| r.management_fee).sum();

        let final_capital = self
            .years
            .last()
            .map(|r| r.eop_capital)
            .unwrap_or(self.initial_capital);

        let lp_multiple = if self.initial_capital != 0.0 {
            total_lp_distributions / self.initial_capital
        } else {
            0.0
        };

        let yearly_lp: Vec<f64> = self.years.iter().map(|r| r.lp_distributions).collect();

        SimulationSummary {
            total_years: self.years.len() as u32,
            total_invested,
            total_gross_returns,
            total_lp_distributions,
            total_gp_carry,
            total_management_fees,
            final_capital,
            realized_positions: self.returns.len() as u32,
            unrealized_positions: self.unrealized_positions,
            unrealized_principal: self.unrealized_principal,
            lp_multiple,
            lp_irr: calculate_lp_irr(self.initial_capital, &yearly_lp),
        }
    }
}

/// Summary statistics for a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_years: u32,
    pub total_invested: f64,
    pub total_gross_returns: f64,
    pub total_lp_distributions: f64,
    pub total_gp_carry: f64,
    pub total_management_fees: f64,
    pub final_capital: f64,
    pub realized_positions: u32,
    pub unrealized_positions: u32,
    pub unrealized_principal: f64,
    /// LP distributions over initial capital
    pub lp_multiple: f64,
    /// Annual IRR of `[-initial_capital, lp_year_0, lp_year_1, ...]`
    pub lp_irr: Option<f64>,
}
