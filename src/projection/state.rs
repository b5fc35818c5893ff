//! Mutable fund state carried through a simulation

use serde::{Deserialize, Serialize};

use crate::assumptions::Stage;
use super::waterfall::WaterfallTerms;

/// Capital committed to a stage and not yet matured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingInvestment {
    /// Sequence number, unique within a run
    pub id: u64,
    pub investment_year: u32,
    pub maturity_year: u32,
    pub principal: f64,
    pub stage: Stage,
}

impl PendingInvestment {
    pub fn is_mature(&self, year: u32) -> bool {
        year >= self.maturity_year
    }
}

/// State of the fund between yearly steps
#[derive(Debug, Clone)]
pub struct FundState {
    /// Free capital; may go negative, nothing guards against overcommitment
    pub capital: f64,

    /// Everything paid to LPs so far (losses included)
    pub cumulative_lp_distributions: f64,

    /// Carry credited back to fund capital so far
    pub cumulative_gp_carry: f64,

    /// Management fees deducted so far
    pub cumulative_management_fees: f64,

    pending: Vec<PendingInvestment>,
    next_id: u64,

    management_fee_rate: f64,
    terms: WaterfallTerms,
}

impl FundState {
    /// Fresh fund with no positions
    pub fn new(initial_capital: f64, management_fee_rate: f64, terms: WaterfallTerms) -> Self {
        Self {
            capital: initial_capital,
            cumulative_lp_distributions: 0.0,
            cumulative_gp_carry: 0.0,
            cumulative_management_fees: 0.0,
            pending: Vec::new(),
            next_id: 0,
            management_fee_rate,
            terms,
        }
    }

    pub fn management_fee_rate(&self) -> f64 {
        self.management_fee_rate
    }

    pub fn terms(&self) -> &WaterfallTerms {
        &self.terms
    }

    /// Positions not yet matured
    pub fn pending(&self) -> &[PendingInvestment] {
        &self.pending
    }

    /// Record a new position and return it
    pub fn add_pending(
        &mut self,
        investment_year: u32,
        maturity_year: u32,
        principal: f64,
        stage: Stage,
    ) -> PendingInvestment {
        let investment = PendingInvestment {
            id: self.next_id,
            investment_year,
            maturity_year,
            principal,
            stage,
        };
        self.next_id += 1;
        self.pending.push(investment);
        investment
    }

    /// Split off every position mature in `year`, oldest first
    ///
    /// The returned positions are gone from the pending set, so each one can
    /// only be matured once. Order matters downstream: each return sees the
    /// catch-up state left by the ones before it, so a newest-first walk can
    /// split carry differently.
    pub fn take_matured(&mut self, year: u32) -> Vec<PendingInvestment> {
        let (matured, still_pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|inv| inv.is_mature(year));
        self.pending = still_pending;
        matured
    }

    /// Principal still tied up in pending positions
    pub fn pending_principal(&self) -> f64 {
        self.pending.iter().map(|inv| inv.principal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FundState {
        FundState::new(1_000.0, 0.02, WaterfallTerms::default())
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut s = state();
        let a = s.add_pending(0, 4, 10.0, Stage::Seed);
        let b = s.add_pending(0, 5, 20.0, Stage::SeriesA);
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
        assert_eq!(s.pending().len(), 2);
    }

    #[test]
    fn test_take_matured_partitions() {
        let mut s = state();
        s.add_pending(0, 4, 10.0, Stage::Seed);
        s.add_pending(0, 6, 20.0, Stage::Seed);
        s.add_pending(1, 5, 30.0, Stage::Seed);

        assert!(s.take_matured(3).is_empty());

        let matured = s.take_matured(5);
        assert_eq!(matured.iter().map(|i| i.id).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(s.pending().len(), 1);
        assert_eq!(s.pending()[0].id, 1);

        // Already-matured positions never come back
        assert!(s.take_matured(5).is_empty());
        assert_eq!(s.take_matured(6).len(), 1);
        assert!(s.pending().is_empty());
    }

    #[test]
    fn test_pending_principal() {
        let mut s = state();
        s.add_pending(0, 4, 10.0, Stage::Seed);
        s.add_pending(0, 4, 15.5, Stage::PreSeed);
        assert_eq!(s.pending_principal(), 25.5);
    }
}
