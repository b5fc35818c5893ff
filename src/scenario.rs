//! Simulation driver and seeded batch runs
//!
//! Builds the engine once, then runs any number of independent simulations
//! against it. Each run owns its `FundState` and random source, so batches fan
//! out across threads with rayon.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::error::FundResult;
use crate::projection::{
    FundConfig, FundEngine, InvestmentRecord, RandomSource, ReturnRecord, SeededRandom,
    SimulationResult, SimulationSummary,
};
use crate::strategy::AllocationPlan;

/// Pre-built engine for repeated runs
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(FundConfig::default())?;
/// let plan = AllocationPlan::even(10);
///
/// let (investments, returns) = runner.run_records(&plan, &mut SeededRandom::seed_from_u64(7)?)?;
/// let batch = runner.run_batch(&plan, 0, 1_000)?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: FundEngine,
}

impl ScenarioRunner {
    /// Runner with the built-in venture assumptions
    pub fn new(config: FundConfig) -> FundResult<Self> {
        Self::with_assumptions(Assumptions::default_venture(), config)
    }

    /// Runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions, config: FundConfig) -> FundResult<Self> {
        Ok(Self {
            engine: FundEngine::new(assumptions, config)?,
        })
    }

    pub fn engine(&self) -> &FundEngine {
        &self.engine
    }

    pub fn config(&self) -> &FundConfig {
        self.engine.config()
    }

    /// Run the configured horizon with the given random source
    pub fn run<R: RandomSource + ?Sized>(
        &self,
        plan: &AllocationPlan,
        rng: &mut R,
    ) -> FundResult<SimulationResult> {
        self.engine.simulate(plan, rng)
    }

    /// Run an explicit horizon, overriding the configured one
    pub fn run_years<R: RandomSource + ?Sized>(
        &self,
        horizon_years: u32,
        plan: &AllocationPlan,
        rng: &mut R,
    ) -> FundResult<SimulationResult> {
        self.engine.simulate_years(horizon_years, plan, rng)
    }

    /// Run and return only the investment and return tables
    pub fn run_records<R: RandomSource + ?Sized>(
        &self,
        plan: &AllocationPlan,
        rng: &mut R,
    ) -> FundResult<(Vec<InvestmentRecord>, Vec<ReturnRecord>)> {
        Ok(self.run(plan, rng)?.into_records())
    }

    /// Run with the configured seed, or from entropy when none is set
    pub fn run_default(&self, plan: &AllocationPlan) -> FundResult<SimulationResult> {
        let mut rng = match self.config().seed {
            Some(seed) => SeededRandom::seed_from_u64(seed)?,
            None => SeededRandom::from_entropy()?,
        };
        self.run(plan, &mut rng)
    }

    /// Run `runs` simulations in parallel, seeded `base_seed`, `base_seed + 1`, ...
    pub fn run_batch(
        &self,
        plan: &AllocationPlan,
        base_seed: u64,
        runs: u32,
    ) -> FundResult<BatchResult> {
        info!("Running {} simulations from seed {}", runs, base_seed);

        let summaries = (0..runs)
            .into_par_iter()
            .map(|i| -> FundResult<SeedSummary> {
                let seed = base_seed.wrapping_add(i as u64);
                let mut rng = SeededRandom::seed_from_u64(seed)?;
                let result = self.run(plan, &mut rng)?;
                Ok(SeedSummary {
                    seed,
                    summary: result.summary(),
                })
            })
            .collect::<FundResult<Vec<_>>>()?;

        let stats = BatchStatistics::from_summaries(&summaries);
        info!(
            "Batch complete: median LP multiple {:.3}, median carry {:.2}",
            stats.lp_multiple.p50, stats.gp_carry.p50
        );

        Ok(BatchResult { runs: summaries, stats })
    }
}

/// Summary of one seeded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSummary {
    pub seed: u64,
    pub summary: SimulationSummary,
}

/// Per-run summaries plus cross-run statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub runs: Vec<SeedSummary>,
    pub stats: BatchStatistics,
}

/// Percentile summary of one metric across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub mean: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl Percentiles {
    /// Nearest-rank percentiles; all zero for an empty sample
    pub fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let n = values.len();
        let at = |p: f64| {
            let idx = ((p * n as f64).ceil() as usize).clamp(1, n) - 1;
            values[idx]
        };
        Self {
            mean: values.iter().sum::<f64>() / n as f64,
            p5: at(0.05),
            p25: at(0.25),
            p50: at(0.50),
            p75: at(0.75),
            p95: at(0.95),
        }
    }
}

/// Cross-run statistics for a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub runs: u32,
    pub lp_multiple: Percentiles,
    pub final_capital: Percentiles,
    pub gp_carry: Percentiles,
    /// Share of runs where LPs got back less than they committed
    pub loss_probability: f64,
}

impl BatchStatistics {
    pub fn from_summaries(runs: &[SeedSummary]) -> Self {
        let metric = |f: fn(&SimulationSummary) -> f64| -> Vec<f64> {
            runs.iter().map(|r| f(&r.summary)).collect()
        };
        let losses = runs.iter().filter(|r| r.summary.lp_multiple < 1.0).count();

        Self {
            runs: runs.len() as u32,
            lp_multiple: Percentiles::from_values(metric(|s| s.lp_multiple)),
            final_capital: Percentiles::from_values(metric(|s| s.final_capital)),
            gp_carry: Percentiles::from_values(metric(|s| s.total_gp_carry)),
            loss_probability: if runs.is_empty() {
                0.0
            } else {
                losses as f64 / runs.len() as f64
            },
        }
    }
}
