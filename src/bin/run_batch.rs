//! Run many seeded fund simulations in parallel
//!
//! Outputs one summary row per seed plus cross-run percentiles

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use vc_fund_sim::{
    scenario::Percentiles, strategy::load_plan, AllocationPlan, Assumptions, FundConfig,
    ScenarioRunner,
};

#[derive(Debug, Parser)]
#[command(name = "run_batch", about = "Run a batch of seeded fund simulations")]
struct Args {
    /// Number of simulations
    #[arg(long, default_value_t = 1_000)]
    runs: u32,

    /// First seed; run i uses base_seed + i
    #[arg(long, default_value_t = 0)]
    base_seed: u64,

    /// JSON file with fund constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding outcome_distributions.csv
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Allocation plan CSV (default: even split every year)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Per-seed summary CSV
    #[arg(long, default_value = "batch_output.csv")]
    output: PathBuf,
}

fn print_percentiles(label: &str, p: &Percentiles) {
    println!(
        "  {:<14} mean={:>14.3} p5={:>14.3} p25={:>14.3} p50={:>14.3} p75={:>14.3} p95={:>14.3}",
        label, p.mean, p.p5, p.p25, p.p50, p.p75, p.p95
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();

    let config = match &args.config {
        Some(path) => FundConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FundConfig::default(),
    };
    let assumptions = match &args.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("Failed to load assumptions from {}", dir.display()))?,
        None => Assumptions::default_venture(),
    };
    let plan = match &args.plan {
        Some(path) => load_plan(path)
            .with_context(|| format!("Failed to load allocation plan {}", path.display()))?,
        None => AllocationPlan::even(config.horizon_years as usize),
    };

    let runner = ScenarioRunner::with_assumptions(assumptions, config)?;

    println!("Running {} simulations...", args.runs);
    let batch = runner.run_batch(&plan, args.base_seed, args.runs)?;
    println!("Simulations complete in {:?}", start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    writer.write_record([
        "Seed",
        "Invested",
        "GrossReturns",
        "LPDistributions",
        "GPCarry",
        "ManagementFees",
        "FinalCapital",
        "Unrealized",
        "LPMultiple",
        "LPIRR",
    ])?;
    for run in &batch.runs {
        let s = &run.summary;
        writer.write_record([
            run.seed.to_string(),
            format!("{:.2}", s.total_invested),
            format!("{:.2}", s.total_gross_returns),
            format!("{:.2}", s.total_lp_distributions),
            format!("{:.2}", s.total_gp_carry),
            format!("{:.2}", s.total_management_fees),
            format!("{:.2}", s.final_capital),
            s.unrealized_positions.to_string(),
            format!("{:.6}", s.lp_multiple),
            s.lp_irr.map(|r| format!("{:.6}", r)).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    println!("\nBatch Summary ({} runs):", batch.stats.runs);
    print_percentiles("LP multiple", &batch.stats.lp_multiple);
    print_percentiles("Final capital", &batch.stats.final_capital);
    print_percentiles("GP carry", &batch.stats.gp_carry);
    println!("  P(LP multiple < 1): {:.2}%", batch.stats.loss_probability * 100.0);

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
