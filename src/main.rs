//! Venture fund simulator CLI
//!
//! Runs one fund simulation and prints the investment, return and yearly tables

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use vc_fund_sim::{
    projection::SimulationResult, strategy::load_plan, AllocationPlan, Assumptions, FundConfig,
    ScenarioRunner,
};

#[derive(Debug, Parser)]
#[command(name = "vc_fund_sim", version, about = "Simulate a venture fund year by year")]
struct Cli {
    /// JSON file with fund constants (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Horizon in years
    #[arg(long)]
    years: Option<u32>,

    /// Initial committed capital
    #[arg(long)]
    capital: Option<f64>,

    /// Annual management fee rate
    #[arg(long)]
    fee: Option<f64>,

    /// Carried interest rate
    #[arg(long)]
    carry: Option<f64>,

    /// Preferred return rate
    #[arg(long)]
    preferred: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding outcome_distributions.csv
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Allocation plan CSV (default: even split every year)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Write investments.csv, returns.csv, yearly.csv and summary.json here
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn fund_config(&self) -> Result<FundConfig> {
        let mut config = match &self.config {
            Some(path) => FundConfig::from_json_path(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => FundConfig::default(),
        };
        if let Some(years) = self.years {
            config.horizon_years = years;
        }
        if let Some(capital) = self.capital {
            config.initial_capital = capital;
        }
        if let Some(fee) = self.fee {
            config.management_fee_rate = fee;
        }
        if let Some(carry) = self.carry {
            config.carry_rate = carry;
        }
        if let Some(preferred) = self.preferred {
            config.preferred_return_rate = preferred;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.fund_config()?;
    let assumptions = match &cli.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("Failed to load assumptions from {}", dir.display()))?,
        None => Assumptions::default_venture(),
    };
    let plan = match &cli.plan {
        Some(path) => load_plan(path)
            .with_context(|| format!("Failed to load allocation plan {}", path.display()))?,
        None => AllocationPlan::even(config.horizon_years as usize),
    };

    println!("Venture Fund Simulator v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!("  Initial capital:  ${:.2}", config.initial_capital);
    println!("  Management fee:   {:.2}%", config.management_fee_rate * 100.0);
    println!("  Carry:            {:.2}%", config.carry_rate * 100.0);
    println!("  Preferred return: {:.2}%", config.preferred_return_rate * 100.0);
    println!("  Horizon:          {} years", config.horizon_years);
    match config.seed {
        Some(seed) => println!("  Seed:             {}", seed),
        None => println!("  Seed:             (entropy)"),
    }
    println!(
        "  Holding period:   {}-{} years",
        assumptions.holding.min_years,
        assumptions.holding.max_years_exclusive - 1
    );
    for (stage, dist) in assumptions.outcomes.iter() {
        println!("  {:<10} mean {:.2}x, stddev {:.2}", stage.name(), dist.mean, dist.stddev);
    }
    println!();

    let runner = ScenarioRunner::with_assumptions(assumptions, config)?;
    let result = runner.run_default(&plan)?;

    print_tables(&result);

    if let Some(dir) = &cli.output_dir {
        write_outputs(dir, &result)?;
        println!("\nFull results written to: {}", dir.display());
    }

    Ok(())
}

fn print_tables(result: &SimulationResult) {
    println!("Investments ({} rows):", result.investments.len());
    println!("{:>5} {:<10} {:>16}", "Year", "Stage", "Investment");
    println!("{}", "-".repeat(33));
    for row in &result.investments {
        println!("{:>5} {:<10} {:>16.2}", row.year, row.stage.name(), row.amount);
    }

    println!("\nReturns ({} rows):", result.returns.len());
    println!("{:>5} {:<10} {:>16} {:>16}", "Year", "Stage", "Principal", "Return");
    println!("{}", "-".repeat(50));
    for row in &result.returns {
        println!(
            "{:>5} {:<10} {:>16.2} {:>16.2}",
            row.year,
            row.stage.name(),
            row.principal,
            row.gross_return
        );
    }

    println!("\nYearly ledger:");
    println!(
        "{:>5} {:>14} {:>14} {:>4} {:>14} {:>14} {:>12} {:>12} {:>14}",
        "Year", "BOP Capital", "Invested", "Mat", "Gross", "LP Dist", "Carry", "Fee", "EOP Capital"
    );
    println!("{}", "-".repeat(113));
    for row in &result.years {
        println!(
            "{:>5} {:>14.2} {:>14.2} {:>4} {:>14.2} {:>14.2} {:>12.2} {:>12.2} {:>14.2}",
            row.year,
            row.bop_capital,
            row.invested,
            row.maturities,
            row.gross_returns,
            row.lp_distributions,
            row.gp_carry,
            row.management_fee,
            row.eop_capital,
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Total invested:       ${:.2}", summary.total_invested);
    println!("  Total gross returns:  ${:.2}", summary.total_gross_returns);
    println!("  LP distributions:     ${:.2}", summary.total_lp_distributions);
    println!("  GP carry:             ${:.2}", summary.total_gp_carry);
    println!("  Management fees:      ${:.2}", summary.total_management_fees);
    println!("  Final capital:        ${:.2}", summary.final_capital);
    println!(
        "  Unrealized positions: {} (${:.2} principal)",
        summary.unrealized_positions, summary.unrealized_principal
    );
    println!("  LP multiple:          {:.3}x", summary.lp_multiple);
    match summary.lp_irr {
        Some(irr) => println!("  LP IRR:               {:.2}%", irr * 100.0),
        None => println!("  LP IRR:               n/a"),
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_outputs(dir: &Path, result: &SimulationResult) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Unable to create {}", dir.display()))?;

    write_csv(&dir.join("investments.csv"), &result.investments)?;
    write_csv(&dir.join("returns.csv"), &result.returns)?;
    write_csv(&dir.join("yearly.csv"), &result.years)?;

    let summary_path = dir.join("summary.json");
    let file = File::create(&summary_path)
        .with_context(|| format!("Unable to create {}", summary_path.display()))?;
    serde_json::to_writer_pretty(file, &result.summary())?;

    Ok(())
}
