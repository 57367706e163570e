//! ProfitMaxi CLI: Monte Carlo runs and delta-ratio comparisons.
//!
//! Commands:
//! - `run`: simulate one configuration and print its analysis
//! - `compare`: sweep delta ratios over a base scenario, print the
//!   theoretical-vs-empirical table and save artifacts

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use profitmaxi_core::SimulationConfig;
use profitmaxi_runner::{
    analyze_batch, compare_delta_ratios, run_monte_carlo_with, save_batch_artifacts,
    save_comparison_artifacts, Analysis, DeltaComparison, McOptions, DEFAULT_RATIOS,
    MIN_ANALYSIS_SAMPLES,
};

/// Progress lines are printed every this many completed runs.
const PROGRESS_EVERY: usize = 100;

#[derive(Parser)]
#[command(
    name = "profitmaxi",
    about = "ProfitMaxi: volume-sensitive limit order simulation on constant-product pools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Monte Carlo batch for one configuration.
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Delta ratio r in (0, 1].
        #[arg(long)]
        delta_ratio: Option<f64>,

        /// Output directory for artifacts. Nothing is saved when omitted.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Compare several delta ratios over the same base scenario.
    Compare {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Delta ratios to compare.
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        ratios: Option<Vec<f64>>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

/// Options shared by both commands.
#[derive(Args)]
struct ScenarioArgs {
    /// Path to a TOML config file. Unset keys take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of simulations per batch (at least 2, for the analysis).
    #[arg(long)]
    num_sims: Option<usize>,

    /// Maximum steps per simulation.
    #[arg(long)]
    max_steps: Option<u64>,

    /// Total order size in quote currency.
    #[arg(long)]
    order_size: Option<f64>,

    /// Master seed for reproducible batches.
    #[arg(long)]
    seed: Option<u64>,

    /// Run simulations on one thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

impl ScenarioArgs {
    /// Load the base config (file or `fallback`) and apply CLI overrides.
    fn resolve(&self, fallback: SimulationConfig) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)?,
            None => fallback,
        };
        if let Some(n) = self.num_sims {
            config.num_simulations = n;
        }
        if let Some(steps) = self.max_steps {
            config.max_time_steps = steps;
        }
        if let Some(size) = self.order_size {
            config.order_size = size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        ensure!(
            config.num_simulations >= MIN_ANALYSIS_SAMPLES,
            "num_simulations must be at least {MIN_ANALYSIS_SAMPLES} to analyze a batch, got {}",
            config.num_simulations
        );
        Ok(config)
    }

    fn options(&self) -> McOptions {
        if self.sequential {
            McOptions::sequential()
        } else {
            McOptions::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            delta_ratio,
            output_dir,
        } => run_cmd(&scenario, delta_ratio, output_dir),
        Commands::Compare {
            scenario,
            ratios,
            output_dir,
        } => compare_cmd(&scenario, ratios, output_dir),
    }
}

fn run_cmd(
    scenario: &ScenarioArgs,
    delta_ratio: Option<f64>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = scenario.resolve(SimulationConfig::default())?;
    if let Some(r) = delta_ratio {
        config = config.with_delta_ratio(r);
        config.validate()?;
    }

    let batch = run_monte_carlo_with(&config, &scenario.options(), |done, total| {
        if done % PROGRESS_EVERY == 0 {
            eprintln!("Completed {done}/{total} simulations");
        }
    })?;
    let analysis = analyze_batch(&config, &batch.results, Some(batch.master_seed))?;

    print_analysis(&config, &analysis);

    if let Some(dir) = output_dir {
        let run_dir = save_batch_artifacts(&analysis, &batch.results, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn compare_cmd(
    scenario: &ScenarioArgs,
    ratios: Option<Vec<f64>>,
    output_dir: PathBuf,
) -> Result<()> {
    let base = scenario.resolve(memecoin_scenario())?;
    let ratios = ratios.unwrap_or_else(|| DEFAULT_RATIOS.to_vec());

    println!("{}", "=".repeat(60));
    println!("PROFITMAXI SIMULATION: VOLUME-SENSITIVE LIMIT ORDER");
    println!("{}", "=".repeat(60));
    println!();
    println!("Scenario: exiting {} quote position", base.order_size);
    println!("Pool liquidity: {} quote", base.pool_liquidity());
    println!(
        "Order/Liquidity ratio: {:.1}%",
        base.order_to_liquidity_ratio() * 100.0
    );

    let comparison = compare_delta_ratios(
        &base,
        &ratios,
        base.num_simulations,
        &scenario.options(),
        |ratio, done, total| {
            if done % PROGRESS_EVERY == 0 {
                eprintln!("[r = {ratio}] Completed {done}/{total} simulations");
            }
        },
    )?;

    for run in &comparison.runs {
        let a = &run.analysis;
        println!();
        println!("Results for r = {}:", run.delta_ratio);
        println!("  Mean price change: {:.4}%", a.price_impact.mean_pct);
        println!("  Price change std:  {:.4}%", a.price_impact.std_pct);
        println!("  Mean fill time:    {:.1} steps", a.fill_time.mean);
        println!("  Fill success rate: {:.1}%", a.fill_rate.fully_filled_pct);
    }

    print_comparison_table(&comparison);

    let run_dir = save_comparison_artifacts(&comparison, &output_dir)?;
    info!("comparison artifacts written to {}", run_dir.display());
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

/// Base scenario for `compare`: thin pool, large exit relative to liquidity.
fn memecoin_scenario() -> SimulationConfig {
    SimulationConfig {
        initial_token_reserve: 1_000_000_000.0,
        initial_quote_reserve: 500.0,
        order_size: 50.0,
        min_threshold: 0.05,
        buy_arrival_rate: 5.0,
        mean_buy_size: 0.5,
        num_simulations: 500,
        ..SimulationConfig::default()
    }
}

fn print_analysis(config: &SimulationConfig, analysis: &Analysis) {
    let p = &analysis.price_impact;
    let t = &analysis.fill_time;
    let f = &analysis.fill_rate;

    println!();
    println!("=== Simulation Result ===");
    println!("Delta ratio:    {}", config.delta_ratio);
    println!("Order size:     {}", config.order_size);
    println!("Pool liquidity: {}", config.pool_liquidity());
    println!(
        "Order/Liq:      {:.2}%",
        config.order_to_liquidity_ratio() * 100.0
    );
    println!("Simulations:    {}", analysis.runs);
    if let Some(seed) = analysis.config.as_ref().and_then(|c| c.master_seed) {
        println!("Seed:           {seed}");
    }
    println!();
    println!("--- Price Impact ---");
    println!("Mean:           {:.4}%", p.mean_pct);
    println!("Std:            {:.4}%", p.std_pct);
    println!("Median:         {:.4}%", p.median_pct);
    println!("Range:          [{:.4}%, {:.4}%]", p.min_pct, p.max_pct);
    println!("95% CI:         [{:.4}%, {:.4}%]", p.ci_95.0, p.ci_95.1);
    println!();
    println!("--- Fill Time ---");
    println!("Mean:           {:.1} steps", t.mean);
    println!("Std:            {:.1}", t.std);
    println!("Median:         {:.1}", t.median);
    println!("Range:          [{}, {}]", t.min, t.max);
    println!();
    println!("--- Fill Rate ---");
    println!("Mean fill:      {:.2}%", f.mean_pct);
    println!("Fully filled:   {:.1}%", f.fully_filled_pct);
    println!();
}

fn print_comparison_table(comparison: &DeltaComparison) {
    println!();
    println!("{}", "=".repeat(60));
    println!("SUMMARY: THEORETICAL vs EMPIRICAL");
    println!("{}", "=".repeat(60));
    println!();
    println!(
        "{:<12} {:<18} {:<18} {:<15}",
        "Delta (r)", "Mean Δ Price (%)", "Theoretical Δ", "Fill Time"
    );
    println!("{}", "-".repeat(65));
    for ratio in comparison.sorted_ratios() {
        if let Some(run) = comparison.get(ratio) {
            println!(
                "{:<12} {:<18.4} {:<18.4} {:<15.1}",
                ratio,
                run.analysis.price_impact.mean_pct,
                run.theoretical_change_pct,
                run.analysis.fill_time.mean
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(num_sims: Option<usize>) -> ScenarioArgs {
        ScenarioArgs {
            config: None,
            num_sims,
            max_steps: None,
            order_size: None,
            seed: Some(1),
            sequential: true,
        }
    }

    #[test]
    fn single_simulation_rejected_before_running() {
        let err = scenario(Some(1))
            .resolve(SimulationConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn overrides_apply_on_top_of_fallback() {
        let config = scenario(Some(2)).resolve(memecoin_scenario()).unwrap();
        assert_eq!(config.num_simulations, 2);
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.initial_quote_reserve, 500.0);
    }

    #[test]
    fn cli_parses_ratio_list() {
        let cli = Cli::try_parse_from(["profitmaxi", "compare", "--ratios", "0.3,1.0"]).unwrap();
        match cli.command {
            Commands::Compare { ratios, .. } => assert_eq!(ratios, Some(vec![0.3, 1.0])),
            Commands::Run { .. } => panic!("expected compare"),
        }
    }
}
