//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: results summary (base config + per-ratio analysis) with schema
//!   versioning; unknown versions are rejected on load
//! - **CSV**: per-run outcomes and the median-outcome trajectory per ratio
//! - **Markdown**: side-by-side comparison of ratios

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use profitmaxi_core::{SimulationConfig, SimulationResult};

use crate::analysis::Analysis;
use crate::sweep::DeltaComparison;

/// Current schema version for persisted summaries.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Durable summary of a comparison sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: SimulationConfig,
    pub master_seed: u64,
    pub order_to_liquidity_pct: f64,
    /// Keyed by the ratio's display form (e.g. "0.5").
    pub results_by_delta_ratio: BTreeMap<String, Analysis>,
}

impl ResultsSummary {
    pub fn from_comparison(comparison: &DeltaComparison) -> Self {
        let results_by_delta_ratio = comparison
            .runs
            .iter()
            .map(|run| (ratio_key(run.delta_ratio), run.analysis.clone()))
            .collect();
        Self {
            schema_version: SCHEMA_VERSION,
            config: comparison.base.clone(),
            master_seed: comparison.master_seed,
            order_to_liquidity_pct: comparison.base.order_to_liquidity_ratio() * 100.0,
            results_by_delta_ratio,
        }
    }
}

fn ratio_key(ratio: f64) -> String {
    format!("{ratio}")
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_summary_json(summary: &ResultsSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize ResultsSummary to JSON")
}

/// Deserialize a `ResultsSummary`, rejecting unknown schema versions.
pub fn import_summary_json(json: &str) -> Result<ResultsSummary> {
    let summary: ResultsSummary =
        serde_json::from_str(json).context("failed to deserialize ResultsSummary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

pub fn export_analysis_json(analysis: &Analysis) -> Result<String> {
    serde_json::to_string_pretty(analysis).context("failed to serialize Analysis to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per run.
///
/// Columns: run, outcome, price_change_pct, fill_time, fill_pct, was_filled,
/// total_volume, fills, quote_received
pub fn export_runs_csv(results: &[SimulationResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "run",
        "outcome",
        "price_change_pct",
        "fill_time",
        "fill_pct",
        "was_filled",
        "total_volume",
        "fills",
        "quote_received",
    ])?;
    for (i, r) in results.iter().enumerate() {
        wtr.write_record([
            &i.to_string(),
            &format!("{:?}", r.outcome),
            &format!("{:.6}", r.price_change_pct()),
            &r.fill_time.to_string(),
            &format!("{:.4}", r.fill_pct()),
            &r.was_filled().to_string(),
            &format!("{:.6}", r.total_volume),
            &r.order_fills.len().to_string(),
            &format!("{:.6}", r.total_quote_received()),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Step-by-step trajectory of one run: step, price, price_change_pct, fill_pct.
pub fn export_trajectory_csv(result: &SimulationResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["step", "price", "price_change_pct", "fill_pct"])?;
    for (step, (price, fill)) in result
        .price_history
        .iter()
        .zip(&result.fill_history)
        .enumerate()
    {
        let change = (price / result.initial_price - 1.0) * 100.0;
        wtr.write_record([
            &step.to_string(),
            &format!("{:.12e}", price),
            &format!("{:.6}", change),
            &format!("{:.4}", fill),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Side-by-side Markdown comparison of every ratio in the sweep.
pub fn generate_comparison_report(comparison: &DeltaComparison) -> String {
    let base = &comparison.base;
    let mut md = String::with_capacity(2048);

    md.push_str("# Delta Ratio Comparison\n\n");

    md.push_str("## Scenario\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Token Reserve | {} |\n", base.initial_token_reserve));
    md.push_str(&format!("| Quote Reserve | {} |\n", base.initial_quote_reserve));
    md.push_str(&format!("| Pool Liquidity | {} |\n", base.pool_liquidity()));
    md.push_str(&format!("| Order Size | {} |\n", base.order_size));
    md.push_str(&format!(
        "| Order / Liquidity | {:.1}% |\n",
        base.order_to_liquidity_ratio() * 100.0
    ));
    md.push_str(&format!("| Min Threshold | {} |\n", base.min_threshold));
    md.push_str(&format!("| Buy Arrival Rate | {} |\n", base.buy_arrival_rate));
    md.push_str(&format!("| Mean Buy Size | {} |\n", base.mean_buy_size));
    if base.organic_sells_enabled() {
        md.push_str(&format!(
            "| Organic Sells | rate {} / mean {} |\n",
            base.organic_sell_rate, base.mean_organic_sell
        ));
    }
    md.push_str(&format!("| Master Seed | {} |\n", comparison.master_seed));
    md.push('\n');

    md.push_str("## Results\n\n");
    md.push_str(
        "| r | Mean Δ Price (%) | Std (%) | 95% CI | Theoretical Δ (%) | Mean Fill Time | Fully Filled |\n",
    );
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for ratio in comparison.sorted_ratios() {
        let Some(run) = comparison.get(ratio) else {
            continue;
        };
        let a = &run.analysis;
        md.push_str(&format!(
            "| {} | {:.4} | {:.4} | [{:.4}, {:.4}] | {:.4} | {:.1} | {:.1}% |\n",
            ratio,
            a.price_impact.mean_pct,
            a.price_impact.std_pct,
            a.price_impact.ci_95.0,
            a.price_impact.ci_95.1,
            run.theoretical_change_pct,
            a.fill_time.mean,
            a.fill_rate.fully_filled_pct,
        ));
    }
    md.push('\n');

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a comparison sweep.
///
/// Creates `compare_{timestamp}/` under `output_dir` containing:
/// - `results_summary.json`: base config and per-ratio analysis
/// - `report.md`: Markdown comparison
/// - `runs_r{r}.csv`: per-run outcomes for each ratio
/// - `median_trajectory_r{r}.csv`: median-outcome trajectory for each ratio
///
/// Returns the path to the created directory.
pub fn save_comparison_artifacts(
    comparison: &DeltaComparison,
    output_dir: &Path,
) -> Result<PathBuf> {
    let dirname = format!("compare_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let summary = ResultsSummary::from_comparison(comparison);
    std::fs::write(run_dir.join("results_summary.json"), export_summary_json(&summary)?)?;
    std::fs::write(run_dir.join("report.md"), generate_comparison_report(comparison))?;

    for run in &comparison.runs {
        let key = ratio_key(run.delta_ratio);
        std::fs::write(
            run_dir.join(format!("runs_r{key}.csv")),
            export_runs_csv(&run.results)?,
        )?;
        if let Some(median) = run.median_outcome() {
            std::fs::write(
                run_dir.join(format!("median_trajectory_r{key}.csv")),
                export_trajectory_csv(median)?,
            )?;
        }
    }

    Ok(run_dir)
}

/// Save artifacts for a single batch: `analysis.json` and `runs.csv` under
/// `run_{timestamp}/`, plus the median trajectory.
pub fn save_batch_artifacts(
    analysis: &Analysis,
    results: &[SimulationResult],
    output_dir: &Path,
) -> Result<PathBuf> {
    let dirname = format!("run_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("analysis.json"), export_analysis_json(analysis)?)?;
    std::fs::write(run_dir.join("runs.csv"), export_runs_csv(results)?)?;
    if let Some(median) = crate::analysis::median_outcome(results) {
        std::fs::write(
            run_dir.join("median_trajectory.csv"),
            export_trajectory_csv(median)?,
        )?;
    }

    Ok(run_dir)
}

/// Load a `ResultsSummary` from a comparison artifact directory.
pub fn load_summary(dir: &Path) -> Result<ResultsSummary> {
    let path = dir.join("results_summary.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_summary_json(&json)
}
