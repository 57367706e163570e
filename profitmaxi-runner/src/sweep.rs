//! Delta-ratio comparison: one full Monte Carlo batch per participation ratio.
//!
//! All ratios share one master seed and batch label, so run `i` of every ratio
//! sees the same buy flow. Differences between ratios come from the order
//! policy alone.

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use profitmaxi_core::{RunSeeds, SimulationConfig, SimulationResult};

use crate::analysis::{analyze_batch, median_outcome, Analysis, AnalysisError};
use crate::monte_carlo::{run_monte_carlo_with, McError, McOptions};

/// Ratios compared by default.
pub const DEFAULT_RATIOS: [f64; 4] = [0.3, 0.5, 0.8, 1.0];

/// Ratios closer than this are the same ratio.
const RATIO_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("no delta ratios to compare")]
    NoRatios,
    #[error("delta ratio {ratio} listed more than once")]
    DuplicateRatio { ratio: f64 },
    #[error("delta ratio {ratio}: {source}")]
    Batch {
        ratio: f64,
        #[source]
        source: McError,
    },
    #[error("delta ratio {ratio}: {source}")]
    Analysis {
        ratio: f64,
        #[source]
        source: AnalysisError,
    },
}

/// Batch results and analysis for one ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioRun {
    pub delta_ratio: f64,
    pub analysis: Analysis,
    /// Rough closed-form expectation for comparison with the empirical mean.
    pub theoretical_change_pct: f64,
    pub results: Vec<SimulationResult>,
}

impl RatioRun {
    /// Run at the median rank of price change.
    pub fn median_outcome(&self) -> Option<&SimulationResult> {
        median_outcome(&self.results)
    }
}

/// Output of a full comparison sweep, in the order the ratios were given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaComparison {
    pub base: SimulationConfig,
    pub master_seed: u64,
    pub runs: Vec<RatioRun>,
}

impl DeltaComparison {
    pub fn get(&self, delta_ratio: f64) -> Option<&RatioRun> {
        self.runs
            .iter()
            .find(|r| same_ratio(r.delta_ratio, delta_ratio))
    }

    /// Ratios in ascending order.
    pub fn sorted_ratios(&self) -> Vec<f64> {
        let mut ratios: Vec<f64> = self.runs.iter().map(|r| r.delta_ratio).collect();
        ratios.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        ratios
    }
}

fn same_ratio(a: f64, b: f64) -> bool {
    (a - b).abs() < RATIO_TOLERANCE
}

/// Scaled first-order estimate of price change (%):
/// `(1 - r) * order_to_liquidity_ratio * 100 * 2`.
pub fn theoretical_change_pct(config: &SimulationConfig) -> f64 {
    (1.0 - config.delta_ratio) * config.order_to_liquidity_ratio() * 100.0 * 2.0
}

/// Run and analyze `num_sims` simulations for each ratio in `ratios`.
///
/// Every other parameter comes from `base`. `progress(ratio, completed, total)`
/// reports per-run completion within the current ratio's batch.
pub fn compare_delta_ratios<F>(
    base: &SimulationConfig,
    ratios: &[f64],
    num_sims: usize,
    options: &McOptions,
    progress: F,
) -> Result<DeltaComparison, SweepError>
where
    F: Fn(f64, usize, usize) + Send + Sync,
{
    if ratios.is_empty() {
        return Err(SweepError::NoRatios);
    }
    for (i, &ratio) in ratios.iter().enumerate() {
        if ratios[..i].iter().any(|&earlier| same_ratio(earlier, ratio)) {
            return Err(SweepError::DuplicateRatio { ratio });
        }
    }
    let master_seed = RunSeeds::resolve(base.seed).master();

    let mut runs = Vec::with_capacity(ratios.len());
    for &ratio in ratios {
        let config = SimulationConfig {
            delta_ratio: ratio,
            num_simulations: num_sims,
            seed: Some(master_seed),
            ..base.clone()
        };
        info!("sweep: delta_ratio = {ratio}");

        let batch = run_monte_carlo_with(&config, options, |done, total| {
            progress(ratio, done, total)
        })
        .map_err(|source| SweepError::Batch { ratio, source })?;

        let analysis = analyze_batch(&config, &batch.results, Some(batch.master_seed))
            .map_err(|source| SweepError::Analysis { ratio, source })?;

        runs.push(RatioRun {
            delta_ratio: ratio,
            analysis,
            theoretical_change_pct: theoretical_change_pct(&config),
            results: batch.results,
        });
    }

    Ok(DeltaComparison {
        base: base.clone(),
        master_seed,
        runs,
    })
}
