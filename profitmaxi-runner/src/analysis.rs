//! Statistical analysis of a Monte Carlo batch.
//!
//! Price impact, fill time and fill rate summaries across runs. Standard
//! deviations are population (n) deviations; the 95% confidence interval for
//! mean price change is a Student-t interval on n - 1 degrees of freedom with
//! the sample (n - 1) standard error of the mean.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

use profitmaxi_core::{SimulationConfig, SimulationResult};

/// Confidence level of the price-impact interval.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Fewest results [`analyze`] accepts.
pub const MIN_ANALYSIS_SAMPLES: usize = 2;

/// Errors from analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("insufficient samples: need at least 2 results, got {got}")]
    InsufficientSamples { got: usize },
    #[error("t-distribution setup failed: {0}")]
    Distribution(String),
}

// ─── Summary types ──────────────────────────────────────────────────

/// Price change (%) distribution across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceImpact {
    pub mean_pct: f64,
    pub std_pct: f64,
    pub median_pct: f64,
    pub min_pct: f64,
    pub max_pct: f64,
    /// (lower, upper) bound of the 95% interval for the mean.
    pub ci_95: (f64, f64),
}

/// Fill time (steps) distribution across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillTime {
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRate {
    /// Mean final fill percentage.
    pub mean_pct: f64,
    /// Percentage of runs counted as fully filled.
    pub fully_filled_pct: f64,
}

impl FillRate {
    /// Fraction of runs fully filled, in [0, 1].
    pub fn fully_filled_fraction(&self) -> f64 {
        self.fully_filled_pct / 100.0
    }
}

/// Scenario parameters the batch was run with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub delta_ratio: f64,
    pub order_size: f64,
    pub pool_liquidity: f64,
    pub order_to_liquidity_ratio: f64,
    pub num_simulations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_seed: Option<u64>,
}

impl ConfigSummary {
    pub fn from_config(config: &SimulationConfig, master_seed: Option<u64>) -> Self {
        Self {
            delta_ratio: config.delta_ratio,
            order_size: config.order_size,
            pool_liquidity: config.pool_liquidity(),
            order_to_liquidity_ratio: config.order_to_liquidity_ratio(),
            num_simulations: config.num_simulations,
            master_seed,
        }
    }
}

/// Aggregated statistics over one batch. Derived once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSummary>,
    pub runs: usize,
    pub price_impact: PriceImpact,
    pub fill_time: FillTime,
    pub fill_rate: FillRate,
}

// ─── Entry points ───────────────────────────────────────────────────

/// Summarize a batch. Requires at least two results.
pub fn analyze(results: &[SimulationResult]) -> Result<Analysis, AnalysisError> {
    let n = results.len();
    if n < MIN_ANALYSIS_SAMPLES {
        return Err(AnalysisError::InsufficientSamples { got: n });
    }

    let price_changes: Vec<f64> = results.iter().map(|r| r.price_change_pct()).collect();
    let fill_times: Vec<f64> = results.iter().map(|r| r.fill_time as f64).collect();
    let fill_pcts: Vec<f64> = results.iter().map(|r| r.fill_pct()).collect();
    let fully_filled = results.iter().filter(|r| r.was_filled()).count();

    let price = Summary::of(&price_changes);
    let ci_95 = t_interval(&price_changes, CONFIDENCE_LEVEL)?;
    let time = Summary::of(&fill_times);

    Ok(Analysis {
        config: None,
        runs: n,
        price_impact: PriceImpact {
            mean_pct: price.mean,
            std_pct: price.std,
            median_pct: price.median,
            min_pct: price.min,
            max_pct: price.max,
            ci_95,
        },
        fill_time: FillTime {
            mean: time.mean,
            std: time.std,
            median: time.median,
            min: time.min,
            max: time.max,
        },
        fill_rate: FillRate {
            mean_pct: mean(&fill_pcts),
            fully_filled_pct: fully_filled as f64 / n as f64 * 100.0,
        },
    })
}

/// [`analyze`] plus the scenario summary for `config`.
pub fn analyze_batch(
    config: &SimulationConfig,
    results: &[SimulationResult],
    master_seed: Option<u64>,
) -> Result<Analysis, AnalysisError> {
    let mut analysis = analyze(results)?;
    analysis.config = Some(ConfigSummary::from_config(config, master_seed));
    Ok(analysis)
}

/// The run at the median rank of price change (upper median for even n).
pub fn median_outcome(results: &[SimulationResult]) -> Option<&SimulationResult> {
    if results.is_empty() {
        return None;
    }
    let mut ranked: Vec<&SimulationResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        a.price_change_pct()
            .partial_cmp(&b.price_change_pct())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Some(ranked[ranked.len() / 2])
}

// ─── Math primitives ────────────────────────────────────────────────

struct Summary {
    mean: f64,
    std: f64,
    median: f64,
    min: f64,
    max: f64,
}

impl Summary {
    fn of(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            mean: mean(values),
            std: population_std(values),
            median: median_sorted(&sorted),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Standard error of the mean using the sample (n - 1) deviation.
fn standard_error(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1.0);
    (var / n).sqrt()
}

/// Median of a sorted slice; mean of the two middle values for even length.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Two-sided Student-t interval for the mean of `values`.
///
/// A zero standard error (all values identical) collapses to `(mean, mean)`.
fn t_interval(values: &[f64], level: f64) -> Result<(f64, f64), AnalysisError> {
    let n = values.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientSamples { got: n });
    }
    let m = mean(values);
    let sem = standard_error(values);
    if sem < 1e-15 {
        return Ok((m, m));
    }

    let df = (n - 1) as f64;
    let t = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    let q = t.inverse_cdf(0.5 + level / 2.0);
    let half_width = q * sem;
    Ok((m - half_width, m + half_width))
}
