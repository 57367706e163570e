//! ProfitMaxi Runner: Monte Carlo orchestration, analysis, sweeps, export.
//!
//! This crate builds on `profitmaxi-core` to provide:
//! - Monte Carlo batches (rayon-parallel or sequential, replayable seeds)
//! - Statistical analysis of a batch (price impact, fill time, fill rate)
//! - Delta-ratio comparison sweeps
//! - JSON / CSV / Markdown artifacts

pub mod analysis;
pub mod export;
pub mod monte_carlo;
pub mod sweep;

pub use analysis::{
    analyze, analyze_batch, median_outcome, Analysis, AnalysisError, ConfigSummary, FillRate,
    FillTime, PriceImpact, MIN_ANALYSIS_SAMPLES,
};
pub use export::{
    generate_comparison_report, import_summary_json, load_summary, save_batch_artifacts,
    save_comparison_artifacts, ResultsSummary,
};
pub use monte_carlo::{run_monte_carlo, run_monte_carlo_with, McBatch, McError, McOptions};
pub use sweep::{
    compare_delta_ratios, theoretical_change_pct, DeltaComparison, RatioRun, SweepError,
    DEFAULT_RATIOS,
};
