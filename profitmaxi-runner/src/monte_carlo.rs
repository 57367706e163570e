//! Monte Carlo driver: repeats the single-run engine with independent
//! randomness and collects results in run order.
//!
//! Each run owns its pool, order and generator. Generators come from the
//! [`RunSeeds`], so a batch with a fixed master seed yields the same results
//! whether it runs sequentially or on any number of rayon threads.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use profitmaxi_core::{
    RunOutcome, RunSeeds, SimError, SimulationConfig, SimulationResult, Simulator,
};

/// Label used for run sub-seeds unless the caller picks another.
pub const DEFAULT_BATCH_LABEL: &str = "batch";

/// Errors from a Monte Carlo batch.
#[derive(Debug, Error)]
pub enum McError {
    #[error("batch setup failed: {0}")]
    Setup(#[from] SimError),
    #[error("simulation run {run} failed: {source}")]
    RunFailed {
        run: usize,
        #[source]
        source: SimError,
    },
}

/// Execution options for a batch.
#[derive(Debug, Clone)]
pub struct McOptions {
    /// Run on the rayon pool (default) or sequentially.
    pub parallel: bool,
    /// Sub-seed label. Batches sharing a label and master seed see the same
    /// market flow run-for-run.
    pub label: String,
}

impl Default for McOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            label: DEFAULT_BATCH_LABEL.to_string(),
        }
    }
}

impl McOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Results of one batch plus the seed needed to replay it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McBatch {
    pub master_seed: u64,
    pub results: Vec<SimulationResult>,
}

impl McBatch {
    pub fn timed_out(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == RunOutcome::TimedOut)
            .count()
    }
}

/// Run `config.num_simulations` independent simulations with default options.
pub fn run_monte_carlo(config: &SimulationConfig) -> Result<Vec<SimulationResult>, McError> {
    run_monte_carlo_with(config, &McOptions::default(), |_, _| {}).map(|batch| batch.results)
}

/// Run a batch with explicit options.
///
/// `progress(completed, total)` is invoked after each run finishes. In parallel
/// mode completions arrive out of run order, but `completed` is a strictly
/// increasing count.
pub fn run_monte_carlo_with<F>(
    config: &SimulationConfig,
    options: &McOptions,
    progress: F,
) -> Result<McBatch, McError>
where
    F: Fn(usize, usize) + Send + Sync,
{
    let simulator = Simulator::new(config.clone())?;
    let seeds = RunSeeds::resolve(config.seed);
    let total = config.num_simulations;
    let completed = AtomicUsize::new(0);

    info!(
        "starting {} simulations (delta_ratio={}, seed={}, parallel={})",
        total,
        config.delta_ratio,
        seeds.master(),
        options.parallel
    );

    let run_one = |run: usize| -> Result<SimulationResult, McError> {
        let mut rng = seeds.rng(&options.label, run as u64);
        let result = simulator
            .run(&mut rng)
            .map_err(|source| McError::RunFailed { run, source })?;
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        progress(done, total);
        Ok(result)
    };

    let results: Vec<SimulationResult> = if options.parallel {
        (0..total)
            .into_par_iter()
            .map(run_one)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        (0..total).map(run_one).collect::<Result<Vec<_>, _>>()?
    };

    let batch = McBatch {
        master_seed: seeds.master(),
        results,
    };
    let timed_out = batch.timed_out();
    if timed_out > 0 {
        warn!(
            "{timed_out}/{total} runs hit the {}-step cap before filling",
            config.max_time_steps
        );
    }
    info!("finished {} simulations", batch.results.len());

    Ok(batch)
}
