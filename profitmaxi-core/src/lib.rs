//! ProfitMaxi Core: constant-product pool, volume-sensitive order, market
//! process and the single-run simulation engine.
//!
//! This crate contains the simulation semantics:
//! - Constant-product pool with invariant-preserving swaps
//! - Delta-ratio order policy evaluated once per incoming buy
//! - Poisson / log-normal / exponential market event generation
//! - Step-by-step run state machine (running -> complete | timed-out)
//! - Per-run seeds derived from one master, independent of scheduling

pub mod config;
pub mod engine;
pub mod market;
pub mod order;
pub mod pool;
pub mod result;
pub mod rng;

pub use config::{ConfigError, SimulationConfig, FILLED_TOLERANCE_PCT, MIN_BUY_SIZE};
pub use engine::{run_single_simulation, SimError, Simulator};
pub use market::MarketProcess;
pub use order::{FillEvent, Order};
pub use pool::Pool;
pub use result::{RunOutcome, SimulationResult};
pub use rng::RunSeeds;
