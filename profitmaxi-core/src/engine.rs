//! Single-run engine: drives one market trajectory against one order.
//!
//! Per step:
//! 1. Stop if the order is complete
//! 2. Draw the step's buy events
//! 3. For each buy, in arrival order: apply it to the pool, add it to volume,
//!    then let the order react at the post-buy price
//! 4. Apply organic sells (never seen by the order)
//! 5. Record price and fill percentage
//!
//! Later buys in a step see the impact of earlier ones. Organic sells for a
//! step always follow all of its buys.

use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::config::{ConfigError, SimulationConfig};
use crate::market::MarketProcess;
use crate::order::Order;
use crate::pool::Pool;
use crate::result::{RunOutcome, SimulationResult};

/// Errors from a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigError),
    #[error("simulation diverged at step {step}: {detail}")]
    SimulationDiverged { step: u64, detail: String },
    #[error("distribution setup failed: {0}")]
    Distribution(String),
}

/// Validated configuration plus the distributions derived from it.
///
/// Immutable and shareable across threads; every call to [`Simulator::run`]
/// builds its own pool and order.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
    market: MarketProcess,
    initial_pool: Pool,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let market = MarketProcess::new(&config)?;
        let initial_pool = Pool::new(config.initial_token_reserve, config.initial_quote_reserve);
        Ok(Self {
            config,
            market,
            initial_pool,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn initial_pool(&self) -> Pool {
        self.initial_pool
    }

    fn new_order(&self) -> Order {
        Order::new(
            self.config.order_size,
            self.config.delta_ratio,
            self.config.min_threshold,
        )
    }

    /// Execute one complete run with the caller's generator.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SimulationResult, SimError> {
        let mut pool = self.initial_pool;
        let mut order = self.new_order();
        let initial_price = pool.price();

        let capacity = (self.config.max_time_steps as usize).saturating_add(1).min(4096);
        let mut price_history = Vec::with_capacity(capacity);
        let mut fill_history = Vec::with_capacity(capacity);
        price_history.push(initial_price);
        fill_history.push(0.0);
        let mut total_volume = 0.0;

        for step in 0..self.config.max_time_steps {
            if order.is_complete() {
                break;
            }

            for buy_size in self.market.step_buys(rng) {
                total_volume += buy_size;
                pool.buy(buy_size);
                check_pool(&pool, step, "buy")?;

                if order.on_buy(step, buy_size, &mut pool).is_some() {
                    check_pool(&pool, step, "order fill")?;
                }
            }

            for organic_quote in self.market.step_organic_sells(rng) {
                let tokens = pool.quote_to_tokens(organic_quote);
                pool.sell(tokens);
                check_pool(&pool, step, "organic sell")?;
            }

            price_history.push(pool.price());
            fill_history.push(order.fill_percentage());
        }

        let outcome = if order.is_complete() {
            RunOutcome::Complete
        } else {
            RunOutcome::TimedOut
        };
        let fill_time = (price_history.len() - 1) as u64;

        debug!(
            "run finished: {:?} after {} steps, {} fills, {:.2}% filled",
            outcome,
            fill_time,
            order.fills().len(),
            order.fill_percentage()
        );

        Ok(SimulationResult {
            initial_price,
            final_price: pool.price(),
            fill_time,
            total_volume,
            price_history,
            fill_history,
            order_fills: order.into_fills(),
            outcome,
        })
    }
}

/// Validate `config` and execute one run with `rng`.
pub fn run_single_simulation<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulationResult, SimError> {
    Simulator::new(config.clone())?.run(rng)
}

fn check_pool(pool: &Pool, step: u64, phase: &str) -> Result<(), SimError> {
    if pool.is_healthy() {
        Ok(())
    } else {
        Err(SimError::SimulationDiverged {
            step,
            detail: format!(
                "non-finite or non-positive reserves after {phase} (token={}, quote={})",
                pool.token_reserve, pool.quote_reserve
            ),
        })
    }
}
