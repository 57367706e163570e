//! Stochastic market process: per-step buy arrivals and optional organic sells.
//!
//! - Buy counts ~ Poisson(`buy_arrival_rate`)
//! - Buy sizes ~ LogNormal(ln(`mean_buy_size`), `buy_size_sigma`), floored at
//!   [`MIN_BUY_SIZE`]
//! - Organic sell counts ~ Poisson(`organic_sell_rate`), sizes ~
//!   Exp(mean = `mean_organic_sell`), in quote units

use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal, Poisson};

use crate::config::{SimulationConfig, MIN_BUY_SIZE};
use crate::engine::SimError;

#[derive(Debug, Clone)]
struct OrganicSells {
    count: Poisson<f64>,
    size: Exp<f64>,
}

/// Event generator for one configuration. Holds no RNG state: every draw takes
/// the calling run's generator.
#[derive(Debug, Clone)]
pub struct MarketProcess {
    buy_count: Poisson<f64>,
    buy_size: LogNormal<f64>,
    organic: Option<OrganicSells>,
}

impl MarketProcess {
    /// Build the distributions for a validated config.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimError> {
        let buy_count = Poisson::new(config.buy_arrival_rate)
            .map_err(|e| SimError::Distribution(format!("buy arrivals: {e}")))?;
        let buy_size = LogNormal::new(config.mean_buy_size.ln(), config.buy_size_sigma)
            .map_err(|e| SimError::Distribution(format!("buy sizes: {e}")))?;

        let organic = if config.organic_sells_enabled() {
            let count = Poisson::new(config.organic_sell_rate)
                .map_err(|e| SimError::Distribution(format!("organic arrivals: {e}")))?;
            let size = Exp::new(1.0 / config.mean_organic_sell)
                .map_err(|e| SimError::Distribution(format!("organic sizes: {e}")))?;
            Some(OrganicSells { count, size })
        } else {
            None
        };

        Ok(Self {
            buy_count,
            buy_size,
            organic,
        })
    }

    pub fn num_buys<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        self.buy_count.sample(rng) as u64
    }

    /// One buy size in quote; never below the dust floor.
    pub fn buy_size<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.buy_size.sample(rng).max(MIN_BUY_SIZE)
    }

    /// Buy sizes for one step, in arrival order.
    pub fn step_buys<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let n = self.num_buys(rng);
        (0..n).map(|_| self.buy_size(rng)).collect()
    }

    /// Organic sell sizes (quote) for one step; empty when disabled.
    pub fn step_organic_sells<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        match &self.organic {
            Some(organic) => {
                let n = organic.count.sample(rng) as u64;
                (0..n).map(|_| organic.size.sample(rng)).collect()
            }
            None => Vec::new(),
        }
    }

    pub fn has_organic_sells(&self) -> bool {
        self.organic.is_some()
    }
}
