//! Simulation configuration: TOML-loadable, validated before any run starts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dust floor applied to every generated buy size.
pub const MIN_BUY_SIZE: f64 = 0.01;

/// Fill percentage at or above which a run counts as fully filled.
pub const FILLED_TOLERANCE_PCT: f64 = 99.99;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {field} must be {requirement}, got {value}")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Full parameter set for one batch of simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Pool
    pub initial_token_reserve: f64,
    pub initial_quote_reserve: f64,

    // Order
    /// Total order size in quote currency.
    pub order_size: f64,
    /// Participation ratio r in (0, 1].
    pub delta_ratio: f64,
    /// Minimum buy size (quote) that triggers a slice.
    pub min_threshold: f64,

    // Market process
    /// Poisson mean of buy events per step.
    pub buy_arrival_rate: f64,
    pub mean_buy_size: f64,
    /// Log-normal shape parameter for buy sizes.
    pub buy_size_sigma: f64,
    /// Poisson mean of background sells per step (0 disables them).
    pub organic_sell_rate: f64,
    pub mean_organic_sell: f64,

    // Simulation
    pub max_time_steps: u64,
    pub num_simulations: usize,
    /// Master seed the per-run generators derive from. `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_token_reserve: 1_000_000.0,
            initial_quote_reserve: 1_000.0,
            order_size: 100.0,
            delta_ratio: 1.0,
            min_threshold: 0.1,
            buy_arrival_rate: 10.0,
            mean_buy_size: 2.0,
            buy_size_sigma: 0.8,
            organic_sell_rate: 0.0,
            mean_organic_sell: 1.0,
            max_time_steps: 1000,
            num_simulations: 1000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse from a TOML string. Missing keys take their defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Copy of this config with a different delta ratio.
    pub fn with_delta_ratio(&self, delta_ratio: f64) -> Self {
        Self {
            delta_ratio,
            ..self.clone()
        }
    }

    pub fn pool_liquidity(&self) -> f64 {
        self.initial_quote_reserve * 2.0
    }

    pub fn order_to_liquidity_ratio(&self) -> f64 {
        self.order_size / self.pool_liquidity()
    }

    pub fn organic_sells_enabled(&self) -> bool {
        self.organic_sell_rate > 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("initial_token_reserve", self.initial_token_reserve)?;
        positive("initial_quote_reserve", self.initial_quote_reserve)?;
        positive("order_size", self.order_size)?;
        if !(self.delta_ratio > 0.0 && self.delta_ratio <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "delta_ratio",
                requirement: "in (0, 1]",
                value: self.delta_ratio,
            });
        }
        non_negative("min_threshold", self.min_threshold)?;
        positive("buy_arrival_rate", self.buy_arrival_rate)?;
        positive("mean_buy_size", self.mean_buy_size)?;
        non_negative("buy_size_sigma", self.buy_size_sigma)?;
        non_negative("organic_sell_rate", self.organic_sell_rate)?;
        if self.organic_sells_enabled() {
            positive("mean_organic_sell", self.mean_organic_sell)?;
        }
        if self.num_simulations == 0 {
            return Err(ConfigError::Invalid {
                field: "num_simulations",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            requirement: "positive and finite",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            requirement: "non-negative and finite",
            value,
        })
    }
}
