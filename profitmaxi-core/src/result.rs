//! Output of a single simulation run.

use serde::{Deserialize, Serialize};

use crate::config::FILLED_TOLERANCE_PCT;
use crate::order::FillEvent;

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Order fully filled before the step cap.
    Complete,
    /// Step cap reached with the order still open.
    TimedOut,
}

/// Immutable trajectory of one run.
///
/// `price_history` and `fill_history` each hold `fill_time + 1` entries; index 0
/// is the pre-simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_price: f64,
    pub final_price: f64,
    /// Steps executed.
    pub fill_time: u64,
    /// Cumulative buy volume (quote) across the run.
    pub total_volume: f64,
    pub price_history: Vec<f64>,
    /// Cumulative fill percentage after each step.
    pub fill_history: Vec<f64>,
    pub order_fills: Vec<FillEvent>,
    pub outcome: RunOutcome,
}

impl SimulationResult {
    pub fn price_change_pct(&self) -> f64 {
        (self.final_price - self.initial_price) / self.initial_price * 100.0
    }

    /// Final cumulative fill percentage.
    pub fn fill_pct(&self) -> f64 {
        self.fill_history.last().copied().unwrap_or(0.0)
    }

    /// Filled within the floating-point tolerance band.
    pub fn was_filled(&self) -> bool {
        self.fill_pct() >= FILLED_TOLERANCE_PCT
    }

    /// Quote actually received across all fills.
    pub fn total_quote_received(&self) -> f64 {
        self.order_fills.iter().map(|f| f.quote_received).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(final_price: f64, fill_history: Vec<f64>) -> SimulationResult {
        SimulationResult {
            initial_price: 2.0,
            final_price,
            fill_time: fill_history.len() as u64 - 1,
            total_volume: 0.0,
            price_history: vec![2.0; fill_history.len()],
            fill_history,
            order_fills: Vec::new(),
            outcome: RunOutcome::TimedOut,
        }
    }

    #[test]
    fn price_change_pct() {
        assert!((result_with(2.2, vec![0.0]).price_change_pct() - 10.0).abs() < 1e-9);
        assert!((result_with(1.5, vec![0.0]).price_change_pct() + 25.0).abs() < 1e-9);
    }

    #[test]
    fn filled_tolerance_band() {
        assert!(result_with(2.0, vec![0.0, 99.995]).was_filled());
        assert!(result_with(2.0, vec![0.0, 100.0]).was_filled());
        assert!(!result_with(2.0, vec![0.0, 99.98]).was_filled());
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&RunOutcome::TimedOut).unwrap();
        assert_eq!(json, "\"timed_out\"");
    }
}
