//! Volume-sensitive limit order: sells in slices proportional to incoming buys.

use serde::{Deserialize, Serialize};

use crate::pool::Pool;

/// One executed slice of the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Time step at which the slice executed.
    pub step: u64,
    /// Size (quote) of the buy that triggered the slice.
    pub trigger_buy: f64,
    /// Intended sell value in quote (what `remaining` was decremented by).
    pub sell_amount: f64,
    pub tokens_sold: f64,
    /// Quote actually received from the pool curve.
    pub quote_received: f64,
    /// Pool spot price immediately after the slice.
    pub price_at_fill: f64,
}

/// Order state for one simulation run.
///
/// `remaining` only decreases and stays within `[0, total_size]`. Bookkeeping
/// is against the intended sell value, never the quote actually received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    total_size: f64,
    delta_ratio: f64,
    min_threshold: f64,
    remaining: f64,
    fills: Vec<FillEvent>,
}

impl Order {
    pub fn new(total_size: f64, delta_ratio: f64, min_threshold: f64) -> Self {
        Self {
            total_size,
            delta_ratio,
            min_threshold,
            remaining: total_size,
            fills: Vec::new(),
        }
    }

    pub fn total_size(&self) -> f64 {
        self.total_size
    }

    pub fn delta_ratio(&self) -> f64 {
        self.delta_ratio
    }

    pub fn min_threshold(&self) -> f64 {
        self.min_threshold
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn filled(&self) -> f64 {
        self.total_size - self.remaining
    }

    pub fn fill_percentage(&self) -> f64 {
        self.filled() / self.total_size * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn fills(&self) -> &[FillEvent] {
        &self.fills
    }

    pub fn into_fills(self) -> Vec<FillEvent> {
        self.fills
    }

    /// Whether a buy of `buy_size` qualifies to trigger a slice.
    pub fn triggers_on(&self, buy_size: f64) -> bool {
        !self.is_complete() && buy_size >= self.min_threshold
    }

    /// Participation amount for a buy before capping by `remaining`.
    pub fn proportional_sell(&self, buy_size: f64) -> f64 {
        self.delta_ratio * buy_size
    }

    /// Quote value the order would sell against a buy of `buy_size`.
    pub fn sell_quote_value(&self, buy_size: f64) -> f64 {
        self.proportional_sell(buy_size).min(self.remaining)
    }

    /// React to a buy that has already been applied to `pool`.
    ///
    /// Sizes the slice with the pool's linear `quote_to_tokens` at the
    /// pre-sell price, sells it into the pool and records the fill. Returns the
    /// fill, or `None` when the order is complete or the buy is below threshold.
    pub fn on_buy(&mut self, step: u64, buy_size: f64, pool: &mut Pool) -> Option<&FillEvent> {
        if !self.triggers_on(buy_size) {
            return None;
        }

        let sell_quote_value = self.sell_quote_value(buy_size);
        let tokens_to_sell = pool.quote_to_tokens(sell_quote_value);
        let quote_received = pool.sell(tokens_to_sell);

        self.remaining -= sell_quote_value;
        self.fills.push(FillEvent {
            step,
            trigger_buy: buy_size,
            sell_amount: sell_quote_value,
            tokens_sold: tokens_to_sell,
            quote_received,
            price_at_fill: pool.price(),
        });
        self.fills.last()
    }
}
