//! Constant-product liquidity pool (x * y = k).
//!
//! Swaps preserve `token_reserve * quote_reserve` up to floating-point error.
//! Every swap computes `k` from the reserves *before* mutating either of them.

use serde::{Deserialize, Serialize};

/// Two-reserve constant-product pool.
///
/// `Clone` yields a fully independent pool; Monte Carlo runs each clone the
/// initial pool so no run observes another run's reserves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub token_reserve: f64,
    pub quote_reserve: f64,
}

impl Pool {
    pub fn new(token_reserve: f64, quote_reserve: f64) -> Self {
        Self {
            token_reserve,
            quote_reserve,
        }
    }

    /// Invariant product `token_reserve * quote_reserve`.
    pub fn k(&self) -> f64 {
        self.token_reserve * self.quote_reserve
    }

    /// Spot price in quote per token.
    pub fn price(&self) -> f64 {
        self.quote_reserve / self.token_reserve
    }

    /// Total liquidity in quote terms (both sides valued at spot).
    pub fn liquidity(&self) -> f64 {
        self.quote_reserve * 2.0
    }

    /// Swap `quote_amount` into the pool. Returns tokens received.
    ///
    /// Non-positive amounts are a no-op returning zero.
    pub fn buy(&mut self, quote_amount: f64) -> f64 {
        if quote_amount <= 0.0 {
            return 0.0;
        }
        let k = self.k();
        let new_quote = self.quote_reserve + quote_amount;
        let new_token = k / new_quote;
        let tokens_out = self.token_reserve - new_token;

        self.quote_reserve = new_quote;
        self.token_reserve = new_token;
        tokens_out
    }

    /// Swap `token_amount` into the pool. Returns quote received.
    ///
    /// Non-positive amounts are a no-op returning zero.
    pub fn sell(&mut self, token_amount: f64) -> f64 {
        if token_amount <= 0.0 {
            return 0.0;
        }
        let k = self.k();
        let new_token = self.token_reserve + token_amount;
        let new_quote = k / new_token;
        let quote_out = self.quote_reserve - new_quote;

        self.token_reserve = new_token;
        self.quote_reserve = new_quote;
        quote_out
    }

    /// Tokens equivalent to `quote_amount` at the current spot price.
    ///
    /// This is a linearization, not the swap curve: selling the returned
    /// amount yields less than `quote_amount`. The order policy sizes its
    /// slices with it.
    pub fn quote_to_tokens(&self, quote_amount: f64) -> f64 {
        quote_amount / self.price()
    }

    /// Quote equivalent to `token_amount` at the current spot price (linear).
    pub fn tokens_to_quote(&self, token_amount: f64) -> f64 {
        token_amount * self.price()
    }

    /// True while both reserves and the spot price are finite and positive.
    pub fn is_healthy(&self) -> bool {
        self.token_reserve.is_finite()
            && self.quote_reserve.is_finite()
            && self.token_reserve > 0.0
            && self.quote_reserve > 0.0
            && self.price().is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_err(a: f64, b: f64) -> f64 {
        ((a - b) / b).abs()
    }

    #[test]
    fn price_and_liquidity() {
        let pool = Pool::new(1_000_000.0, 1_000.0);
        assert!((pool.price() - 0.001).abs() < 1e-15);
        assert!((pool.liquidity() - 2_000.0).abs() < 1e-12);
    }

    #[test]
    fn buy_matches_constant_product() {
        let mut pool = Pool::new(1_000_000.0, 1_000.0);
        let tokens_out = pool.buy(100.0);

        assert!((pool.quote_reserve - 1_100.0).abs() < 1e-9);
        assert!((pool.token_reserve - 909_090.909_090_909).abs() < 1e-6);
        assert!((tokens_out - 90_909.090_909_09).abs() < 1e-6);
    }

    #[test]
    fn sell_matches_constant_product() {
        let mut pool = Pool::new(1_000_000.0, 1_000.0);
        let quote_out = pool.sell(250_000.0);

        // new_quote = 1e9 / 1.25e6 = 800
        assert!((pool.quote_reserve - 800.0).abs() < 1e-9);
        assert!((quote_out - 200.0).abs() < 1e-9);
    }

    #[test]
    fn swaps_preserve_k() {
        let mut pool = Pool::new(1_000_000.0, 1_000.0);
        let k0 = pool.k();
        pool.buy(37.5);
        assert!(rel_err(pool.k(), k0) < 1e-9);
        pool.sell(12_345.0);
        assert!(rel_err(pool.k(), k0) < 1e-9);
    }

    #[test]
    fn non_positive_amounts_are_noops() {
        let mut pool = Pool::new(1_000.0, 10.0);
        let before = pool;
        assert_eq!(pool.buy(0.0), 0.0);
        assert_eq!(pool.sell(0.0), 0.0);
        assert_eq!(pool.buy(-5.0), 0.0);
        assert_eq!(pool.sell(-5.0), 0.0);
        assert_eq!(pool, before);
    }

    #[test]
    fn linear_helpers_use_spot_price() {
        let pool = Pool::new(1_000_000.0, 1_000.0);
        assert!((pool.quote_to_tokens(1.0) - 1_000.0).abs() < 1e-9);
        assert!((pool.tokens_to_quote(1_000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_sizing_undershoots_actual_proceeds() {
        let mut pool = Pool::new(1_000_000.0, 1_000.0);
        let tokens = pool.quote_to_tokens(50.0);
        let received = pool.sell(tokens);
        assert!(received < 50.0);
        assert!(received > 45.0);
    }

    #[test]
    fn clone_is_independent() {
        let original = Pool::new(1_000.0, 10.0);
        let mut copy = original;
        copy.buy(5.0);
        assert_eq!(original, Pool::new(1_000.0, 10.0));
        assert_ne!(copy, original);
    }

    #[test]
    fn unhealthy_pool_detected() {
        assert!(Pool::new(1.0, 1.0).is_healthy());
        assert!(!Pool::new(f64::INFINITY, 1.0).is_healthy());
        assert!(!Pool::new(1.0, f64::NAN).is_healthy());
        assert!(!Pool::new(0.0, 1.0).is_healthy());
    }
}
