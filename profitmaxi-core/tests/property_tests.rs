//! Property tests for pool and order invariants.
//!
//! Uses proptest to verify:
//! 1. Constant product: k is preserved by every buy and sell
//! 2. Round-trip slippage: buy then sell never returns more quote than paid
//! 3. Fill monotonicity: fill percentage never decreases and stays in [0, 100]
//! 4. Threshold gate: sub-threshold buys never touch `remaining`

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use profitmaxi_core::{Order, Pool, SimulationConfig, Simulator};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_reserve() -> impl Strategy<Value = f64> {
    1.0..1e9_f64
}

fn arb_swap() -> impl Strategy<Value = (bool, f64)> {
    (any::<bool>(), 0.0..1e6_f64)
}

fn rel_err(a: f64, b: f64) -> f64 {
    ((a - b) / b).abs()
}

// ── 1. Constant product ──────────────────────────────────────────────

proptest! {
    #[test]
    fn swaps_preserve_constant_product(
        token in arb_reserve(),
        quote in arb_reserve(),
        swaps in prop::collection::vec(arb_swap(), 1..50),
    ) {
        let mut pool = Pool::new(token, quote);
        for (is_buy, amount) in swaps {
            let before = pool.k();
            if is_buy {
                pool.buy(amount);
            } else {
                pool.sell(amount);
            }
            prop_assert!(rel_err(pool.k(), before) < 1e-9, "k drifted: {} -> {}", before, pool.k());
        }
    }
}

// ── 2. Round-trip slippage ───────────────────────────────────────────

proptest! {
    #[test]
    fn round_trip_never_profits(
        token in arb_reserve(),
        quote in arb_reserve(),
        amount in 0.0..1e6_f64,
    ) {
        let mut pool = Pool::new(token, quote);
        let tokens = pool.buy(amount);
        let back = pool.sell(tokens);
        // absolute slack scales with the reserve the difference is taken against
        let slack = (quote + amount) * 1e-12;
        prop_assert!(back <= amount + slack, "paid {} got back {}", amount, back);
    }

    #[test]
    fn buy_raises_price_and_sell_lowers_it(
        token in arb_reserve(),
        quote in arb_reserve(),
        amount in 1e-3..1e6_f64,
    ) {
        let mut pool = Pool::new(token, quote);
        let p0 = pool.price();
        let tokens = pool.buy(amount);
        prop_assert!(tokens > 0.0);
        prop_assert!(pool.price() >= p0 * (1.0 - 1e-12));
        let p1 = pool.price();
        pool.sell(tokens);
        prop_assert!(pool.price() <= p1 * (1.0 + 1e-12));
    }
}

// ── 3. Fill monotonicity ─────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fill_history_monotone_and_bounded(
        seed in any::<u64>(),
        delta_ratio in 0.05..=1.0_f64,
        order_size in 1.0..200.0_f64,
        organic_sell_rate in 0.0..5.0_f64,
    ) {
        let config = SimulationConfig {
            delta_ratio,
            order_size,
            organic_sell_rate,
            max_time_steps: 200,
            ..Default::default()
        };
        let sim = Simulator::new(config).unwrap();
        let result = sim.run(&mut StdRng::seed_from_u64(seed)).unwrap();

        for w in result.fill_history.windows(2) {
            prop_assert!(w[1] >= w[0]);
        }
        for f in &result.fill_history {
            prop_assert!((0.0..=100.0).contains(f));
        }
    }
}

// ── 4. Threshold gate ────────────────────────────────────────────────

proptest! {
    #[test]
    fn sub_threshold_buy_never_fills(
        threshold in 0.01..100.0_f64,
        frac in 0.0..0.999_f64,
        delta_ratio in 0.01..=1.0_f64,
    ) {
        let mut order = Order::new(1_000.0, delta_ratio, threshold);
        let mut pool = Pool::new(1_000_000.0, 1_000.0);
        let buy = threshold * frac;
        pool.buy(buy);

        prop_assert!(order.on_buy(0, buy, &mut pool).is_none());
        prop_assert_eq!(order.remaining(), 1_000.0);
    }

    #[test]
    fn remaining_stays_within_bounds(
        total in 1.0..100.0_f64,
        buys in prop::collection::vec(0.01..50.0_f64, 1..40),
    ) {
        let mut order = Order::new(total, 1.0, 0.0);
        let mut pool = Pool::new(1_000_000.0, 1_000.0);
        let mut last = order.remaining();
        for (i, b) in buys.into_iter().enumerate() {
            pool.buy(b);
            order.on_buy(i as u64, b, &mut pool);
            prop_assert!(order.remaining() <= last);
            prop_assert!(order.remaining() >= 0.0);
            last = order.remaining();
        }
    }
}
