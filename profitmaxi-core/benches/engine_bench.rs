use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use profitmaxi_core::{Pool, SimulationConfig, Simulator};

fn bench_single_run(c: &mut Criterion) {
    let sim = Simulator::new(SimulationConfig::default()).unwrap();
    c.bench_function("single_run_default", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            let mut rng = StdRng::seed_from_u64(seed);
            black_box(sim.run(&mut rng).unwrap())
        })
    });

    let slow = Simulator::new(SimulationConfig {
        delta_ratio: 0.3,
        organic_sell_rate: 2.0,
        order_size: 500.0,
        ..Default::default()
    })
    .unwrap();
    c.bench_function("single_run_with_organic_sells", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            let mut rng = StdRng::seed_from_u64(seed);
            black_box(slow.run(&mut rng).unwrap())
        })
    });
}

fn bench_pool_swaps(c: &mut Criterion) {
    c.bench_function("pool_buy_sell_1k", |b| {
        b.iter(|| {
            let mut pool = Pool::new(1_000_000.0, 1_000.0);
            for i in 0..1_000 {
                let tokens = pool.buy(black_box(1.0 + (i % 7) as f64));
                pool.sell(tokens * 0.5);
            }
            black_box(pool.price())
        })
    });
}

criterion_group!(benches, bench_single_run, bench_pool_swaps);
criterion_main!(benches);
