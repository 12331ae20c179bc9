//! Benchmarks the Candidate Route Finder's BFS over a synthetic pool graph
//! of increasing width, mirroring the teacher's per-hot-path bench style
//! (`benches/amm_math.rs`): no assertions, just `black_box`ed throughput.

use amm_router::config::PoolPredicate;
use amm_router::finder::{find_candidate_routes, FinderInput};
use amm_router::pool::{Pool, PoolId, PoolKind, SwapState};
use amm_router::pool_store::PoolStore;
use amm_router::Denom;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn ring_of_pools(n: u64) -> Vec<Pool> {
    (0..n)
        .map(|i| {
            let a = Denom::from(format!("tok{i}"));
            let b = Denom::from(format!("tok{}", (i + 1) % n));
            let mut reserves = HashMap::new();
            reserves.insert(a.clone(), 1_000_000u128);
            reserves.insert(b.clone(), 1_000_000u128);
            Pool {
                id: PoolId(i),
                kind: PoolKind::Balancer,
                denoms: vec![a, b],
                liquidity_cap: 1_000_000,
                liquidity_cap_error_empty: false,
                spread_factor: dec!(0.003),
                taker_fee: dec!(0.0),
                swap_state: SwapState(Vec::new()),
                reserves: Some(reserves),
                code_id: None,
                is_canonical_orderbook: false,
            }
        })
        .collect()
}

fn bench_finder(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_finder");
    for size in [8u64, 32, 128] {
        let store = PoolStore::new();
        store.replace(ring_of_pools(size));
        let snapshot = store.snapshot();
        let input = Denom::from("tok0");
        let output = Denom::from(format!("tok{}", size / 2));
        let filters: Vec<PoolPredicate> = Vec::new();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let result = find_candidate_routes(
                    &snapshot,
                    FinderInput {
                        input_denom: &input,
                        input_amount: 1_000,
                        output_denom: &output,
                        max_routes: 20,
                        max_pools_per_route: 4,
                        min_pool_liquidity_cap: 0,
                        pool_filters_any_of: &filters,
                    },
                );
                black_box(result).ok();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_finder);
criterion_main!(benches);
