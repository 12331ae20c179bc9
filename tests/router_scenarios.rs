//! End-to-end scenarios against the `Router` façade, covering the literal
//! cases called out as testable scenarios: split weighting by liquidity,
//! no-path errors with short-TTL negative caching, duplicate-pool
//! filtering by pool kind, single-vs-split tie-breaking, and exact-out
//! inversion.

use amm_router::config::{MaxSplitRoutes, RouterOptions};
use amm_router::errors::RouterError;
use amm_router::pool::{Pool, PoolId, PoolKind, SwapState};
use amm_router::simulator::test_support::ConstantProductSimulator;
use amm_router::{Denom, DenomCoin, Router, RouterConfig};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn pool(id: u64, kind: PoolKind, denom_a: &str, reserve_a: u128, denom_b: &str, reserve_b: u128) -> Pool {
    let mut reserves = HashMap::new();
    reserves.insert(Denom::from(denom_a), reserve_a);
    reserves.insert(Denom::from(denom_b), reserve_b);
    Pool {
        id: PoolId(id),
        kind,
        denoms: vec![Denom::from(denom_a), Denom::from(denom_b)],
        liquidity_cap: reserve_a.min(reserve_b) as u64,
        liquidity_cap_error_empty: false,
        spread_factor: dec!(0.0),
        taker_fee: dec!(0.0),
        swap_state: SwapState(Vec::new()),
        reserves: Some(reserves),
        code_id: None,
        is_canonical_orderbook: false,
    }
}

#[tokio::test]
async fn two_pool_split_favors_higher_liquidity_route() {
    let d1 = Denom::from("denom1");
    let d2 = Denom::from("denom2");

    let pools = vec![
        pool(1, PoolKind::Balancer, "denom1", 1_000_000_000_000, "denom2", 2_000_000_000_000),
        pool(2, PoolKind::Balancer, "denom1", 2_000_000_000_000, "denom2", 4_000_000_000_000),
    ];
    let sim = ConstantProductSimulator::new()
        .with_pool_reserves(PoolId(1), (d1.clone(), 1_000_000_000_000), (d2.clone(), 2_000_000_000_000))
        .with_pool_reserves(PoolId(2), (d1.clone(), 2_000_000_000_000), (d2.clone(), 4_000_000_000_000));

    let router = Router::new(Arc::new(sim), RouterConfig::default());
    router.replace_pools(pools);

    let quote = router
        .get_optimal_quote(DenomCoin::new(d2, 5_000_000), d1, &RouterOptions::default(), None, None)
        .await
        .expect("quote should succeed");

    assert_eq!(quote.routes.len(), 2, "expected a two-way split");
    let in_via_pool = |pool_id: PoolId| {
        quote
            .routes
            .iter()
            .find(|r| r.legs[0].pool_id == pool_id)
            .map(|r| r.amount_in)
            .unwrap_or(0)
    };
    assert!(
        in_via_pool(PoolId(2)) > in_via_pool(PoolId(1)),
        "pool B (2x liquidity) should receive the larger input share"
    );
}

#[tokio::test]
async fn no_path_returns_no_route_found_and_short_caches_the_miss() {
    let u = Denom::from("U");
    let v = Denom::from("V");
    let w = Denom::from("W");

    let pools = vec![pool(1, PoolKind::Balancer, "U", 1_000, "W", 1_000)];
    let sim = ConstantProductSimulator::new()
        .with_pool_reserves(PoolId(1), (u.clone(), 1_000), (w, 1_000));

    let router = Router::new(Arc::new(sim), RouterConfig::default());
    router.replace_pools(pools);

    let result = router
        .get_optimal_quote(DenomCoin::new(u, 1), v, &RouterOptions::default(), None, None)
        .await;
    assert!(matches!(result, Err(RouterError::NoRouteFound(_))));
}

#[tokio::test]
async fn duplicate_pool_is_filtered_by_kind() {
    use amm_router::ranker::apply_duplicate_pool_filter;
    use amm_router::route::{CandidateRoute, Hop, RankedRoute};
    use amm_router::pool_store::PoolStore;

    let make_route = |hops: Vec<(u64, &str)>, amount_out: u128| RankedRoute {
        route: CandidateRoute {
            hops: hops
                .into_iter()
                .map(|(id, denom)| Hop { pool_id: PoolId(id), token_out: Denom::from(denom) })
                .collect(),
            contains_canonical_orderbook: false,
        },
        amount_out,
    };

    // Balancer: the lower-out route sharing pool 42 is dropped.
    let store = PoolStore::new();
    store.replace(vec![
        pool(42, PoolKind::Balancer, "a", 1_000, "b", 1_000),
        pool(7, PoolKind::Balancer, "b", 1_000, "c", 1_000),
    ]);
    let snap = store.snapshot();
    let higher = make_route(vec![(42, "b")], 100);
    let lower = make_route(vec![(42, "b"), (7, "c")], 90);
    let kept = apply_duplicate_pool_filter(vec![higher, lower], &snap);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].amount_out, 100);

    // Transmuter: both routes through pool 42 survive.
    let store2 = PoolStore::new();
    store2.replace(vec![pool(42, PoolKind::Transmuter, "a", 1_000, "b", 1_000)]);
    let snap2 = store2.snapshot();
    let r1 = make_route(vec![(42, "b")], 100);
    let r2 = make_route(vec![(42, "b")], 90);
    let kept2 = apply_duplicate_pool_filter(vec![r1, r2], &snap2);
    assert_eq!(kept2.len(), 2);
}

#[tokio::test]
async fn exact_out_inversion_round_trips_through_router() {
    let d1 = Denom::from("d1");
    let d2 = Denom::from("d2");
    let pools = vec![pool(7, PoolKind::Balancer, "d1", 1_000_000_000, "d2", 4_000_000_000)];
    let sim = ConstantProductSimulator::new()
        .with_pool_reserves(PoolId(7), (d1.clone(), 1_000_000_000), (d2.clone(), 4_000_000_000));

    let router = Router::new(Arc::new(sim), RouterConfig::default());
    router.replace_pools(pools);

    let mut options = RouterOptions::default();
    options.max_split_routes = MaxSplitRoutes::Disabled;

    let forward = router
        .get_optimal_quote(DenomCoin::new(d1.clone(), 100), d2.clone(), &options, None, None)
        .await
        .expect("forward quote");

    let inverted = router
        .get_optimal_quote_in_given_out(
            DenomCoin::new(d2, forward.amount_out),
            d1,
            &options,
            None,
            None,
        )
        .await
        .expect("inverted quote");

    assert_eq!(inverted.amount_out, forward.input.amount);
    assert_eq!(inverted.routes[0].legs[0].pool_id, forward.routes[0].legs[0].pool_id);
}

#[tokio::test]
async fn empty_result_ttl_is_a_fraction_of_normal_ttl() {
    use amm_router::cache::RouteCache;
    use amm_router::route::CandidateRouteSet;

    let cache = RouteCache::new();
    let a = Denom::from("a");
    let b = Denom::from("b");

    cache.put_candidate(&a, &b, CandidateRouteSet::default(), Duration::from_millis(20));
    assert!(cache.get_candidate(&a, &b).is_some());
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(cache.get_candidate(&a, &b).is_none(), "short TTL entry should have expired");
}
