//! Split Optimizer — knapsack DP over ranked routes (spec §4.5).

use crate::cancellation::CancellationToken;
use crate::denom::Denom;
use crate::errors::RouterError;
use crate::pool_store::Snapshot;
use crate::route::RankedRoute;
use crate::simulator::{simulate_route, SwapSimulator};
use std::collections::HashMap;

fn cancelled(cancellation: Option<&dyn CancellationToken>) -> bool {
    cancellation.is_some_and(|t| t.is_cancelled())
}

/// Per-route allocation, expressed both as a weight out of `granularity`
/// and as the coin amounts that weight corresponds to.
#[derive(Debug, Clone)]
pub struct RouteAllocation {
    pub route_index: usize,
    pub weight: u32,
    pub amount_in: u128,
    pub amount_out: u128,
}

#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub allocations: Vec<RouteAllocation>,
    pub total_amount_out: u128,
}

/// Runs the DP for `ranked_routes` against `amount_in`, quantized into
/// `granularity` increments (spec §4.5, default `G = 10`).
///
/// Checks `cancellation` before each simulator call during the memo pre-fill
/// and at each outer-loop cell of the DP recurrence (spec §5).
pub async fn optimize_split(
    simulator: &dyn SwapSimulator,
    snapshot: &Snapshot,
    ranked_routes: &[RankedRoute],
    input_denom: &Denom,
    amount_in: u128,
    granularity: u32,
    cancellation: Option<&dyn CancellationToken>,
) -> Result<SplitPlan, RouterError> {
    let n = ranked_routes.len();
    if n == 0 {
        return Err(RouterError::SplitOptimizationInfeasible { reason: "no routes to split" });
    }
    if n == 1 {
        if cancelled(cancellation) {
            return Err(RouterError::Cancelled(crate::errors::ErrorContext::default()));
        }
        let route = &ranked_routes[0];
        let amount_out =
            simulate_route(simulator, snapshot, &route.route, input_denom, amount_in)
                .await
                .unwrap_or(0);
        return Ok(SplitPlan {
            allocations: vec![RouteAllocation {
                route_index: 0,
                weight: granularity,
                amount_in,
                amount_out,
            }],
            total_amount_out: amount_out,
        });
    }

    let g = granularity as usize;
    let unit = amount_in / granularity as u128;

    // Pre-fill the memo table; simulator calls are async so we cannot call
    // them from inside the synchronous DP recurrence below.
    let mut memo: HashMap<(usize, usize), u128> = HashMap::new();
    for route_idx in 0..n {
        for units in 1..=g {
            if cancelled(cancellation) {
                return Err(RouterError::Cancelled(crate::errors::ErrorContext::default()));
            }
            let amount = (unit * units as u128).min(amount_in);
            let amount_out = simulate_route(
                simulator,
                snapshot,
                &ranked_routes[route_idx].route,
                input_denom,
                amount,
            )
            .await
            .unwrap_or(0);
            memo.insert((route_idx, units), amount_out);
        }
    }
    let out_of = |route_idx: usize, units: usize| -> u128 {
        if units == 0 {
            0
        } else {
            *memo.get(&(route_idx, units)).unwrap_or(&0)
        }
    };

    // dp[x][j] = max output using first j routes with x units consumed.
    let mut dp = vec![vec![0u128; n + 1]; g + 1];
    let mut choice = vec![vec![0usize; n + 1]; g + 1];

    for j in 1..=n {
        if cancelled(cancellation) {
            return Err(RouterError::Cancelled(crate::errors::ErrorContext::default()));
        }
        for x in 0..=g {
            let mut best = dp[x][j - 1];
            let mut best_p = 0usize;
            for p in 0..=x {
                let candidate = dp[x - p][j - 1] + out_of(j - 1, p);
                if candidate > best {
                    best = candidate;
                    best_p = p;
                }
            }
            dp[x][j] = best;
            choice[x][j] = best_p;
        }
    }

    // Reconstruct from (G, N) down to (_, 0).
    let mut allocations = Vec::new();
    let mut x = g;
    for j in (1..=n).rev() {
        let p = choice[x][j];
        if p > 0 {
            let amount = (unit * p as u128).min(amount_in);
            allocations.push(RouteAllocation {
                route_index: j - 1,
                weight: p as u32,
                amount_in: amount,
                amount_out: out_of(j - 1, p),
            });
        }
        x -= p;
    }
    allocations.reverse();

    // `unit` truncates `amount_in / granularity`; fold the truncation
    // remainder into the last allocation so Σ per-route in = amount_in
    // exactly, even when amount_in isn't a multiple of granularity.
    let remainder = amount_in % granularity as u128;
    if remainder > 0 {
        if let Some(last) = allocations.last_mut() {
            last.amount_in += remainder;
        }
    }

    let total_weight: u32 = allocations.iter().map(|a| a.weight).sum();
    if total_weight != granularity {
        return Err(RouterError::internal("total increments mismatch"));
    }
    for a in &allocations {
        if (a.amount_in == 0) != (a.amount_out == 0) {
            return Err(RouterError::internal(
                "route allocation rounds to zero input but nonzero output (or vice-versa)",
            ));
        }
    }

    let total_amount_out = dp[g][n];
    if total_amount_out == 0 {
        return Err(RouterError::SplitOptimizationInfeasible {
            reason: "reconstructed total output is zero",
        });
    }

    Ok(SplitPlan { allocations, total_amount_out })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Pool, PoolId, PoolKind, SwapState};
    use crate::pool_store::PoolStore;
    use crate::route::{CandidateRoute, Hop};
    use crate::simulator::test_support::ConstantProductSimulator;
    use rust_decimal_macros::dec;
    use std::collections::HashMap as Map;

    fn pool_with_reserves(id: u64, reserve_a: u128, reserve_b: u128) -> Pool {
        let mut reserves = Map::new();
        reserves.insert(Denom::from("a"), reserve_a);
        reserves.insert(Denom::from("b"), reserve_b);
        Pool {
            id: PoolId(id),
            kind: PoolKind::Balancer,
            denoms: vec![Denom::from("a"), Denom::from("b")],
            liquidity_cap: reserve_a as u64,
            liquidity_cap_error_empty: false,
            spread_factor: dec!(0.0),
            taker_fee: dec!(0.0),
            swap_state: SwapState(Vec::new()),
            reserves: Some(reserves),
            code_id: None,
            is_canonical_orderbook: false,
        }
    }

    fn ranked(pool_id: u64) -> RankedRoute {
        RankedRoute {
            route: CandidateRoute {
                hops: vec![Hop { pool_id: PoolId(pool_id), token_out: Denom::from("b") }],
                contains_canonical_orderbook: false,
            },
            amount_out: 0,
        }
    }

    #[tokio::test]
    async fn single_route_short_circuits() {
        let store = PoolStore::new();
        store.replace(vec![pool_with_reserves(1, 1_000_000, 1_000_000)]);
        let snap = store.snapshot();
        let sim = ConstantProductSimulator::new().with_pool_reserves(
            PoolId(1),
            (Denom::from("a"), 1_000_000),
            (Denom::from("b"), 1_000_000),
        );

        let plan = optimize_split(&sim, &snap, &[ranked(1)], &Denom::from("a"), 1_000, 10, None)
            .await
            .unwrap();
        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].weight, 10);
    }

    #[tokio::test]
    async fn two_pool_split_weights_higher_liquidity_pool_more() {
        let store = PoolStore::new();
        store.replace(vec![
            pool_with_reserves(1, 1_000_000_000_000u128, 2_000_000_000_000u128),
            pool_with_reserves(2, 2_000_000_000_000u128, 4_000_000_000_000u128),
        ]);
        let snap = store.snapshot();
        let sim = ConstantProductSimulator::new()
            .with_pool_reserves(PoolId(1), (Denom::from("b"), 2_000_000_000_000), (Denom::from("a"), 1_000_000_000_000))
            .with_pool_reserves(PoolId(2), (Denom::from("b"), 4_000_000_000_000), (Denom::from("a"), 2_000_000_000_000));

        let routes = vec![
            RankedRoute {
                route: CandidateRoute {
                    hops: vec![Hop { pool_id: PoolId(1), token_out: Denom::from("a") }],
                    contains_canonical_orderbook: false,
                },
                amount_out: 0,
            },
            RankedRoute {
                route: CandidateRoute {
                    hops: vec![Hop { pool_id: PoolId(2), token_out: Denom::from("a") }],
                    contains_canonical_orderbook: false,
                },
                amount_out: 0,
            },
        ];

        let plan = optimize_split(&sim, &snap, &routes, &Denom::from("b"), 5_000_000, 10, None)
            .await
            .unwrap();
        let weight_a = plan.allocations.iter().find(|a| a.route_index == 0).map(|a| a.weight).unwrap_or(0);
        let weight_b = plan.allocations.iter().find(|a| a.route_index == 1).map(|a| a.weight).unwrap_or(0);
        assert!(weight_b > weight_a, "pool B (2x liquidity) should take a larger share: a={weight_a} b={weight_b}");
    }

    #[tokio::test]
    async fn non_exact_multiple_amount_is_fully_allocated() {
        let store = PoolStore::new();
        store.replace(vec![
            pool_with_reserves(1, 1_000_000_000, 2_000_000_000),
            pool_with_reserves(2, 2_000_000_000, 4_000_000_000),
        ]);
        let snap = store.snapshot();
        let sim = ConstantProductSimulator::new()
            .with_pool_reserves(PoolId(1), (Denom::from("a"), 1_000_000_000), (Denom::from("b"), 2_000_000_000))
            .with_pool_reserves(PoolId(2), (Denom::from("a"), 2_000_000_000), (Denom::from("b"), 4_000_000_000));

        let routes = vec![ranked(1), ranked(2)];
        let plan = optimize_split(&sim, &snap, &routes, &Denom::from("a"), 10_007, 10, None)
            .await
            .unwrap();

        let total_in: u128 = plan.allocations.iter().map(|a| a.amount_in).sum();
        assert_eq!(total_in, 10_007, "the granularity-truncation remainder must not be dropped");
    }
}
