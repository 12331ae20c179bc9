//! Direct-Quote Ranker (spec §4.4).

use crate::cancellation::CancellationToken;
use crate::denom::Denom;
use crate::errors::RouterError;
use crate::pool_store::Snapshot;
use crate::route::{CandidateRoute, RankedRoute};
use crate::simulator::{simulate_route, SwapSimulator};
use std::collections::HashSet;

/// `estimate_and_rank`: simulate every candidate with the whole input, sort
/// descending, drop duplicate-pool routes, truncate to `max_split_routes`.
///
/// Checks `cancellation` before each simulator call (spec §5: "before each
/// simulator call in ranking"), so a cancelled quote can abort mid-loop
/// instead of paying for every remaining candidate's simulation.
pub async fn estimate_and_rank(
    simulator: &dyn SwapSimulator,
    snapshot: &Snapshot,
    routes: Vec<CandidateRoute>,
    input_denom: &Denom,
    amount_in: u128,
    max_split_routes: usize,
    cancellation: Option<&dyn CancellationToken>,
) -> Result<Vec<RankedRoute>, RouterError> {
    let attempted = routes.len();
    let mut ranked = Vec::with_capacity(routes.len());
    for route in routes {
        if cancellation.is_some_and(|t| t.is_cancelled()) {
            return Err(RouterError::Cancelled(crate::errors::ErrorContext::default()));
        }
        if let Ok(amount_out) = simulate_route(simulator, snapshot, &route, input_denom, amount_in).await {
            ranked.push(RankedRoute { route, amount_out });
        }
    }

    if attempted > 0 && ranked.is_empty() {
        return Err(RouterError::NotEnoughLiquidity(crate::errors::ErrorContext::default()));
    }

    ranked.sort_by(|a, b| b.amount_out.cmp(&a.amount_out));

    let deduped = apply_duplicate_pool_filter(ranked, snapshot);
    Ok(deduped.into_iter().take(max_split_routes).collect())
}

/// Keeps a route only if every one of its slippage-bearing pools is not
/// already covered by a previously-kept route; zero-slippage pools are
/// exempt (spec §4.4).
pub fn apply_duplicate_pool_filter(
    ranked: Vec<RankedRoute>,
    snapshot: &Snapshot,
) -> Vec<RankedRoute> {
    let mut covered: HashSet<_> = HashSet::new();
    let mut kept = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        let slippage_bearing_ids: Vec<_> = candidate
            .route
            .pool_ids()
            .filter(|id| {
                snapshot
                    .get(*id)
                    .map(|p| !p.kind.is_zero_slippage())
                    .unwrap_or(true)
            })
            .collect();

        if slippage_bearing_ids.iter().any(|id| covered.contains(id)) {
            continue;
        }
        covered.extend(slippage_bearing_ids);
        kept.push(candidate);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Pool, PoolId, PoolKind, SwapState};
    use crate::pool_store::PoolStore;
    use crate::route::Hop;
    use rust_decimal_macros::dec;

    fn pool(id: u64, kind: PoolKind) -> Pool {
        Pool {
            id: PoolId(id),
            kind,
            denoms: vec![Denom::from("a"), Denom::from("b")],
            liquidity_cap: 1_000,
            liquidity_cap_error_empty: false,
            spread_factor: dec!(0.0),
            taker_fee: dec!(0.0),
            swap_state: SwapState(Vec::new()),
            reserves: None,
            code_id: None,
            is_canonical_orderbook: false,
        }
    }

    fn route(hops: Vec<(u64, &str)>) -> RankedRoute {
        RankedRoute {
            route: CandidateRoute {
                hops: hops
                    .into_iter()
                    .map(|(id, denom)| Hop { pool_id: PoolId(id), token_out: Denom::from(denom) })
                    .collect(),
                contains_canonical_orderbook: false,
            },
            amount_out: 0,
        }
    }

    #[test]
    fn duplicate_balancer_pool_drops_lower_ranked_route() {
        let store = PoolStore::new();
        store.replace(vec![pool(42, PoolKind::Balancer), pool(7, PoolKind::Balancer)]);
        let snap = store.snapshot();

        let mut r1 = route(vec![(42, "b")]);
        r1.amount_out = 100;
        let mut r2 = route(vec![(42, "b"), (7, "b")]);
        r2.amount_out = 90;

        let kept = apply_duplicate_pool_filter(vec![r1, r2], &snap);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].amount_out, 100);
    }

    #[test]
    fn duplicate_transmuter_pool_is_exempt() {
        let store = PoolStore::new();
        store.replace(vec![pool(42, PoolKind::Transmuter)]);
        let snap = store.snapshot();

        let r1 = route(vec![(42, "b")]);
        let r2 = route(vec![(42, "b")]);
        let kept = apply_duplicate_pool_filter(vec![r1, r2], &snap);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let store = PoolStore::new();
        store.replace(vec![pool(1, PoolKind::Balancer), pool(2, PoolKind::Balancer)]);
        let snap = store.snapshot();

        let mut r1 = route(vec![(1, "b")]);
        r1.amount_out = 100;
        let mut r2 = route(vec![(2, "b")]);
        r2.amount_out = 90;

        let once = apply_duplicate_pool_filter(vec![r1, r2], &snap);
        let twice = apply_duplicate_pool_filter(once.iter().map(clone_ranked).collect(), &snap);
        assert_eq!(once.len(), twice.len());
    }

    fn clone_ranked(r: &RankedRoute) -> RankedRoute {
        RankedRoute { route: r.route.clone(), amount_out: r.amount_out }
    }
}
