//! Candidate Route Finder — breadth-first path search (spec §4.2).

use crate::config::PoolPredicate;
use crate::denom::Denom;
use crate::errors::RouterError;
use crate::pool::{Pool, PoolId, PoolKind};
use crate::pool_store::Snapshot;
use crate::route::{CandidateRoute, CandidateRouteSet, Hop};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FinderInput<'a> {
    pub input_denom: &'a Denom,
    pub input_amount: u128,
    pub output_denom: &'a Denom,
    pub max_routes: u8,
    pub max_pools_per_route: u8,
    pub min_pool_liquidity_cap: u64,
    pub pool_filters_any_of: &'a [PoolPredicate],
}

/// A partial route under expansion in the BFS queue.
#[derive(Debug, Clone)]
struct Partial {
    hops: Vec<Hop>,
    contains_canonical_orderbook: bool,
}

fn predicate_skips(pool: &Pool, filters: &[PoolPredicate]) -> bool {
    filters.iter().any(|f| match f {
        PoolPredicate::SkipOrderbooks => pool.is_canonical_orderbook,
        PoolPredicate::SkipGeneralizedCosmWasm => pool.kind == PoolKind::GeneralizedCosmWasm,
    })
}

/// Enumerates up to `K` distinct routes of length <= `H` (spec §4.2).
///
/// The visited-set is keyed by pool-id across the whole search: a pool-id is
/// marked visited only once the partial route that introduced it has been
/// fully expanded, which lets the same pool be reused from a different
/// partial route while still bounding the search.
pub fn find_candidate_routes(
    snapshot: &Snapshot,
    input: FinderInput<'_>,
) -> Result<(CandidateRouteSet, HashSet<PoolId>), RouterError> {
    let mut queue: VecDeque<Partial> = VecDeque::new();
    queue.push_back(Partial { hops: Vec::new(), contains_canonical_orderbook: false });

    let mut visited: HashSet<PoolId> = HashSet::new();
    let mut completed: Vec<CandidateRoute> = Vec::new();

    while let Some(partial) = queue.pop_front() {
        if completed.len() >= input.max_routes as usize {
            break;
        }

        let current_in: Denom = partial
            .hops
            .last()
            .map(|h| h.token_out.clone())
            .unwrap_or_else(|| input.input_denom.clone());

        let is_first_hop = partial.hops.is_empty();

        // current_in appears as a non-first token in the route: forbid
        // revisiting the input denom as an intermediate (spec §4.2).
        if !is_first_hop && current_in == *input.input_denom {
            continue;
        }

        let candidates: Vec<Arc<Pool>> = snapshot.pools_with_denom(&current_in).to_vec();

        'next_pool: for pool in candidates {
            if visited.contains(&pool.id) {
                continue;
            }
            if predicate_skips(&pool, input.pool_filters_any_of) {
                continue;
            }
            if pool.liquidity_cap < input.min_pool_liquidity_cap {
                visited.insert(pool.id);
                continue;
            }
            if is_first_hop && pool.kind != PoolKind::AlloyedTransmuter {
                if let Some(reserve) = pool.reserve_of(&current_in) {
                    if reserve < input.input_amount {
                        visited.insert(pool.id);
                        continue 'next_pool;
                    }
                }
            }

            for other_denom in pool.other_denoms(&current_in) {
                let mut hops = partial.hops.clone();
                hops.push(Hop { pool_id: pool.id, token_out: other_denom.clone() });
                let contains_canonical_orderbook =
                    partial.contains_canonical_orderbook || pool.is_canonical_orderbook;

                if other_denom == input.output_denom {
                    if hops.len() <= input.max_pools_per_route as usize {
                        completed.push(CandidateRoute { hops, contains_canonical_orderbook });
                        if completed.len() >= input.max_routes as usize {
                            break 'next_pool;
                        }
                    }
                    continue;
                }

                if hops.len() < input.max_pools_per_route as usize {
                    queue.push_back(Partial { hops, contains_canonical_orderbook });
                }
            }

            visited.insert(pool.id);
        }
    }

    debug!(
        input_denom = %input.input_denom,
        output_denom = %input.output_denom,
        routes_found = completed.len(),
        "candidate search complete"
    );

    let route_set = validate_and_filter(completed, input.input_denom, input.output_denom)?;
    let used = route_set.used_pool_ids();
    Ok((route_set, used))
}

/// Post-filter applied to completed routes (spec §4.2).
fn validate_and_filter(
    routes: Vec<CandidateRoute>,
    input_denom: &Denom,
    output_denom: &Denom,
) -> Result<CandidateRouteSet, RouterError> {
    let mut kept = Vec::with_capacity(routes.len());
    for route in routes {
        if route.is_empty() {
            return Err(RouterError::internal("candidate route with zero hops"));
        }
        if route.output_denom() != Some(output_denom) {
            return Err(RouterError::internal(
                "candidate routes disagree on final token-out",
            ));
        }
        // The input denom must never reappear as a hop's token-out, and the
        // output denom must appear only at the last hop (spec §4.2 post-filter).
        let last_idx = route.hops.len() - 1;
        let endpoint_violation = route.hops.iter().enumerate().any(|(i, h)| {
            h.token_out == *input_denom || (i != last_idx && h.token_out == *output_denom)
        });
        if endpoint_violation {
            continue;
        }
        if route.has_duplicate_pool_ids() {
            continue;
        }
        kept.push(route);
    }
    Ok(CandidateRouteSet { routes: kept })
}
