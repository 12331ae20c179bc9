//! Route, hop and route-set types shared by the finder, ranker and optimizer.

use crate::denom::Denom;
use crate::pool::PoolId;
use std::collections::HashSet;

/// One transition: swap through `pool_id`, receiving `token_out`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub pool_id: PoolId,
    pub token_out: Denom,
}

/// An ordered sequence of hops from an input denom to an output denom
/// (spec §3 `Candidate Route`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRoute {
    pub hops: Vec<Hop>,
    pub contains_canonical_orderbook: bool,
}

impl CandidateRoute {
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn output_denom(&self) -> Option<&Denom> {
        self.hops.last().map(|h| &h.token_out)
    }

    pub fn pool_ids(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.hops.iter().map(|h| h.pool_id)
    }

    pub fn has_duplicate_pool_ids(&self) -> bool {
        let mut seen = HashSet::new();
        !self.hops.iter().all(|h| seen.insert(h.pool_id))
    }
}

/// Result of a candidate search: up to `K` distinct routes sharing input and
/// output denoms (spec §3 `Candidate Route Set`).
#[derive(Debug, Clone, Default)]
pub struct CandidateRouteSet {
    pub routes: Vec<CandidateRoute>,
}

impl CandidateRouteSet {
    pub fn used_pool_ids(&self) -> HashSet<PoolId> {
        self.routes.iter().flat_map(|r| r.pool_ids()).collect()
    }
}

/// A candidate route annotated with its simulated output for the whole
/// input (spec §3 `Ranked Route`).
#[derive(Debug, Clone)]
pub struct RankedRoute {
    pub route: CandidateRoute,
    pub amount_out: u128,
}
