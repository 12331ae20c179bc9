//! Route Cache — two expiring stores keyed by denom pair (spec §4.6).
//!
//! Backed by `dashmap::DashMap`, matching the teacher's choice of a
//! concurrent map over per-venue series in
//! `services_v2/adapters/src/metrics.rs`; writes are copy-on-insert so
//! concurrent readers never observe a partially-written entry.

use crate::denom::Denom;
use crate::route::CandidateRouteSet;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// `floor(log10(n))` for `n > 0`, `0` for `n <= 0` (spec §4.6, §8, §9 open
/// question: this collides amount `0` with amounts `1..=9`, preserved as-is
/// because the spec requires it, not because it is considered correct).
pub fn order_of_magnitude(n: i128) -> u32 {
    if n <= 0 {
        return 0;
    }
    let mut n = n as u128;
    let mut magnitude = 0u32;
    while n >= 10 {
        n /= 10;
        magnitude += 1;
    }
    magnitude
}

#[derive(Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct PairKey {
    input: Denom,
    output: Denom,
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct RankedKey {
    pair: PairKey,
    magnitude: u32,
}

pub struct RouteCache {
    candidates: DashMap<PairKey, Entry<CandidateRouteSet>>,
    ranked: DashMap<RankedKey, Entry<CandidateRouteSet>>,
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteCache {
    pub fn new() -> Self {
        Self { candidates: DashMap::new(), ranked: DashMap::new() }
    }

    pub fn get_candidate(&self, input: &Denom, output: &Denom) -> Option<CandidateRouteSet> {
        let key = PairKey { input: input.clone(), output: output.clone() };
        self.candidates.get(&key).and_then(|e| {
            if e.expires_at > Instant::now() {
                Some(e.value.clone())
            } else {
                None
            }
        })
    }

    pub fn put_candidate(&self, input: &Denom, output: &Denom, routes: CandidateRouteSet, ttl: Duration) {
        let key = PairKey { input: input.clone(), output: output.clone() };
        self.candidates.insert(key, Entry { value: routes, expires_at: Instant::now() + ttl });
    }

    pub fn get_ranked(&self, input: &Denom, output: &Denom, magnitude: u32) -> Option<CandidateRouteSet> {
        let key = RankedKey { pair: PairKey { input: input.clone(), output: output.clone() }, magnitude };
        self.ranked.get(&key).and_then(|e| {
            if e.expires_at > Instant::now() {
                Some(e.value.clone())
            } else {
                None
            }
        })
    }

    pub fn put_ranked(
        &self,
        input: &Denom,
        output: &Denom,
        magnitude: u32,
        mut routes: CandidateRouteSet,
        ttl: Duration,
        canonical_orderbook: Option<crate::route::CandidateRoute>,
    ) {
        // The canonical-orderbook route, if newly discovered, is always
        // preserved into the cached set even if ranking dropped it (spec §4.6).
        if let Some(orderbook_route) = canonical_orderbook {
            let already_present = routes
                .routes
                .iter()
                .any(|r| r.pool_ids().eq(orderbook_route.pool_ids()));
            if !already_present {
                routes.routes.push(orderbook_route);
            }
        }
        let key = RankedKey { pair: PairKey { input: input.clone(), output: output.clone() }, magnitude };
        self.ranked.insert(key, Entry { value: routes, expires_at: Instant::now() + ttl });
    }

    /// Drops both entries for `(input, output)` across every magnitude bucket.
    pub fn invalidate(&self, input: &Denom, output: &Denom) {
        let pair_key = PairKey { input: input.clone(), output: output.clone() };
        self.candidates.remove(&pair_key);
        self.ranked.retain(|k, _| k.pair != pair_key);
    }
}
