//! Pool Store — ordered, filtered snapshot of routable pools (spec §4.1).

use crate::config::CosmWasmAllowlist;
use crate::denom::Denom;
use crate::pool::{Pool, PoolId, PoolKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A sorted, filtered view of pools, plus a per-denom index. Immutable once
/// built; a new snapshot replaces this one wholesale (spec §3 lifecycle).
#[derive(Debug)]
pub struct Snapshot {
    pools: Vec<Arc<Pool>>,
    by_denom: HashMap<Denom, Vec<Arc<Pool>>>,
}

impl Snapshot {
    fn build(pools: Vec<Pool>) -> Self {
        let pools: Vec<Arc<Pool>> = pools.into_iter().map(Arc::new).collect();
        let mut by_denom: HashMap<Denom, Vec<Arc<Pool>>> = HashMap::new();
        for pool in &pools {
            for denom in &pool.denoms {
                by_denom.entry(denom.clone()).or_default().push(pool.clone());
            }
        }
        Self { pools, by_denom }
    }

    /// Pools ordered by the ranking score, highest first.
    pub fn ordered_pools(&self) -> &[Arc<Pool>] {
        &self.pools
    }

    /// Pools containing `denom`, in snapshot order.
    pub fn pools_with_denom(&self, denom: &Denom) -> &[Arc<Pool>] {
        self.by_denom.get(denom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: PoolId) -> Option<&Arc<Pool>> {
        self.pools.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Owns the current routable snapshot and publishes replacements atomically.
pub struct PoolStore {
    current: RwLock<Arc<Snapshot>>,
}

impl Default for PoolStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::build(Vec::new()))),
        }
    }

    /// Install a new snapshot atomically. Readers already holding an `Arc`
    /// from `snapshot()` keep observing the old, complete snapshot.
    pub fn replace(&self, pools: Vec<Pool>) {
        let snapshot = Arc::new(Snapshot::build(pools));
        *self.current.write() = snapshot;
    }

    /// A read handle pinned against reclamation for as long as it is held.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Validate and rank raw pools into the order a snapshot should hold,
    /// per the score in spec §4.1. Dropped pools are logged, not returned.
    pub fn validate_and_sort(
        raw_pools: Vec<Pool>,
        cosmwasm_allowlist: &CosmWasmAllowlist,
        preferred_ids: &[PoolId],
    ) -> Vec<Pool> {
        let mut validated: Vec<Pool> = Vec::with_capacity(raw_pools.len());
        for pool in raw_pools {
            if let Err(e) = pool.validate() {
                warn!(pool_id = %pool.id, error = ?e, "dropping pool: failed validation");
                continue;
            }
            if pool.kind.is_cosmwasm_derived() {
                let code_id = pool.code_id;
                let allowlisted = code_id.is_some_and(|id| cosmwasm_allowlist.contains(id));
                if !allowlisted {
                    warn!(pool_id = %pool.id, ?code_id, "dropping pool: cosmwasm code-id not allowlisted");
                    continue;
                }
            }
            validated.push(pool);
        }

        let sum_all: f64 = validated.iter().map(|p| p.liquidity_cap as f64).sum();
        let mut indexed: Vec<(usize, Pool)> = validated.into_iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| {
            let sa = ranking_score(a, sum_all, preferred_ids);
            let sb = ranking_score(b, sum_all, preferred_ids);
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal).then(ia.cmp(ib))
        });
        indexed.into_iter().map(|(_, p)| p).collect()
    }

    /// Linear filter preserving order (spec §4.1).
    pub fn filter_by_min_liquidity(pools: Vec<Pool>, min_cap: u64) -> Vec<Pool> {
        pools.into_iter().filter(|p| p.liquidity_cap >= min_cap).collect()
    }
}

fn ranking_score(pool: &Pool, sum_all: f64, preferred_ids: &[PoolId]) -> f64 {
    let mut score = pool.liquidity_cap as f64;
    if pool.liquidity_cap_error_empty {
        score += sum_all / 100.0;
    }
    if preferred_ids.contains(&pool.id) {
        score += sum_all;
    }
    if pool.kind.is_concentrated() {
        score += sum_all / 2.0;
    }
    if matches!(pool.kind, PoolKind::AlloyedTransmuter | PoolKind::Transmuter) {
        score += 1.5 * sum_all;
    }
    score
}
