//! Router configuration and defaults.
//!
//! Mirrors the teacher's `libs/config/src/service.rs` pattern: a module of
//! named constants for defaults, plus an explicit config struct passed in by
//! the host at construction time. No process-wide mutable state lives here.

use std::time::Duration;

/// Split-route cap. `Disabled` is a distinct variant (not a `0` sentinel) so
/// "disable splitting" can never be confused with a misconfigured zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxSplitRoutes {
    Disabled,
    Limit(u8),
}

impl MaxSplitRoutes {
    pub fn limit(self) -> Option<u8> {
        match self {
            MaxSplitRoutes::Disabled => None,
            MaxSplitRoutes::Limit(n) => Some(n),
        }
    }
}

/// Per-request knobs a caller may override; see spec §6 `RouterOptions`.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub max_pools_per_route: u8,
    pub max_routes: u8,
    pub max_split_routes: MaxSplitRoutes,
    pub min_pool_liquidity_cap: u64,
    pub candidate_route_ttl: Duration,
    pub ranked_route_ttl: Duration,
    pub disable_cache: bool,
    pub pool_filters_any_of: Vec<PoolPredicate>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_pools_per_route: defaults::MAX_POOLS_PER_ROUTE,
            max_routes: defaults::MAX_ROUTES,
            max_split_routes: MaxSplitRoutes::Limit(defaults::MAX_SPLIT_ROUTES),
            min_pool_liquidity_cap: defaults::MIN_POOL_LIQUIDITY_CAP,
            candidate_route_ttl: Duration::from_secs(defaults::CANDIDATE_ROUTE_TTL_S as u64),
            ranked_route_ttl: Duration::from_secs(defaults::RANKED_ROUTE_TTL_S as u64),
            disable_cache: false,
            pool_filters_any_of: Vec::new(),
        }
    }
}

/// A named filter applied during candidate search (spec §4.2 "extra predicate").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPredicate {
    SkipOrderbooks,
    SkipGeneralizedCosmWasm,
}

/// Construction-time configuration for a [`crate::router::Router`]. Unlike
/// [`RouterOptions`], these are not overridden per request.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub options: RouterOptions,
    /// Code-id allowlists for CosmWasm-derived pool kinds (spec §4.1).
    pub cosmwasm_allowlist: CosmWasmAllowlist,
    /// Pool ids treated as `is_preferred` in the ranking score.
    pub preferred_pool_ids: Vec<crate::pool::PoolId>,
    /// Empty-result cache entries live for this fraction of the normal TTL.
    pub empty_result_ttl_divisor: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            options: RouterOptions::default(),
            cosmwasm_allowlist: CosmWasmAllowlist::default(),
            preferred_pool_ids: Vec::new(),
            empty_result_ttl_divisor: defaults::EMPTY_RESULT_TTL_DIVISOR,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CosmWasmAllowlist {
    pub transmuter_code_ids: Vec<u64>,
    pub alloyed_transmuter_code_ids: Vec<u64>,
    pub generalized_code_ids: Vec<u64>,
}

impl CosmWasmAllowlist {
    pub fn contains(&self, code_id: u64) -> bool {
        self.transmuter_code_ids.contains(&code_id)
            || self.alloyed_transmuter_code_ids.contains(&code_id)
            || self.generalized_code_ids.contains(&code_id)
    }
}

/// Default values, grouped the way the teacher groups per-service defaults
/// in `libs/config/src/service.rs`.
pub mod defaults {
    pub const MAX_POOLS_PER_ROUTE: u8 = 4;
    pub const MAX_ROUTES: u8 = 20;
    pub const MAX_SPLIT_ROUTES: u8 = 3;
    pub const MIN_POOL_LIQUIDITY_CAP: u64 = 0;
    pub const CANDIDATE_ROUTE_TTL_S: u32 = 600;
    pub const RANKED_ROUTE_TTL_S: u32 = 30;
    pub const EMPTY_RESULT_TTL_DIVISOR: u32 = 4;
    /// Split optimizer quantization (`G` in spec §4.5).
    pub const SPLIT_GRANULARITY: u32 = 10;
}
