//! Swap-routing and quoting engine: candidate route discovery over a pool
//! store, direct-quote ranking, split optimization and a two-tier route
//! cache, assembled behind the `Router` façade.
//!
//! Module layout mirrors the pipeline a quote request travels through:
//! `pool`/`pool_store` hold routable state, `finder` discovers candidate
//! routes, `ranker`/`split_optimizer` price them, `cache` remembers the
//! expensive parts, `quote` assembles the caller-facing result, and
//! `router` wires all of it together.

pub mod cache;
pub mod cancellation;
pub mod config;
pub mod denom;
pub mod errors;
pub mod finder;
pub mod metrics;
pub mod pool;
pub mod pool_store;
pub mod quote;
pub mod ranker;
pub mod route;
pub mod router;
pub mod simulator;
pub mod split_optimizer;

pub use cancellation::{AtomicCancellationToken, CancellationToken, NeverCancelled};
pub use config::{CosmWasmAllowlist, MaxSplitRoutes, PoolPredicate, RouterConfig, RouterOptions};
pub use denom::{Coin, Denom, DenomCoin};
pub use errors::{ErrorContext, RouterError, SwapError};
pub use metrics::{CacheKind, InMemoryMetrics, NoopMetrics, RouterMetrics};
pub use pool::{Pool, PoolId, PoolKind, PoolValidationError, SwapState};
pub use quote::{Quote, QuotePoolLeg, QuoteRoute};
pub use route::{CandidateRoute, CandidateRouteSet, Hop, RankedRoute};
pub use router::{Deadline, Router};
pub use simulator::SwapSimulator;
