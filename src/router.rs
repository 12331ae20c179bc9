//! Router façade — wires the Pool Store, Finder, Ranker, Split Optimizer,
//! Route Cache and Quote Assembler into the `RouterUseCase` surface from
//! spec §6. Orchestration style is grounded on the teacher's
//! `StrategyEngine` (`services_v2/strategies/flash_arbitrage/src/strategy_engine.rs`):
//! one struct owning the shared state, `async fn` entry points, `tracing`
//! at lifecycle boundaries.

use crate::cache::{order_of_magnitude, RouteCache};
use crate::cancellation::CancellationToken;
use crate::config::{MaxSplitRoutes, PoolPredicate, RouterConfig, RouterOptions};
use crate::denom::{Denom, DenomCoin};
use crate::errors::RouterError;
use crate::finder::{find_candidate_routes, FinderInput};
use crate::metrics::{CacheKind, NoopMetrics, RouterMetrics};
use crate::pool::{Pool, PoolId, PoolKind};
use crate::pool_store::PoolStore;
use crate::quote::{leg_from_hop, prepare_result, Quote, QuoteRoute};
use crate::ranker::estimate_and_rank;
use crate::route::{CandidateRoute, CandidateRouteSet, RankedRoute};
use crate::simulator::SwapSimulator;
use crate::split_optimizer::optimize_split;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct Router {
    pool_store: PoolStore,
    cache: RouteCache,
    simulator: Arc<dyn SwapSimulator>,
    metrics: Arc<dyn RouterMetrics>,
    config: RouterConfig,
}

/// An optional per-call deadline; the assembler checks it before each phase
/// (spec §5 "Timeouts").
#[derive(Clone, Copy)]
pub struct Deadline(pub Instant);

impl Router {
    pub fn new(simulator: Arc<dyn SwapSimulator>, config: RouterConfig) -> Self {
        Self {
            pool_store: PoolStore::new(),
            cache: RouteCache::new(),
            simulator,
            metrics: Arc::new(NoopMetrics),
            config,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn RouterMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Ingests a freshly refreshed pool set (spec §4.1 `PoolStore.replace`
    /// fed by the external `PoolSource.all_pools()` collaborator, spec §6).
    pub fn replace_pools(&self, raw_pools: Vec<Pool>) {
        let sorted = PoolStore::validate_and_sort(
            raw_pools,
            &self.config.cosmwasm_allowlist,
            &self.config.preferred_pool_ids,
        );
        info!(pool_count = sorted.len(), "installing new pool snapshot");
        self.pool_store.replace(sorted);
    }

    fn check_deadline(&self, deadline: Option<Deadline>, ctx: &Denom) -> Result<(), RouterError> {
        if let Some(Deadline(at)) = deadline {
            if Instant::now() >= at {
                return Err(RouterError::DeadlineExceeded(crate::errors::ErrorContext {
                    input_denom: Some(ctx.clone()),
                    output_denom: None,
                    pool_id: None,
                }));
            }
        }
        Ok(())
    }

    fn check_cancelled(
        &self,
        token: Option<&dyn CancellationToken>,
        ctx: &Denom,
    ) -> Result<(), RouterError> {
        if token.is_some_and(|t| t.is_cancelled()) {
            return Err(RouterError::Cancelled(crate::errors::ErrorContext {
                input_denom: Some(ctx.clone()),
                output_denom: None,
                pool_id: None,
            }));
        }
        Ok(())
    }

    /// `get_candidate_routes` (spec §6): pure discovery, no ranking/caching.
    pub fn get_candidate_routes(
        &self,
        input_denom: &Denom,
        input_amount: u128,
        output_denom: &Denom,
        options: &RouterOptions,
    ) -> Result<CandidateRouteSet, RouterError> {
        let snapshot = self.pool_store.snapshot();
        let (set, _used) = find_candidate_routes(
            &snapshot,
            FinderInput {
                input_denom,
                input_amount,
                output_denom,
                max_routes: options.max_routes,
                max_pools_per_route: options.max_pools_per_route,
                min_pool_liquidity_cap: options.min_pool_liquidity_cap,
                pool_filters_any_of: &options.pool_filters_any_of,
            },
        )?;
        self.metrics.routes_found(set.routes.len());
        Ok(set)
    }

    pub async fn get_pool_spot_price(
        &self,
        pool_id: PoolId,
        base: &Denom,
        quote: &Denom,
    ) -> Result<rust_decimal::Decimal, RouterError> {
        let snapshot = self.pool_store.snapshot();
        let pool = snapshot
            .get(pool_id)
            .ok_or_else(|| RouterError::internal(format!("unknown pool {pool_id}")))?;
        self.simulator
            .spot_price(pool, base, quote)
            .await
            .map_err(|_| RouterError::internal("spot price unavailable"))
    }

    /// `get_optimal_quote` (spec §4.7, §6).
    pub async fn get_optimal_quote(
        &self,
        coin_in: DenomCoin,
        out_denom: Denom,
        options: &RouterOptions,
        deadline: Option<Deadline>,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<Quote, RouterError> {
        let started = Instant::now();
        let result = self
            .get_optimal_quote_inner(&coin_in, &out_denom, options, deadline, cancellation)
            .await;
        self.metrics.quote_latency(started.elapsed());
        result
    }

    async fn get_optimal_quote_inner(
        &self,
        coin_in: &DenomCoin,
        out_denom: &Denom,
        options: &RouterOptions,
        deadline: Option<Deadline>,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<Quote, RouterError> {
        self.check_deadline(deadline, &coin_in.denom)?;
        self.check_cancelled(cancellation, &coin_in.denom)?;

        let snapshot = self.pool_store.snapshot();
        let magnitude = order_of_magnitude(coin_in.amount as i128);

        let (ranked_set, precomputed) =
            self.ranked_set(coin_in, out_denom, options, magnitude, cancellation).await?;
        self.check_deadline(deadline, &coin_in.denom)?;

        if ranked_set.routes.is_empty() {
            return Err(RouterError::NoRouteFound(crate::errors::ErrorContext::denoms(
                &coin_in.denom,
                out_denom,
            )));
        }

        let split_limit = options.max_split_routes.limit().unwrap_or(options.max_routes).max(1) as usize;
        // On a cache miss `ranked_set` already simulated every candidate
        // against this exact amount; re-simulating here would double every
        // real simulator call. Only a cache hit (routes ranked against a
        // possibly-different amount in the same magnitude bucket) needs it.
        let ranked_routes: Vec<RankedRoute> = match precomputed {
            Some(ranked) => ranked,
            None => match self
                .simulate_each(&snapshot, &ranked_set.routes, &coin_in.denom, coin_in.amount, split_limit, cancellation)
                .await
            {
                Ok(ranked) => ranked,
                Err(e) => {
                    if !options.disable_cache {
                        self.cache.invalidate(&coin_in.denom, out_denom);
                    }
                    return Err(e);
                }
            },
        };
        if ranked_routes.is_empty() {
            if !options.disable_cache {
                self.cache.invalidate(&coin_in.denom, out_denom);
            }
            return Err(RouterError::NotEnoughLiquidity(crate::errors::ErrorContext::denoms(
                &coin_in.denom,
                out_denom,
            )));
        }

        if ranked_routes.len() == 1 || options.max_split_routes == MaxSplitRoutes::Disabled {
            return self.single_route_quote(&snapshot, coin_in, out_denom, &ranked_routes[0]).await;
        }

        let top_single = self.single_route_quote(&snapshot, coin_in, out_denom, &ranked_routes[0]).await?;

        // Exclude generalized CosmWasm pools from split-consideration only.
        let split_candidates: Vec<RankedRoute> = ranked_routes
            .iter()
            .filter(|r| {
                !r.route
                    .pool_ids()
                    .any(|id| snapshot.get(id).map(|p| p.kind == PoolKind::GeneralizedCosmWasm).unwrap_or(false))
            })
            .cloned()
            .collect();

        if split_candidates.is_empty() {
            return Ok(top_single);
        }

        self.check_deadline(deadline, &coin_in.denom)?;

        let granularity = crate::config::defaults::SPLIT_GRANULARITY;
        let split_result = optimize_split(
            self.simulator.as_ref(),
            &snapshot,
            &split_candidates,
            &coin_in.denom,
            coin_in.amount,
            granularity,
            cancellation,
        )
        .await;

        let split_quote = match split_result {
            Ok(plan) => Some(
                self.split_plan_to_quote(&snapshot, coin_in, out_denom, &split_candidates, &plan)
                    .await?,
            ),
            Err(e) => {
                warn!(error = %e, "split optimizer failed, falling back to top single route");
                None
            }
        };

        match split_quote {
            Some(split) if split.amount_out > top_single.amount_out => Ok(split),
            _ => Ok(top_single),
        }
    }

    /// `get_optimal_quote_in_given_out` (spec §4.7): exact-out, forces
    /// `disable_cache` and excludes orderbook pools, then inverts the result.
    pub async fn get_optimal_quote_in_given_out(
        &self,
        coin_out: DenomCoin,
        in_denom: Denom,
        options: &RouterOptions,
        deadline: Option<Deadline>,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<Quote, RouterError> {
        let mut opts = options.clone();
        opts.disable_cache = true;
        opts.pool_filters_any_of.push(PoolPredicate::SkipOrderbooks);

        // Roles reversed inside the simulator: we quote an exact-in swap
        // from coin_out.denom to in_denom for coin_out.amount, then invert.
        let quote = self
            .get_optimal_quote_inner(&coin_out, &in_denom, &opts, deadline, cancellation)
            .await?;
        Ok(quote.invert())
    }

    /// `get_custom_direct_quote` (spec §4.7): single pool, caller-chosen.
    pub async fn get_custom_direct_quote(
        &self,
        coin_in: DenomCoin,
        out_denom: Denom,
        pool_id: PoolId,
    ) -> Result<Quote, RouterError> {
        let snapshot = self.pool_store.snapshot();
        let pool = snapshot
            .get(pool_id)
            .ok_or_else(|| RouterError::internal(format!("unknown pool {pool_id}")))?;
        if !pool.contains(&coin_in.denom) {
            return Err(RouterError::TokenInDenomNotInPool { pool_id, denom: coin_in.denom.clone() });
        }
        if !pool.contains(&out_denom) {
            return Err(RouterError::TokenOutDenomNotInPool { pool_id, denom: out_denom.clone() });
        }

        let amount_out = self
            .simulator
            .simulate_amount_out(pool, &coin_in.denom, coin_in.amount)
            .await
            .map_err(|_| RouterError::NotEnoughLiquidity(crate::errors::ErrorContext::denoms(&coin_in.denom, &out_denom)))?;

        let leg = leg_from_hop(&snapshot, pool_id, &coin_in.denom, &out_denom)
            .ok_or_else(|| RouterError::internal("pool vanished between lookup and leg construction"))?;
        let route = QuoteRoute { legs: vec![leg], amount_in: coin_in.amount, amount_out };
        Ok(Quote::single_route(coin_in, out_denom, route))
    }

    /// `get_custom_direct_quote_multi` (spec §4.7): chains single-pool direct
    /// quotes; `out_denoms` and `pool_ids` must have equal, nonzero length.
    pub async fn get_custom_direct_quote_multi(
        &self,
        coin_in: DenomCoin,
        out_denoms: Vec<Denom>,
        pool_ids: Vec<PoolId>,
    ) -> Result<Quote, RouterError> {
        if out_denoms.is_empty() || pool_ids.is_empty() {
            return Err(RouterError::EmptyPoolIdList(crate::errors::ErrorContext::denoms(
                &coin_in.denom,
                out_denoms.first().unwrap_or(&coin_in.denom),
            )));
        }
        if out_denoms.len() != pool_ids.len() {
            return Err(RouterError::MismatchedLengths {
                what: "out_denoms vs pool_ids",
                a: out_denoms.len(),
                b: pool_ids.len(),
            });
        }

        let snapshot = self.pool_store.snapshot();
        let mut current_denom = coin_in.denom.clone();
        let mut current_amount = coin_in.amount;
        let mut legs = Vec::with_capacity(pool_ids.len());

        for (pool_id, out_denom) in pool_ids.into_iter().zip(out_denoms.into_iter()) {
            let pool = snapshot
                .get(pool_id)
                .ok_or_else(|| RouterError::internal(format!("unknown pool {pool_id}")))?;
            if !pool.contains(&current_denom) {
                return Err(RouterError::TokenInDenomNotInPool { pool_id, denom: current_denom.clone() });
            }
            if !pool.contains(&out_denom) {
                return Err(RouterError::TokenOutDenomNotInPool { pool_id, denom: out_denom.clone() });
            }
            let amount_out = self
                .simulator
                .simulate_amount_out(pool, &current_denom, current_amount)
                .await
                .map_err(|_| {
                    RouterError::NotEnoughLiquidity(crate::errors::ErrorContext::denoms(&current_denom, &out_denom))
                })?;
            legs.push(
                leg_from_hop(&snapshot, pool_id, &current_denom, &out_denom)
                    .ok_or_else(|| RouterError::internal("pool vanished mid-chain"))?,
            );
            current_denom = out_denom;
            current_amount = amount_out;
        }

        let route = QuoteRoute { legs, amount_in: coin_in.amount, amount_out: current_amount };
        Ok(Quote::single_route(coin_in, current_denom, route))
    }

    /// Reads the ranked-route cache, or recomputes via Finder + Ranker and
    /// writes the cache (spec §4.7 steps 1-2). The cached value is the
    /// deduped, ordered set of *routes* the ranker kept, not frozen output
    /// amounts — those are re-simulated per request against the exact
    /// `coin_in.amount`, since the magnitude bucket only coarsely matches it.
    ///
    /// On a cache *miss* the ranking pass already simulated every candidate
    /// against the exact `coin_in.amount`; that result is returned alongside
    /// the cacheable route set so the caller doesn't re-simulate it. On a
    /// cache *hit* the second element is `None` — the cached routes may have
    /// been ranked against a different literal amount in the same magnitude
    /// bucket, so the caller must re-simulate against this request's amount.
    async fn ranked_set(
        &self,
        coin_in: &DenomCoin,
        out_denom: &Denom,
        options: &RouterOptions,
        magnitude: u32,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<(CandidateRouteSet, Option<Vec<RankedRoute>>), RouterError> {
        if !options.disable_cache {
            if let Some(cached) = self.cache.get_ranked(&coin_in.denom, out_denom, magnitude) {
                self.metrics.cache_hit(CacheKind::Ranked);
                debug!(%coin_in.denom, %out_denom, magnitude, "ranked-route cache hit");
                return Ok((cached, None));
            }
            self.metrics.cache_miss(CacheKind::Ranked);
        }

        let candidate_set = self.candidate_set(coin_in, out_denom, options)?;
        if candidate_set.routes.is_empty() {
            if !options.disable_cache {
                self.cache.put_ranked(
                    &coin_in.denom,
                    out_denom,
                    magnitude,
                    CandidateRouteSet::default(),
                    options.ranked_route_ttl.checked_div_u32(self.config.empty_result_ttl_divisor),
                    None,
                );
            }
            return Ok((CandidateRouteSet::default(), Some(Vec::new())));
        }

        let snapshot = self.pool_store.snapshot();
        let split_limit = options.max_split_routes.limit().unwrap_or(options.max_routes).max(1) as usize;
        let ranked = estimate_and_rank(
            self.simulator.as_ref(),
            &snapshot,
            candidate_set.routes.clone(),
            &coin_in.denom,
            coin_in.amount,
            split_limit,
            cancellation,
        )
        .await?;
        let ranked_set = CandidateRouteSet { routes: ranked.iter().map(|r| r.route.clone()).collect() };

        let canonical_orderbook = candidate_set.routes.iter().find(|r| r.contains_canonical_orderbook).cloned();

        if !options.disable_cache {
            self.cache.put_ranked(
                &coin_in.denom,
                out_denom,
                magnitude,
                ranked_set.clone(),
                options.ranked_route_ttl,
                canonical_orderbook,
            );
            self.metrics.cache_write(CacheKind::Ranked);
        }
        Ok((ranked_set, Some(ranked)))
    }

    /// Reads the candidate-route cache, or recomputes via the Finder (spec §4.2, §4.6).
    fn candidate_set(
        &self,
        coin_in: &DenomCoin,
        out_denom: &Denom,
        options: &RouterOptions,
    ) -> Result<CandidateRouteSet, RouterError> {
        if !options.disable_cache {
            if let Some(cached) = self.cache.get_candidate(&coin_in.denom, out_denom) {
                self.metrics.cache_hit(CacheKind::Candidate);
                return Ok(cached);
            }
            self.metrics.cache_miss(CacheKind::Candidate);
        }

        let snapshot = self.pool_store.snapshot();
        let (set, _used) = find_candidate_routes(
            &snapshot,
            FinderInput {
                input_denom: &coin_in.denom,
                input_amount: coin_in.amount,
                output_denom: out_denom,
                max_routes: options.max_routes,
                max_pools_per_route: options.max_pools_per_route,
                min_pool_liquidity_cap: options.min_pool_liquidity_cap,
                pool_filters_any_of: &options.pool_filters_any_of,
            },
        )?;
        self.metrics.routes_found(set.routes.len());

        if !options.disable_cache {
            let ttl = if set.routes.is_empty() {
                options.candidate_route_ttl.checked_div_u32(self.config.empty_result_ttl_divisor)
            } else {
                options.candidate_route_ttl
            };
            self.cache.put_candidate(&coin_in.denom, out_denom, set.clone(), ttl);
            self.metrics.cache_write(CacheKind::Candidate);
        }
        Ok(set)
    }

    async fn simulate_each(
        &self,
        snapshot: &crate::pool_store::Snapshot,
        routes: &[CandidateRoute],
        input_denom: &Denom,
        amount_in: u128,
        max_split_routes: usize,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<Vec<RankedRoute>, RouterError> {
        estimate_and_rank(
            self.simulator.as_ref(),
            snapshot,
            routes.to_vec(),
            input_denom,
            amount_in,
            max_split_routes,
            cancellation,
        )
        .await
    }

    async fn single_route_quote(
        &self,
        snapshot: &crate::pool_store::Snapshot,
        coin_in: &DenomCoin,
        out_denom: &Denom,
        ranked: &RankedRoute,
    ) -> Result<Quote, RouterError> {
        let legs = self.legs_for_route(snapshot, &ranked.route, &coin_in.denom)?;
        let route = QuoteRoute { legs, amount_in: coin_in.amount, amount_out: ranked.amount_out };
        let quote = Quote::single_route(coin_in.clone(), out_denom.clone(), route);
        let spot = self.route_spot_price(snapshot, &ranked.route, &coin_in.denom).await;
        Ok(prepare_result(quote, &[spot], spot))
    }

    async fn split_plan_to_quote(
        &self,
        snapshot: &crate::pool_store::Snapshot,
        coin_in: &DenomCoin,
        out_denom: &Denom,
        routes: &[RankedRoute],
        plan: &crate::split_optimizer::SplitPlan,
    ) -> Result<Quote, RouterError> {
        let mut quote_routes = Vec::with_capacity(plan.allocations.len());
        let mut spots = Vec::with_capacity(plan.allocations.len());
        for alloc in &plan.allocations {
            let ranked = &routes[alloc.route_index];
            let legs = self.legs_for_route(snapshot, &ranked.route, &coin_in.denom)?;
            quote_routes.push(QuoteRoute { legs, amount_in: alloc.amount_in, amount_out: alloc.amount_out });
            spots.push(self.route_spot_price(snapshot, &ranked.route, &coin_in.denom).await);
        }
        let overall_spot = spots.iter().copied().sum::<rust_decimal::Decimal>()
            / rust_decimal::Decimal::from(spots.len().max(1));

        let quote = Quote {
            input: coin_in.clone(),
            output_denom: out_denom.clone(),
            amount_out: plan.total_amount_out,
            routes: quote_routes,
            effective_fee: Default::default(),
            price_impact: Default::default(),
            spot_price: Default::default(),
        };
        Ok(prepare_result(quote, &spots, overall_spot))
    }

    fn legs_for_route(
        &self,
        snapshot: &crate::pool_store::Snapshot,
        route: &CandidateRoute,
        input_denom: &Denom,
    ) -> Result<Vec<crate::quote::QuotePoolLeg>, RouterError> {
        let mut legs = Vec::with_capacity(route.hops.len());
        let mut current_in = input_denom.clone();
        for hop in &route.hops {
            let leg = leg_from_hop(snapshot, hop.pool_id, &current_in, &hop.token_out)
                .ok_or_else(|| RouterError::internal("pool vanished while building quote legs"))?;
            current_in = hop.token_out.clone();
            legs.push(leg);
        }
        Ok(legs)
    }

    async fn route_spot_price(
        &self,
        snapshot: &crate::pool_store::Snapshot,
        route: &CandidateRoute,
        input_denom: &Denom,
    ) -> rust_decimal::Decimal {
        let mut current_in = input_denom.clone();
        let mut product = rust_decimal::Decimal::ONE;
        for hop in &route.hops {
            let Some(pool) = snapshot.get(hop.pool_id) else { return rust_decimal::Decimal::ZERO };
            match self.simulator.spot_price(pool, &current_in, &hop.token_out).await {
                Ok(p) => product *= p,
                Err(_) => return rust_decimal::Decimal::ZERO,
            }
            current_in = hop.token_out.clone();
        }
        product
    }
}

// `duration / u32` is natural but `Duration` doesn't implement `Div<u32>`
// returning a non-panicking result for zero; guard against a zero divisor
// misconfiguration by falling back to the dividend itself.
trait DivTtl {
    fn checked_div_u32(self, rhs: u32) -> Duration;
}

impl DivTtl for Duration {
    fn checked_div_u32(self, rhs: u32) -> Duration {
        if rhs == 0 {
            self
        } else {
            self / rhs
        }
    }
}
