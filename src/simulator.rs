//! Route Simulator contract (spec §4.3).
//!
//! The per-pool swap math is an external collaborator (spec §1); this module
//! owns only the trait boundary and the left-to-right composition of
//! per-pool outputs into a whole-route output. Grounded on the teacher's
//! `V2Math`/`V2PoolState` shape in `libs/amm/src/optimal_size.rs`, which this
//! crate's test double (`test_support`) reuses for constant-product math.

use crate::denom::Denom;
use crate::errors::SwapError;
use crate::pool::Pool;
use crate::route::CandidateRoute;
use async_trait::async_trait;

/// Pure function of `(pool, token_in_denom, amount_in) -> (token_out, amount_out)`,
/// implemented by the host per spec §6 `Simulator.simulate_amount_out`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapSimulator: Send + Sync {
    async fn simulate_amount_out(
        &self,
        pool: &Pool,
        token_in_denom: &Denom,
        amount_in: u128,
    ) -> Result<u128, SwapError>;

    async fn spot_price(
        &self,
        pool: &Pool,
        base: &Denom,
        quote: &Denom,
    ) -> Result<rust_decimal::Decimal, SwapError>;
}

/// Composes per-pool math left-to-right across a route's hops, propagating
/// each hop's output as the next hop's input (spec §4.3).
pub async fn simulate_route(
    simulator: &dyn SwapSimulator,
    snapshot: &crate::pool_store::Snapshot,
    route: &CandidateRoute,
    input_denom: &Denom,
    amount_in: u128,
) -> Result<u128, SwapError> {
    if route.is_empty() {
        return Err(SwapError::PoolUnsupported);
    }
    let mut current_denom = input_denom.clone();
    let mut current_amount = amount_in;
    for hop in &route.hops {
        let pool = snapshot.get(hop.pool_id).ok_or(SwapError::PoolUnsupported)?;
        current_amount = simulator
            .simulate_amount_out(pool, &current_denom, current_amount)
            .await?;
        current_denom = hop.token_out.clone();
    }
    Ok(current_amount)
}

/// Constant-product (Uniswap-V2-style) test double. Not part of the public
/// contract; used only so the rest of the engine is testable without a real
/// per-pool-math implementation, per spec §1's "treated as a pure function".
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use crate::pool::PoolId;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct ConstantProductSimulator {
        /// (pool_id, denom) -> reserve, independent of `Pool::reserves` so
        /// tests can diverge simulated reserves from the finder's liquidity
        /// pre-check data when a scenario calls for it.
        pub reserves: HashMap<(PoolId, Denom), u128>,
    }

    impl ConstantProductSimulator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_pool_reserves(
            mut self,
            pool_id: PoolId,
            a: (Denom, u128),
            b: (Denom, u128),
        ) -> Self {
            self.reserves.insert((pool_id, a.0), a.1);
            self.reserves.insert((pool_id, b.0), b.1);
            self
        }
    }

    #[async_trait]
    impl SwapSimulator for ConstantProductSimulator {
        async fn simulate_amount_out(
            &self,
            pool: &Pool,
            token_in_denom: &Denom,
            amount_in: u128,
        ) -> Result<u128, SwapError> {
            if amount_in == 0 {
                return Ok(0);
            }
            let token_out_denom = pool
                .denoms
                .iter()
                .find(|d| *d != token_in_denom)
                .ok_or(SwapError::PoolUnsupported)?;
            let reserve_in = *self
                .reserves
                .get(&(pool.id, token_in_denom.clone()))
                .ok_or(SwapError::PoolUnsupported)?;
            let reserve_out = *self
                .reserves
                .get(&(pool.id, token_out_denom.clone()))
                .ok_or(SwapError::PoolUnsupported)?;
            if reserve_in == 0 || reserve_out == 0 {
                return Err(SwapError::NotEnoughLiquidity);
            }
            let fee_num = Decimal::ONE - pool.spread_factor - pool.taker_fee;
            let amount_in_with_fee = (amount_in as f64) * fee_num.to_f64().unwrap_or(1.0);
            let numerator = amount_in_with_fee * (reserve_out as f64);
            let denominator = (reserve_in as f64) + amount_in_with_fee;
            if denominator <= 0.0 {
                return Err(SwapError::MathDomain);
            }
            let out = numerator / denominator;
            if out >= reserve_out as f64 {
                return Err(SwapError::NotEnoughLiquidity);
            }
            Ok(out as u128)
        }

        async fn spot_price(
            &self,
            pool: &Pool,
            base: &Denom,
            quote: &Denom,
        ) -> Result<Decimal, SwapError> {
            let reserve_base = *self
                .reserves
                .get(&(pool.id, base.clone()))
                .ok_or(SwapError::PoolUnsupported)?;
            let reserve_quote = *self
                .reserves
                .get(&(pool.id, quote.clone()))
                .ok_or(SwapError::PoolUnsupported)?;
            if reserve_base == 0 {
                return Err(SwapError::MathDomain);
            }
            Ok(Decimal::from(reserve_quote as u64) / Decimal::from(reserve_base as u64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolId;
    use crate::pool_store::PoolStore;
    use crate::route::Hop;
    use mockall::predicate::*;
    use rust_decimal_macros::dec;

    fn pool(id: u64) -> Pool {
        Pool {
            id: PoolId(id),
            kind: crate::pool::PoolKind::Balancer,
            denoms: vec![Denom::from("a"), Denom::from("b")],
            liquidity_cap: 1_000,
            liquidity_cap_error_empty: false,
            spread_factor: dec!(0.0),
            taker_fee: dec!(0.0),
            swap_state: crate::pool::SwapState(Vec::new()),
            reserves: None,
            code_id: None,
            is_canonical_orderbook: false,
        }
    }

    #[tokio::test]
    async fn simulate_route_composes_mocked_hops_left_to_right() {
        let store = PoolStore::new();
        store.replace(vec![pool(1), pool(2)]);
        let snapshot = store.snapshot();

        let mut mock = MockSwapSimulator::new();
        mock.expect_simulate_amount_out()
            .with(always(), eq(Denom::from("a")), eq(100u128))
            .returning(|_, _, _| Ok(90));
        mock.expect_simulate_amount_out()
            .with(always(), eq(Denom::from("b")), eq(90u128))
            .returning(|_, _, _| Ok(80));

        let route = CandidateRoute {
            hops: vec![
                Hop { pool_id: PoolId(1), token_out: Denom::from("b") },
                Hop { pool_id: PoolId(2), token_out: Denom::from("c") },
            ],
            contains_canonical_orderbook: false,
        };

        let out = simulate_route(&mock, &snapshot, &route, &Denom::from("a"), 100).await.unwrap();
        assert_eq!(out, 80);
    }

    #[tokio::test]
    async fn simulate_route_empty_is_pool_unsupported() {
        let store = PoolStore::new();
        let snapshot = store.snapshot();
        let mock = MockSwapSimulator::new();
        let route = CandidateRoute { hops: vec![], contains_canonical_orderbook: false };
        let result = simulate_route(&mock, &snapshot, &route, &Denom::from("a"), 100).await;
        assert_eq!(result, Err(SwapError::PoolUnsupported));
    }
}
