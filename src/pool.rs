//! Pool value type and kind-specific validation.
//!
//! Spec §9 redesign note: "duck-typed pool collections → a single `Pool`
//! value type with a trait/interface exposing `liquidity_cap`, `kind`,
//! `denoms`, `spread`, `taker_fee`, `validate`". `swap_state` stays an
//! opaque payload the simulator understands; the router never inspects it.

use crate::denom::Denom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub u64);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Balancer,
    StableSwap,
    Concentrated,
    Transmuter,
    AlloyedTransmuter,
    GeneralizedCosmWasm,
}

impl PoolKind {
    /// Transmuter-family kinds are (near-)zero-slippage and exempt from the
    /// duplicate-pool filter (spec §4.4, glossary).
    pub fn is_zero_slippage(self) -> bool {
        matches!(self, PoolKind::Transmuter | PoolKind::AlloyedTransmuter)
    }

    pub fn is_concentrated(self) -> bool {
        matches!(self, PoolKind::Concentrated)
    }

    pub fn is_cosmwasm_derived(self) -> bool {
        matches!(
            self,
            PoolKind::Transmuter | PoolKind::AlloyedTransmuter | PoolKind::GeneralizedCosmWasm
        )
    }
}

/// Opaque kind-specific state consumed only by the external simulator.
#[derive(Debug, Clone)]
pub struct SwapState(pub Vec<u8>);

#[derive(Debug, Clone)]
pub struct Pool {
    pub id: PoolId,
    pub kind: PoolKind,
    pub denoms: Vec<Denom>,
    pub liquidity_cap: u64,
    /// `true` when the cap could not be priced and was filled with a
    /// conservative placeholder (spec §4.1 `liquidity_cap_error_empty`).
    pub liquidity_cap_error_empty: bool,
    pub spread_factor: Decimal,
    pub taker_fee: Decimal,
    pub swap_state: SwapState,
    /// Per-denom reserves, used by the finder's first-hop liquidity
    /// pre-check (spec §4.2). Not all pool kinds report per-denom reserves
    /// meaningfully (e.g. concentrated-liquidity pools report active-range
    /// liquidity instead); absence is `None`, never a silent zero.
    pub reserves: Option<std::collections::HashMap<Denom, u128>>,
    /// CosmWasm code-id, present for `is_cosmwasm_derived` kinds.
    pub code_id: Option<u64>,
    /// Distinguished orderbook marked for cache preservation (spec §4.6, §8 scenario 4 note).
    pub is_canonical_orderbook: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolValidationError {
    TooFewDenoms,
    NegativeLiquidityCap,
    SpreadFactorOutOfRange,
    TakerFeeOutOfRange,
    CosmWasmCodeIdNotAllowlisted,
}

impl Pool {
    pub fn contains(&self, denom: &Denom) -> bool {
        self.denoms.iter().any(|d| d == denom)
    }

    pub fn other_denoms<'a>(&'a self, denom: &'a Denom) -> impl Iterator<Item = &'a Denom> {
        self.denoms.iter().filter(move |d| *d != denom)
    }

    /// Kind-specific validation. The generic invariants (spec §3) live here;
    /// allowlist membership is checked by the caller (`PoolStore`) since it
    /// needs the configured allowlist, not just the pool itself.
    pub fn validate(&self) -> Result<(), PoolValidationError> {
        if self.denoms.len() < 2 {
            return Err(PoolValidationError::TooFewDenoms);
        }
        if !(Decimal::ZERO..Decimal::ONE).contains(&self.spread_factor) {
            return Err(PoolValidationError::SpreadFactorOutOfRange);
        }
        if !(Decimal::ZERO..Decimal::ONE).contains(&self.taker_fee) {
            return Err(PoolValidationError::TakerFeeOutOfRange);
        }
        Ok(())
    }

    /// Reserve of `denom` in this pool, if the pool kind reports one.
    pub fn reserve_of(&self, denom: &Denom) -> Option<u128> {
        self.reserves.as_ref().and_then(|r| r.get(denom).copied())
    }
}
