//! Router error types.
//!
//! One `thiserror`-derived enum for core invariant/operational errors, and a
//! small separate enum for the simulator's declared error set (spec §4.3),
//! matching the split the teacher draws between `DetectorError`
//! (`services_v2/strategies/flash_arbitrage/src/detector.rs`) and the
//! narrower math errors it wraps from `alphapulse-amm`.

use crate::denom::Denom;
use crate::pool::PoolId;
use thiserror::Error;

/// Diagnostic context carried by most router errors (spec §7).
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub input_denom: Option<Denom>,
    pub output_denom: Option<Denom>,
    pub pool_id: Option<PoolId>,
}

impl ErrorContext {
    pub fn denoms(input: &Denom, output: &Denom) -> Self {
        Self {
            input_denom: Some(input.clone()),
            output_denom: Some(output.clone()),
            pool_id: None,
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(in={:?}, out={:?}, pool={:?})",
            self.input_denom, self.output_denom, self.pool_id
        )
    }
}

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("empty pool-id list {0}")]
    EmptyPoolIdList(ErrorContext),

    #[error("mismatched argument lengths: {what} ({a} vs {b})")]
    MismatchedLengths { what: &'static str, a: usize, b: usize },

    #[error("pool {pool_id:?} does not contain denom {denom:?}")]
    TokenInDenomNotInPool { pool_id: PoolId, denom: Denom },

    #[error("pool {pool_id:?} does not contain denom {denom:?}")]
    TokenOutDenomNotInPool { pool_id: PoolId, denom: Denom },

    #[error("no route found {0}")]
    NoRouteFound(ErrorContext),

    #[error("not enough liquidity {0}")]
    NotEnoughLiquidity(ErrorContext),

    #[error("split optimization infeasible: {reason}")]
    SplitOptimizationInfeasible { reason: &'static str },

    #[error("deadline exceeded {0}")]
    DeadlineExceeded(ErrorContext),

    #[error("cancelled {0}")]
    Cancelled(ErrorContext),

    #[error("internal invariant violated: {reason}")]
    Internal { reason: String },
}

impl RouterError {
    pub fn internal(reason: impl Into<String>) -> Self {
        RouterError::Internal { reason: reason.into() }
    }
}

/// Contract for the external per-pool swap-math collaborator (spec §4.3).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    #[error("not enough liquidity")]
    NotEnoughLiquidity,
    #[error("overflow")]
    Overflow,
    #[error("math domain error")]
    MathDomain,
    #[error("pool kind unsupported by simulator")]
    PoolUnsupported,
}
