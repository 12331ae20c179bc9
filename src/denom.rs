//! Token identifiers.
//!
//! An interned, `Arc`-backed string rather than an owned `String` per Pool,
//! matching the teacher's preference for cheap-to-clone shared handles
//! (`Arc<PoolStateManager>`, `Arc<VenueId>`-keyed maps) over per-access
//! allocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque token identifier, equal by string value (spec §3).
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Denom(Arc<str>);

impl Denom {
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Denom {
    fn from(s: &str) -> Self {
        Denom::new(s)
    }
}

impl From<String> for Denom {
    fn from(s: String) -> Self {
        Denom::new(s)
    }
}

/// An amount of a specific denom (spec §3 `Coin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    pub amount: u128,
}

impl Coin {
    pub fn new(amount: u128) -> Self {
        Self { amount }
    }
}

/// A denom-amount pair, as carried at the edges of the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomCoin {
    pub denom: Denom,
    pub amount: u128,
}

impl DenomCoin {
    pub fn new(denom: impl Into<Denom>, amount: u128) -> Self {
        Self { denom: denom.into(), amount }
    }
}
