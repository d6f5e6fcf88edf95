//! # Core Domain Entities
//!
//! Fixed-width primitives and the chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

use crate::errors::InvalidChainId;

/// A 32-byte digest (double SHA-256).
pub type Hash = [u8; 32];

/// A 32-byte Ed25519 public key identifying a block producer.
pub type PublicKey = [u8; 32];

/// The all-zero digest.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Identifier of a logically independent ledger.
///
/// Always positive: zero and negative values are rejected when the
/// identifier is built from a boundary integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(NonZeroU32);

impl ChainId {
    /// Build a chain id, returning `None` for zero.
    pub const fn new(id: u32) -> Option<Self> {
        match NonZeroU32::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// The raw numeric identifier.
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for ChainId {
    type Error = InvalidChainId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(ChainId::new)
            .ok_or(InvalidChainId(value))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
