//! Error types for block ingestion
//!
//! Each layer owns its enum; all of them collapse onto a canonical
//! [`ErrorCode`] through `code()` at the boundary.

use super::wire::CodecError;
use super::window::WindowError;
use shared_types::{ChainId, ErrorCode, InvalidChainId, ResponseEnvelope};

/// Block validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("hash mismatch: declared {declared}, computed {computed}")]
    HashMismatch { declared: String, computed: String },

    #[error("transaction count mismatch: header declares {declared}, block carries {actual}")]
    TxCountMismatch { declared: u32, actual: usize },

    #[error("too many transactions: {count} > {limit}")]
    TooManyTransactions { count: usize, limit: usize },

    #[error("duplicate transaction at index {index}")]
    DuplicateTransaction { index: usize },

    #[error("transaction root mismatch")]
    TxRootMismatch,

    #[error("discontinuity: expected height {expected_height}, got {actual_height}")]
    Discontinuity {
        expected_height: u64,
        actual_height: u64,
    },

    #[error("previous hash at height {height} does not match tip")]
    PreviousHashMismatch { height: u64 },

    #[error("height {height} already processed (tip {tip})")]
    AlreadyProcessed { height: u64, tip: u64 },

    #[error("timestamp {timestamp} is not after tip timestamp {tip_timestamp}")]
    TimestampNotAfterTip { timestamp: u64, tip_timestamp: u64 },

    #[error("timestamp {timestamp} drifts from wall clock {now} by more than {bound}s")]
    ClockDrift { timestamp: u64, now: u64, bound: u64 },

    #[error("unknown round {0}")]
    UnknownRound(u64),

    #[error("producer is not a member of round {round_index}")]
    ProducerNotInRound { round_index: u64 },

    #[error("wrong slot: producer owns slot {expected}, header claims {actual}")]
    WrongSlot { expected: u32, actual: u32 },

    #[error("slot time mismatch: expected {expected}, header has {actual}")]
    SlotTimeMismatch { expected: u64, actual: u64 },

    #[error("invalid producer signature")]
    InvalidSignature,

    #[error("transaction {index} rejected: {reason}")]
    TransactionRejected { index: usize, reason: String },

    #[error("validation cancelled")]
    Cancelled,
}

impl ConsensusError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConsensusError::HashMismatch { .. }
            | ConsensusError::TxCountMismatch { .. }
            | ConsensusError::TooManyTransactions { .. }
            | ConsensusError::DuplicateTransaction { .. }
            | ConsensusError::TxRootMismatch => ErrorCode::DataParseError,
            ConsensusError::Discontinuity { .. } | ConsensusError::PreviousHashMismatch { .. } => {
                ErrorCode::Discontinuity
            }
            ConsensusError::AlreadyProcessed { .. } => ErrorCode::AlreadyProcessed,
            ConsensusError::TimestampNotAfterTip { .. }
            | ConsensusError::ClockDrift { .. }
            | ConsensusError::SlotTimeMismatch { .. } => ErrorCode::TimestampInvalid,
            ConsensusError::UnknownRound(_)
            | ConsensusError::ProducerNotInRound { .. }
            | ConsensusError::WrongSlot { .. } => ErrorCode::ProducerIneligible,
            ConsensusError::InvalidSignature => ErrorCode::SignatureInvalid,
            ConsensusError::TransactionRejected { .. } => ErrorCode::TxValidationFailed,
            ConsensusError::Cancelled => ErrorCode::Cancelled,
        }
    }
}

/// Result type for validation
pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Chain metadata store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no record for chain {0}")]
    NotFound(ChainId),

    #[error("chain {0} already recorded")]
    Duplicate(ChainId),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("chain {0} is already registered")]
    AlreadyRegistered(ChainId),

    #[error("chain {0} does not exist")]
    ChainNotExist(ChainId),
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::AlreadyRegistered(_) => ErrorCode::ParamError,
            RegistryError::ChainNotExist(_) => ErrorCode::ChainNotExist,
        }
    }
}

/// Everything that can fail between a request arriving and a response leaving.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("{0}")]
    Param(String),

    #[error(transparent)]
    InvalidChainId(#[from] InvalidChainId),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("transport decode failed: {0}")]
    Transport(#[from] hex::FromHexError),

    #[error("decode failed: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    #[error(transparent)]
    Window(#[from] WindowError),
}

impl IngestError {
    pub fn param(msg: impl Into<String>) -> Self {
        IngestError::Param(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            IngestError::Param(_) | IngestError::InvalidChainId(_) => ErrorCode::ParamError,
            IngestError::Registry(e) => e.code(),
            IngestError::Transport(_) | IngestError::Codec(_) => ErrorCode::DataParseError,
            IngestError::Consensus(e) => e.code(),
            IngestError::Window(e) => e.code(),
        }
    }

    pub fn into_response(self) -> ResponseEnvelope {
        ResponseEnvelope::failed_with(self.code(), self.to_string())
    }
}

pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consensus_codes() {
        assert_eq!(
            ConsensusError::AlreadyProcessed { height: 1, tip: 3 }.code(),
            ErrorCode::AlreadyProcessed
        );
        assert_eq!(
            ConsensusError::WrongSlot {
                expected: 1,
                actual: 2
            }
            .code(),
            ErrorCode::ProducerIneligible
        );
        assert_eq!(
            ConsensusError::ClockDrift {
                timestamp: 0,
                now: 100,
                bound: 15
            }
            .code(),
            ErrorCode::TimestampInvalid
        );
        assert_eq!(ConsensusError::Cancelled.code(), ErrorCode::Cancelled);
    }

    #[test]
    fn test_ingest_error_response() {
        let err = IngestError::from(CodecError::TrailingBytes(2));
        let response = err.into_response();
        assert_eq!(response.code, ErrorCode::DataParseError);
        assert!(response.msg.unwrap().contains("trailing"));

        let err = IngestError::from(InvalidChainId(0));
        assert_eq!(err.code(), ErrorCode::ParamError);
    }
}
