//! # Error Types
//!
//! Canonical result codes returned at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Canonical result code carried by every response envelope.
///
/// Serialized as the SCREAMING_SNAKE_CASE name, e.g. `"CHAIN_NOT_EXIST"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Success,
    /// Missing key or out-of-range primitive.
    ParamError,
    /// Unknown chain id.
    ChainNotExist,
    /// Binary or transport decode failed.
    DataParseError,
    /// Height or previous-hash link broken.
    Discontinuity,
    /// Height at or below the tip during historical download.
    AlreadyProcessed,
    /// Temporal rule violated.
    TimestampInvalid,
    /// Producer not in the active set or wrong slot.
    ProducerIneligible,
    SignatureInvalid,
    TxValidationFailed,
    Cancelled,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Success => "SUCCESS",
            ErrorCode::ParamError => "PARAM_ERROR",
            ErrorCode::ChainNotExist => "CHAIN_NOT_EXIST",
            ErrorCode::DataParseError => "DATA_PARSE_ERROR",
            ErrorCode::Discontinuity => "DISCONTINUITY",
            ErrorCode::AlreadyProcessed => "ALREADY_PROCESSED",
            ErrorCode::TimestampInvalid => "TIMESTAMP_INVALID",
            ErrorCode::ProducerIneligible => "PRODUCER_INELIGIBLE",
            ErrorCode::SignatureInvalid => "SIGNATURE_INVALID",
            ErrorCode::TxValidationFailed => "TX_VALIDATION_FAILED",
            ErrorCode::Cancelled => "CANCELLED",
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boundary integer that is not a valid chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid chain id: {0} (must be a positive 32-bit integer)")]
pub struct InvalidChainId(pub i64);
