//! Request parameter coercion
//!
//! Requests are loose JSON maps. Integers may arrive as numbers or numeric
//! strings; byte fields arrive hex-encoded.

use crate::domain::{IngestError, IngestResult};
use crate::validation::ValidationMode;
use serde_json::{Map, Value};
use shared_types::ChainId;

pub type RpcParams = Map<String, Value>;

pub const PARAM_CHAIN_ID: &str = "chainId";
pub const PARAM_BLOCK_HEADER: &str = "blockHeader";
pub const PARAM_BLOCK: &str = "block";
pub const PARAM_HEADER_LIST: &str = "headerList";
pub const PARAM_HEIGHT: &str = "height";
pub const PARAM_DOWNLOAD: &str = "download";

/// Fail unless every key is present and non-null.
pub fn require_present(params: &RpcParams, keys: &[&str]) -> IngestResult<()> {
    for key in keys {
        require(params, key)?;
    }
    Ok(())
}

pub fn require<'a>(params: &'a RpcParams, key: &str) -> IngestResult<&'a Value> {
    match params.get(key) {
        Some(Value::Null) | None => Err(IngestError::param(format!("missing parameter `{key}`"))),
        Some(value) => Ok(value),
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn require_i64(params: &RpcParams, key: &str) -> IngestResult<i64> {
    as_i64(require(params, key)?)
        .ok_or_else(|| IngestError::param(format!("parameter `{key}` must be an integer")))
}

pub fn require_u64(params: &RpcParams, key: &str) -> IngestResult<u64> {
    as_u64(require(params, key)?).ok_or_else(|| {
        IngestError::param(format!("parameter `{key}` must be a non-negative integer"))
    })
}

pub fn require_chain_id(params: &RpcParams) -> IngestResult<ChainId> {
    Ok(ChainId::try_from(require_i64(params, PARAM_CHAIN_ID)?)?)
}

pub fn require_mode(params: &RpcParams) -> IngestResult<ValidationMode> {
    let flag = require_i64(params, PARAM_DOWNLOAD)?;
    ValidationMode::from_flag(flag).ok_or_else(|| {
        IngestError::param(format!("parameter `{PARAM_DOWNLOAD}` must be 0 or 1, got {flag}"))
    })
}

fn decode_hex(key: &str, value: &Value) -> IngestResult<Vec<u8>> {
    let text = value
        .as_str()
        .ok_or_else(|| IngestError::param(format!("parameter `{key}` must be a hex string")))?;
    Ok(hex::decode(text)?)
}

pub fn require_hex(params: &RpcParams, key: &str) -> IngestResult<Vec<u8>> {
    decode_hex(key, require(params, key)?)
}

/// Non-empty array of hex strings, order preserved.
pub fn require_hex_list(params: &RpcParams, key: &str) -> IngestResult<Vec<Vec<u8>>> {
    let items = require(params, key)?
        .as_array()
        .ok_or_else(|| IngestError::param(format!("parameter `{key}` must be an array")))?;
    if items.is_empty() {
        return Err(IngestError::param(format!("parameter `{key}` must not be empty")));
    }
    items.iter().map(|item| decode_hex(key, item)).collect()
}
