//! # Response Envelope
//!
//! The uniform `{code, msg, data}` wrapper returned by every boundary
//! operation.
//!
//! Successful mutators carry `data = {"value": true}`; failures carry a
//! non-success `code` and usually a human-readable `msg`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::ErrorCode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: ErrorCode,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Success without payload.
    pub fn success() -> Self {
        Self {
            code: ErrorCode::Success,
            msg: None,
            data: None,
        }
    }

    /// Success carrying the literal mapping `{"value": true}`.
    pub fn success_value() -> Self {
        Self::success().with_data(json!({ "value": true }))
    }

    pub fn failed_with(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: Some(msg.into()),
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}
