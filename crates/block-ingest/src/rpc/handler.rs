//! Line-oriented request handler
//!
//! Each request is one JSON object `{"method": ..., "params": {...}, "id": ...}`.
//! The response is the envelope, echoing `id` when one was given.

use super::RpcParams;
use crate::ports::BlockServiceApi;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ErrorCode, ResponseEnvelope};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: RpcParams,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
}

pub struct RpcHandler<A> {
    api: Arc<A>,
}

impl<A: BlockServiceApi> RpcHandler<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        let envelope = self.api.dispatch(&request.method, &request.params).await;
        RpcResponse {
            id: request.id,
            envelope,
        }
    }

    /// Handle one raw request line and render the response line.
    pub async fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request line");
                RpcResponse {
                    id: None,
                    envelope: ResponseEnvelope::failed_with(
                        ErrorCode::ParamError,
                        format!("malformed request: {e}"),
                    ),
                }
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(r#"{{"code":"DATA_PARSE_ERROR","msg":"failed to encode response: {e}","data":null}}"#)
        })
    }
}
