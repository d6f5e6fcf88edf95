//! Driving ports (Inbound API)

use crate::rpc::{
    RpcParams, METHOD_ADD_BLOCK, METHOD_CHAIN_ROLL_BACK, METHOD_RECEIVE_HEADER_LIST,
    METHOD_VALID_BLOCK,
};
use async_trait::async_trait;
use shared_types::{ErrorCode, ResponseEnvelope};

/// Block ingestion API invoked by the RPC layer.
///
/// Every operation answers with an envelope; errors never escape as `Err`.
#[async_trait]
pub trait BlockServiceApi: Send + Sync {
    /// Append one header after the chain tip.
    ///
    /// Keys: `chainId`, `blockHeader`.
    async fn add_block(&self, params: &RpcParams) -> ResponseEnvelope;

    /// Drop every header at or above `height`.
    ///
    /// `height == tip` removes the tip itself; a height above the tip, or
    /// any height on an empty chain, changes nothing and publishes nothing.
    ///
    /// Keys: `chainId`, `height`.
    async fn chain_roll_back(&self, params: &RpcParams) -> ResponseEnvelope;

    /// Prepend an oldest-first batch of historical headers.
    ///
    /// Headers pushed out of a full window by the bound are not reported.
    ///
    /// Keys: `chainId`, `headerList`.
    async fn receive_header_list(&self, params: &RpcParams) -> ResponseEnvelope;

    /// Validate a block without mutating the chain.
    ///
    /// Keys: `chainId`, `block`, `download` (0 = download, 1 = live).
    async fn valid_block(&self, params: &RpcParams) -> ResponseEnvelope;

    /// Route a request by its RPC method name.
    async fn dispatch(&self, method: &str, params: &RpcParams) -> ResponseEnvelope {
        match method {
            METHOD_ADD_BLOCK => self.add_block(params).await,
            METHOD_CHAIN_ROLL_BACK => self.chain_roll_back(params).await,
            METHOD_RECEIVE_HEADER_LIST => self.receive_header_list(params).await,
            METHOD_VALID_BLOCK => self.valid_block(params).await,
            other => {
                tracing::warn!(method = other, "Unknown RPC method");
                ResponseEnvelope::failed_with(ErrorCode::ParamError, format!("unknown method `{other}`"))
            }
        }
    }
}
