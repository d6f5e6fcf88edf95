//! Block Service - the boundary façade
//!
//! Every RPC operation has the same shape: presence check, type coercion,
//! chain lookup, decode, dispatch to the validator or the block manager,
//! then a `{code, msg, data}` envelope. Failures are logged on the chain's
//! `basic` channel once the chain is known.

mod manager;

pub use manager::BlockManager;

use crate::domain::{
    decode_block, decode_header, Block, BlockHeader, Chain, ChainConfig, ConsensusError, IngestError,
    IngestResult, RegistryError, Round, SyncInfo,
};
use crate::ports::{
    BlockServiceApi, ChainStore, EventBus, SignatureVerifier, TimeSource, TransactionVerifier,
};
use crate::registry::ChainRegistry;
use crate::rpc::params::{
    self, PARAM_BLOCK, PARAM_BLOCK_HEADER, PARAM_CHAIN_ID, PARAM_DOWNLOAD, PARAM_HEADER_LIST,
    PARAM_HEIGHT,
};
use crate::rpc::{
    RpcParams, METHOD_ADD_BLOCK, METHOD_CHAIN_ROLL_BACK, METHOD_RECEIVE_HEADER_LIST,
    METHOD_VALID_BLOCK,
};
use crate::validation::{BlockValidator, ValidationMode};
use async_trait::async_trait;
use shared_types::{ChainId, ResponseEnvelope};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Block Service
pub struct BlockService<E, C, S, T> {
    registry: Arc<ChainRegistry>,
    manager: BlockManager<E, C>,
    validator: BlockValidator<S, T>,
    /// Parent of every validation token; cancelled on shutdown.
    shutdown: CancellationToken,
}

/// Dependencies for BlockService
pub struct IngestDependencies<E, C, S, T> {
    pub registry: Arc<ChainRegistry>,
    pub event_bus: Arc<E>,
    pub store: Arc<C>,
    pub sig_verifier: Arc<S>,
    pub tx_verifier: Arc<T>,
}

impl<E, C, S, T> BlockService<E, C, S, T>
where
    E: EventBus,
    C: ChainStore,
    S: SignatureVerifier,
    T: TransactionVerifier,
{
    pub fn new(deps: IngestDependencies<E, C, S, T>) -> Self {
        Self {
            registry: deps.registry,
            manager: BlockManager::new(deps.event_bus, deps.store),
            validator: BlockValidator::new(deps.sig_verifier, deps.tx_verifier),
            shutdown: CancellationToken::new(),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.validator = self.validator.with_time_source(time_source);
        self
    }

    pub fn registry(&self) -> &Arc<ChainRegistry> {
        &self.registry
    }

    /// Create, register and attach a chain.
    pub fn register_chain(&self, config: ChainConfig) -> Result<Arc<Chain>, RegistryError> {
        let chain = self.registry.register(Chain::new(config))?;
        let sync = self.manager.attach(&chain);
        tracing::info!(
            parent: chain.loggers().basic(),
            window_size = chain.config().window_size,
            sync_height = sync.current_height,
            "Chain attached"
        );
        Ok(chain)
    }

    pub fn unregister_chain(&self, chain_id: ChainId) -> bool {
        self.registry.unregister(chain_id).is_some()
    }

    /// Cancel in-flight validations and drop every chain.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.registry.shutdown();
    }

    pub async fn install_round(&self, chain_id: ChainId, round: Round) -> IngestResult<()> {
        self.registry.lookup(chain_id)?.install_round(round).await;
        Ok(())
    }

    pub async fn tip(&self, chain_id: ChainId) -> IngestResult<Option<BlockHeader>> {
        Ok(self.registry.lookup(chain_id)?.tip().await)
    }

    /// Headers with `lo <= height <= hi` currently in the window.
    pub async fn header_range(
        &self,
        chain_id: ChainId,
        lo: u64,
        hi: u64,
    ) -> IngestResult<Vec<BlockHeader>> {
        Ok(self.registry.lookup(chain_id)?.header_range(lo, hi).await)
    }

    pub fn sync_info(&self, chain_id: ChainId) -> Option<SyncInfo> {
        self.manager.store().sync_info(chain_id)
    }

    /// Validate `block` without mutating the chain.
    pub async fn validate_block(
        &self,
        chain_id: ChainId,
        block: &Block,
        mode: ValidationMode,
        cancel: &CancellationToken,
    ) -> IngestResult<()> {
        let chain = self.registry.lookup(chain_id)?;
        self.validate_on(&chain, block, mode, cancel).await
    }

    /// Validate under the shared lease, then append under the exclusive one.
    ///
    /// The tip may move between the two; the append re-checks continuity and
    /// fails with a discontinuity if it did.
    pub async fn import_block(
        &self,
        chain_id: ChainId,
        block: Block,
        mode: ValidationMode,
        cancel: &CancellationToken,
    ) -> IngestResult<()> {
        let chain = self.registry.lookup(chain_id)?;
        self.validate_on(&chain, &block, mode, cancel).await?;
        self.manager.add_new_block(&chain, block.header).await?;
        Ok(())
    }

    async fn validate_on(
        &self,
        chain: &Chain,
        block: &Block,
        mode: ValidationMode,
        cancel: &CancellationToken,
    ) -> IngestResult<()> {
        let token = self.shutdown.child_token();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ConsensusError::Cancelled.into()),
            result = self.validator.validate(mode, chain, block, &token) => Ok(result?),
        }
    }

    fn resolve_chain(&self, params: &RpcParams, required: &[&str]) -> IngestResult<Arc<Chain>> {
        params::require_present(params, required)?;
        let chain_id = params::require_chain_id(params)?;
        Ok(self.registry.lookup(chain_id)?)
    }

    fn reject(&self, method: &str, chain: Option<&Chain>, error: IngestError) -> ResponseEnvelope {
        let code = error.code();
        match chain {
            Some(chain) => tracing::error!(
                parent: chain.loggers().basic(),
                method,
                %code,
                error = %error,
                "Request failed"
            ),
            None => tracing::warn!(method, %code, error = %error, "Request rejected"),
        }
        error.into_response()
    }

    /// Run `op` against the chain named in `params`.
    async fn serve<'a, F, Fut>(
        &'a self,
        method: &'static str,
        params: &'a RpcParams,
        required: &[&str],
        op: F,
    ) -> ResponseEnvelope
    where
        F: FnOnce(Arc<Chain>) -> Fut,
        Fut: std::future::Future<Output = IngestResult<ResponseEnvelope>> + 'a,
    {
        let chain = match self.resolve_chain(params, required) {
            Ok(chain) => chain,
            Err(e) => return self.reject(method, None, e),
        };
        tracing::debug!(parent: chain.loggers().rpc(), method, "Handling request");
        match op(Arc::clone(&chain)).await {
            Ok(response) => response,
            Err(e) => self.reject(method, Some(&chain), e),
        }
    }

    async fn add_block_op(&self, chain: Arc<Chain>, params: &RpcParams) -> IngestResult<ResponseEnvelope> {
        let header = decode_header(&params::require_hex(params, PARAM_BLOCK_HEADER)?)?;
        self.manager.add_new_block(&chain, header).await?;
        Ok(ResponseEnvelope::success_value())
    }

    async fn chain_roll_back_op(
        &self,
        chain: Arc<Chain>,
        params: &RpcParams,
    ) -> IngestResult<ResponseEnvelope> {
        let height = params::require_u64(params, PARAM_HEIGHT)?;
        self.manager.chain_roll_back(&chain, height).await;
        Ok(ResponseEnvelope::success_value())
    }

    async fn receive_header_list_op(
        &self,
        chain: Arc<Chain>,
        params: &RpcParams,
    ) -> IngestResult<ResponseEnvelope> {
        let headers = params::require_hex_list(params, PARAM_HEADER_LIST)?
            .iter()
            .map(|bytes| decode_header(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        self.manager.receive_header_list(&chain, headers).await?;
        Ok(ResponseEnvelope::success_value())
    }

    async fn valid_block_op(&self, chain: Arc<Chain>, params: &RpcParams) -> IngestResult<ResponseEnvelope> {
        let mode = params::require_mode(params)?;
        let block = decode_block(&params::require_hex(params, PARAM_BLOCK)?)?;
        self.validate_on(&chain, &block, mode, &CancellationToken::new())
            .await?;
        Ok(ResponseEnvelope::success())
    }
}

#[async_trait]
impl<E, C, S, T> BlockServiceApi for BlockService<E, C, S, T>
where
    E: EventBus + 'static,
    C: ChainStore + 'static,
    S: SignatureVerifier + 'static,
    T: TransactionVerifier + 'static,
{
    async fn add_block(&self, params: &RpcParams) -> ResponseEnvelope {
        self.serve(
            METHOD_ADD_BLOCK,
            params,
            &[PARAM_CHAIN_ID, PARAM_BLOCK_HEADER],
            |chain| self.add_block_op(chain, params),
        )
        .await
    }

    async fn chain_roll_back(&self, params: &RpcParams) -> ResponseEnvelope {
        self.serve(
            METHOD_CHAIN_ROLL_BACK,
            params,
            &[PARAM_CHAIN_ID, PARAM_HEIGHT],
            |chain| self.chain_roll_back_op(chain, params),
        )
        .await
    }

    async fn receive_header_list(&self, params: &RpcParams) -> ResponseEnvelope {
        self.serve(
            METHOD_RECEIVE_HEADER_LIST,
            params,
            &[PARAM_CHAIN_ID, PARAM_HEADER_LIST],
            |chain| self.receive_header_list_op(chain, params),
        )
        .await
    }

    async fn valid_block(&self, params: &RpcParams) -> ResponseEnvelope {
        self.serve(
            METHOD_VALID_BLOCK,
            params,
            &[PARAM_CHAIN_ID, PARAM_BLOCK, PARAM_DOWNLOAD],
            |chain| self.valid_block_op(chain, params),
        )
        .await
    }
}
