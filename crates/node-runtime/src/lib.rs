//! # Node Runtime
//!
//! Hosts the block ingestion core behind a line-oriented transport.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialise logging
//! 3. Register every configured chain and attach its sync progress
//! 4. Install the bootstrap producer round, if configured
//! 5. Serve one JSON request per input line until EOF or shutdown
//!
//! Requests on the line transport are answered serially, in input order.
//! A slow transaction check on one chain delays every line behind it.
//! Chain events are broadcast to subscribers of [`NodeRuntime::events`]
//! and are not retained.

pub mod config;

use std::sync::Arc;

use block_ingest::{
    AcceptAllTransactions, BlockService, BroadcastEventBus, ChainRegistry,
    Ed25519SignatureVerifier, InMemoryChainStore, IngestDependencies, RegistryError, Round,
    RpcHandler, SystemTimeSource, TimeSource,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use config::{ConfigError, NodeConfig};

pub type NodeService =
    BlockService<BroadcastEventBus, InMemoryChainStore, Ed25519SignatureVerifier, AcceptAllTransactions>;

/// Index of the producer round installed at startup.
///
/// No later round is ever installed, so live-mode validation rejects every
/// block once `producers * packing_interval_secs` seconds have passed.
/// See the [`config`] module for the codes returned.
pub const BOOTSTRAP_ROUND: u64 = 1;

/// The node runtime wiring registry, service and transport.
pub struct NodeRuntime {
    config: NodeConfig,
    service: Arc<NodeService>,
    handler: RpcHandler<NodeService>,
    events: Arc<BroadcastEventBus>,
    shutdown: CancellationToken,
}

impl NodeRuntime {
    /// Build the service and register every configured chain.
    pub async fn new(config: NodeConfig) -> Result<Self, RegistryError> {
        Self::with_time_source(config, Arc::new(SystemTimeSource)).await
    }

    pub async fn with_time_source(
        config: NodeConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, RegistryError> {
        let events = Arc::new(BroadcastEventBus::new());
        let service = BlockService::new(IngestDependencies {
            registry: Arc::new(ChainRegistry::new()),
            event_bus: Arc::clone(&events),
            store: Arc::new(InMemoryChainStore::new()),
            sig_verifier: Arc::new(Ed25519SignatureVerifier),
            tx_verifier: Arc::new(AcceptAllTransactions),
        })
        .with_time_source(Arc::clone(&time_source));
        let service = Arc::new(service);

        let start_time = time_source.now();
        for chain_config in config.chain_configs() {
            let chain = service.register_chain(chain_config)?;
            if !config.producers.is_empty() {
                let round = Round::new(
                    BOOTSTRAP_ROUND,
                    start_time,
                    config.packing_interval_secs,
                    config.producers.clone(),
                );
                chain.install_round(round).await;
                info!(
                    chain_id = %chain.id(),
                    producers = config.producers.len(),
                    start_time,
                    "Installed bootstrap round"
                );
            }
        }
        info!(chains = config.chain_ids.len(), window_size = config.window_size, "Chains registered");

        Ok(Self {
            handler: RpcHandler::new(Arc::clone(&service)),
            config,
            service,
            events,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<NodeService> {
        &self.service
    }

    /// The chain event channel; subscribe before issuing requests.
    pub fn events(&self) -> &Arc<BroadcastEventBus> {
        &self.events
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Answer a single request line.
    pub async fn handle_line(&self, line: &str) -> String {
        self.handler.handle_line(line).await
    }

    /// Serve newline-delimited requests until EOF or shutdown.
    ///
    /// Each line is answered before the next is read. Blank lines are skipped. Returns the number of requests answered.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut served = 0;
        loop {
            let line = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line).await;
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            served += 1;
        }
        debug!(served, "Request stream closed");
        Ok(served)
    }

    /// Stop serving, cancel in-flight validations and drop every chain.
    pub fn shutdown(&self) {
        info!("Initiating shutdown");
        self.shutdown.cancel();
        self.service.shutdown();
    }
}
