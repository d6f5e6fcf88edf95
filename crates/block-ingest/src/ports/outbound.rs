//! Driven ports (Outbound dependencies)

use crate::domain::{ChainConfigInfo, ChainInfo, StoreError, SyncInfo, Transaction};
use crate::events::ChainEvent;
use async_trait::async_trait;
use shared_types::ChainId;

/// Downstream observers of window mutations.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a chain event.
    ///
    /// Called after the mutation is applied; a failure is logged by the
    /// caller and never undoes the mutation.
    async fn publish(&self, event: ChainEvent) -> Result<(), String>;
}

/// Chain metadata store.
///
/// Opaque persistence for chain records and per-chain sync progress.
pub trait ChainStore: Send + Sync {
    fn chain_info_list(&self) -> Vec<ChainInfo>;

    fn chain_info(&self, chain_id: ChainId) -> Option<ChainInfo>;

    fn add_chain_info(&self, info: ChainInfo) -> Result<(), StoreError>;

    /// Record a chain together with its configuration snapshot.
    fn add_cache_chain(&self, info: ChainInfo, config: ChainConfigInfo) -> Result<(), StoreError>;

    fn chain_config(&self, chain_id: ChainId) -> Option<ChainConfigInfo>;

    /// Insert or replace every record in `infos`.
    fn save_chain_list(&self, infos: Vec<ChainInfo>) -> Result<(), StoreError>;

    /// Remove every record in `infos`.
    fn rollback_chain_list(&self, infos: Vec<ChainInfo>) -> Result<(), StoreError>;

    fn sync_info(&self, chain_id: ChainId) -> Option<SyncInfo>;

    /// Create or overwrite the sync record at `height` with step `Initial`.
    fn save_new_sync_info(
        &self,
        chain_id: ChainId,
        height: u64,
        protocol_version: u16,
    ) -> Result<SyncInfo, StoreError>;

    /// Persist `current_height` and `step` of an existing record.
    fn update_step(&self, info: &SyncInfo) -> Result<(), StoreError>;
}

/// Producer signature verification.
pub trait SignatureVerifier: Send + Sync {
    /// Verify `signature` by `public_key` over `message`.
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8; 32]) -> bool;
}

/// Transaction checks against chain state.
#[async_trait]
pub trait TransactionVerifier: Send + Sync {
    /// Check `tx` against the state of `chain_id` at `tip_height`.
    ///
    /// Returns the rejection reason on failure.
    async fn verify(
        &self,
        chain_id: ChainId,
        tip_height: Option<u64>,
        tx: &Transaction,
    ) -> Result<(), String>;
}

/// Time source for timestamp validation
pub trait TimeSource: Send + Sync {
    /// Get current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
