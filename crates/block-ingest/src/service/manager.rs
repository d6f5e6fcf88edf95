//! Block Manager - window mutations and their side effects
//!
//! Every mutator holds the chain's exclusive lease from the window change
//! through the store update and event publication, so observers see events
//! in mutation order. Nothing cancellable is awaited inside the lease.

use crate::domain::{
    BlockHeader, Chain, ChainConfigInfo, ChainInfo, ChainPhase, SyncInfo, SyncStep, WindowError,
};
use crate::events::ChainEvent;
use crate::metrics;
use crate::ports::{ChainStore, EventBus};
use std::sync::Arc;

pub struct BlockManager<E, C> {
    event_bus: Arc<E>,
    store: Arc<C>,
}

impl<E, C> BlockManager<E, C>
where
    E: EventBus,
    C: ChainStore,
{
    pub fn new(event_bus: Arc<E>, store: Arc<C>) -> Self {
        Self { event_bus, store }
    }

    pub fn store(&self) -> &Arc<C> {
        &self.store
    }

    /// Record `chain` in the store and load its sync progress, creating a
    /// fresh record at height 0 when none exists.
    pub fn attach(&self, chain: &Chain) -> SyncInfo {
        let config = chain.config();
        let chain_id = chain.id();

        if self.store.chain_info(chain_id).is_none() {
            if let Err(e) = self
                .store
                .add_cache_chain(ChainInfo::from_config(config), ChainConfigInfo::from(config))
            {
                tracing::warn!(parent: chain.loggers().basic(), error = %e, "Failed to record chain info");
            }
        }

        if let Some(info) = self.store.sync_info(chain_id) {
            tracing::info!(
                parent: chain.loggers().basic(),
                height = info.current_height,
                step = ?info.step,
                "Resumed sync progress"
            );
            return info;
        }
        match self
            .store
            .save_new_sync_info(chain_id, 0, config.protocol_version)
        {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(parent: chain.loggers().basic(), error = %e, "Failed to create sync info");
                SyncInfo::new(chain_id, 0, config.protocol_version)
            }
        }
    }

    /// Append `header` after the tip, re-checking continuity under the lease.
    ///
    /// Failure leaves the window untouched.
    pub async fn add_new_block(&self, chain: &Chain, header: BlockHeader) -> Result<(), WindowError> {
        let height = header.height;
        let hash = header.hash;

        let mut state = chain.write().await;
        if let Err(e) = state.window.append(header) {
            metrics::record_block_rejected(e.code().as_str());
            tracing::warn!(parent: chain.loggers().basic(), height, error = %e, "Rejected header append");
            return Err(e);
        }
        state.settle_phase();
        metrics::record_block_added();
        tracing::info!(
            parent: chain.loggers().basic(),
            height,
            hash = %hex::encode(hash),
            "Tip advanced"
        );

        self.record_progress(chain, height, SyncStep::TipAdvanced);
        self.publish(
            chain,
            ChainEvent::TipAdvanced {
                chain_id: chain.id(),
                height,
                hash,
            },
        )
        .await;
        Ok(())
    }

    /// Splice an oldest-first historical batch before the window.
    ///
    /// The batch must be continuous and link to the current oldest header.
    /// The tip never moves unless the window was empty. Eviction drops the
    /// oldest headers first, so a full window may keep none of the batch; in
    /// that case the call succeeds without recording progress or publishing.
    /// Returns how many headers of the batch were kept.
    pub async fn receive_header_list(
        &self,
        chain: &Chain,
        headers: Vec<BlockHeader>,
    ) -> Result<usize, WindowError> {
        let count = headers.len();
        if count == 0 {
            return Ok(0);
        }

        let mut state = chain.write().await;
        let evicted = match state.window.prepend(headers) {
            Ok(evicted) => evicted,
            Err(e) => {
                tracing::warn!(parent: chain.loggers().basic(), count, error = %e, "Rejected header batch");
                return Err(e);
            }
        };
        let retained = count.saturating_sub(evicted);
        if retained == 0 {
            tracing::debug!(
                parent: chain.loggers().basic(),
                count,
                capacity = state.window.capacity(),
                "Window full, header batch evicted"
            );
            return Ok(0);
        }
        state.settle_phase();
        metrics::record_headers_prepended(retained);

        let oldest_height = state.window.oldest().map_or(0, |h| h.height);
        let tip_height = state.tip_height().unwrap_or(0);
        tracing::info!(
            parent: chain.loggers().basic(),
            count,
            retained,
            evicted,
            oldest_height,
            tip_height,
            "History extended"
        );

        self.record_progress(chain, tip_height, SyncStep::HistoryExtended);
        self.publish(
            chain,
            ChainEvent::HistoryExtended {
                chain_id: chain.id(),
                oldest_height,
                count: retained,
            },
        )
        .await;
        Ok(retained)
    }

    /// Drop every header with `height >= target`. Returns how many were removed.
    ///
    /// A target above the tip changes nothing and publishes nothing.
    pub async fn chain_roll_back(&self, chain: &Chain, target: u64) -> usize {
        let mut state = chain.write().await;
        match state.tip_height() {
            Some(tip) if target <= tip => {}
            tip => {
                tracing::debug!(parent: chain.loggers().basic(), target, ?tip, "Rollback is a no-op");
                return 0;
            }
        }

        state.phase = ChainPhase::RollingBack;
        let removed = state.window.truncate_from(target);
        state.settle_phase();
        let new_tip = state.tip_height();
        metrics::record_rollback();
        tracing::info!(
            parent: chain.loggers().basic(),
            target,
            removed,
            ?new_tip,
            "Chain rolled back"
        );

        let height = new_tip.unwrap_or_else(|| target.saturating_sub(1));
        self.record_progress(chain, height, SyncStep::RolledBack);
        self.publish(
            chain,
            ChainEvent::RolledBack {
                chain_id: chain.id(),
                target_height: target,
                removed,
                new_tip,
            },
        )
        .await;
        removed
    }

    /// Persist sync progress; failures are logged and never undo the mutation.
    fn record_progress(&self, chain: &Chain, height: u64, step: SyncStep) {
        let chain_id = chain.id();
        let current = match self.store.sync_info(chain_id) {
            Some(info) => Ok(info),
            None => self
                .store
                .save_new_sync_info(chain_id, height, chain.config().protocol_version),
        };
        let result = current.and_then(|info| self.store.update_step(&info.advanced(height, step)));
        if let Err(e) = result {
            tracing::error!(
                parent: chain.loggers().basic(),
                height,
                ?step,
                error = %e,
                "Failed to update sync info"
            );
        }
    }

    async fn publish(&self, chain: &Chain, event: ChainEvent) {
        if let Err(e) = self.event_bus.publish(event).await {
            tracing::error!(parent: chain.loggers().basic(), error = %e, "Failed to publish chain event");
        }
    }
}
