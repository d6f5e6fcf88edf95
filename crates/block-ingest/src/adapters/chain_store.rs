//! In-memory chain store
//!
//! Backs the `ChainStore` port with maps guarded by `parking_lot` locks.
//! Durable storage lives outside this crate.

use crate::domain::{ChainConfigInfo, ChainInfo, StoreError, SyncInfo};
use crate::ports::ChainStore;
use parking_lot::RwLock;
use shared_types::ChainId;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemoryChainStore {
    chains: RwLock<BTreeMap<ChainId, ChainInfo>>,
    configs: RwLock<BTreeMap<ChainId, ChainConfigInfo>>,
    sync: RwLock<BTreeMap<ChainId, SyncInfo>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for InMemoryChainStore {
    fn chain_info_list(&self) -> Vec<ChainInfo> {
        self.chains.read().values().cloned().collect()
    }

    fn chain_info(&self, chain_id: ChainId) -> Option<ChainInfo> {
        self.chains.read().get(&chain_id).cloned()
    }

    fn add_chain_info(&self, info: ChainInfo) -> Result<(), StoreError> {
        let mut chains = self.chains.write();
        if chains.contains_key(&info.chain_id) {
            return Err(StoreError::Duplicate(info.chain_id));
        }
        chains.insert(info.chain_id, info);
        Ok(())
    }

    fn add_cache_chain(&self, info: ChainInfo, config: ChainConfigInfo) -> Result<(), StoreError> {
        let chain_id = info.chain_id;
        self.chains.write().insert(chain_id, info);
        self.configs.write().insert(chain_id, config);
        Ok(())
    }

    fn chain_config(&self, chain_id: ChainId) -> Option<ChainConfigInfo> {
        self.configs.read().get(&chain_id).cloned()
    }

    fn save_chain_list(&self, infos: Vec<ChainInfo>) -> Result<(), StoreError> {
        let mut chains = self.chains.write();
        for info in infos {
            chains.insert(info.chain_id, info);
        }
        Ok(())
    }

    fn rollback_chain_list(&self, infos: Vec<ChainInfo>) -> Result<(), StoreError> {
        let mut chains = self.chains.write();
        for info in infos {
            chains.remove(&info.chain_id);
        }
        Ok(())
    }

    fn sync_info(&self, chain_id: ChainId) -> Option<SyncInfo> {
        self.sync.read().get(&chain_id).cloned()
    }

    fn save_new_sync_info(
        &self,
        chain_id: ChainId,
        height: u64,
        protocol_version: u16,
    ) -> Result<SyncInfo, StoreError> {
        let info = SyncInfo::new(chain_id, height, protocol_version);
        self.sync.write().insert(chain_id, info.clone());
        Ok(info)
    }

    fn update_step(&self, info: &SyncInfo) -> Result<(), StoreError> {
        match self.sync.write().get_mut(&info.chain_id) {
            Some(record) => {
                record.current_height = info.current_height;
                record.step = info.step;
                Ok(())
            }
            None => Err(StoreError::NotFound(info.chain_id)),
        }
    }
}
