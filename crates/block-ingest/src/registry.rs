//! Chain registry
//!
//! Process-wide `chain_id -> Chain` map created at startup and torn down
//! explicitly. Lookups share the lock; registration and removal take it
//! exclusively.

use crate::domain::{Chain, RegistryError};
use parking_lot::RwLock;
use shared_types::ChainId;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ChainRegistry {
    chains: RwLock<HashMap<ChainId, Arc<Chain>>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `chain` under its own id. Fails if the id is taken.
    pub fn register(&self, chain: Chain) -> Result<Arc<Chain>, RegistryError> {
        let chain_id = chain.id();
        let mut chains = self.chains.write();
        if chains.contains_key(&chain_id) {
            return Err(RegistryError::AlreadyRegistered(chain_id));
        }
        let chain = Arc::new(chain);
        chains.insert(chain_id, Arc::clone(&chain));
        tracing::info!(%chain_id, "Registered chain");
        Ok(chain)
    }

    pub fn lookup(&self, chain_id: ChainId) -> Result<Arc<Chain>, RegistryError> {
        self.get(chain_id)
            .ok_or(RegistryError::ChainNotExist(chain_id))
    }

    pub fn get(&self, chain_id: ChainId) -> Option<Arc<Chain>> {
        self.chains.read().get(&chain_id).cloned()
    }

    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.chains.read().contains_key(&chain_id)
    }

    /// Remove a chain. Idempotent.
    pub fn unregister(&self, chain_id: ChainId) -> Option<Arc<Chain>> {
        let removed = self.chains.write().remove(&chain_id);
        if removed.is_some() {
            tracing::info!(%chain_id, "Unregistered chain");
        }
        removed
    }

    /// Snapshot of registered ids, ascending.
    pub fn chain_ids(&self) -> Vec<ChainId> {
        let mut ids: Vec<ChainId> = self.chains.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.chains.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.read().is_empty()
    }

    /// Drop every chain. In-flight operations keep their `Arc` until done.
    pub fn shutdown(&self) {
        let drained = std::mem::take(&mut *self.chains.write());
        tracing::info!(chains = drained.len(), "Chain registry shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{chain_id, create_chain};

    #[test]
    fn test_register_and_lookup() {
        let registry = ChainRegistry::new();
        registry.register(create_chain(1, 10)).unwrap();

        assert!(registry.lookup(chain_id(1)).is_ok());
        assert_eq!(
            registry.lookup(chain_id(999)).unwrap_err(),
            RegistryError::ChainNotExist(chain_id(999))
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = ChainRegistry::new();
        registry.register(create_chain(1, 10)).unwrap();
        assert_eq!(
            registry.register(create_chain(1, 20)).unwrap_err(),
            RegistryError::AlreadyRegistered(chain_id(1))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(chain_id(1)).unwrap().config().window_size, 10);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ChainRegistry::new();
        registry.register(create_chain(2, 10)).unwrap();

        assert!(registry.unregister(chain_id(2)).is_some());
        assert!(registry.unregister(chain_id(2)).is_none());
        assert!(!registry.contains(chain_id(2)));
    }

    #[test]
    fn test_shutdown_clears_all() {
        let registry = ChainRegistry::new();
        for id in [3, 1, 2] {
            registry.register(create_chain(id, 10)).unwrap();
        }
        assert_eq!(registry.chain_ids(), vec![chain_id(1), chain_id(2), chain_id(3)]);

        registry.shutdown();
        assert!(registry.is_empty());
    }
}
