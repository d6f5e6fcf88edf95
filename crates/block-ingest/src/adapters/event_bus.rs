//! Event Bus adapters
//!
//! Implements the EventBus port twice: a broadcast channel that retains
//! nothing for long-running nodes, and an in-memory recorder for tests.

use crate::events::ChainEvent;
use crate::ports::EventBus;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Default number of events a slow subscriber may lag behind.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcast event bus.
///
/// Events go to whoever is subscribed at publish time and are dropped
/// otherwise. A subscriber that falls more than `capacity` events behind
/// observes `RecvError::Lagged`.
pub struct BroadcastEventBus {
    sender: broadcast::Sender<ChainEvent>,
    events_published: AtomicU64,
}

impl BroadcastEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for BroadcastEventBus {
    async fn publish(&self, event: ChainEvent) -> Result<(), String> {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let chain_id = event.chain_id();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::trace!(%chain_id, receivers, "Broadcast chain event");
            }
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(%chain_id, ?event, "No subscribers, chain event dropped");
            }
        }
        Ok(())
    }
}

/// In-memory event bus adapter for testing
pub struct InMemoryEventBus {
    events: parking_lot::RwLock<Vec<ChainEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            events: parking_lot::RwLock::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<ChainEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: ChainEvent) -> Result<(), String> {
        tracing::trace!(chain_id = %event.chain_id(), ?event, "Publishing chain event");
        self.events.write().push(event);
        Ok(())
    }
}
