//! Published events (Outgoing)

use serde::{Deserialize, Serialize};
use shared_types::{ChainId, Hash};

/// Published to the event bus after a window mutation is applied.
///
/// Observers use these to extend or reverse state derived from the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainEvent {
    /// A header was appended after the tip.
    TipAdvanced {
        chain_id: ChainId,
        height: u64,
        hash: Hash,
    },
    /// A historical batch was spliced before the oldest header.
    HistoryExtended {
        chain_id: ChainId,
        /// Oldest height now in the window
        oldest_height: u64,
        count: usize,
    },
    /// Every header at or above `target_height` was dropped.
    RolledBack {
        chain_id: ChainId,
        target_height: u64,
        removed: usize,
        /// Tip after the rollback, `None` when the window emptied
        new_tip: Option<u64>,
    },
}

impl ChainEvent {
    pub fn chain_id(&self) -> ChainId {
        match self {
            ChainEvent::TipAdvanced { chain_id, .. }
            | ChainEvent::HistoryExtended { chain_id, .. }
            | ChainEvent::RolledBack { chain_id, .. } => *chain_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_is_tagged() {
        let event = ChainEvent::RolledBack {
            chain_id: ChainId::new(1).unwrap(),
            target_height: 2,
            removed: 2,
            new_tip: Some(1),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "rolled_back");
        assert_eq!(json["chain_id"], 1);
        assert_eq!(event.chain_id().get(), 1);
    }
}
