//! Per-chain configuration

use serde::{Deserialize, Serialize};
use shared_types::ChainId;

/// Default header window size.
pub const DEFAULT_WINDOW_SIZE: usize = 1_000;

/// Default wall-clock drift bound for live blocks (seconds).
pub const DEFAULT_MAX_TIMESTAMP_DRIFT_SECS: u64 = 15;

/// Default seconds between consecutive producer slots.
pub const DEFAULT_PACKING_INTERVAL_SECS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: ChainId,
    /// Human-readable chain name
    pub name: String,
    /// Header window capacity (`W`)
    pub window_size: usize,
    /// Maximum distance between a live block's timestamp and the wall clock
    pub max_timestamp_drift_secs: u64,
    /// Maximum transactions per block
    pub max_txs_per_block: usize,
    /// Default slot spacing for rounds installed without an explicit interval
    pub packing_interval_secs: u64,
    /// Protocol version recorded in the chain's sync record
    pub protocol_version: u16,
    /// How many producer rounds are kept per chain
    pub max_rounds: usize,
}

impl ChainConfig {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            name: format!("chain-{chain_id}"),
            window_size: DEFAULT_WINDOW_SIZE,
            max_timestamp_drift_secs: DEFAULT_MAX_TIMESTAMP_DRIFT_SECS,
            max_txs_per_block: 10_000,
            packing_interval_secs: DEFAULT_PACKING_INTERVAL_SECS,
            protocol_version: 1,
            max_rounds: 64,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    #[must_use]
    pub fn with_max_timestamp_drift(mut self, secs: u64) -> Self {
        self.max_timestamp_drift_secs = secs;
        self
    }

    #[must_use]
    pub fn with_max_txs_per_block(mut self, max: usize) -> Self {
        self.max_txs_per_block = max;
        self
    }

    #[must_use]
    pub fn with_packing_interval(mut self, secs: u64) -> Self {
        self.packing_interval_secs = secs;
        self
    }

    #[must_use]
    pub fn with_protocol_version(mut self, version: u16) -> Self {
        self.protocol_version = version;
        self
    }

    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}
