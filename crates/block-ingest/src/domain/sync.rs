//! Chain metadata records kept by the chain store.

use serde::{Deserialize, Serialize};
use shared_types::ChainId;

use super::config::ChainConfig;

/// Last mutation applied to a chain's window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    #[default]
    Initial,
    TipAdvanced,
    HistoryExtended,
    RolledBack,
}

/// Per-chain progress record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncInfo {
    pub chain_id: ChainId,
    pub current_height: u64,
    pub protocol_version: u16,
    pub step: SyncStep,
}

impl SyncInfo {
    pub fn new(chain_id: ChainId, current_height: u64, protocol_version: u16) -> Self {
        Self {
            chain_id,
            current_height,
            protocol_version,
            step: SyncStep::Initial,
        }
    }

    /// Copy of `self` moved to `height` with `step`.
    pub fn advanced(&self, height: u64, step: SyncStep) -> Self {
        Self {
            current_height: height,
            step,
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    #[default]
    Enabled,
    Disabled,
}

/// Chain metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain_id: ChainId,
    pub name: String,
    pub status: ChainStatus,
}

impl ChainInfo {
    pub fn from_config(config: &ChainConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            name: config.name.clone(),
            status: ChainStatus::Enabled,
        }
    }
}

/// Configuration snapshot cached next to a [`ChainInfo`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfigInfo {
    pub chain_id: ChainId,
    pub window_size: usize,
    pub max_timestamp_drift_secs: u64,
    pub packing_interval_secs: u64,
    pub protocol_version: u16,
}

impl From<&ChainConfig> for ChainConfigInfo {
    fn from(config: &ChainConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            window_size: config.window_size,
            max_timestamp_drift_secs: config.max_timestamp_drift_secs,
            packing_interval_secs: config.packing_interval_secs,
            protocol_version: config.protocol_version,
        }
    }
}
