//! # Node Configuration
//!
//! Every setting has a default and can be overridden from the environment:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `QC_CHAIN_IDS` | comma-separated chain ids to register | `1` |
//! | `QC_WINDOW_SIZE` | headers kept per chain | `1000` |
//! | `QC_DRIFT_BOUND_SECS` | live-mode clock drift bound | `15` |
//! | `QC_PACKING_INTERVAL_SECS` | seconds between producer slots | `10` |
//! | `QC_LOG` | tracing filter, overridden by `RUST_LOG` | `info` |
//! | `QC_PRODUCERS` | comma-separated hex keys installed as round 1 | none |
//!
//! Only round 1 is installed, starting at process start, and nothing
//! installs later rounds. Once `producers * QC_PACKING_INTERVAL_SECS`
//! seconds have passed, live-mode `validBlock` rejects every block: later
//! rounds answer `PRODUCER_INELIGIBLE` and round-1 slot times fall outside
//! the drift bound (`TIMESTAMP_INVALID`). Download mode still accepts
//! round-1 blocks.

use block_ingest::domain::{
    DEFAULT_MAX_TIMESTAMP_DRIFT_SECS, DEFAULT_PACKING_INTERVAL_SECS, DEFAULT_WINDOW_SIZE,
};
use block_ingest::ChainConfig;
use shared_types::{ChainId, PublicKey};
use thiserror::Error;

pub const ENV_CHAIN_IDS: &str = "QC_CHAIN_IDS";
pub const ENV_WINDOW_SIZE: &str = "QC_WINDOW_SIZE";
pub const ENV_DRIFT_BOUND: &str = "QC_DRIFT_BOUND_SECS";
pub const ENV_PACKING_INTERVAL: &str = "QC_PACKING_INTERVAL_SECS";
pub const ENV_LOG: &str = "QC_LOG";
pub const ENV_PRODUCERS: &str = "QC_PRODUCERS";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: cannot parse `{value}`")]
    Invalid { var: &'static str, value: String },

    #[error("{0}: at least one chain id is required")]
    NoChains(&'static str),

    #[error("{var}: chain {id} listed twice")]
    DuplicateChain { var: &'static str, id: ChainId },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub chain_ids: Vec<ChainId>,
    pub window_size: usize,
    pub drift_bound_secs: u64,
    pub packing_interval_secs: u64,
    pub log_filter: String,
    /// Producers of the bootstrap round; empty means no round is installed.
    pub producers: Vec<PublicKey>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            chain_ids: ChainId::new(1).into_iter().collect(),
            window_size: DEFAULT_WINDOW_SIZE,
            drift_bound_secs: DEFAULT_MAX_TIMESTAMP_DRIFT_SECS,
            packing_interval_secs: DEFAULT_PACKING_INTERVAL_SECS,
            log_filter: "info".to_string(),
            producers: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for each variable, then validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = var(ENV_CHAIN_IDS) {
            config.chain_ids = split(&value)
                .map(|item| {
                    item.parse::<i64>()
                        .ok()
                        .and_then(|id| ChainId::try_from(id).ok())
                        .ok_or_else(|| invalid(ENV_CHAIN_IDS, item))
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = var(ENV_WINDOW_SIZE) {
            config.window_size = parse(ENV_WINDOW_SIZE, &value)?;
        }
        if let Some(value) = var(ENV_DRIFT_BOUND) {
            config.drift_bound_secs = parse(ENV_DRIFT_BOUND, &value)?;
        }
        if let Some(value) = var(ENV_PACKING_INTERVAL) {
            config.packing_interval_secs = parse(ENV_PACKING_INTERVAL, &value)?;
        }
        if let Some(value) = var(ENV_LOG) {
            config.log_filter = value.trim().to_string();
        }
        if let Some(value) = var(ENV_PRODUCERS) {
            config.producers = split(&value)
                .map(|item| {
                    hex::decode(item)
                        .ok()
                        .and_then(|bytes| PublicKey::try_from(bytes.as_slice()).ok())
                        .ok_or_else(|| invalid(ENV_PRODUCERS, item))
                })
                .collect::<Result<_, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_ids.is_empty() {
            return Err(ConfigError::NoChains(ENV_CHAIN_IDS));
        }
        for (i, id) in self.chain_ids.iter().enumerate() {
            if self.chain_ids[..i].contains(id) {
                return Err(ConfigError::DuplicateChain {
                    var: ENV_CHAIN_IDS,
                    id: *id,
                });
            }
        }
        if self.window_size == 0 {
            return Err(ConfigError::Zero(ENV_WINDOW_SIZE));
        }
        if self.packing_interval_secs == 0 {
            return Err(ConfigError::Zero(ENV_PACKING_INTERVAL));
        }
        Ok(())
    }

    /// Per-chain configuration for every configured chain id.
    pub fn chain_configs(&self) -> Vec<ChainConfig> {
        self.chain_ids
            .iter()
            .map(|id| {
                ChainConfig::new(*id)
                    .with_window_size(self.window_size)
                    .with_max_timestamp_drift(self.drift_bound_secs)
                    .with_packing_interval(self.packing_interval_secs)
            })
            .collect()
    }
}

fn split(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(var, value))
}
