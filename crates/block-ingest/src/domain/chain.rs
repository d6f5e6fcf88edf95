//! Chain runtime state
//!
//! One [`Chain`] per tracked ledger. The window and consensus state sit behind
//! a fair `tokio::sync::RwLock`: validation and queries share it, mutations
//! hold it exclusively. Configuration and loggers are immutable and read
//! without locking.

use super::block::BlockHeader;
use super::config::ChainConfig;
use super::round::{Round, RoundSchedule};
use super::window::HeaderWindow;
use shared_types::ChainId;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::Span;

pub const BASIC_LOGGER: &str = "basic";
pub const CONSENSUS_LOGGER: &str = "consensus";
pub const RPC_LOGGER: &str = "rpc";

/// Per-chain logger table.
///
/// Each channel is a span carrying `chain_id` and `channel`; events are
/// emitted with `parent: loggers.basic()` and friends.
#[derive(Debug, Clone)]
pub struct ChainLoggers {
    basic: Span,
    consensus: Span,
    rpc: Span,
}

impl ChainLoggers {
    pub fn for_chain(chain_id: ChainId) -> Self {
        let channel = |name: &'static str| {
            tracing::info_span!("chain", chain_id = chain_id.get(), channel = name)
        };
        Self {
            basic: channel(BASIC_LOGGER),
            consensus: channel(CONSENSUS_LOGGER),
            rpc: channel(RPC_LOGGER),
        }
    }

    /// Look a channel up by name.
    pub fn get(&self, channel: &str) -> Option<&Span> {
        match channel {
            BASIC_LOGGER => Some(&self.basic),
            CONSENSUS_LOGGER => Some(&self.consensus),
            RPC_LOGGER => Some(&self.rpc),
            _ => None,
        }
    }

    pub fn basic(&self) -> &Span {
        &self.basic
    }

    pub fn consensus(&self) -> &Span {
        &self.consensus
    }

    pub fn rpc(&self) -> &Span {
        &self.rpc
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainPhase {
    Empty,
    Tracking,
    /// Only observable from inside the exclusive lease of a rollback.
    RollingBack,
}

/// Lock-protected part of a chain.
#[derive(Debug)]
pub struct ChainState {
    pub(crate) window: HeaderWindow,
    pub(crate) rounds: RoundSchedule,
    pub(crate) phase: ChainPhase,
}

impl ChainState {
    fn new(config: &ChainConfig) -> Self {
        Self {
            window: HeaderWindow::new(config.window_size),
            rounds: RoundSchedule::new(config.max_rounds),
            phase: ChainPhase::Empty,
        }
    }

    pub fn window(&self) -> &HeaderWindow {
        &self.window
    }

    pub fn rounds(&self) -> &RoundSchedule {
        &self.rounds
    }

    pub fn phase(&self) -> ChainPhase {
        self.phase
    }

    pub fn tip(&self) -> Option<&BlockHeader> {
        self.window.tip()
    }

    pub fn tip_height(&self) -> Option<u64> {
        self.window.tip_height()
    }

    /// Re-derive the phase from the window after a mutation.
    pub(crate) fn settle_phase(&mut self) {
        self.phase = if self.window.is_empty() {
            ChainPhase::Empty
        } else {
            ChainPhase::Tracking
        };
    }
}

pub struct Chain {
    config: ChainConfig,
    loggers: ChainLoggers,
    state: RwLock<ChainState>,
}

impl Chain {
    pub fn new(config: ChainConfig) -> Self {
        let loggers = ChainLoggers::for_chain(config.chain_id);
        let state = RwLock::new(ChainState::new(&config));
        Self {
            config,
            loggers,
            state,
        }
    }

    pub fn id(&self) -> ChainId {
        self.config.chain_id
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn loggers(&self) -> &ChainLoggers {
        &self.loggers
    }

    /// Shared lease.
    pub async fn read(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state.read().await
    }

    /// Exclusive lease; only the block manager mutates chain state.
    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, ChainState> {
        self.state.write().await
    }

    pub async fn tip(&self) -> Option<BlockHeader> {
        self.read().await.tip().cloned()
    }

    pub async fn tip_height(&self) -> Option<u64> {
        self.read().await.tip_height()
    }

    pub async fn phase(&self) -> ChainPhase {
        self.read().await.phase
    }

    /// Headers with `lo <= height <= hi`, oldest first.
    pub async fn header_range(&self, lo: u64, hi: u64) -> Vec<BlockHeader> {
        self.read().await.window.range_by_height(lo, hi)
    }

    /// Make a producer round known to the validator.
    pub async fn install_round(&self, round: Round) {
        let index = round.index;
        let members = round.len();
        self.state.write().await.rounds.insert(round);
        tracing::debug!(
            parent: self.loggers.consensus(),
            round_index = index,
            members,
            "Installed producer round"
        );
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("chain_id", &self.config.chain_id)
            .field("window_size", &self.config.window_size)
            .finish_non_exhaustive()
    }
}
