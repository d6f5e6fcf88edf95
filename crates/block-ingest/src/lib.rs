//! # block-ingest
//!
//! Multi-chain block ingestion and validation core.
//!
//! ## Architecture
//!
//! Each registered chain keeps a bounded window of recent headers, the
//! producer rounds used to check eligibility, and a table of logging
//! channels. Four RPC operations act on it:
//!
//! ```text
//! addBlock ──────────┐
//! chainRollBack ─────┼──→ [BlockService] ──→ [BlockManager] ──→ HeaderWindow
//! receiveHeaderList ─┘          │                  │
//!                               │                  ├──→ ChainStore (sync progress)
//! validBlock ───────────────────┘                  └──→ EventBus (ChainEvent)
//!                         ↓
//!                 [BlockValidator] (shared lease, read only)
//! ```
//!
//! ### Leases
//!
//! Every chain is guarded by a fair read/write lock. Validation and queries
//! share it; window mutations take it exclusively. `import_block` validates
//! under the shared lease and appends under the exclusive one, where the
//! append re-checks the link to the tip. Of several racing blocks at the
//! same height exactly one wins; the rest fail with `DISCONTINUITY`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use block_ingest::{BlockService, IngestDependencies, ChainConfig};
//!
//! let service = BlockService::new(IngestDependencies {
//!     registry: Arc::new(ChainRegistry::new()),
//!     event_bus,
//!     store,
//!     sig_verifier: Arc::new(Ed25519SignatureVerifier),
//!     tx_verifier: Arc::new(AcceptAllTransactions),
//! });
//! service.register_chain(ChainConfig::new(chain_id))?;
//!
//! let response = service.dispatch("addBlock", &params).await;
//! ```

pub mod adapters;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod registry;
pub mod rpc;
pub mod service;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use adapters::{
    AcceptAllTransactions, BroadcastEventBus, Ed25519SignatureVerifier, InMemoryChainStore,
    InMemoryEventBus,
};
pub use domain::{
    decode_block, decode_header, encode_block, encode_header, Block, BlockHeader, Chain,
    ChainConfig, ChainPhase, ConsensusError, ConsensusExtension, HeaderWindow, IngestError,
    IngestResult, RegistryError, Round, SyncInfo, SyncStep, Transaction, WindowError,
};
pub use events::ChainEvent;
pub use ports::{
    BlockServiceApi, ChainStore, EventBus, SignatureVerifier, SystemTimeSource, TimeSource,
    TransactionVerifier,
};
pub use registry::ChainRegistry;
pub use rpc::{RpcHandler, RpcParams, RpcRequest, RpcResponse};
pub use service::{BlockManager, BlockService, IngestDependencies};
pub use validation::{BlockValidator, ValidationMode};
