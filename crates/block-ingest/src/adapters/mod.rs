//! Adapters layer (Hexagonal Architecture)

mod chain_store;
mod event_bus;
mod signature;
mod transactions;

pub use chain_store::*;
pub use event_bus::*;
pub use signature::*;
pub use transactions::*;
