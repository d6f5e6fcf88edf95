//! Domain layer for block ingestion
//!
//! - wire/codec: binary framing of headers and blocks
//! - window: the bounded per-chain header window
//! - chain: per-chain runtime state and logger table
//! - round: producer rounds consumed by validation

mod block;
mod chain;
mod codec;
mod config;
mod error;
mod round;
mod sync;
mod window;
pub mod wire;

pub use block::*;
pub use chain::*;
pub use codec::*;
pub use config::*;
pub use error::*;
pub use round::*;
pub use sync::*;
pub use window::*;
pub use wire::{CodecError, CodecResult, WireDecode, WireEncode};
