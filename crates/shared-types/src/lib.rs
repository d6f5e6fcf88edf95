//! # Shared Types Crate
//!
//! Primitive aliases, the chain identifier, the canonical error codes and the
//! `{code, msg, data}` response envelope used at the RPC boundary.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every crate uses these aliases for digests
//!   and keys instead of redefining them.
//! - **Envelope Integrity**: every boundary operation answers with a
//!   [`ResponseEnvelope`], success or failure.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::ResponseEnvelope;
pub use errors::*;
