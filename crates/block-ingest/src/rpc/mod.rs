//! RPC boundary: method names, parameter coercion, line handler.

mod handler;
pub mod params;

pub use handler::{RpcHandler, RpcRequest, RpcResponse};
pub use params::RpcParams;

pub const METHOD_ADD_BLOCK: &str = "addBlock";
pub const METHOD_CHAIN_ROLL_BACK: &str = "chainRollBack";
pub const METHOD_RECEIVE_HEADER_LIST: &str = "receiveHeaderList";
pub const METHOD_VALID_BLOCK: &str = "validBlock";
