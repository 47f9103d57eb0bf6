//! JSON-RPC interface to the agent.
//!
//! The method name that runs the agent is configuration, not a constant:
//! the collaborating service decides it.

mod dispatch;
pub mod protocol;

pub use dispatch::RpcDispatcher;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
