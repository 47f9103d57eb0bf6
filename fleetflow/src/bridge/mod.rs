//! Chat-completions bridge in front of an agent.
//!
//! This module provides:
//! - Chat-completions request and chunk types
//! - The bridge turning a chat request into one agent prompt
//! - The axum router serving chat, health, agent card and JSON-RPC routes

mod handler;
pub mod protocol;
mod server;

pub use handler::{extract_prompt, Bridge, BridgeError};
pub use protocol::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage};
pub use server::{router, serve, BridgeState, API_KEY_HEADER, SERVICE_NAME};
