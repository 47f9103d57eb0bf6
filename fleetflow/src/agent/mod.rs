//! Agents turn a natural language prompt into a final text answer.
//!
//! This module provides:
//! - The [`Agent`] trait the bridge and the maintenance flow call into
//! - A local agent driving a tool chain
//! - A JSON-RPC client agent for a remote agent service
//! - The vehicle maintenance flow built on top of any agent

mod flow;
#[cfg(feature = "remote")]
mod remote;
mod tool_chain;

pub use flow::{predict_vehicle_maintenance, vehicle_maintenance_flow, VEHICLE_MAINTENANCE_FLOW};
#[cfg(feature = "remote")]
pub use remote::RemoteAgent;
pub use tool_chain::{maintenance_agent, render_fleet_report, ContextRenderer, ToolChainAgent};

use crate::context::ContextRecord;
use crate::errors::FleetflowError;
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// The final answer of an agent run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    /// The text handed back to the caller.
    pub text: String,
    /// The final pipeline context, for agents that run one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextRecord>,
}

impl AgentResponse {
    /// Creates a text-only response.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }
}

/// Errors raised while running an agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The prompt does not name a vehicle.
    #[error("No vehicle id found in prompt: {0:?}")]
    MissingVehicleId(String),

    /// The agent's pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] FleetflowError),

    /// The agent could not be assembled.
    #[error("Agent configuration error: {0}")]
    Configuration(String),

    /// The remote agent could not be reached.
    #[error("Remote agent request failed: {0}")]
    Transport(String),

    /// The remote agent answered with a JSON-RPC error.
    #[error("Remote agent returned error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The remote agent answered with something unexpected.
    #[error("Malformed remote agent response: {0}")]
    MalformedResponse(String),
}

/// An agent answering prompts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name, used in logs.
    fn name(&self) -> &str;

    /// Returns the tools the agent may call, advertised on the agent card.
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Runs the agent to completion on a prompt.
    async fn run(&self, prompt: &str) -> Result<AgentResponse, AgentError>;
}
