//! # Fleetflow
//!
//! Tool-chain pipelines for predictive vehicle maintenance, and a
//! chat-completions bridge that puts an agent behind an HTTP endpoint.
//!
//! Fleetflow provides:
//!
//! - **Tool-chain execution**: ordered stages exchanging fields through an
//!   accumulating context, validated before anything runs
//! - **Fleet tools**: vehicle, driver, dealership and parts lookups plus the
//!   predict, cost, order, book and notify maintenance flow
//! - **Agents**: a local agent over the lookup chain and a JSON-RPC client
//!   for a remote one
//! - **Request bridge**: chat-completions requests in, server-sent chunks out
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fleetflow::prelude::*;
//!
//! let flow = maintenance_flow(FailureHorizon::default())?;
//! let run = flow
//!     .run(MaintenanceRequest::new("TRUCK-42").into_record())
//!     .await?;
//! println!("{}", run.summary().unwrap_or_default());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod agent;
pub mod bridge;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod rpc;
pub mod settings;
pub mod stages;
pub mod testing;
pub mod tools;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::{
        maintenance_agent, vehicle_maintenance_flow, Agent, AgentError, AgentResponse,
        ToolChainAgent,
    };
    #[cfg(feature = "remote")]
    pub use crate::agent::RemoteAgent;
    pub use crate::bridge::{Bridge, BridgeError, ChatCompletionRequest, ChatMessage};
    pub use crate::context::{ContextRecord, RunIdentity, StageInputs};
    pub use crate::core::{StageOutput, StageStatus};
    pub use crate::errors::{
        ContractErrorInfo, FleetflowError, MissingFieldError, PipelineValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineRun, ToolChainExecutor};
    pub use crate::settings::ServiceConfig;
    pub use crate::stages::{FnStage, Stage, StageSignature};
    pub use crate::tools::{
        agent_chain, maintenance_flow, FailureHorizon, MaintenanceRequest, ToolDefinition,
    };
}
