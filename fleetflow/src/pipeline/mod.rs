//! Pipeline building and execution.
//!
//! This module provides:
//! - Pipeline definitions
//! - Pipeline builder with static field-dependency validation
//! - The sequential tool-chain executor

mod builder;
mod executor;
mod spec;

pub use builder::PipelineBuilder;
pub use executor::{PipelineRun, StageRecord, ToolChainExecutor};
pub use spec::Pipeline;
