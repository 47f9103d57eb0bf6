//! Context management for pipeline execution.
//!
//! This module provides:
//! - The accumulating context record threaded through a run
//! - Per-stage input views restricted to declared fields
//! - Run identity for correlating runs with requests

mod identity;
mod inputs;
mod record;

pub use identity::RunIdentity;
pub use inputs::StageInputs;
pub use record::ContextRecord;
