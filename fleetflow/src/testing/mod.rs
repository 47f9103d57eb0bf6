//! Testing utilities for fleetflow pipelines and agents.
//!
//! This module provides:
//! - Recording and failing stages
//! - Counting and failing agents
//! - Assertions for stage outputs and context records

mod assertions;
mod mocks;

pub use assertions::{
    assert_output_contains, assert_output_failed, assert_output_succeeded,
    assert_record_has_fields, assert_record_superset,
};
pub use mocks::{CountingAgent, FailingAgent, FailingStage, RecordingStage};
