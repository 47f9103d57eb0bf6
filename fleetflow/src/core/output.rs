//! Stage output type with factory methods.

use super::StageStatus;
use crate::context::ContextRecord;
use crate::errors::FleetflowError;
use serde::{Deserialize, Serialize};

/// The output of a stage execution.
///
/// A successful output carries the fields the stage contributes to the
/// running context; a failed output carries an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    /// The status of the stage execution.
    pub status: StageStatus,

    /// The fields returned by the stage.
    #[serde(default)]
    pub data: ContextRecord,

    /// Error message (for failed executions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for StageOutput {
    fn default() -> Self {
        Self::ok_empty()
    }
}

impl StageOutput {
    /// Creates a successful output with data.
    #[must_use]
    pub fn ok(data: ContextRecord) -> Self {
        Self {
            status: StageStatus::Ok,
            data,
            error: None,
        }
    }

    /// Creates a successful output with no data.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self::ok(ContextRecord::new())
    }

    /// Creates a successful output with a single value.
    #[must_use]
    pub fn ok_value(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::ok(ContextRecord::new().with(key, value))
    }

    /// Creates a failure output with an error message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Fail,
            data: ContextRecord::new(),
            error: Some(error.into()),
        }
    }

    /// Returns true if the output indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the output indicates failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Gets a value from the data.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

impl From<Result<ContextRecord, FleetflowError>> for StageOutput {
    fn from(result: Result<ContextRecord, FleetflowError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
