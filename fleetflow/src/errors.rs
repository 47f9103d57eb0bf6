//! Error types for the fleetflow pipeline layer.
//!
//! Agent and bridge failures have their own enums next to the code that
//! raises them; everything a pipeline build or run can fail with lives here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum FleetflowError {
    /// The pipeline definition is inconsistent.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A stage was reached without one of its required fields.
    #[error("{0}")]
    MissingField(#[from] MissingFieldError),

    /// A field was present but held a value of the wrong shape.
    #[error("{0}")]
    InvalidField(#[from] InvalidFieldError),

    /// A stage reported failure.
    #[error("Stage '{stage}' failed: {message}")]
    StageExecution {
        /// The failing stage.
        stage: String,
        /// The error reported by the stage.
        message: String,
    },
}

impl FleetflowError {
    /// Creates a stage execution error.
    #[must_use]
    pub fn stage_execution(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageExecution {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Returns the name of the stage involved, when there is one.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::MissingField(e) => Some(&e.stage),
            Self::InvalidField(e) => Some(&e.stage),
            Self::StageExecution { stage, .. } => Some(stage),
            Self::Validation(e) => e.stages.first().map(String::as_str),
        }
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "PIPELINE-002-MISSING_FIELD").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when a pipeline definition fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the contract code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}

/// Error raised when a stage needs a field the context does not hold.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Stage '{stage}' requires field '{field}' but it is missing from the context")]
pub struct MissingFieldError {
    /// The stage that needed the field.
    pub stage: String,
    /// The missing field.
    pub field: String,
}

impl MissingFieldError {
    /// Creates a new missing field error.
    #[must_use]
    pub fn new(stage: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            field: field.into(),
        }
    }
}

/// Error raised when a field holds a value of an unexpected type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Stage '{stage}' expected field '{field}' to be {expected}")]
pub struct InvalidFieldError {
    /// The stage reading the field.
    pub stage: String,
    /// The offending field.
    pub field: String,
    /// Human readable description of the expected type.
    pub expected: String,
}

impl InvalidFieldError {
    /// Creates a new invalid field error.
    #[must_use]
    pub fn new(
        stage: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            field: field.into(),
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_stage_and_field() {
        let err = MissingFieldError::new("book_slot", "vehicle_id");
        let msg = err.to_string();
        assert!(msg.contains("book_slot"));
        assert!(msg.contains("vehicle_id"));
    }

    #[test]
    fn test_validation_error_code() {
        let err = PipelineValidationError::new("bad")
            .with_error_info(ContractErrorInfo::new("PIPELINE-004-EMPTY", "empty"));
        assert_eq!(err.code(), Some("PIPELINE-004-EMPTY"));
    }

    #[test]
    fn test_error_stage_accessor() {
        let err: FleetflowError = MissingFieldError::new("notify_driver", "driver_id").into();
        assert_eq!(err.stage(), Some("notify_driver"));

        let err = FleetflowError::stage_execution("order_parts", "out of stock");
        assert_eq!(err.stage(), Some("order_parts"));
        assert_eq!(err.to_string(), "Stage 'order_parts' failed: out of stock");
    }

    #[test]
    fn test_contract_info_context() {
        let info = ContractErrorInfo::new("X", "y")
            .with_fix_hint("reorder stages")
            .with_context_entry("field", "city");
        assert_eq!(info.context.get("field").map(String::as_str), Some("city"));
        assert_eq!(info.fix_hint.as_deref(), Some("reorder stages"));
    }
}
