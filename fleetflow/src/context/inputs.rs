//! The slice of the context handed to a single stage.

use super::ContextRecord;
use crate::errors::{FleetflowError, InvalidFieldError, MissingFieldError};
use serde_json::Value;

/// Provides an immutable view of the fields a stage declared.
///
/// Only required and optional fields of the stage's signature are present;
/// everything else in the running context is hidden from the stage.
#[derive(Debug, Clone, Default)]
pub struct StageInputs {
    /// The selected fields.
    fields: ContextRecord,
    /// The name of the current stage (for error messages).
    stage_name: String,
}

impl StageInputs {
    /// Creates new stage inputs.
    #[must_use]
    pub fn new(stage_name: impl Into<String>, fields: ContextRecord) -> Self {
        Self {
            fields,
            stage_name: stage_name.into(),
        }
    }

    /// Returns the stage name these inputs were selected for.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// Gets a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Gets a required value.
    ///
    /// # Errors
    ///
    /// Returns `MissingFieldError` if the field is absent.
    pub fn require(&self, key: &str) -> Result<&Value, MissingFieldError> {
        self.fields
            .get(key)
            .ok_or_else(|| MissingFieldError::new(&self.stage_name, key))
    }

    /// Gets a required string field.
    pub fn require_str(&self, key: &str) -> Result<&str, FleetflowError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| InvalidFieldError::new(&self.stage_name, key, "a string").into())
    }

    /// Gets a required integer field.
    pub fn require_i64(&self, key: &str) -> Result<i64, FleetflowError> {
        self.require(key)?
            .as_i64()
            .ok_or_else(|| InvalidFieldError::new(&self.stage_name, key, "an integer").into())
    }

    /// Gets an optional string field.
    ///
    /// Absent fields yield `Ok(None)`; present fields of another type are an error.
    pub fn optional_str(&self, key: &str) -> Result<Option<&str>, InvalidFieldError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| InvalidFieldError::new(&self.stage_name, key, "a string")),
        }
    }

    /// Gets an optional integer field.
    pub fn optional_i64(&self, key: &str) -> Result<Option<i64>, InvalidFieldError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| InvalidFieldError::new(&self.stage_name, key, "an integer")),
        }
    }

    /// Checks if a field was selected.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains(key)
    }

    /// Returns the selected fields.
    #[must_use]
    pub fn fields(&self) -> &ContextRecord {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StageInputs {
        StageInputs::new(
            "check_cost",
            ContextRecord::new()
                .with("component", "Brake Pads")
                .with("failure_in_days", 6),
        )
    }

    #[test]
    fn test_require_present() {
        let inputs = sample();
        assert_eq!(inputs.require_str("component").unwrap(), "Brake Pads");
        assert_eq!(inputs.require_i64("failure_in_days").unwrap(), 6);
    }

    #[test]
    fn test_require_missing_names_stage_and_field() {
        let inputs = sample();
        let err = inputs.require_str("vehicle_id").unwrap_err();
        match err {
            FleetflowError::MissingField(e) => {
                assert_eq!(e.stage, "check_cost");
                assert_eq!(e.field, "vehicle_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_require_wrong_type() {
        let inputs = sample();
        assert!(matches!(
            inputs.require_i64("component"),
            Err(FleetflowError::InvalidField(_))
        ));
    }

    #[test]
    fn test_optional_fields() {
        let inputs = sample();
        assert_eq!(inputs.optional_str("vehicle_id").unwrap(), None);
        assert_eq!(inputs.optional_i64("failure_in_days").unwrap(), Some(6));
        assert!(inputs.optional_str("failure_in_days").is_err());
    }
}
