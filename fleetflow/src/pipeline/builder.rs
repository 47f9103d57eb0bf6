//! Pipeline builder with validation.

use super::Pipeline;
use crate::errors::{ContractErrorInfo, PipelineValidationError};
use crate::stages::Stage;
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Stages are checked as they are added: every required field of a new
/// stage must be one of the declared input fields or an output of an
/// earlier stage. Declare input fields before adding stages.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    /// The pipeline name.
    name: String,
    /// Declared initial input fields.
    input_fields: Vec<String>,
    /// Stages in insertion order.
    stages: Vec<Arc<dyn Stage>>,
    /// Fields known to be in the context once every added stage has run.
    available: HashSet<String>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_fields: Vec::new(),
            stages: Vec::new(),
            available: HashSet::new(),
        }
    }

    /// Declares the fields every run starts with.
    #[must_use]
    pub fn input_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            self.available.insert(field.clone());
            self.input_fields.push(field);
        }
        self
    }

    /// Adds a stage to the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage name is already taken or a required
    /// field is not produced by anything before it.
    pub fn stage(mut self, runner: Arc<dyn Stage>) -> Result<Self, PipelineValidationError> {
        self.add_stage(runner)?;
        Ok(self)
    }

    /// Adds a stage in place.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn add_stage(&mut self, runner: Arc<dyn Stage>) -> Result<(), PipelineValidationError> {
        let name = runner.name().to_string();

        if self.stages.iter().any(|s| s.name() == name) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{name}' is defined twice in pipeline '{}'",
                self.name
            ))
            .with_stages(vec![name.clone()])
            .with_error_info(
                ContractErrorInfo::new(
                    "PIPELINE-003-DUPLICATE_STAGE",
                    format!("Stage '{name}' already exists"),
                )
                .with_fix_hint("Give every stage in a pipeline a unique name."),
            ));
        }

        let signature = runner.signature();
        for field in &signature.required {
            if !self.available.contains(field) {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{name}' requires field '{field}' which no earlier stage or input provides"
                ))
                .with_stages(vec![name.clone()])
                .with_error_info(
                    ContractErrorInfo::new(
                        "PIPELINE-002-MISSING_FIELD",
                        format!("Field '{field}' is not available"),
                    )
                    .with_fix_hint(
                        "Declare the field as a pipeline input or move the stage after the one producing it.",
                    )
                    .with_context_entry("field", field.clone()),
                ));
            }
        }

        self.available.extend(signature.outputs.iter().cloned());
        self.stages.push(runner);
        Ok(())
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or there are no stages.
    pub fn build(self) -> Result<Pipeline, PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "Pipeline name cannot be empty or whitespace-only",
            )
            .with_error_info(ContractErrorInfo::new(
                "PIPELINE-001-EMPTY_NAME",
                "Pipeline name is blank",
            )));
        }

        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages").with_error_info(
                ContractErrorInfo::new("PIPELINE-004-EMPTY", "Cannot build an empty pipeline")
                    .with_fix_hint("Add at least one stage to the pipeline before building."),
            ));
        }

        Ok(Pipeline::new(self.name, self.input_fields, self.stages))
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageOutput;
    use crate::stages::{FnStage, NoOpStage, StageSignature};

    fn noop(name: &str) -> Arc<dyn Stage> {
        Arc::new(NoOpStage::new(name))
    }

    fn stage(name: &str, requires: &[&str], produces: &[&str]) -> Arc<dyn Stage> {
        Arc::new(FnStage::new(
            name,
            StageSignature::new()
                .requires(requires.iter().copied())
                .produces(produces.iter().copied()),
            |_| StageOutput::ok_empty(),
        ))
    }

    #[test]
    fn test_builder_creation() {
        let builder = PipelineBuilder::new("test");
        assert_eq!(builder.name(), "test");
        assert_eq!(builder.stage_count(), 0);
    }

    #[test]
    fn test_builder_accepts_satisfied_dependencies() {
        let pipeline = PipelineBuilder::new("test")
            .input_fields(["vehicle_id"])
            .stage(stage("locate", &["vehicle_id"], &["city"]))
            .unwrap()
            .stage(stage("slots", &["city"], &["slots"]))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(pipeline.stage_names(), vec!["locate", "slots"]);
    }

    #[test]
    fn test_builder_rejects_misordered_stages() {
        let err = PipelineBuilder::new("test")
            .input_fields(["vehicle_id"])
            .stage(stage("slots", &["city"], &["slots"]))
            .unwrap_err();

        assert_eq!(err.code(), Some("PIPELINE-002-MISSING_FIELD"));
        assert_eq!(err.stages, vec!["slots"]);
        assert!(err.message.contains("'city'"));
    }

    #[test]
    fn test_builder_rejects_duplicate_names() {
        let err = PipelineBuilder::new("test")
            .stage(noop("a"))
            .unwrap()
            .stage(noop("a"))
            .unwrap_err();

        assert_eq!(err.code(), Some("PIPELINE-003-DUPLICATE_STAGE"));
    }

    #[test]
    fn test_builder_empty_build() {
        let err = PipelineBuilder::new("test").build().unwrap_err();
        assert_eq!(err.code(), Some("PIPELINE-004-EMPTY"));
    }

    #[test]
    fn test_builder_blank_name() {
        let err = PipelineBuilder::new("   ")
            .stage(noop("a"))
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(err.code(), Some("PIPELINE-001-EMPTY_NAME"));
    }
}
