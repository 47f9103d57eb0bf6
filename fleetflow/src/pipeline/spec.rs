//! Pipeline definition.

use super::{PipelineRun, ToolChainExecutor};
use crate::context::ContextRecord;
use crate::errors::FleetflowError;
use crate::stages::Stage;
use crate::tools::ToolDefinition;
use std::sync::Arc;

/// An ordered sequence of stages plus the fields a run starts from.
///
/// Pipelines are built and validated by [`super::PipelineBuilder`]; once
/// built they are immutable and may be run any number of times.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// The pipeline name.
    name: String,
    /// Fields the initial input is expected to carry.
    input_fields: Vec<String>,
    /// Stages in execution order.
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub(super) fn new(
        name: String,
        input_fields: Vec<String>,
        stages: Vec<Arc<dyn Stage>>,
    ) -> Self {
        Self {
            name,
            input_fields,
            stages,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared initial input fields.
    #[must_use]
    pub fn input_fields(&self) -> &[String] {
        &self.input_fields
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Returns the definitions of the tool stages, in execution order.
    ///
    /// Stages that do not wrap a tool are skipped.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<&ToolDefinition> {
        self.stages.iter().filter_map(|s| s.definition()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs the pipeline with a default executor (no event sink).
    pub async fn run(&self, initial: ContextRecord) -> Result<PipelineRun, FleetflowError> {
        ToolChainExecutor::new().run(self, initial).await
    }
}
