//! Sequential tool-chain executor.
//!
//! Runs the stages of a [`Pipeline`] one after another, handing each stage
//! the fields it declared and merging what it returns into the running
//! context.

use super::Pipeline;
use crate::context::{ContextRecord, RunIdentity, StageInputs};
use crate::errors::{FleetflowError, MissingFieldError};
use crate::events::{EventSink, NoOpEventSink, PipelineEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span, Instrument};

/// What a single stage did during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    /// The stage name.
    pub stage: String,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
    /// Fields the stage wrote into the context.
    pub fields: Vec<String>,
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// The identity of this run.
    pub identity: RunIdentity,
    /// The pipeline name.
    pub pipeline: String,
    /// The final context after the last stage.
    pub context: ContextRecord,
    /// One record per executed stage, in order.
    pub stages: Vec<StageRecord>,
    /// Total execution time in milliseconds.
    pub duration_ms: f64,
}

impl PipelineRun {
    /// Returns the notification summary of the run.
    ///
    /// Reads the `summary` field, falling back to `message`.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.context
            .get_str("summary")
            .or_else(|| self.context.get_str("message"))
    }

    /// Consumes the run into its final context.
    #[must_use]
    pub fn into_context(self) -> ContextRecord {
        self.context
    }
}

/// Executes pipelines stage by stage.
#[derive(Clone)]
pub struct ToolChainExecutor {
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for ToolChainExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolChainExecutor").finish_non_exhaustive()
    }
}

impl Default for ToolChainExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolChainExecutor {
    /// Creates an executor that discards lifecycle events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Runs a pipeline with a fresh run identity.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        initial: ContextRecord,
    ) -> Result<PipelineRun, FleetflowError> {
        self.run_with_identity(pipeline, initial, RunIdentity::new())
            .await
    }

    /// Runs a pipeline.
    ///
    /// The context starts as `initial`. Each stage receives the subset of
    /// the context named in its signature; a missing required field fails
    /// the run before the stage is invoked. A successful stage's fields are
    /// merged into the context, overwriting fields of the same name.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when a required field is absent and
    /// `StageExecution` when a stage reports failure.
    pub async fn run_with_identity(
        &self,
        pipeline: &Pipeline,
        initial: ContextRecord,
        identity: RunIdentity,
    ) -> Result<PipelineRun, FleetflowError> {
        let start = Instant::now();
        let run_id = identity.pipeline_run_id;
        let event = |event_type: &str| PipelineEvent::new(event_type, pipeline.name(), run_id);

        self.event_sink
            .emit(&event("pipeline.started").with_data(serde_json::json!({
                "stages": pipeline.stage_names(),
                "input_fields": initial.keys().collect::<Vec<_>>(),
            })))
            .await;

        let mut context = initial;
        let mut records = Vec::with_capacity(pipeline.stage_count());

        for stage in pipeline.stages() {
            let name = stage.name();
            let span = info_span!(
                "stage",
                pipeline = %pipeline.name(),
                stage = %name,
                run_id = %run_id
            );

            let outcome = async {
                let signature = stage.signature();
                if let Some(field) = signature.required.iter().find(|f| !context.contains(f)) {
                    return Err(FleetflowError::from(MissingFieldError::new(name, field.as_str())));
                }

                let inputs = StageInputs::new(name, context.select(signature.inputs()));
                self.event_sink
                    .emit(&event("stage.started").with_stage(name))
                    .await;
                debug!(fields = ?inputs.fields().keys().collect::<Vec<_>>(), "Invoking stage");

                let stage_start = Instant::now();
                let output = stage.execute(inputs).await;
                let duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0;

                if output.is_failure() {
                    let message = output.error.unwrap_or_else(|| "unknown error".to_string());
                    return Err(FleetflowError::stage_execution(name, message));
                }

                let fields: Vec<String> = output.data.keys().cloned().collect();
                debug!(duration_ms, fields = ?fields, "Stage completed");
                self.event_sink
                    .emit(
                        &event("stage.completed")
                            .with_stage(name)
                            .with_data(serde_json::json!({
                                "duration_ms": duration_ms,
                                "fields": fields,
                            })),
                    )
                    .await;

                context.merge(output.data);
                Ok(StageRecord {
                    stage: name.to_string(),
                    duration_ms,
                    fields,
                })
            }
            .instrument(span)
            .await;

            match outcome {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!(
                        pipeline = %pipeline.name(),
                        stage = %name,
                        error = %e,
                        "Pipeline stage failed"
                    );
                    self.event_sink
                        .emit(
                            &event("stage.failed")
                                .with_stage(name)
                                .with_data(serde_json::json!({ "error": e.to_string() })),
                        )
                        .await;
                    self.event_sink
                        .emit(
                            &event("pipeline.failed").with_data(serde_json::json!({
                                "stage": name,
                                "error": e.to_string(),
                            })),
                        )
                        .await;
                    return Err(e);
                }
            }
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.event_sink
            .emit(&event("pipeline.completed").with_data(serde_json::json!({
                "duration_ms": duration_ms,
                "fields": context.keys().collect::<Vec<_>>(),
            })))
            .await;

        Ok(PipelineRun {
            identity,
            pipeline: pipeline.name().to_string(),
            context,
            stages: records,
            duration_ms,
        })
    }
}
