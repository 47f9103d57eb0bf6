//! Vehicle maintenance flow delegating to an agent.

use super::Agent;
use crate::context::{ContextRecord, StageInputs};
use crate::core::StageOutput;
use crate::errors::PipelineValidationError;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::{Stage, StageSignature};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Name of the agent-backed maintenance pipeline.
pub const VEHICLE_MAINTENANCE_FLOW: &str = "vehicle_maintenance_flow";

struct AgentStage {
    agent: Arc<dyn Agent>,
    signature: StageSignature,
}

impl fmt::Debug for AgentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentStage")
            .field("agent", &self.agent.name())
            .finish()
    }
}

#[async_trait]
impl Stage for AgentStage {
    fn name(&self) -> &str {
        "predict_vehicle_maintenance"
    }

    fn signature(&self) -> &StageSignature {
        &self.signature
    }

    async fn execute(&self, inputs: StageInputs) -> StageOutput {
        let vehicle_id = match inputs.require_str("vehicle_id") {
            Ok(id) => id,
            Err(e) => return StageOutput::fail(e.to_string()),
        };

        let prompt = format!("Predict maintenance for vehicle {vehicle_id}");
        match self.agent.run(&prompt).await {
            Ok(response) => StageOutput::ok(
                ContextRecord::new()
                    .with("vehicle_id", vehicle_id)
                    .with("result", response.text),
            ),
            Err(e) => {
                warn!(agent = %self.agent.name(), vehicle_id, error = %e, "Agent call failed");
                StageOutput::fail(e.to_string())
            }
        }
    }
}

/// Wraps an agent as the `predict_vehicle_maintenance` stage.
///
/// Requires `vehicle_id`; produces the agent's answer as `result`.
pub fn predict_vehicle_maintenance(agent: Arc<dyn Agent>) -> Arc<dyn Stage> {
    Arc::new(AgentStage {
        agent,
        signature: StageSignature::new()
            .requires(["vehicle_id"])
            .produces(["vehicle_id", "result"]),
    })
}

/// Builds the single-stage pipeline asking an agent about one vehicle.
pub fn vehicle_maintenance_flow(
    agent: Arc<dyn Agent>,
) -> Result<Pipeline, PipelineValidationError> {
    PipelineBuilder::new(VEHICLE_MAINTENANCE_FLOW)
        .input_fields(["vehicle_id"])
        .stage(predict_vehicle_maintenance(agent))?
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, AgentResponse, MockAgent};
    use crate::errors::FleetflowError;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_flow_prompts_agent_with_vehicle() {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("mock".to_string());
        agent
            .expect_run()
            .with(eq("Predict maintenance for vehicle TRUCK-9"))
            .times(1)
            .returning(|_| Ok(AgentResponse::text("replace brake pads")));

        let run = vehicle_maintenance_flow(Arc::new(agent))
            .unwrap()
            .run(ContextRecord::new().with("vehicle_id", "TRUCK-9"))
            .await
            .unwrap();

        assert_eq!(run.context.get_str("result"), Some("replace brake pads"));
        assert_eq!(run.context.get_str("vehicle_id"), Some("TRUCK-9"));
    }

    #[tokio::test]
    async fn test_agent_failure_fails_the_run() {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("mock".to_string());
        agent
            .expect_run()
            .returning(|_| Err(AgentError::Transport("connection refused".to_string())));

        let err = vehicle_maintenance_flow(Arc::new(agent))
            .unwrap()
            .run(ContextRecord::new().with("vehicle_id", "TRUCK-9"))
            .await
            .unwrap_err();

        match err {
            FleetflowError::StageExecution { stage, message } => {
                assert_eq!(stage, "predict_vehicle_maintenance");
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
