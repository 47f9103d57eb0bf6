//! Mock stages and agents for testing.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::agent::{Agent, AgentError, AgentResponse};
use crate::context::{ContextRecord, StageInputs};
use crate::core::StageOutput;
use crate::stages::{Stage, StageSignature};

/// A stage that records the inputs it was handed and returns fixed fields.
#[derive(Debug)]
pub struct RecordingStage {
    name: String,
    signature: StageSignature,
    output: ContextRecord,
    inputs: Mutex<Vec<ContextRecord>>,
}

impl RecordingStage {
    /// Creates a recording stage returning `output`.
    ///
    /// The signature's outputs are the keys of `output`.
    #[must_use]
    pub fn new(name: impl Into<String>, signature: StageSignature, output: ContextRecord) -> Self {
        let outputs: Vec<String> = output.keys().cloned().collect();
        Self {
            name: name.into(),
            signature: signature.produces(outputs),
            output,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Returns the inputs of every call, in order.
    #[must_use]
    pub fn recorded_inputs(&self) -> Vec<ContextRecord> {
        self.inputs.lock().clone()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs.lock().len()
    }
}

#[async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &StageSignature {
        &self.signature
    }

    async fn execute(&self, inputs: StageInputs) -> StageOutput {
        self.inputs.lock().push(inputs.fields().clone());
        StageOutput::ok(self.output.clone())
    }
}

/// A stage that always fails.
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    signature: StageSignature,
    error: String,
}

impl FailingStage {
    /// Creates a failing stage with an empty signature.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: StageSignature::new(),
            error: error.into(),
        }
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &StageSignature {
        &self.signature
    }

    async fn execute(&self, _inputs: StageInputs) -> StageOutput {
        StageOutput::fail(&self.error)
    }
}

/// An agent that answers with fixed text and counts its calls.
#[derive(Debug)]
pub struct CountingAgent {
    text: String,
    prompts: Mutex<Vec<String>>,
}

impl CountingAgent {
    /// Creates an agent answering `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of runs.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Returns every prompt received, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Agent for CountingAgent {
    fn name(&self) -> &str {
        "counting_agent"
    }

    async fn run(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        self.prompts.lock().push(prompt.to_string());
        Ok(AgentResponse::text(self.text.clone()))
    }
}

/// An agent that always fails with a configuration error.
#[derive(Debug)]
pub struct FailingAgent {
    message: String,
}

impl FailingAgent {
    /// Creates an agent failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Agent for FailingAgent {
    fn name(&self) -> &str {
        "failing_agent"
    }

    async fn run(&self, _prompt: &str) -> Result<AgentResponse, AgentError> {
        Err(AgentError::Configuration(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_stage() {
        let stage = RecordingStage::new(
            "record",
            StageSignature::new().requires(["a"]),
            ContextRecord::new().with("b", 2),
        );

        let output = stage
            .execute(StageInputs::new("record", ContextRecord::new().with("a", 1)))
            .await;

        assert!(output.is_success());
        assert_eq!(output.get("b"), Some(&serde_json::json!(2)));
        assert_eq!(stage.signature().outputs, vec!["b"]);
        assert_eq!(stage.call_count(), 1);
        assert_eq!(stage.recorded_inputs()[0].get_i64("a"), Some(1));
    }

    #[tokio::test]
    async fn test_failing_stage() {
        let stage = FailingStage::new("fail", "test error");
        let output = stage
            .execute(StageInputs::new("fail", ContextRecord::new()))
            .await;

        assert!(output.is_failure());
        assert_eq!(output.error.as_deref(), Some("test error"));
    }

    #[tokio::test]
    async fn test_counting_agent() {
        let agent = CountingAgent::new("done");
        let response = agent.run("first").await.unwrap();
        agent.run("second").await.unwrap();

        assert_eq!(response.text, "done");
        assert_eq!(agent.calls(), 2);
        assert_eq!(agent.prompts(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_failing_agent() {
        let err = FailingAgent::new("offline").run("hi").await.unwrap_err();
        assert_eq!(err.to_string(), "Agent configuration error: offline");
    }
}
