//! Stage trait and implementations.
//!
//! Stages are the fundamental units of work in a fleetflow pipeline. Each
//! one reads the fields its signature declares and returns the fields it
//! contributes to the running context.

mod signature;

pub use signature::StageSignature;

use crate::context::StageInputs;
use crate::core::StageOutput;
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Returns the fields the stage reads and writes.
    fn signature(&self) -> &StageSignature;

    /// Returns the tool definition when the stage wraps a tool.
    fn definition(&self) -> Option<&ToolDefinition> {
        None
    }

    /// Executes the stage.
    ///
    /// # Arguments
    ///
    /// * `inputs` - The context fields declared in the signature
    ///
    /// # Returns
    ///
    /// The stage output indicating success or failure.
    async fn execute(&self, inputs: StageInputs) -> StageOutput;
}

/// A simple function-based stage.
///
/// Plain functions over `StageInputs` become stages by pairing them with a
/// name and a signature.
pub struct FnStage<F>
where
    F: Fn(&StageInputs) -> StageOutput + Send + Sync,
{
    name: String,
    signature: StageSignature,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&StageInputs) -> StageOutput + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, signature: StageSignature, func: F) -> Self {
        Self {
            name: name.into(),
            signature,
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(&StageInputs) -> StageOutput + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&StageInputs) -> StageOutput + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &StageSignature {
        &self.signature
    }

    async fn execute(&self, inputs: StageInputs) -> StageOutput {
        (self.func)(&inputs)
    }
}

/// A no-op stage for testing.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    name: String,
    signature: StageSignature,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: StageSignature::new(),
        }
    }
}

#[async_trait]
impl Stage for NoOpStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &StageSignature {
        &self.signature
    }

    async fn execute(&self, _inputs: StageInputs) -> StageOutput {
        StageOutput::ok_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextRecord;

    #[tokio::test]
    async fn test_fn_stage() {
        let stage = FnStage::new(
            "echo",
            StageSignature::new().requires(["x"]).produces(["y"]),
            |inputs| match inputs.require_i64("x") {
                Ok(x) => StageOutput::ok_value("y", x + 1),
                Err(e) => StageOutput::fail(e.to_string()),
            },
        );

        assert_eq!(stage.name(), "echo");
        assert_eq!(stage.signature().outputs, vec!["y"]);

        let inputs = StageInputs::new("echo", ContextRecord::new().with("x", 1));
        let output = stage.execute(inputs).await;
        assert_eq!(output.get("y"), Some(&serde_json::json!(2)));
    }

    #[tokio::test]
    async fn test_noop_stage() {
        let stage = NoOpStage::new("noop");
        assert_eq!(stage.name(), "noop");

        let output = stage.execute(StageInputs::default()).await;
        assert!(output.is_success());
        assert!(output.data.is_empty());
    }
}
