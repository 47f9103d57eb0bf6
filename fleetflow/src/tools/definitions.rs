//! Tool definitions and the stage adapter wrapping tool functions.

use crate::context::{ContextRecord, StageInputs};
use crate::core::StageOutput;
use crate::errors::FleetflowError;
use crate::stages::{Stage, StageSignature};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a tool only reads state or also changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPermission {
    /// The tool only looks things up.
    ReadOnly,
    /// The tool books, orders or notifies.
    ReadWrite,
}

impl fmt::Display for ToolPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read_only"),
            Self::ReadWrite => write!(f, "read_write"),
        }
    }
}

/// Definition of a tool that can be run as a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name, also used as the stage name.
    pub name: String,
    /// Description of what the tool does.
    pub description: String,
    /// The tool's permission level.
    pub permission: ToolPermission,
    /// Fields the tool reads and writes.
    pub signature: StageSignature,
}

impl ToolDefinition {
    /// Creates a new read-only tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, signature: StageSignature) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            permission: ToolPermission::ReadOnly,
            signature,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Sets the permission.
    #[must_use]
    pub fn with_permission(mut self, permission: ToolPermission) -> Self {
        self.permission = permission;
        self
    }
}

/// A tool function paired with its definition.
///
/// Errors returned by the function become failed stage outputs.
pub struct ToolStage<F>
where
    F: Fn(&StageInputs) -> Result<ContextRecord, FleetflowError> + Send + Sync,
{
    definition: ToolDefinition,
    func: F,
}

impl<F> ToolStage<F>
where
    F: Fn(&StageInputs) -> Result<ContextRecord, FleetflowError> + Send + Sync,
{
    /// Creates a new tool stage.
    pub fn new(definition: ToolDefinition, func: F) -> Self {
        Self { definition, func }
    }
}

impl<F> fmt::Debug for ToolStage<F>
where
    F: Fn(&StageInputs) -> Result<ContextRecord, FleetflowError> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolStage")
            .field("name", &self.definition.name)
            .field("permission", &self.definition.permission)
            .finish()
    }
}

#[async_trait]
impl<F> Stage for ToolStage<F>
where
    F: Fn(&StageInputs) -> Result<ContextRecord, FleetflowError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn signature(&self) -> &StageSignature {
        &self.definition.signature
    }

    fn definition(&self) -> Option<&ToolDefinition> {
        Some(&self.definition)
    }

    async fn execute(&self, inputs: StageInputs) -> StageOutput {
        (self.func)(&inputs).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition_creation() {
        let def = ToolDefinition::new("lookup", StageSignature::new().requires(["id"]))
            .with_description("Looks things up");

        assert_eq!(def.name, "lookup");
        assert_eq!(def.permission, ToolPermission::ReadOnly);
        assert_eq!(def.signature.required, vec!["id"]);
    }

    #[test]
    fn test_permission_serialization() {
        let json = serde_json::to_string(&ToolPermission::ReadWrite).unwrap();
        assert_eq!(json, "\"read_write\"");
        assert_eq!(ToolPermission::ReadOnly.to_string(), "read_only");
    }

    #[tokio::test]
    async fn test_tool_stage_maps_errors_to_failures() {
        let stage = ToolStage::new(
            ToolDefinition::new("needs_id", StageSignature::new().requires(["id"])),
            |inputs: &StageInputs| {
                let id = inputs.require_str("id")?;
                Ok(ContextRecord::new().with("echo", id))
            },
        );

        let ok = stage
            .execute(StageInputs::new("needs_id", ContextRecord::new().with("id", "x")))
            .await;
        assert_eq!(ok.get("echo"), Some(&serde_json::json!("x")));

        let failed = stage.execute(StageInputs::new("needs_id", ContextRecord::new())).await;
        assert!(failed.is_failure());
    }

    #[test]
    fn test_tool_stage_exposes_definition() {
        let stage: Box<dyn Stage> = Box::new(ToolStage::new(
            ToolDefinition::new("book", StageSignature::new())
                .with_description("Books a slot")
                .with_permission(ToolPermission::ReadWrite),
            |_: &StageInputs| Ok(ContextRecord::new()),
        ));

        let definition = stage.definition().unwrap();
        assert_eq!(definition.description, "Books a slot");
        assert_eq!(definition.permission, ToolPermission::ReadWrite);
        assert!(crate::stages::NoOpStage::new("plain").definition().is_none());
    }
}
