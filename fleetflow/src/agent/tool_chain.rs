//! Local agent driving a tool chain.

use super::{Agent, AgentError, AgentResponse};
use crate::context::ContextRecord;
use crate::pipeline::{Pipeline, ToolChainExecutor};
use crate::settings::AgentConfig;
use crate::tools::{agent_chain, ToolDefinition};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns the final context of a run into the answer text.
pub type ContextRenderer = Arc<dyn Fn(&ContextRecord) -> String + Send + Sync>;

const DEFAULT_VEHICLE_PATTERN: &str = r"\b[A-Z][A-Z0-9]*-\d+\b";

/// An agent that answers by running a fixed tool chain.
///
/// The vehicle id is located in the prompt with a regex and seeded into the
/// initial context together with any configured defaults.
pub struct ToolChainAgent {
    name: String,
    pipeline: Arc<Pipeline>,
    executor: ToolChainExecutor,
    vehicle_pattern: Regex,
    seed: ContextRecord,
    renderer: ContextRenderer,
}

impl fmt::Debug for ToolChainAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolChainAgent")
            .field("name", &self.name)
            .field("pipeline", &self.pipeline.name())
            .field("vehicle_pattern", &self.vehicle_pattern.as_str())
            .finish_non_exhaustive()
    }
}

impl ToolChainAgent {
    /// Creates an agent over a pipeline that renders the context as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the built-in vehicle pattern fails to compile.
    pub fn new(name: impl Into<String>, pipeline: Pipeline) -> Result<Self, AgentError> {
        Ok(Self {
            name: name.into(),
            pipeline: Arc::new(pipeline),
            executor: ToolChainExecutor::new(),
            vehicle_pattern: compile_pattern(DEFAULT_VEHICLE_PATTERN)?,
            seed: ContextRecord::new(),
            renderer: Arc::new(render_json),
        })
    }

    /// Sets the executor, e.g. one with a logging event sink.
    #[must_use]
    pub fn with_executor(mut self, executor: ToolChainExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Sets fields seeded into every run.
    #[must_use]
    pub fn with_seed(mut self, seed: ContextRecord) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the regex used to find the vehicle id.
    pub fn with_vehicle_pattern(mut self, pattern: &str) -> Result<Self, AgentError> {
        self.vehicle_pattern = compile_pattern(pattern)?;
        Ok(self)
    }

    /// Sets the renderer for the answer text.
    #[must_use]
    pub fn with_renderer(mut self, renderer: ContextRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Returns the pipeline run by this agent.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Builds the initial context for a prompt.
    ///
    /// # Errors
    ///
    /// Returns `MissingVehicleId` when the pattern does not match.
    pub fn initial_context(&self, prompt: &str) -> Result<ContextRecord, AgentError> {
        let vehicle_id = self
            .vehicle_pattern
            .find(prompt)
            .ok_or_else(|| AgentError::MissingVehicleId(prompt.to_string()))?;

        let mut context = self.seed.clone();
        context.insert("vehicle_id", vehicle_id.as_str());
        Ok(context)
    }
}

#[async_trait]
impl Agent for ToolChainAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        self.pipeline
            .tool_definitions()
            .into_iter()
            .cloned()
            .collect()
    }

    async fn run(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        let initial = self.initial_context(prompt)?;
        debug!(
            agent = %self.name,
            vehicle_id = ?initial.get_str("vehicle_id"),
            "Starting tool chain"
        );

        let run = self.executor.run(&self.pipeline, initial).await?;
        info!(
            agent = %self.name,
            run_id = %run.identity.pipeline_run_id,
            duration_ms = run.duration_ms,
            "Tool chain finished"
        );

        let text = (self.renderer)(&run.context);
        Ok(AgentResponse {
            text,
            context: Some(run.into_context()),
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, AgentError> {
    Regex::new(pattern)
        .map_err(|e| AgentError::Configuration(format!("invalid vehicle id pattern: {e}")))
}

fn render_json(context: &ContextRecord) -> String {
    serde_json::to_string_pretty(context).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn first_str<'a>(context: &'a ContextRecord, key: &str) -> Option<&'a str> {
    context
        .get(key)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
}

fn joined(context: &ContextRecord, key: &str) -> String {
    let items: Vec<&str> = context
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Renders the fleet lookup context as a short maintenance report.
#[must_use]
pub fn render_fleet_report(context: &ContextRecord) -> String {
    let vehicle = context.get_str("vehicle_id").unwrap_or("unknown");
    let city = context.get_str("city").unwrap_or("unknown");
    let driver = context.get_str("driver_id").unwrap_or("unknown");
    let component = context.get_str("component").unwrap_or("unknown");
    let stock = context.get_i64("stock").unwrap_or(0);
    let slot = first_str(context, "slots");

    let mut report = format!(
        "Maintenance plan for {vehicle}\n\
         - Location: {city}\n\
         - Driver {driver} availability: {}\n\
         - Dealership slots: {}\n\
         - {component} in stock: {stock}\n",
        joined(context, "availability"),
        joined(context, "slots"),
    );

    let action = match (slot, stock > 0) {
        (Some(slot), true) => {
            format!("Book the {slot} slot in {city} and reserve {component} from inventory.")
        }
        (Some(slot), false) => {
            format!("Order {component} now and book the {slot} slot in {city}.")
        }
        (None, _) => format!("No dealership slot is open in {city}; retry later."),
    };
    report.push_str("Recommended action: ");
    report.push_str(&action);
    report
}

/// Builds the local maintenance agent over the fleet lookup chain.
///
/// # Errors
///
/// Returns `Configuration` when the chain or the vehicle pattern is invalid.
pub fn maintenance_agent(
    config: &AgentConfig,
    executor: ToolChainExecutor,
) -> Result<ToolChainAgent, AgentError> {
    let chain = agent_chain().map_err(|e| AgentError::Configuration(e.to_string()))?;
    let seed = ContextRecord::new()
        .with("driver_id", config.default_driver_id.as_str())
        .with("component", config.default_component.as_str());

    Ok(ToolChainAgent::new("fleet_maintenance_agent", chain)?
        .with_executor(executor)
        .with_seed(seed)
        .with_vehicle_pattern(&config.vehicle_id_pattern)?
        .with_renderer(Arc::new(render_fleet_report)))
}
