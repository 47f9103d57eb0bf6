//! Fleet lookup tools used by the maintenance agent.
//!
//! The agent calls these in a fixed order: locate the vehicle, read the
//! driver's schedule, list dealership slots in the vehicle's city, then
//! check parts stock. The data is canned.

use super::{ToolDefinition, ToolStage};
use crate::context::{ContextRecord, StageInputs};
use crate::errors::{FleetflowError, PipelineValidationError};
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::{Stage, StageSignature};
use std::sync::Arc;

/// Driver looked up when the context names none.
pub const DEFAULT_DRIVER_ID: &str = "driver-1";

/// Component checked when the context names none.
pub const DEFAULT_COMPONENT: &str = "Brake Pads";

/// Name of the agent lookup pipeline.
pub const AGENT_CHAIN: &str = "fleet_agent_chain";

fn vehicle_location(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let vehicle_id = inputs.require_str("vehicle_id")?;
    Ok(ContextRecord::new()
        .with("vehicle_id", vehicle_id)
        .with("city", "San Francisco"))
}

fn driver_schedule(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let driver_id = inputs.optional_str("driver_id")?.unwrap_or(DEFAULT_DRIVER_ID);
    Ok(ContextRecord::new()
        .with("driver_id", driver_id)
        .with("availability", serde_json::json!(["2025-11-22T14:00:00"])))
}

fn dealership_slots(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let city = inputs.require_str("city")?;
    Ok(ContextRecord::new()
        .with("city", city)
        .with("slots", serde_json::json!(["2025-11-22T15:00:00"])))
}

fn parts_inventory(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let component = inputs.optional_str("component")?.unwrap_or(DEFAULT_COMPONENT);
    Ok(ContextRecord::new()
        .with("component", component)
        .with("stock", 5))
}

/// Returns the current city of a vehicle.
pub fn get_vehicle_location() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "get_vehicle_location",
            StageSignature::new()
                .requires(["vehicle_id"])
                .produces(["vehicle_id", "city"]),
        )
        .with_description("Get the current city for the given vehicle ID."),
        vehicle_location,
    ))
}

/// Returns the schedule availability of a driver.
pub fn get_driver_schedule() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "get_driver_schedule",
            StageSignature::new()
                .accepts(["driver_id"])
                .produces(["driver_id", "availability"]),
        )
        .with_description("Get the schedule availability for the driver."),
        driver_schedule,
    ))
}

/// Returns dealership service slots in a city.
pub fn get_dealership_slots() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "get_dealership_slots",
            StageSignature::new()
                .requires(["city"])
                .produces(["city", "slots"]),
        )
        .with_description("Get dealership service slots available in a given city."),
        dealership_slots,
    ))
}

/// Returns the stock count of a component.
pub fn get_parts_inventory() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "get_parts_inventory",
            StageSignature::new()
                .accepts(["component"])
                .produces(["component", "stock"]),
        )
        .with_description("Check inventory count for a specific vehicle component."),
        parts_inventory,
    ))
}

/// Builds the agent lookup chain, starting from `vehicle_id`.
pub fn agent_chain() -> Result<Pipeline, PipelineValidationError> {
    PipelineBuilder::new(AGENT_CHAIN)
        .input_fields(["vehicle_id"])
        .stage(get_vehicle_location())?
        .stage(get_driver_schedule())?
        .stage(get_dealership_slots())?
        .stage(get_parts_inventory())?
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_agent_chain_from_vehicle_id() {
        let run = agent_chain()
            .unwrap()
            .run(ContextRecord::new().with("vehicle_id", "TRUCK-22"))
            .await
            .unwrap();

        for field in ["city", "availability", "slots", "stock"] {
            assert!(run.context.contains(field), "missing {field}");
        }
        assert_eq!(run.context.get_str("city"), Some("San Francisco"));
        assert_eq!(run.context.get_str("driver_id"), Some(DEFAULT_DRIVER_ID));
        assert_eq!(run.context.get_str("component"), Some(DEFAULT_COMPONENT));
        assert_eq!(run.context.get_i64("stock"), Some(5));
    }

    #[tokio::test]
    async fn test_agent_chain_respects_seeded_driver() {
        let run = agent_chain()
            .unwrap()
            .run(
                ContextRecord::new()
                    .with("vehicle_id", "VAN-7")
                    .with("driver_id", "driver-9")
                    .with("component", "Oil Filter"),
            )
            .await
            .unwrap();

        assert_eq!(run.context.get_str("driver_id"), Some("driver-9"));
        assert_eq!(run.context.get_str("component"), Some("Oil Filter"));
    }

    #[test]
    fn test_agent_chain_order() {
        let chain = agent_chain().unwrap();
        assert_eq!(
            chain.stage_names(),
            vec![
                "get_vehicle_location",
                "get_driver_schedule",
                "get_dealership_slots",
                "get_parts_inventory"
            ]
        );
    }
}
