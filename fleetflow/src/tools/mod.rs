//! Fleet maintenance tools.
//!
//! This module provides:
//! - Tool definitions and the stage adapter for tool functions
//! - The agent lookup tools and their chain
//! - The predictive maintenance flow tools and their pipeline

mod definitions;
mod fleet;
mod maintenance;

pub use definitions::{ToolDefinition, ToolPermission, ToolStage};
pub use fleet::{
    agent_chain, get_dealership_slots, get_driver_schedule, get_parts_inventory,
    get_vehicle_location, AGENT_CHAIN, DEFAULT_COMPONENT, DEFAULT_DRIVER_ID,
};
pub use maintenance::{
    book_slot, check_cost, maintenance_flow, notify_driver, order_parts, predict_failure,
    FailureHorizon, MaintenanceRequest, MAINTENANCE_FLOW, PREDICTED_COMPONENT, SERVICE_SLOT,
};
