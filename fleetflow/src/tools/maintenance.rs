//! Predictive maintenance flow tools.
//!
//! Predict a failure, price it, order parts, book a slot and tell the
//! driver. Each tool passes through the identifiers later tools need.

use super::{ToolDefinition, ToolPermission, ToolStage, DEFAULT_DRIVER_ID};
use crate::context::{ContextRecord, StageInputs};
use crate::errors::{FleetflowError, PipelineValidationError};
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::{Stage, StageSignature};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the maintenance pipeline.
pub const MAINTENANCE_FLOW: &str = "predictive_maintenance_flow";

/// Component every prediction currently points at.
pub const PREDICTED_COMPONENT: &str = "Brake Pads";

/// Service slot handed out by the booking tool.
pub const SERVICE_SLOT: &str = "2025-11-22T15:00:00";

/// How far out `predict_failure` places the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureHorizon {
    /// Uniformly random number of days in `min..=max`.
    Random {
        /// Lower bound in days.
        min: i64,
        /// Upper bound in days.
        max: i64,
    },
    /// Always the same number of days.
    Fixed(i64),
}

impl Default for FailureHorizon {
    fn default() -> Self {
        Self::Random { min: 5, max: 12 }
    }
}

impl FailureHorizon {
    fn sample(self) -> i64 {
        match self {
            Self::Fixed(days) => days,
            Self::Random { min, max } if min >= max => min,
            Self::Random { min, max } => rand::thread_rng().gen_range(min..=max),
        }
    }
}

/// Input of the maintenance flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    /// Vehicle to check.
    pub vehicle_id: String,
    /// Driver to notify.
    #[serde(default = "default_driver_id")]
    pub driver_id: String,
}

fn default_driver_id() -> String {
    DEFAULT_DRIVER_ID.to_string()
}

impl MaintenanceRequest {
    /// Creates a request for the default driver.
    #[must_use]
    pub fn new(vehicle_id: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            driver_id: default_driver_id(),
        }
    }

    /// Sets the driver.
    #[must_use]
    pub fn with_driver(mut self, driver_id: impl Into<String>) -> Self {
        self.driver_id = driver_id.into();
        self
    }

    /// Converts the request into the initial context of a run.
    #[must_use]
    pub fn into_record(self) -> ContextRecord {
        ContextRecord::new()
            .with("vehicle_id", self.vehicle_id)
            .with("driver_id", self.driver_id)
    }
}

fn display_or_unknown(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn estimate_cost(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let component = inputs.require_str("component")?;
    let failure_in_days = inputs.require_i64("failure_in_days")?;
    let estimated_cost = if component == PREDICTED_COMPONENT { 250 } else { 400 };

    Ok(ContextRecord::new()
        .with("vehicle_id", inputs.get("vehicle_id").cloned().unwrap_or_default())
        .with("component", component)
        .with("failure_in_days", failure_in_days)
        .with("estimated_cost", estimated_cost)
        .with("recommended", failure_in_days < 8))
}

fn place_order(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let component = inputs.require_str("component")?;
    Ok(ContextRecord::new()
        .with("vehicle_id", inputs.get("vehicle_id").cloned().unwrap_or_default())
        .with("component", component)
        .with("status", "ordered")
        .with("order_id", format!("ORD-{}-001", component.replace(' ', "-"))))
}

fn reserve_slot(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let vehicle_id = inputs.require_str("vehicle_id")?;
    Ok(ContextRecord::new()
        .with("vehicle_id", vehicle_id)
        .with("component", inputs.get("component").cloned().unwrap_or_default())
        .with("status", "confirmed")
        .with("slot", SERVICE_SLOT)
        .with(
            "booking_ref",
            format!("BOOK-{vehicle_id}-{}", SERVICE_SLOT.replace(':', "-")),
        ))
}

fn send_notification(inputs: &StageInputs) -> Result<ContextRecord, FleetflowError> {
    let driver_id = inputs.require_str("driver_id")?;
    let vehicle_id = display_or_unknown(inputs.optional_str("vehicle_id")?);
    let component = display_or_unknown(inputs.optional_str("component")?);
    let failure_in_days = display_or_unknown(inputs.optional_i64("failure_in_days")?);
    let booking_ref = display_or_unknown(inputs.optional_str("booking_ref")?);

    let message = format!(
        "Maintenance scheduled for {vehicle_id}. {component} needs service in {failure_in_days} days. Booking: {booking_ref}"
    );
    let summary =
        format!("Vehicle {vehicle_id}: {component} maintenance booked (Reference: {booking_ref})");

    Ok(ContextRecord::new()
        .with("sent", true)
        .with("driver_id", driver_id)
        .with("message", message)
        .with("booking_ref", booking_ref)
        .with("summary", summary))
}

/// Predicts when a vehicle component will fail.
pub fn predict_failure(horizon: FailureHorizon) -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "predict_failure",
            StageSignature::new().requires(["vehicle_id"]).produces([
                "vehicle_id",
                "component",
                "failure_in_days",
                "confidence",
            ]),
        )
        .with_description("Predict vehicle component failure and return details"),
        move |inputs: &StageInputs| {
            let vehicle_id = inputs.require_str("vehicle_id")?;
            Ok(ContextRecord::new()
                .with("vehicle_id", vehicle_id)
                .with("component", PREDICTED_COMPONENT)
                .with("failure_in_days", horizon.sample())
                .with("confidence", 0.85))
        },
    ))
}

/// Estimates the maintenance cost of a component.
pub fn check_cost() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "check_cost",
            StageSignature::new()
                .requires(["component", "failure_in_days"])
                .accepts(["vehicle_id"])
                .produces([
                    "vehicle_id",
                    "component",
                    "failure_in_days",
                    "estimated_cost",
                    "recommended",
                ]),
        )
        .with_description("Estimate maintenance cost for a component"),
        estimate_cost,
    ))
}

/// Orders replacement parts for a component.
pub fn order_parts() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "order_parts",
            StageSignature::new()
                .requires(["component"])
                .accepts(["vehicle_id", "estimated_cost"])
                .produces(["vehicle_id", "component", "status", "order_id"]),
        )
        .with_description("Order replacement parts for a component")
        .with_permission(ToolPermission::ReadWrite),
        place_order,
    ))
}

/// Books a service slot for the vehicle.
pub fn book_slot() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "book_slot",
            StageSignature::new()
                .requires(["vehicle_id"])
                .accepts(["component", "failure_in_days"])
                .produces(["vehicle_id", "component", "status", "slot", "booking_ref"]),
        )
        .with_description("Book a service appointment slot")
        .with_permission(ToolPermission::ReadWrite),
        reserve_slot,
    ))
}

/// Notifies the driver about the scheduled maintenance.
pub fn notify_driver() -> Arc<dyn Stage> {
    Arc::new(ToolStage::new(
        ToolDefinition::new(
            "notify_driver",
            StageSignature::new()
                .requires(["driver_id"])
                .accepts(["vehicle_id", "component", "failure_in_days", "booking_ref"])
                .produces(["sent", "driver_id", "message", "booking_ref", "summary"]),
        )
        .with_description("Send notification to driver about maintenance")
        .with_permission(ToolPermission::ReadWrite),
        send_notification,
    ))
}

/// Builds the maintenance flow, starting from `vehicle_id` and `driver_id`.
pub fn maintenance_flow(horizon: FailureHorizon) -> Result<Pipeline, PipelineValidationError> {
    PipelineBuilder::new(MAINTENANCE_FLOW)
        .input_fields(["vehicle_id", "driver_id"])
        .stage(predict_failure(horizon))?
        .stage(check_cost())?
        .stage(order_parts())?
        .stage(book_slot())?
        .stage(notify_driver())?
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_horizon_sampling_stays_in_range() {
        let horizon = FailureHorizon::default();
        for _ in 0..100 {
            let days = horizon.sample();
            assert!((5..=12).contains(&days));
        }
        assert_eq!(FailureHorizon::Fixed(3).sample(), 3);
        assert_eq!(FailureHorizon::Random { min: 4, max: 4 }.sample(), 4);
    }

    #[tokio::test]
    async fn test_cost_depends_on_component_and_urgency() {
        let stage = check_cost();
        let output = stage
            .execute(StageInputs::new(
                "check_cost",
                ContextRecord::new()
                    .with("component", "Alternator")
                    .with("failure_in_days", 9),
            ))
            .await;

        assert_eq!(output.get("estimated_cost"), Some(&serde_json::json!(400)));
        assert_eq!(output.get("recommended"), Some(&serde_json::json!(false)));
        assert_eq!(output.get("vehicle_id"), Some(&serde_json::Value::Null));
    }

    #[tokio::test]
    async fn test_order_id_format() {
        let output = order_parts()
            .execute(StageInputs::new(
                "order_parts",
                ContextRecord::new().with("component", "Brake Pads"),
            ))
            .await;
        assert_eq!(output.get("order_id"), Some(&serde_json::json!("ORD-Brake-Pads-001")));
        assert_eq!(output.get("status"), Some(&serde_json::json!("ordered")));
    }

    #[tokio::test]
    async fn test_booking_reference_format() {
        let output = book_slot()
            .execute(StageInputs::new(
                "book_slot",
                ContextRecord::new().with("vehicle_id", "TRUCK-22"),
            ))
            .await;
        assert_eq!(
            output.get("booking_ref"),
            Some(&serde_json::json!("BOOK-TRUCK-22-2025-11-22T15-00-00"))
        );
    }

    #[tokio::test]
    async fn test_maintenance_flow_end_to_end() {
        let run = maintenance_flow(FailureHorizon::default())
            .unwrap()
            .run(
                MaintenanceRequest::new("TRUCK-22")
                    .with_driver("driver-1")
                    .into_record(),
            )
            .await
            .unwrap();

        let summary = run.context.get_str("summary").unwrap();
        assert!(summary.contains("TRUCK-22"));
        assert!(summary.contains(PREDICTED_COMPONENT));
        assert!(!run.context.get_str("booking_ref").unwrap().is_empty());
        assert_eq!(run.summary(), Some(summary));
        assert_eq!(run.context.get("sent"), Some(&serde_json::json!(true)));
        assert_eq!(run.context.get_str("order_id"), Some("ORD-Brake-Pads-001"));
        // book_slot overwrote order_parts' status
        assert_eq!(run.context.get_str("status"), Some("confirmed"));
    }

    #[tokio::test]
    async fn test_fixed_horizon_is_idempotent() {
        let flow = maintenance_flow(FailureHorizon::Fixed(6)).unwrap();
        let first = flow
            .run(MaintenanceRequest::new("TRUCK-22").into_record())
            .await
            .unwrap();
        let second = flow
            .run(MaintenanceRequest::new("TRUCK-22").into_record())
            .await
            .unwrap();

        assert_eq!(first.context, second.context);
        assert_eq!(first.context.get("recommended"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn test_request_defaults_driver() {
        let request: MaintenanceRequest =
            serde_json::from_value(serde_json::json!({"vehicle_id": "VAN-1"})).unwrap();
        assert_eq!(request.driver_id, DEFAULT_DRIVER_ID);
    }
}
