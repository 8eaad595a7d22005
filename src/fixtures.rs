//! Example allocation requests and the scenarios built from them.

use crate::models::{AllocationRequest, DeliveryWindow, DemandUnit, OptimizationMode};
use crate::scenario::Scenario;

/// Expected to produce a normal recommendation without alerts.
pub fn example_request_1() -> AllocationRequest {
    AllocationRequest {
        station_id: "STN-101".to_string(),
        forecasted_demand: 8000.0,
        demand_unit: DemandUnit::Liters,
        delivery_window: DeliveryWindow::new("2025-09-25T09:00:00", "2025-09-25T13:00:00"),
        tank_level_percent: 28.0,
        tank_level_threshold: 20.0,
        optimization_mode: OptimizationMode::Balanced,
    }
}

/// Same as [`example_request_1`] but in gallons for another station; expected
/// to produce alerts.
pub fn example_request_2() -> AllocationRequest {
    example_request_1()
        .with_station("STN-105")
        .with_demand_unit(DemandUnit::Gallons)
}

pub fn success_scenario() -> Scenario {
    Scenario::new("success", example_request_1())
}

pub fn alerts_scenario() -> Scenario {
    Scenario::new("alerts", example_request_2()).expecting_alerts()
}

pub fn all_scenarios() -> Vec<Scenario> {
    vec![success_scenario(), alerts_scenario()]
}
