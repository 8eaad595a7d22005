//! End-to-end scenario tests against a local stub of the allocation API.
//!
//! Coverage:
//! - Both fixtures submitted over HTTP and verified
//! - The request body on the wire matches the documented shape
//! - Transport failures abort the scenario with a distinct error
//! - A broken response still gets every rule evaluated

mod common;

use common::{StubMode, StubServer};
use serde_json::{json, Value};
use std::time::Duration;

use sfa_contract::checks::Rule;
use sfa_contract::client::ClientError;
use sfa_contract::config::AlertPolicy;
use sfa_contract::fixtures::{alerts_scenario, all_scenarios, example_request_1, success_scenario};
use sfa_contract::models::response::BALANCED_FALLBACK;
use sfa_contract::scenario::{run_scenario, run_scenarios, ScenarioError};
use sfa_contract::AllocationClient;

fn client_for(server: &StubServer) -> AllocationClient {
    AllocationClient::new(&server.base_url, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn test_success_scenario_passes_against_compliant_api() {
    let server = StubServer::start(StubMode::Compliant).await;
    let client = client_for(&server);

    let report = run_scenario(&client, &success_scenario(), AlertPolicy::Strict)
        .await
        .expect("transport ok");

    assert!(report.is_success(), "{report}");
    assert_eq!(report.station_id, "STN-101");
    assert_eq!(
        report.pending().collect::<Vec<_>>(),
        vec![
            Rule::TankLevels,
            Rule::DeliveryConstraints,
            Rule::CostMinimization,
            Rule::WindowAndTankThreshold,
        ]
    );
}

#[tokio::test]
async fn test_alerts_scenario_passes_against_compliant_api() {
    let server = StubServer::start(StubMode::Compliant).await;
    let client = client_for(&server);

    let report = run_scenario(&client, &alerts_scenario(), AlertPolicy::Strict)
        .await
        .expect("transport ok");

    assert!(report.is_success(), "{report}");
    assert_eq!(report.station_id, "STN-105");
}

#[tokio::test]
async fn test_request_body_matches_documented_shape() {
    let server = StubServer::start(StubMode::Compliant).await;
    let client = client_for(&server);

    run_scenario(&client, &success_scenario(), AlertPolicy::Strict)
        .await
        .expect("transport ok");

    assert_eq!(
        server.received(),
        vec![json!({
            "station_id": "STN-101",
            "forecasted_demand": 8000,
            "demand_unit": "liters",
            "delivery_window": {
                "start": "2025-09-25T09:00:00",
                "end": "2025-09-25T13:00:00"
            },
            "tank_level_percent": 28,
            "tank_level_threshold": 20,
            "optimization_mode": "Balanced"
        })]
    );
}

#[tokio::test]
async fn test_scenarios_run_sequentially_in_order() {
    let server = StubServer::start(StubMode::Compliant).await;
    let client = client_for(&server);

    let results = run_scenarios(&client, &all_scenarios(), AlertPolicy::Strict).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|result| result.is_ok()));
    let stations: Vec<Value> = server
        .received()
        .into_iter()
        .map(|body| body["station_id"].clone())
        .collect();
    assert_eq!(stations, vec![json!("STN-101"), json!("STN-105")]);
}

#[tokio::test]
async fn test_server_error_aborts_scenario() {
    let server = StubServer::start(StubMode::Status(500)).await;
    let client = client_for(&server);

    let err = run_scenario(&client, &success_scenario(), AlertPolicy::Strict)
        .await
        .unwrap_err();

    match err {
        ScenarioError::Transport { scenario, source } => {
            assert_eq!(scenario, "success");
            assert_eq!(source.status(), Some(500));
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_a_transport_failure() {
    let server = StubServer::start(StubMode::NotJson).await;
    let client = client_for(&server);

    let err = client.allocate(&example_request_1()).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_slow_endpoint_hits_configured_timeout() {
    let server = StubServer::start(StubMode::Delay(Duration::from_secs(5))).await;
    let client =
        AllocationClient::new(&server.base_url, Duration::from_millis(200)).expect("client");

    let err = client.allocate(&example_request_1()).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn test_one_aborted_scenario_does_not_skip_the_next() {
    let server = StubServer::start(StubMode::Status(503)).await;
    let client = client_for(&server);

    let results = run_scenarios(&client, &all_scenarios(), AlertPolicy::Strict).await;

    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|result| matches!(result, Err(ScenarioError::Transport { .. }))));
    assert_eq!(server.received().len(), 2);
}

#[tokio::test]
async fn test_missing_fallback_fails_required_fields_but_runs_every_rule() {
    let server = StubServer::start(StubMode::Fixed(json!({
        "station_id": "STN-101",
        "recommended_volume": 5000,
        "recommended_unit": "liters",
        "suggested_delivery_time": "2025-09-25T11:00:00",
        "alerts": []
    })))
    .await;
    let client = client_for(&server);

    let report = run_scenario(&client, &success_scenario(), AlertPolicy::Strict)
        .await
        .expect("transport ok");

    assert_eq!(report.outcomes.len(), Rule::ALL.len());
    assert_eq!(
        report.failed_rules(),
        vec![Rule::RequiredFields, Rule::OptimizationMode]
    );
    assert!(report
        .status_of(Rule::DeliveryVolume)
        .is_some_and(|status| !status.is_failed()));
}

#[tokio::test]
async fn test_alerts_scenario_fails_when_api_raises_no_alerts() {
    let server = StubServer::start(StubMode::Fixed(json!({
        "station_id": "STN-105",
        "recommended_volume": 6400,
        "recommended_unit": "gallons",
        "suggested_delivery_time": "2025-09-25T11:00:00",
        "alerts": [],
        "fallback": BALANCED_FALLBACK
    })))
    .await;
    let client = client_for(&server);

    let report = run_scenario(&client, &alerts_scenario(), AlertPolicy::Strict)
        .await
        .expect("transport ok");

    assert_eq!(report.failed_rules(), vec![Rule::AlertReporting]);
}
