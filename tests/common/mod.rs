//! Stub allocation endpoint served on an ephemeral local port.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use sfa_contract::models::alert::NO_TRUCKS_AVAILABLE;
use sfa_contract::models::response::BALANCED_FALLBACK;
use sfa_contract::models::{AllocationRequest, AllocationResponse, OptimizationMode};
use sfa_contract::utils::parse_iso8601;

/// Station the stub treats as having no trucks in any window.
pub const NO_TRUCKS_STATION: &str = "STN-105";

#[derive(Debug, Clone)]
pub enum StubMode {
    /// Answer like a compliant allocation API.
    Compliant,
    /// Reply with this status and a plain-text body.
    Status(u16),
    /// Reply 200 with a body that is not JSON.
    NotJson,
    /// Reply 200 with this exact body.
    Fixed(Value),
    /// Sleep before answering.
    Delay(Duration),
}

#[derive(Clone)]
struct StubState {
    mode: StubMode,
    received: Arc<Mutex<Vec<Value>>>,
}

pub struct StubServer {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(mode: StubMode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral");
        let addr = listener.local_addr().expect("local addr");
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            mode,
            received: received.clone(),
        };
        let app = Router::new()
            .route("/api/allocate", post(allocate))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        Self {
            base_url: format!("http://{addr}"),
            received,
            handle,
        }
    }

    /// Request bodies received so far, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().expect("received lock").clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn allocate(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state
        .received
        .lock()
        .expect("received lock")
        .push(body.clone());

    match state.mode {
        StubMode::Compliant => match serde_json::from_value::<AllocationRequest>(body) {
            Ok(request) => Json(compliant_response(&request)).into_response(),
            Err(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response(),
        },
        StubMode::Status(code) => {
            let status = StatusCode::from_u16(code).expect("valid status code");
            (status, "allocation service unavailable").into_response()
        }
        StubMode::NotJson => (StatusCode::OK, "<html>mock server</html>").into_response(),
        StubMode::Fixed(value) => Json(value).into_response(),
        StubMode::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Json(json!({})).into_response()
        }
    }
}

/// What a compliant API answers for `request`.
pub fn compliant_response(request: &AllocationRequest) -> AllocationResponse {
    let fallback = match &request.optimization_mode {
        OptimizationMode::Balanced => BALANCED_FALLBACK.to_string(),
        other => format!("Recommendation based on {} optimization.", other.as_str().to_lowercase()),
    };

    if request.station_id == NO_TRUCKS_STATION {
        return AllocationResponse {
            station_id: request.station_id.clone(),
            recommended_volume: 0,
            recommended_unit: request.demand_unit.as_str().to_string(),
            suggested_delivery_time: None,
            alerts: vec![NO_TRUCKS_AVAILABLE.to_string()],
            fallback,
        };
    }

    let start = parse_iso8601(&request.delivery_window.start).expect("window start");
    let end = parse_iso8601(&request.delivery_window.end).expect("window end");
    let midpoint = start + (end - start) / 2;

    AllocationResponse {
        station_id: request.station_id.clone(),
        recommended_volume: (request.forecasted_demand * 0.8).floor() as u64,
        recommended_unit: request.demand_unit.as_str().to_string(),
        suggested_delivery_time: Some(midpoint.format("%Y-%m-%dT%H:%M:%S").to_string()),
        alerts: Vec::new(),
        fallback,
    }
}
