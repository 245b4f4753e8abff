//! ---
//! fw_section: "03-networking-external-interfaces"
//! fw_subsection: "integration-tests"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Integration tests for the backend HTTP client."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fleetwatch_client::{BackendClient, ClientError};
use fleetwatch_model::{FetchStatus, RunScenarioRequest};
use serde_json::{json, Value};

async fn spawn_backend(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test backend");
    });
    addr
}

fn client_for(addr: SocketAddr) -> BackendClient {
    BackendClient::new(&format!("http://{addr}"), Duration::from_secs(2)).expect("client")
}

#[tokio::test]
async fn map_state_decodes_and_forwards_scenario_id() {
    let app = Router::new().route(
        "/map_state/",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("scenario_id").map(String::as_str), Some("s-7"));
            Json(json!({
                "status": "success",
                "scenario_id": "s-7",
                "vehicles": [
                    {"id": "v-1", "longitude": 11.58, "latitude": 48.13, "enroute": "idle"}
                ],
                "customers": []
            }))
        }),
    );
    let addr = spawn_backend(app).await;

    let snapshot = client_for(addr).map_state("s-7").await.unwrap();
    assert_eq!(snapshot.status, FetchStatus::Success);
    assert_eq!(snapshot.vehicles.len(), 1);
    assert_eq!(snapshot.vehicles[0].id, "v-1");
}

#[tokio::test]
async fn run_scenario_encodes_parameters_in_path() {
    let app = Router::new().route(
        "/run_scenario/:customers/:vehicles/:rate",
        post(
            |Path((customers, vehicles, rate)): Path<(u32, u32, f64)>| async move {
                assert_eq!((customers, vehicles), (8, 3));
                assert!((rate - 0.2).abs() < f64::EPSILON);
                Json(json!({
                    "status": "RUNNING",
                    "scenario_id": "s-new",
                    "num_customers": customers,
                    "num_vehicles": vehicles,
                    "utilization": 0.0,
                    "efficiency": 0.0
                }))
            },
        ),
    );
    let addr = spawn_backend(app).await;

    let request = RunScenarioRequest {
        num_customers: 8,
        num_vehicles: 3,
        breakdown_rate: 0.2,
    };
    let summary = client_for(addr).run_scenario(&request).await.unwrap();
    assert_eq!(summary.scenario_id, "s-new");
    assert_eq!(summary.num_vehicles, Some(3));
}

#[tokio::test]
async fn scenarios_unwraps_the_list_envelope() {
    let app = Router::new().route(
        "/scenarios",
        get(|| async {
            Json(json!({
                "scenarios": [
                    {"status": "COMPLETED", "scenario_id": "s-1", "utilization": 0.4, "efficiency": 0.6},
                    {"status": "RUNNING", "scenario_id": "s-2", "utilization": 0.0, "efficiency": 0.0}
                ]
            }))
        }),
    );
    let addr = spawn_backend(app).await;

    let scenarios = client_for(addr).scenarios().await.unwrap();
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[1].scenario_id, "s-2");
}

#[tokio::test]
async fn non_success_status_is_a_protocol_error() {
    let app = Router::new().route(
        "/current_scenario",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_backend(app).await;

    let err = client_for(addr)
        .current_scenario(Some("s-1"))
        .await
        .unwrap_err();
    match err {
        ClientError::Protocol { endpoint, status } => {
            assert_eq!(endpoint, "current_scenario");
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let app = Router::new().route(
        "/map_state/",
        get(|| async { Json(Value::String("not a snapshot".into())) }),
    );
    let addr = spawn_backend(app).await;

    let err = client_for(addr).map_state("s-1").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { endpoint: "map_state", .. }));
}
