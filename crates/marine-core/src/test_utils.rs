//! Test utilities for marine-core
//!
//! A mock marine analytics server for integration tests and local demos.
//! Every route answers with a realistic default body; tests switch a route's
//! behavior with [`MockMarineServer::set`] and inspect traffic with
//! [`MockMarineServer::hits`] and [`MockMarineServer::last_body`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::config::ClientConfig;

/// How a route answers
#[derive(Debug, Clone)]
pub enum RouteBehavior {
    /// 200 with this JSON body
    Json(Value),
    /// This status with a small JSON body
    Status(u16),
    /// 200 with a truncated JSON body
    Malformed,
    /// 200 with this JSON body after a pause
    Delayed(Duration, Value),
}

#[derive(Default)]
struct ServerState {
    routes: Mutex<HashMap<String, RouteBehavior>>,
    hits: Mutex<HashMap<String, usize>>,
    bodies: Mutex<HashMap<String, Bytes>>,
}

/// Mock marine backend server
pub struct MockMarineServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockMarineServer {
    /// Start the mock server on an available port with every default route
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        {
            let mut routes = state.routes.lock().unwrap();
            for (path, body) in default_routes() {
                routes.insert(path.to_string(), RouteBehavior::Json(body));
            }
        }

        let app = Router::new()
            .fallback(handle_request)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client config pointing at this server
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default().with_origin(&self.url())
    }

    /// Change how a route answers
    pub fn set(&self, path: &str, behavior: RouteBehavior) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), behavior);
    }

    /// Make a route answer 404
    pub fn remove(&self, path: &str) {
        self.state.routes.lock().unwrap().remove(path);
    }

    /// Make every route answer with this status
    pub fn fail_all(&self, status: u16) {
        let mut routes = self.state.routes.lock().unwrap();
        for behavior in routes.values_mut() {
            *behavior = RouteBehavior::Status(status);
        }
    }

    /// Requests received on a path
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Raw body of the most recent request on a path
    pub fn last_body(&self, path: &str) -> Option<Vec<u8>> {
        self.state
            .bodies
            .lock()
            .unwrap()
            .get(path)
            .map(|b| b.to_vec())
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockMarineServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_request(
    State(state): State<Arc<ServerState>>,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
    state.bodies.lock().unwrap().insert(path.clone(), body);

    let behavior = state.routes.lock().unwrap().get(&path).cloned();
    match behavior {
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not Found"}))).into_response(),
        Some(RouteBehavior::Json(body)) => Json(body).into_response(),
        Some(RouteBehavior::Status(code)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({"detail": "mock failure"})),
        )
            .into_response(),
        Some(RouteBehavior::Malformed) => (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"species": "Indian Mack"#,
        )
            .into_response(),
        Some(RouteBehavior::Delayed(pause, body)) => {
            tokio::time::sleep(pause).await;
            Json(body).into_response()
        }
    }
}

/// Realistic bodies for every backend route
fn default_routes() -> Vec<(&'static str, Value)> {
    vec![
        (
            "/predict/fish_species",
            json!({
                "species": "Indian Mackerel",
                "confidence": 91.25,
                "top_predictions": {"Indian Mackerel": 91.25, "Oil Sardine": 6.5, "Seer Fish": 2.25}
            }),
        ),
        (
            "/classify/fish",
            json!({"predicted_class": "Oil Sardine", "confidence": 84.0}),
        ),
        (
            "/api/v1/fish/classify",
            json!({
                "classification": {
                    "species": "Yellowfin Tuna",
                    "confidence": 78.5,
                    "top_predictions": {"Yellowfin Tuna": 78.5, "Skipjack Tuna": 15.0}
                },
                "biological_data": {
                    "species": "Yellowfin Tuna",
                    "biological_info": "Highly migratory pelagic predator.",
                    "data_source": "rag"
                }
            }),
        ),
        (
            "/overfishing_monitor",
            json!({
                "data": [
                    {"name": "Stock Volume", "x": ["2024-01", "2024-02", "2024-03"], "y": [1000, 900, 800]},
                    {"name": "Catch Volume", "x": ["2024-01", "2024-02", "2024-03"], "y": [150, 200, 240]},
                    {"name": "Threshold (20%)", "x": ["2024-01", "2024-02", "2024-03"], "y": [200, 180, 160]}
                ],
                "layout": {"title": "Stock vs Catch Volume"}
            }),
        ),
        (
            "/predict/csv",
            json!({
                "depth": [5, 10, 20],
                "salinity": [35.1, 35.2, 35.4],
                "ph": [8.1, 8.05, 7.98],
                "predicted_chlorophyll": [0.82, 0.61, 0.37]
            }),
        ),
        (
            "/predict/sst/csv",
            json!({
                "forecast": [
                    {"ds": "2025-01-01", "yhat": 27.4, "yhat_lower": 26.8, "yhat_upper": 28.0},
                    {"ds": "2025-02-01", "yhat": 27.9, "yhat_lower": 27.2, "yhat_upper": 28.6}
                ]
            }),
        ),
        (
            "/predict/sst",
            json!({"message": "Upload SST CSV to /predict/sst/csv with columns: date,value"}),
        ),
        (
            "/api/v1/edna/analyze",
            json!({
                "success": true,
                "detected_species": [
                    {"sequence": "ATGGCAAGCCTACGAAAAACACACC", "species": "Thunnus albacares", "confidence": 94.5, "invasive": false, "sequenceId": "SEQ_001"},
                    {"sequence": "GTGGCCAGCCTACGAAAAACCCATC", "species": "Pterois volitans", "confidence": 82.0, "invasive": true}
                ],
                "analysis": {
                    "species_scientific": "Thunnus albacares",
                    "species_common": "Yellowfin Tuna",
                    "confidence": 94.5,
                    "genetic_markers": ["COI"],
                    "invasive_status": "Native",
                    "characteristics": {"habitat": "Pelagic", "behavior": "Schooling", "diet": "Fish, squid", "conservation_status": "Least Concern"},
                    "ecological_role": "Apex predator",
                    "interesting_facts": ["Can swim at 75 km/h"]
                },
                "invasive_species": [{"species": "Pterois volitans"}]
            }),
        ),
        (
            "/api/v1/edna/chat",
            json!({"success": true, "answer": "Yellowfin tuna feed mostly on fish and squid."}),
        ),
        (
            "/aws/fisheries-agent",
            json!({"success": true, "response": "Keep catch under 20% of the standing stock."}),
        ),
    ]
}
