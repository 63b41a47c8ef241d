//! Health check endpoints

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process is serving
    pub status: &'static str,
    /// Uptime in seconds
    pub uptime_seconds: i64,
    /// Signatures held by the dedup store
    pub processed_signatures: usize,
}

/// Health check handler
///
/// GET /
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    tracing::info!("Health check endpoint hit");

    Json(HealthResponse {
        status: "healthy",
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        processed_signatures: state.pipeline.store().len(),
    })
}

/// Static diagnostic endpoint
///
/// GET /test
pub async fn test_endpoint() -> Json<Value> {
    Json(json!({ "message": "Test endpoint working" }))
}
