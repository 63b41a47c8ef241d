//! Webhook handler for incoming Helius transaction events

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::models::parse_events;

/// Webhook response
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookResponse {
    /// Status of the request
    pub status: WebhookStatus,
    /// Parse error, when the body was not JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Webhook status
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Success,
    Error,
}

/// Webhook handler
///
/// POST / and POST /webhook
///
/// Accepts a single event object or an array of events and runs each
/// through the migration pipeline before responding.
///
/// Always answers 200. Helius retries deliveries on non-2xx responses,
/// so processing and notification failures stay out of the status code;
/// only an unparseable body is reported, and only in the JSON body.
pub async fn webhook_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Json<WebhookResponse> {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, body_size = body.len(), "Error processing webhook");
            return Json(WebhookResponse {
                status: WebhookStatus::Error,
                message: Some(e.to_string()),
            });
        }
    };

    let summary = state.pipeline.process_batch(parse_events(payload)).await;

    tracing::info!(
        events = summary.events,
        migrations = summary.migrations,
        delivered = summary.delivered,
        duplicates = summary.duplicates,
        malformed = summary.malformed,
        failed = summary.failed,
        "Webhook batch processed"
    );

    Json(WebhookResponse {
        status: WebhookStatus::Success,
        message: None,
    })
}
