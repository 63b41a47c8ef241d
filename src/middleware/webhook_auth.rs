//! Webhook authorization middleware
//!
//! Helius echoes the `authHeader` registered with a webhook in the
//! `Authorization` header of every delivery. When a token is configured,
//! POST requests must carry it exactly; other methods pass through.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::AppError;

/// Expected Authorization header value
#[derive(Clone)]
pub struct WebhookAuthState {
    token: Arc<str>,
}

impl WebhookAuthState {
    pub fn new(token: &str) -> Self {
        Self {
            token: Arc::from(token),
        }
    }
}

/// Reject webhook deliveries without the configured Authorization header
pub async fn webhook_auth(
    State(state): State<WebhookAuthState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let rejection = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(value) if value == &*state.token => None,
        Some(_) => Some("Invalid Authorization header"),
        None => Some("Missing Authorization header"),
    };

    if let Some(reason) = rejection {
        tracing::warn!(path = %request.uri().path(), reason, "Webhook delivery rejected");
        return AppError::Auth(reason.to_string()).into_response();
    }

    next.run(request).await
}
