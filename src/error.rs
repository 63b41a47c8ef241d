//! Error types for Migration Sentinel

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// JSON-RPC error returned by the metadata service
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Transport-level HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Parse(e.to_string())
        } else {
            AppError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

/// Error response structure for HTTP callers
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, reason) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "authentication_failed"),
            AppError::Rpc(_) => (StatusCode::BAD_GATEWAY, "rpc_error"),
            AppError::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            AppError::Parse(_) => (StatusCode::BAD_GATEWAY, "parse_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let status = if status_code.is_client_error() {
            "rejected"
        } else {
            "error"
        };

        let error_response = ErrorResponse {
            status,
            reason: reason.to_string(),
            details: Some(self.to_string()),
        };

        tracing::error!(
            error_type = %self,
            status_code = %status_code,
            "Request error"
        );

        (status_code, Json(json!(error_response))).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
