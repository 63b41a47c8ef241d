//! HTTP handlers for Migration Sentinel

mod health;
mod webhook;

pub use health::*;
pub use webhook::*;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::pipeline::MigrationPipeline;

/// Shared state for webhook and health handlers
pub struct AppState {
    /// Event pipeline
    pub pipeline: Arc<MigrationPipeline>,
    /// Application start time
    pub started_at: DateTime<Utc>,
}
