//! Migration Sentinel Library
//!
//! Receives Helius enhanced-transaction webhooks, detects token migrations
//! to Raydium, enriches them through Helius RPC and posts Telegram alerts.

pub mod config;
pub mod constants;
pub mod dedup;
pub mod enrichment;
pub mod error;
pub mod handlers;
pub mod helius;
pub mod matcher;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod pipeline;
pub mod server;

// Re-export commonly used types for tests
pub use config::AppConfig;
pub use dedup::ProcessedStore;
pub use enrichment::{Enricher, Enrichment, MetadataSource};
pub use error::{AppError, AppResult};
pub use matcher::EventMatcher;
pub use metrics::MetricsState;
pub use models::{HolderEntry, HolderInfo, TokenInfo, TokenMetadata, TokenTransfer, TransactionEvent};
pub use notifications::{CompositeNotifier, NotificationMessage, NotificationService};
pub use pipeline::{BatchSummary, EventOutcome, MigrationPipeline};
pub use server::{build_pipeline, build_router, pipeline_with};
