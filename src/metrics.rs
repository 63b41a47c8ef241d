//! Prometheus metrics for Migration Sentinel
//!
//! Exposes metrics endpoint for monitoring:
//! - Webhook event counters (received, duplicate, migrations)
//! - Notification delivery counters
//! - Enrichment failures and latency per source

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Metrics state
pub struct MetricsState {
    /// Prometheus registry
    registry: Registry,
    /// Events read from webhook bodies
    pub events_received: IntCounter,
    /// Events skipped because their signature was already processed
    pub events_duplicate: IntCounter,
    /// Qualifying migration transfers
    pub migrations_detected: IntCounter,
    /// Notifications delivered
    pub notifications_sent: IntCounter,
    /// Notifications that failed every service
    pub notifications_failed: IntCounter,
    /// Enrichment lookups that fell back to defaults, by source
    pub enrichment_failures: IntCounterVec,
    /// Enrichment latency in milliseconds, by source
    pub enrichment_latency: HistogramVec,
    /// Size of the processed-signature store
    pub processed_signatures: IntGauge,
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::with_opts(Opts::new(name, help))
        .unwrap_or_else(|e| panic!("Failed to create {}: {}", name, e));
    registry
        .register(Box::new(counter.clone()))
        .unwrap_or_else(|e| panic!("Failed to register {}: {}", name, e));
    counter
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered
    pub fn new() -> Self {
        let registry = Registry::new();

        let events_received = counter(
            &registry,
            "sentinel_events_received_total",
            "Total webhook events received",
        );
        let events_duplicate = counter(
            &registry,
            "sentinel_events_duplicate_total",
            "Webhook events skipped as already processed",
        );
        let migrations_detected = counter(
            &registry,
            "sentinel_migrations_detected_total",
            "Migration transfers detected",
        );
        let notifications_sent = counter(
            &registry,
            "sentinel_notifications_sent_total",
            "Notifications delivered",
        );
        let notifications_failed = counter(
            &registry,
            "sentinel_notifications_failed_total",
            "Notifications that could not be delivered",
        );

        let enrichment_failures = IntCounterVec::new(
            Opts::new(
                "sentinel_enrichment_failures_total",
                "Enrichment lookups that fell back to defaults",
            ),
            &["source"],
        )
        .expect("Failed to create enrichment_failures counter");
        registry
            .register(Box::new(enrichment_failures.clone()))
            .expect("Failed to register enrichment_failures");

        let enrichment_latency = HistogramVec::new(
            HistogramOpts::new(
                "sentinel_enrichment_latency_ms",
                "Enrichment lookup latency in milliseconds",
            )
            .buckets(vec![
                25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
            ]),
            &["source"],
        )
        .expect("Failed to create enrichment_latency histogram");
        registry
            .register(Box::new(enrichment_latency.clone()))
            .expect("Failed to register enrichment_latency");

        let processed_signatures = IntGauge::with_opts(Opts::new(
            "sentinel_processed_signatures",
            "Signatures held in the dedup store",
        ))
        .expect("Failed to create processed_signatures gauge");
        registry
            .register(Box::new(processed_signatures.clone()))
            .expect("Failed to register processed_signatures");

        Self {
            registry,
            events_received,
            events_duplicate,
            migrations_detected,
            notifications_sent,
            notifications_failed,
            enrichment_failures,
            enrichment_latency,
            processed_signatures,
        }
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics handler - returns Prometheus metrics in text format
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry().gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("Content-Type", "text/plain; version=0.0.4")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        buffer,
    )
}
