//! Router assembly and service wiring

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::dedup::ProcessedStore;
use crate::enrichment::{Enricher, MetadataSource};
use crate::error::{AppError, AppResult};
use crate::handlers::{health_check, test_endpoint, webhook_handler, AppState};
use crate::helius::HeliusRpcClient;
use crate::matcher::EventMatcher;
use crate::metrics::{metrics_handler, MetricsState};
use crate::middleware::{log_requests, webhook_auth, WebhookAuthState};
use crate::notifications::{CompositeNotifier, FormatSettings, TelegramNotifier};
use crate::pipeline::MigrationPipeline;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the pipeline from configuration with the production collaborators
pub fn build_pipeline(
    config: &AppConfig,
    metrics: Arc<MetricsState>,
) -> AppResult<Arc<MigrationPipeline>> {
    let source: Arc<dyn MetadataSource> = Arc::new(HeliusRpcClient::new(&config.helius)?);

    let telegram = TelegramNotifier::new(&config.telegram)
        .map_err(|e| AppError::Internal(format!("Failed to create Telegram notifier: {}", e)))?;
    let mut notifier = CompositeNotifier::new();
    notifier.add_service(Arc::new(telegram));

    Ok(Arc::new(pipeline_with(config, source, Arc::new(notifier), metrics)))
}

/// Build the pipeline around arbitrary collaborators
pub fn pipeline_with(
    config: &AppConfig,
    source: Arc<dyn MetadataSource>,
    notifier: Arc<CompositeNotifier>,
    metrics: Arc<MetricsState>,
) -> MigrationPipeline {
    let enricher = Enricher::new(source, config.helius.enrichment_timeout())
        .with_first_transaction(config.pipeline.time_to_bond)
        .with_metrics(metrics.clone());

    MigrationPipeline::new(
        Arc::new(ProcessedStore::new()),
        EventMatcher::from_config(&config.migration),
        enricher,
        notifier,
        FormatSettings::from_config(&config.migration, &config.pipeline),
        metrics,
    )
}

/// Build the HTTP router
///
/// - `POST /`, `POST /webhook`: event ingestion
/// - `GET /`: health check
/// - `GET /test`: diagnostic
/// - `GET /metrics`: Prometheus exposition
pub fn build_router(
    pipeline: Arc<MigrationPipeline>,
    metrics: Arc<MetricsState>,
    auth_token: Option<&str>,
) -> Router {
    let app_state = Arc::new(AppState {
        pipeline,
        started_at: Utc::now(),
    });

    let mut app_routes = Router::new()
        .route("/", get(health_check).post(webhook_handler))
        .route("/webhook", post(webhook_handler))
        .route("/test", get(test_endpoint))
        .with_state(app_state);

    if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
        app_routes = app_routes.route_layer(axum_middleware::from_fn_with_state(
            WebhookAuthState::new(token),
            webhook_auth,
        ));
    }

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(app_routes)
        .merge(metrics_routes)
        .layer(axum_middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
