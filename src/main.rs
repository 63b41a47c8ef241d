//! Migration Sentinel - Raydium migration alerts from Helius webhooks
//!
//! Main entry point. Loads configuration, wires the pipeline and serves
//! the webhook endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use migration_sentinel::config::AppConfig;
use migration_sentinel::metrics::MetricsState;
use migration_sentinel::server::{build_pipeline, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Migration Sentinel v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let metrics = Arc::new(MetricsState::new());
    let pipeline = build_pipeline(&config, metrics.clone())?;
    tracing::info!(
        watch_address = %config.migration.watch_address,
        excluded_amount = config.migration.excluded_amount,
        time_to_bond = config.pipeline.time_to_bond,
        "Migration pipeline initialized"
    );

    if config.webhook.auth_token.is_some() {
        tracing::info!("Webhook Authorization header required");
    }

    let app = build_router(pipeline, metrics, config.webhook.auth_token.as_deref());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    tracing::info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "migration_sentinel=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Load and validate configuration
fn load_config() -> anyhow::Result<AppConfig> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
