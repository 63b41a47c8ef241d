//! Token enrichment
//!
//! A `MetadataSource` answers three independent lookups for a mint. The
//! `Enricher` runs them concurrently under a per-lookup time limit and folds
//! every failure into a default value, so callers always get a usable
//! result and the formatter never sees an error branch.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::AppResult;
use crate::metrics::MetricsState;
use crate::models::{FirstTransaction, HolderInfo, TokenInfo, TokenMetadata};

/// Fallible metadata lookups keyed by mint address
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Display name and symbol
    async fn token_metadata(&self, mint: &str) -> AppResult<TokenMetadata>;

    /// Oldest recorded transaction touching the mint
    async fn first_transaction(&self, mint: &str) -> AppResult<Option<FirstTransaction>>;

    /// Non-zero token accounts, summarized
    async fn holder_distribution(&self, mint: &str) -> AppResult<HolderInfo>;
}

/// Result of enriching one mint
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub token: TokenInfo,
    pub holders: HolderInfo,
}

/// Fail-soft composition of a `MetadataSource`
pub struct Enricher {
    source: Arc<dyn MetadataSource>,
    /// Whole-lookup limit; sources bound their own calls and pages
    timeout: Duration,
    include_first_transaction: bool,
    metrics: Option<Arc<MetricsState>>,
}

impl Enricher {
    pub fn new(source: Arc<dyn MetadataSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            include_first_transaction: true,
            metrics: None,
        }
    }

    /// Skip the first-transaction lookup when time-to-bond is disabled
    pub fn with_first_transaction(mut self, enabled: bool) -> Self {
        self.include_first_transaction = enabled;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run all lookups for a mint concurrently. Never fails.
    pub async fn enrich(&self, mint: &str) -> Enrichment {
        let first_transaction = async {
            if self.include_first_transaction {
                self.soft("first_transaction", mint, self.source.first_transaction(mint))
                    .await
            } else {
                None
            }
        };

        let (metadata, first_transaction, holders) = tokio::join!(
            self.soft("token_metadata", mint, self.source.token_metadata(mint)),
            first_transaction,
            self.soft("holder_distribution", mint, self.source.holder_distribution(mint)),
        );

        Enrichment {
            token: TokenInfo::from_parts(mint, metadata, first_transaction),
            holders,
        }
    }

    async fn soft<T, F>(&self, source: &'static str, mint: &str, lookup: F) -> T
    where
        T: Default,
        F: Future<Output = AppResult<T>>,
    {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, lookup).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Some(ref metrics) = self.metrics {
            metrics
                .enrichment_latency
                .with_label_values(&[source])
                .observe(elapsed_ms);
        }

        match result {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::error!(source, mint, error = %e, "Enrichment lookup failed, using defaults");
                self.record_failure(source);
                T::default()
            }
            Err(_) => {
                tracing::error!(
                    source,
                    mint,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Enrichment lookup timed out, using defaults"
                );
                self.record_failure(source);
                T::default()
            }
        }
    }

    fn record_failure(&self, source: &'static str) {
        if let Some(ref metrics) = self.metrics {
            metrics
                .enrichment_failures
                .with_label_values(&[source])
                .inc();
        }
    }
}
