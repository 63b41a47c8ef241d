//! Migration event pipeline
//!
//! received → dedup → match → enrich → format → dispatch
//!
//! Each event is isolated: a failure or panic while handling one event is
//! logged and counted, and the remaining events in the batch still run.

use chrono::Utc;
use futures_util::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::dedup::ProcessedStore;
use crate::enrichment::Enricher;
use crate::matcher::EventMatcher;
use crate::metrics::MetricsState;
use crate::models::{TokenTransfer, TransactionEvent};
use crate::notifications::{format_migration, CompositeNotifier, FormatSettings, MigrationAlert};

/// Terminal state of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Missing signature; cannot be deduplicated
    Malformed,
    /// Signature already processed
    Duplicate,
    /// No qualifying transfer
    NoMatch,
    /// One or more migrations were detected and dispatched
    Notified {
        /// Qualifying transfers in the event
        matches: usize,
        /// Successful deliveries across all matches and services
        delivered: usize,
    },
}

/// Per-request tally, logged by the webhook handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub events: usize,
    pub malformed: usize,
    pub duplicates: usize,
    pub unmatched: usize,
    pub migrations: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: EventOutcome) {
        match outcome {
            EventOutcome::Malformed => self.malformed += 1,
            EventOutcome::Duplicate => self.duplicates += 1,
            EventOutcome::NoMatch => self.unmatched += 1,
            EventOutcome::Notified { matches, delivered } => {
                self.migrations += matches;
                self.delivered += delivered;
            }
        }
    }
}

/// Orchestrates processing of webhook events
pub struct MigrationPipeline {
    store: Arc<ProcessedStore>,
    matcher: EventMatcher,
    enricher: Enricher,
    notifier: Arc<CompositeNotifier>,
    settings: FormatSettings,
    metrics: Arc<MetricsState>,
}

impl MigrationPipeline {
    pub fn new(
        store: Arc<ProcessedStore>,
        matcher: EventMatcher,
        enricher: Enricher,
        notifier: Arc<CompositeNotifier>,
        settings: FormatSettings,
        metrics: Arc<MetricsState>,
    ) -> Self {
        Self {
            store,
            matcher,
            enricher,
            notifier,
            settings,
            metrics,
        }
    }

    /// Processed-signature store
    pub fn store(&self) -> &Arc<ProcessedStore> {
        &self.store
    }

    /// Process one event to completion
    pub async fn process_event(&self, event: &TransactionEvent) -> EventOutcome {
        self.metrics.events_received.inc();

        if event.signature.is_empty() {
            tracing::debug!("Event without signature ignored");
            return EventOutcome::Malformed;
        }

        // Marked before matching so non-migrations are never re-inspected either
        if !self.store.try_mark(&event.signature, Utc::now()) {
            self.metrics.events_duplicate.inc();
            tracing::debug!(signature = %event.signature, "Duplicate event skipped");
            return EventOutcome::Duplicate;
        }
        self.metrics
            .processed_signatures
            .set(self.store.len() as i64);

        let matches = self.matcher.matching_transfers(event);
        if matches.is_empty() {
            return EventOutcome::NoMatch;
        }

        let mut delivered = 0;
        for transfer in &matches {
            self.metrics.migrations_detected.inc();
            delivered += self.dispatch_migration(&event.signature, transfer).await;
        }

        EventOutcome::Notified {
            matches: matches.len(),
            delivered,
        }
    }

    async fn dispatch_migration(&self, signature: &str, transfer: &TokenTransfer) -> usize {
        let enrichment = self.enricher.enrich(&transfer.mint).await;

        tracing::warn!(
            signature,
            mint = %transfer.mint,
            name = %enrichment.token.name,
            symbol = %enrichment.token.symbol,
            amount = transfer.token_amount,
            total_holders = enrichment.holders.total_holders,
            first_transaction = ?enrichment.token.first_transaction.as_ref().map(|f| &f.signature),
            "New token migration to Raydium detected"
        );

        let alert = MigrationAlert {
            signature,
            transfer,
            token: &enrichment.token,
            holders: &enrichment.holders,
        };
        let message = format_migration(&alert, Utc::now(), &self.settings);

        let delivered = self.notifier.notify(&message).await;
        if delivered > 0 {
            self.metrics.notifications_sent.inc_by(delivered as u64);
        } else if self.notifier.has_enabled_services() {
            self.metrics.notifications_failed.inc();
        } else {
            tracing::warn!(signature, "No notification service enabled, alert not delivered");
        }

        delivered
    }

    /// Process a batch sequentially in array order.
    ///
    /// Unreadable elements count as malformed. A panic inside one event is
    /// caught here and does not stop the batch.
    pub async fn process_batch(
        &self,
        events: Vec<Result<TransactionEvent, serde_json::Error>>,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for item in events {
            summary.events += 1;

            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    self.metrics.events_received.inc();
                    tracing::warn!(error = %e, "Unreadable webhook event ignored");
                    summary.malformed += 1;
                    continue;
                }
            };

            match AssertUnwindSafe(self.process_event(&event))
                .catch_unwind()
                .await
            {
                Ok(outcome) => summary.record(outcome),
                Err(panic) => {
                    tracing::error!(
                        signature = %event.signature,
                        panic = %panic_message(panic.as_ref()),
                        "Event processing panicked"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
