//! Notification service for Migration Sentinel
//!
//! Formats migration alerts and pushes them to chat services. Delivery is
//! best-effort: failures are logged and swallowed, never retried.

pub mod format;
pub mod telegram;

pub use format::{format_migration, FormatSettings, MigrationAlert};
pub use telegram::TelegramNotifier;

use std::sync::Arc;

/// A fully composed, HTML-formatted message ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage(String);

impl NotificationMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notification service trait
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    /// Deliver a message
    async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()>;

    /// Check if the service is enabled
    fn is_enabled(&self) -> bool;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Composite notifier that can send to multiple services
pub struct CompositeNotifier {
    services: Vec<Arc<dyn NotificationService>>,
}

impl CompositeNotifier {
    /// Create a new composite notifier
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
        }
    }

    /// Add a notification service
    pub fn add_service(&mut self, service: Arc<dyn NotificationService>) {
        self.services.push(service);
    }

    /// Whether any service would receive a message
    pub fn has_enabled_services(&self) -> bool {
        self.services.iter().any(|s| s.is_enabled())
    }

    /// Send to all enabled services, returning how many accepted it.
    ///
    /// Errors are logged here and never reach the caller.
    pub async fn notify(&self, message: &NotificationMessage) -> usize {
        let mut delivered = 0;

        for service in &self.services {
            if !service.is_enabled() {
                continue;
            }

            match service.send(message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!(
                        service = service.name(),
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }

        delivered
    }
}

impl Default for CompositeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
