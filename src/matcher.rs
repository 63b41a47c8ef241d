//! Migration transfer matching

use crate::config::MigrationConfig;
use crate::models::{TokenTransfer, TransactionEvent};

/// Filters token transfers that indicate a migration to the watch address
#[derive(Debug, Clone)]
pub struct EventMatcher {
    watch_address: String,
    excluded_amount: i64,
}

impl EventMatcher {
    pub fn new(watch_address: impl Into<String>, excluded_amount: i64) -> Self {
        Self {
            watch_address: watch_address.into(),
            excluded_amount,
        }
    }

    pub fn from_config(config: &MigrationConfig) -> Self {
        Self::new(config.watch_address.clone(), config.excluded_amount)
    }

    pub fn watch_address(&self) -> &str {
        &self.watch_address
    }

    /// Check a single transfer
    pub fn is_migration(&self, transfer: &TokenTransfer) -> bool {
        transfer.to_user_account == self.watch_address
            && transfer.whole_amount() != self.excluded_amount
    }

    /// All qualifying transfers in event order.
    ///
    /// Every match is returned; an event carrying two migrations notifies twice.
    pub fn matching_transfers<'a>(&self, event: &'a TransactionEvent) -> Vec<&'a TokenTransfer> {
        event
            .token_transfers
            .iter()
            .filter(|t| self.is_migration(t))
            .collect()
    }
}
