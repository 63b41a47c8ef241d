//! Processed-signature store
//!
//! Remembers every transaction signature seen during the process lifetime so
//! webhook redeliveries never produce a second notification.
//!
//! There is no eviction and nothing is persisted: memory grows with the
//! number of distinct signatures until the process restarts.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory signature → first-seen timestamp map
#[derive(Debug, Default)]
pub struct ProcessedStore {
    processed: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ProcessedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a signature was already seen
    pub fn has_processed(&self, signature: &str) -> bool {
        self.processed.lock().contains_key(signature)
    }

    /// Record a signature; keeps the original timestamp if already present
    pub fn mark_processed(&self, signature: &str, at: DateTime<Utc>) {
        self.processed
            .lock()
            .entry(signature.to_string())
            .or_insert(at);
    }

    /// Atomically check and record a signature.
    ///
    /// Returns `true` only for the first caller for a given signature.
    pub fn try_mark(&self, signature: &str, at: DateTime<Utc>) -> bool {
        let mut processed = self.processed.lock();
        if processed.contains_key(signature) {
            return false;
        }
        processed.insert(signature.to_string(), at);
        true
    }

    /// First-seen timestamp for a signature
    pub fn processed_at(&self, signature: &str) -> Option<DateTime<Utc>> {
        self.processed.lock().get(signature).copied()
    }

    pub fn len(&self) -> usize {
        self.processed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.lock().is_empty()
    }
}
