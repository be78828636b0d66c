use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use courtside_application::RateLimitStore;
use courtside_domain::{RateLimitDecision, RateLimitEntry, RateLimitPolicy};

/// Process-local rate limit store.
///
/// One instance is created at startup and shared by reference. A single
/// mutex guards the map so each attempt's read-increment-write is atomic.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tracked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether no key is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Counters are plain values; a panic mid-update cannot leave one torn.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn record_attempt(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut entries = self.lock();
        let (entry, decision) = RateLimitEntry::register_attempt(entries.get(key), policy, now);

        if decision.allowed {
            entries.insert(key.to_owned(), entry);
        }

        decision
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
