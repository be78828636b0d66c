use chrono::{DateTime, Utc};

use courtside_domain::{RateLimitDecision, RateLimitPolicy};

/// Store port for rate limit counters.
///
/// Calls are synchronous and must not suspend. Implementations apply
/// [`courtside_domain::RateLimitEntry::register_attempt`] atomically per key.
pub trait RateLimitStore: Send + Sync {
    /// Records an attempt for the given key under `policy` and returns the
    /// decision. Rejected attempts leave the stored entry unchanged.
    fn record_attempt(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> RateLimitDecision;

    /// Deletes the entry for one key.
    fn remove(&self, key: &str);

    /// Deletes every entry.
    fn clear(&self);
}
