//! Fixed-window throttling rules.
//!
//! A window opens on the first attempt for a key and closes `window_ms`
//! later. Attempts inside the window increment the counter until the policy's
//! `max_attempts` is reached; rejected attempts leave the entry untouched.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use courtside_core::{AppError, AppResult};

/// Throttling policy for one action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_attempts: u32,
    window_ms: u64,
}

impl RateLimitPolicy {
    /// Creates a validated policy.
    pub fn new(max_attempts: u32, window_ms: u64) -> AppResult<Self> {
        if max_attempts == 0 {
            return Err(AppError::Validation(
                "rate limit max_attempts must be greater than zero".to_owned(),
            ));
        }

        if window_ms == 0 {
            return Err(AppError::Validation(
                "rate limit window_ms must be greater than zero".to_owned(),
            ));
        }

        Ok(Self::fixed(max_attempts, window_ms))
    }

    const fn fixed(max_attempts: u32, window_ms: u64) -> Self {
        Self {
            max_attempts,
            window_ms,
        }
    }

    /// Returns the number of attempts admitted per window.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the window length in milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    fn window(&self) -> TimeDelta {
        TimeDelta::try_milliseconds(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
            .unwrap_or(TimeDelta::MAX)
    }
}

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;

/// Policy applied to any action without an explicit entry.
pub const DEFAULT_RATE_LIMIT_POLICY: RateLimitPolicy = RateLimitPolicy::fixed(100, MINUTE_MS);

/// Reference policy table keyed by action name.
pub const STANDARD_RATE_LIMIT_POLICIES: &[(&str, RateLimitPolicy)] = &[
    ("login", RateLimitPolicy::fixed(5, 15 * MINUTE_MS)),
    ("signup", RateLimitPolicy::fixed(3, HOUR_MS)),
    ("password_reset", RateLimitPolicy::fixed(3, HOUR_MS)),
    ("create_post", RateLimitPolicy::fixed(10, MINUTE_MS)),
    ("comment", RateLimitPolicy::fixed(20, MINUTE_MS)),
    ("like", RateLimitPolicy::fixed(60, MINUTE_MS)),
    ("follow", RateLimitPolicy::fixed(30, MINUTE_MS)),
    ("send_message", RateLimitPolicy::fixed(30, MINUTE_MS)),
    ("create_booking", RateLimitPolicy::fixed(5, MINUTE_MS)),
    ("create_match", RateLimitPolicy::fixed(5, HOUR_MS)),
    ("report_content", RateLimitPolicy::fixed(5, HOUR_MS)),
    ("search", RateLimitPolicy::fixed(30, MINUTE_MS)),
];

/// Counter state for one `(action, identifier)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Attempts admitted in the current window.
    pub count: u32,
    /// Instant at which the window closes and the counter starts over.
    pub window_reset_at: DateTime<Utc>,
}

/// Outcome of one throttling check. Rejection is a value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the attempt may proceed.
    pub allowed: bool,
    /// Attempts still available in the current window.
    pub remaining: u32,
    /// Time until the window closes; set only on rejection.
    pub retry_after: Option<Duration>,
}

impl RateLimitDecision {
    /// Returns the retry delay rounded up to whole seconds, if rejected.
    #[must_use]
    pub fn retry_after_seconds(&self) -> Option<u64> {
        self.retry_after.map(|delay| {
            let seconds = delay.as_millis().div_ceil(1000);
            u64::try_from(seconds).unwrap_or(u64::MAX).max(1)
        })
    }
}

impl RateLimitEntry {
    /// Applies one attempt to the current entry.
    ///
    /// Returns the entry to store and the decision. On rejection the returned
    /// entry equals the current one.
    #[must_use]
    pub fn register_attempt(
        current: Option<&Self>,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> (Self, RateLimitDecision) {
        let active = current.filter(|entry| now < entry.window_reset_at);

        let Some(entry) = active else {
            let fresh = Self {
                count: 1,
                window_reset_at: now
                    .checked_add_signed(policy.window())
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            };
            return (
                fresh,
                RateLimitDecision {
                    allowed: true,
                    remaining: policy.max_attempts.saturating_sub(1),
                    retry_after: None,
                },
            );
        };

        if entry.count >= policy.max_attempts {
            let retry_after = (entry.window_reset_at - now).to_std().unwrap_or_default();
            return (
                *entry,
                RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    retry_after: Some(retry_after),
                },
            );
        }

        let updated = Self {
            count: entry.count + 1,
            window_reset_at: entry.window_reset_at,
        };
        (
            updated,
            RateLimitDecision {
                allowed: true,
                remaining: policy.max_attempts - updated.count,
                retry_after: None,
            },
        )
    }
}
