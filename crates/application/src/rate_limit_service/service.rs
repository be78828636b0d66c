use std::sync::Arc;

use tracing::debug;

use courtside_core::{AppError, AppResult};
use courtside_domain::{RateLimitDecision, RateLimitPolicy};

use crate::{Clock, SystemClock};

use super::config::RateLimitPolicies;
use super::ports::RateLimitStore;

/// Identifier used when the caller has no authenticated user yet.
pub const ANONYMOUS_IDENTIFIER: &str = "anonymous";

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
    policies: Arc<RateLimitPolicies>,
    clock: Arc<dyn Clock>,
}

impl RateLimitService {
    /// Creates a new rate limit service on the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>, policies: RateLimitPolicies) -> Self {
        Self::with_clock(store, policies, Arc::new(SystemClock))
    }

    /// Creates a new rate limit service with an explicit time source.
    #[must_use]
    pub fn with_clock(
        store: Arc<dyn RateLimitStore>,
        policies: RateLimitPolicies,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policies: Arc::new(policies),
            clock,
        }
    }

    /// Checks and records one attempt of `action` by `identifier`.
    ///
    /// A missing or blank identifier shares the [`ANONYMOUS_IDENTIFIER`]
    /// bucket. Rejection is reported in the returned decision.
    pub fn check(&self, action: &str, identifier: Option<&str>) -> RateLimitDecision {
        let policy = self.policies.policy_for(action);
        let key = composite_key(action, identifier);
        let decision = self.store.record_attempt(&key, &policy, self.clock.now());

        if !decision.allowed {
            debug!(
                key = %key,
                retry_after_ms = decision
                    .retry_after
                    .map(|delay| u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
                "rate limit rejected attempt"
            );
        }

        decision
    }

    /// Like [`Self::check`], but turns a rejection into
    /// `AppError::RateLimited` carrying the retry delay in whole seconds.
    pub fn enforce(&self, action: &str, identifier: Option<&str>) -> AppResult<RateLimitDecision> {
        let decision = self.check(action, identifier);
        if decision.allowed {
            return Ok(decision);
        }

        let seconds = decision.retry_after_seconds().unwrap_or(1);
        let unit = if seconds == 1 { "second" } else { "seconds" };
        Err(AppError::RateLimited(format!(
            "too many attempts, try again in {seconds} {unit}"
        )))
    }

    /// Clears the counter for one `(action, identifier)` key, e.g. after a
    /// successful password reset.
    pub fn reset(&self, action: &str, identifier: Option<&str>) {
        self.store.remove(&composite_key(action, identifier));
    }

    /// Clears every counter. Call on sign-out so throttling state does not
    /// carry over to the next account in the same process.
    pub fn clear_all(&self) {
        self.store.clear();
    }

    /// Returns the effective policy for an action.
    #[must_use]
    pub fn policy_for(&self, action: &str) -> RateLimitPolicy {
        self.policies.policy_for(action)
    }
}

fn composite_key(action: &str, identifier: Option<&str>) -> String {
    let identifier = identifier
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(ANONYMOUS_IDENTIFIER);
    format!("{action}:{identifier}")
}
