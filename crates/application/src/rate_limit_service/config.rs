use std::collections::HashMap;

use courtside_core::{AppError, AppResult, NonEmptyString};
use courtside_domain::{DEFAULT_RATE_LIMIT_POLICY, RateLimitPolicy, STANDARD_RATE_LIMIT_POLICIES};

const ENV_PREFIX: &str = "RATE_LIMIT_";
const DEFAULT_ACTION: &str = "default";

/// Static policy table keyed by action name.
///
/// Unknown actions resolve to the default policy rather than failing.
#[derive(Debug, Clone)]
pub struct RateLimitPolicies {
    policies: HashMap<String, RateLimitPolicy>,
    default_policy: RateLimitPolicy,
}

impl RateLimitPolicies {
    /// Creates a table with no explicit entries.
    #[must_use]
    pub fn new(default_policy: RateLimitPolicy) -> Self {
        Self {
            policies: HashMap::new(),
            default_policy,
        }
    }

    /// Returns the reference policy table.
    #[must_use]
    pub fn standard() -> Self {
        let policies = STANDARD_RATE_LIMIT_POLICIES
            .iter()
            .map(|(action, policy)| ((*action).to_owned(), *policy))
            .collect();

        Self {
            policies,
            default_policy: DEFAULT_RATE_LIMIT_POLICY,
        }
    }

    /// Adds or replaces the policy for one action.
    pub fn with_policy(
        mut self,
        action: impl Into<String>,
        policy: RateLimitPolicy,
    ) -> AppResult<Self> {
        let action = NonEmptyString::new(action)?;
        self.policies.insert(action.into(), policy);
        Ok(self)
    }

    /// Replaces the fallback policy.
    #[must_use]
    pub fn with_default(mut self, policy: RateLimitPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Applies `RATE_LIMIT_<ACTION>=<max_attempts>/<window_ms>` overrides.
    ///
    /// `RATE_LIMIT_DEFAULT` replaces the fallback policy. Variables without
    /// the prefix are ignored; malformed values are rejected.
    pub fn with_env_overrides<I>(mut self, vars: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(action) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            let action = action.to_ascii_lowercase();
            let policy = parse_policy(name.as_str(), value.as_str())?;
            if action == DEFAULT_ACTION {
                self.default_policy = policy;
            } else {
                self = self.with_policy(action, policy)?;
            }
        }

        Ok(self)
    }

    /// Returns the effective policy for an action.
    #[must_use]
    pub fn policy_for(&self, action: &str) -> RateLimitPolicy {
        self.policies
            .get(action)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Returns the fallback policy.
    #[must_use]
    pub fn default_policy(&self) -> RateLimitPolicy {
        self.default_policy
    }
}

impl Default for RateLimitPolicies {
    fn default() -> Self {
        Self::standard()
    }
}

fn parse_policy(name: &str, value: &str) -> AppResult<RateLimitPolicy> {
    let Some((max_attempts, window_ms)) = value.trim().split_once('/') else {
        return Err(AppError::Validation(format!(
            "{name} must look like '<max_attempts>/<window_ms>', got '{value}'"
        )));
    };

    let max_attempts = max_attempts
        .trim()
        .parse::<u32>()
        .map_err(|error| AppError::Validation(format!("invalid {name} max_attempts: {error}")))?;
    let window_ms = window_ms
        .trim()
        .parse::<u64>()
        .map_err(|error| AppError::Validation(format!("invalid {name} window_ms: {error}")))?;

    RateLimitPolicy::new(max_attempts, window_ms)
}
