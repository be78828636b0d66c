//! Application services and ports.

#![forbid(unsafe_code)]

mod clock;
mod gamification_service;
mod rate_limit_service;

pub use clock::{Clock, SystemClock};
pub use gamification_service::{
    GamificationService, LeaderboardRepository, MAX_LEADERBOARD_LIMIT, MAX_RECONCILE_BATCH_SIZE,
    SessionProvider, UserProgressRepository, XpEventRepository, XpIncrement,
};
pub use rate_limit_service::{
    ANONYMOUS_IDENTIFIER, Debounced, RateLimitPolicies, RateLimitService, RateLimitStore,
    Throttled, debounce, throttle,
};
