//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod leveling;
mod progress;
mod rate_limit;
mod user;
mod xp_event;

pub use leveling::{
    LEVEL_THRESHOLDS, LevelProgress, XP_PER_EXTRAPOLATED_LEVEL, calculate_level,
    xp_required_for_level,
};
pub use progress::{LeaderboardEntry, LevelUpResult, UserProgress};
pub use rate_limit::{
    DEFAULT_RATE_LIMIT_POLICY, RateLimitDecision, RateLimitEntry, RateLimitPolicy,
    STANDARD_RATE_LIMIT_POLICIES,
};
pub use user::UserId;
pub use xp_event::{XpEvent, XpEventType};
