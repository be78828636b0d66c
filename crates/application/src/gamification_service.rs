//! Gamification ports and application service.
//!
//! Turns user activities into fixed XP rewards and keeps the cached level
//! projection in step with cumulative XP. The leveling curve itself lives in
//! `courtside_domain::calculate_level`.

mod activities;
mod ports;
mod service;


pub use ports::{
    LeaderboardRepository, SessionProvider, UserProgressRepository, XpEventRepository, XpIncrement,
};
pub use service::{GamificationService, MAX_LEADERBOARD_LIMIT, MAX_RECONCILE_BATCH_SIZE};
