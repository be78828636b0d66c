//! Player progression records.

use serde::{Deserialize, Serialize};

use crate::{LevelProgress, UserId, calculate_level};

/// Stored progression for one user.
///
/// `total_xp` is the source of truth; `level` and `xp_to_next_level` are a
/// cached projection of it and may lag behind after a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    /// Owner of the record.
    pub user_id: UserId,
    /// Cumulative XP, never decreasing.
    pub total_xp: u64,
    /// Cached level.
    pub level: u32,
    /// Cached XP needed for the next level.
    pub xp_to_next_level: u64,
}

impl UserProgress {
    /// Recomputes the level projection from `total_xp`.
    #[must_use]
    pub fn derived_progress(&self) -> LevelProgress {
        calculate_level(self.total_xp)
    }

    /// Returns whether the cached projection matches `total_xp`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let derived = self.derived_progress();
        self.level == derived.level && self.xp_to_next_level == derived.xp_to_next_level
    }
}

/// Result of one XP award, used by callers to decide on a level-up toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpResult {
    /// Whether the new level is above the previously stored level.
    pub leveled_up: bool,
    /// Level after the award.
    pub new_level: u32,
    /// XP granted by this award.
    pub xp_gained: u64,
    /// Cumulative XP after the award.
    pub total_xp: u64,
    /// XP still needed to reach the level after `new_level`.
    pub xp_for_next_level: u64,
}

/// One ranked row of the XP leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Ranked user.
    pub user_id: UserId,
    /// Public display name.
    pub display_name: String,
    /// Profile picture location, if any.
    pub avatar_url: Option<String>,
    /// Level derived from `total_xp`.
    pub level: u32,
    /// Cumulative XP.
    pub total_xp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_level_is_detected() {
        let progress = UserProgress {
            user_id: UserId::new(),
            total_xp: 2_500,
            level: 1,
            xp_to_next_level: 500,
        };

        assert!(!progress.is_consistent());
        assert_eq!(progress.derived_progress().level, 4);
    }

    #[test]
    fn fresh_record_is_consistent() {
        let progress = UserProgress {
            user_id: UserId::new(),
            total_xp: 0,
            level: 1,
            xp_to_next_level: 500,
        };

        assert!(progress.is_consistent());
    }
}
