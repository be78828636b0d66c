use async_trait::async_trait;

use courtside_core::AppResult;
use courtside_domain::{LeaderboardEntry, LevelProgress, UserId, UserProgress, XpEvent};

/// Totals observed by one atomic XP increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpIncrement {
    /// Cumulative XP before the increment.
    pub previous_total_xp: u64,
    /// Level stored before the increment. May be stale.
    pub previous_level: u32,
    /// Cumulative XP after the increment.
    pub total_xp: u64,
}

/// Repository port for user progression.
#[async_trait]
pub trait UserProgressRepository: Send + Sync {
    /// Finds the progression record for a user.
    async fn find_progress(&self, user_id: UserId) -> AppResult<Option<UserProgress>>;

    /// Atomically adds `xp_amount` to the user's `total_xp`.
    ///
    /// Fails with `AppError::NotFound` when the user has no record.
    async fn increment_xp(&self, user_id: UserId, xp_amount: u64) -> AppResult<XpIncrement>;

    /// Stores the level projection computed for `expected_total_xp`.
    ///
    /// Writes only while the stored `total_xp` still equals
    /// `expected_total_xp` and returns whether the write happened, so a
    /// projection of an older total never overwrites a newer one.
    async fn store_level(
        &self,
        user_id: UserId,
        expected_total_xp: u64,
        progress: LevelProgress,
    ) -> AppResult<bool>;

    /// Lists records ordered by ascending user id, starting after `after`.
    async fn list_progress(
        &self,
        after: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<UserProgress>>;
}

/// Repository port for the append-only XP event log.
#[async_trait]
pub trait XpEventRepository: Send + Sync {
    /// Appends an XP event entry.
    async fn append_event(&self, event: XpEvent) -> AppResult<()>;
}

/// Read port for the XP leaderboard.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Returns at most `limit` entries ordered by `total_xp` descending, then
    /// user id ascending.
    async fn top_by_xp(&self, limit: usize) -> AppResult<Vec<LeaderboardEntry>>;
}

/// Auth port resolving the signed-in user.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the current user, or `None` when no session exists.
    async fn current_user_id(&self) -> AppResult<Option<UserId>>;
}
