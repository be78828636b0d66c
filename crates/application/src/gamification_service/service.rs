use std::sync::Arc;

use tracing::{debug, info, warn};

use courtside_core::{AppError, AppResult};
use courtside_domain::{
    LeaderboardEntry, LevelUpResult, UserId, UserProgress, XpEvent, XpEventType, calculate_level,
};

use crate::{Clock, SystemClock};

use super::ports::{
    LeaderboardRepository, SessionProvider, UserProgressRepository, XpEventRepository,
};

/// Largest leaderboard page a caller may request.
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Largest page size used when reconciling stored levels.
pub const MAX_RECONCILE_BATCH_SIZE: usize = 5_000;

/// Application service for XP awards and leveling.
#[derive(Clone)]
pub struct GamificationService {
    session_provider: Arc<dyn SessionProvider>,
    progress_repository: Arc<dyn UserProgressRepository>,
    event_repository: Arc<dyn XpEventRepository>,
    leaderboard_repository: Arc<dyn LeaderboardRepository>,
    clock: Arc<dyn Clock>,
}

impl GamificationService {
    /// Creates a new gamification service on the system clock.
    #[must_use]
    pub fn new(
        session_provider: Arc<dyn SessionProvider>,
        progress_repository: Arc<dyn UserProgressRepository>,
        event_repository: Arc<dyn XpEventRepository>,
        leaderboard_repository: Arc<dyn LeaderboardRepository>,
    ) -> Self {
        Self {
            session_provider,
            progress_repository,
            event_repository,
            leaderboard_repository,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source used for event timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Awards the fixed XP reward for `event_type` to the signed-in user.
    ///
    /// The increment is applied atomically by the repository, then the level
    /// projection for the new total is stored. Only a failed increment is
    /// returned as an error. Storing the level and logging the event are
    /// best-effort once the increment has landed.
    pub async fn award_xp(
        &self,
        event_type: XpEventType,
        metadata: Option<serde_json::Value>,
    ) -> AppResult<LevelUpResult> {
        let user_id = self.require_user().await?;
        let xp_amount = event_type.xp_amount();

        let increment = self
            .progress_repository
            .increment_xp(user_id, xp_amount)
            .await?;
        let progress = calculate_level(increment.total_xp);
        let leveled_up = progress.level > increment.previous_level;

        match self
            .progress_repository
            .store_level(user_id, increment.total_xp, progress)
            .await
        {
            Ok(true) => {}
            Ok(false) => debug!(
                user_id = %user_id,
                total_xp = increment.total_xp,
                "level projection superseded by a concurrent award"
            ),
            // The increment is committed; reconciliation repairs the cached level.
            Err(error) => warn!(
                user_id = %user_id,
                total_xp = increment.total_xp,
                error = %error,
                "failed to store level projection"
            ),
        }

        let event = XpEvent {
            user_id,
            event_type,
            xp_amount,
            metadata: metadata.unwrap_or_else(|| serde_json::json!({})),
            created_at: self.clock.now(),
        };
        if let Err(error) = self.event_repository.append_event(event).await {
            warn!(
                user_id = %user_id,
                event_type = %event_type,
                error = %error,
                "failed to append xp event"
            );
        }

        if leveled_up {
            info!(
                user_id = %user_id,
                previous_level = increment.previous_level,
                new_level = progress.level,
                total_xp = increment.total_xp,
                "user leveled up"
            );
        }

        Ok(LevelUpResult {
            leveled_up,
            new_level: progress.level,
            xp_gained: xp_amount,
            total_xp: increment.total_xp,
            xp_for_next_level: progress.xp_to_next_level,
        })
    }

    /// Returns a user's progression with the level recomputed from `total_xp`.
    pub async fn get_progress(&self, user_id: UserId) -> AppResult<UserProgress> {
        let stored = self
            .progress_repository
            .find_progress(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("progress for user '{user_id}'")))?;
        let derived = stored.derived_progress();

        Ok(UserProgress {
            level: derived.level,
            xp_to_next_level: derived.xp_to_next_level,
            ..stored
        })
    }

    /// Returns the top `limit` users by XP, ties broken by ascending user id.
    ///
    /// Levels are recomputed from `total_xp` rather than read from storage.
    pub async fn get_leaderboard(&self, limit: usize) -> AppResult<Vec<LeaderboardEntry>> {
        if limit == 0 || limit > MAX_LEADERBOARD_LIMIT {
            return Err(AppError::Validation(format!(
                "leaderboard limit must be between 1 and {MAX_LEADERBOARD_LIMIT}"
            )));
        }

        let mut entries = self.leaderboard_repository.top_by_xp(limit).await?;
        for entry in &mut entries {
            entry.level = calculate_level(entry.total_xp).level;
        }
        entries.sort_by(|left, right| {
            right
                .total_xp
                .cmp(&left.total_xp)
                .then_with(|| left.user_id.cmp(&right.user_id))
        });
        entries.truncate(limit);

        Ok(entries)
    }

    /// Rewrites cached levels that disagree with `total_xp`.
    ///
    /// Pages through every record in user id order and returns how many
    /// records were fixed.
    pub async fn reconcile_levels(&self, batch_size: usize) -> AppResult<u64> {
        if batch_size == 0 || batch_size > MAX_RECONCILE_BATCH_SIZE {
            return Err(AppError::Validation(format!(
                "reconcile batch size must be between 1 and {MAX_RECONCILE_BATCH_SIZE}"
            )));
        }

        let mut fixed = 0_u64;
        let mut after = None;
        loop {
            let page = self
                .progress_repository
                .list_progress(after, batch_size)
                .await?;

            for record in page.iter().filter(|record| !record.is_consistent()) {
                let derived = record.derived_progress();
                let stored = self
                    .progress_repository
                    .store_level(record.user_id, record.total_xp, derived)
                    .await?;
                if stored {
                    fixed = fixed.saturating_add(1);
                    debug!(
                        user_id = %record.user_id,
                        stale_level = record.level,
                        level = derived.level,
                        "reconciled stored level"
                    );
                }
            }

            match page.last() {
                Some(last) if page.len() == batch_size => after = Some(last.user_id),
                _ => break,
            }
        }

        Ok(fixed)
    }

    async fn require_user(&self) -> AppResult<UserId> {
        self.session_provider
            .current_user_id()
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("sign in to earn experience points".to_owned())
            })
    }
}
