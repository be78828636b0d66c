use std::collections::BTreeMap;

use async_trait::async_trait;
use courtside_application::{
    LeaderboardRepository, UserProgressRepository, XpEventRepository, XpIncrement,
};
use courtside_core::{AppError, AppResult};
use courtside_domain::{
    LeaderboardEntry, LevelProgress, UserId, UserProgress, XpEvent, calculate_level,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct PlayerRecord {
    display_name: String,
    avatar_url: Option<String>,
    progress: UserProgress,
}

/// In-memory progression store implementing every gamification persistence
/// port. Used for local development and tests.
#[derive(Default)]
pub struct InMemoryProgressRepository {
    players: RwLock<BTreeMap<UserId, PlayerRecord>>,
    events: RwLock<Vec<XpEvent>>,
}

impl InMemoryProgressRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a level 1 record for a player. Existing records are kept.
    pub async fn register_player(
        &self,
        user_id: UserId,
        display_name: impl Into<String>,
        avatar_url: Option<String>,
    ) {
        let start = calculate_level(0);
        self.players
            .write()
            .await
            .entry(user_id)
            .or_insert_with(|| PlayerRecord {
                display_name: display_name.into(),
                avatar_url,
                progress: UserProgress {
                    user_id,
                    total_xp: 0,
                    level: start.level,
                    xp_to_next_level: start.xp_to_next_level,
                },
            });
    }

    /// Returns the logged XP events, oldest first.
    pub async fn events(&self) -> Vec<XpEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl UserProgressRepository for InMemoryProgressRepository {
    async fn find_progress(&self, user_id: UserId) -> AppResult<Option<UserProgress>> {
        Ok(self
            .players
            .read()
            .await
            .get(&user_id)
            .map(|record| record.progress))
    }

    async fn increment_xp(&self, user_id: UserId, xp_amount: u64) -> AppResult<XpIncrement> {
        let mut players = self.players.write().await;
        let record = players
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("progress for user '{user_id}'")))?;

        let previous_total_xp = record.progress.total_xp;
        let total_xp = previous_total_xp.checked_add(xp_amount).ok_or_else(|| {
            AppError::Conflict(format!("total xp overflow for user '{user_id}'"))
        })?;
        record.progress.total_xp = total_xp;

        Ok(XpIncrement {
            previous_total_xp,
            previous_level: record.progress.level,
            total_xp,
        })
    }

    async fn store_level(
        &self,
        user_id: UserId,
        expected_total_xp: u64,
        progress: LevelProgress,
    ) -> AppResult<bool> {
        let mut players = self.players.write().await;
        let Some(record) = players
            .get_mut(&user_id)
            .filter(|record| record.progress.total_xp == expected_total_xp)
        else {
            return Ok(false);
        };

        record.progress.level = progress.level;
        record.progress.xp_to_next_level = progress.xp_to_next_level;
        Ok(true)
    }

    async fn list_progress(
        &self,
        after: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<UserProgress>> {
        let players = self.players.read().await;
        let page = match after {
            Some(after) => players
                .range((std::ops::Bound::Excluded(after), std::ops::Bound::Unbounded))
                .take(limit)
                .map(|(_, record)| record.progress)
                .collect(),
            None => players
                .values()
                .take(limit)
                .map(|record| record.progress)
                .collect(),
        };

        Ok(page)
    }
}

#[async_trait]
impl XpEventRepository for InMemoryProgressRepository {
    async fn append_event(&self, event: XpEvent) -> AppResult<()> {
        if !self.players.read().await.contains_key(&event.user_id) {
            return Err(AppError::NotFound(format!(
                "progress for user '{}'",
                event.user_id
            )));
        }

        self.events.write().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryProgressRepository {
    async fn top_by_xp(&self, limit: usize) -> AppResult<Vec<LeaderboardEntry>> {
        let mut entries: Vec<LeaderboardEntry> = self
            .players
            .read()
            .await
            .values()
            .map(|record| LeaderboardEntry {
                user_id: record.progress.user_id,
                display_name: record.display_name.clone(),
                avatar_url: record.avatar_url.clone(),
                level: record.progress.level,
                total_xp: record.progress.total_xp,
            })
            .collect();

        entries.sort_by(|left, right| {
            right
                .total_xp
                .cmp(&left.total_xp)
                .then_with(|| left.user_id.cmp(&right.user_id))
        });
        entries.truncate(limit);

        Ok(entries)
    }
}
