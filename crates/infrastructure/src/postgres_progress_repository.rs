//! PostgreSQL-backed progression repository using the `player_progress` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use courtside_application::{LeaderboardRepository, UserProgressRepository, XpIncrement};
use courtside_core::{AppError, AppResult};
use courtside_domain::{LeaderboardEntry, LevelProgress, UserId, UserProgress, calculate_level};


/// PostgreSQL implementation of the progression and leaderboard ports.
#[derive(Clone)]
pub struct PostgresProgressRepository {
    pool: PgPool,
}

impl PostgresProgressRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a level 1 record for a player. Existing records are kept.
    pub async fn register_player(
        &self,
        user_id: UserId,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> AppResult<()> {
        let start = calculate_level(0);
        sqlx::query(
            r#"
            INSERT INTO player_progress (user_id, display_name, avatar_url, level, xp_to_next_level)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(display_name)
        .bind(avatar_url)
        .bind(to_db_level(start.level)?)
        .bind(to_db_xp(start.xp_to_next_level)?)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to register player: {error}")))?;

        Ok(())
    }
}

#[async_trait]
impl UserProgressRepository for PostgresProgressRepository {
    async fn find_progress(&self, user_id: UserId) -> AppResult<Option<UserProgress>> {
        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT user_id, total_xp, level, xp_to_next_level
            FROM player_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user progress: {error}")))?;

        row.map(ProgressRow::into_domain).transpose()
    }

    async fn increment_xp(&self, user_id: UserId, xp_amount: u64) -> AppResult<XpIncrement> {
        // Single statement so concurrent awards cannot lose increments.
        let row = sqlx::query_as::<_, IncrementRow>(
            r#"
            UPDATE player_progress
            SET total_xp = total_xp + $2,
                updated_at = now()
            WHERE user_id = $1
            RETURNING total_xp - $2 AS previous_total_xp, level AS previous_level, total_xp
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(to_db_xp(xp_amount)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to increment user xp: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("progress for user '{user_id}'")))?;

        Ok(XpIncrement {
            previous_total_xp: from_db_xp(row.previous_total_xp)?,
            previous_level: from_db_level(row.previous_level)?,
            total_xp: from_db_xp(row.total_xp)?,
        })
    }

    async fn store_level(
        &self,
        user_id: UserId,
        expected_total_xp: u64,
        progress: LevelProgress,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE player_progress
            SET level = $3,
                xp_to_next_level = $4,
                updated_at = now()
            WHERE user_id = $1
              AND total_xp = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(to_db_xp(expected_total_xp)?)
        .bind(to_db_level(progress.level)?)
        .bind(to_db_xp(progress.xp_to_next_level)?)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to store user level: {error}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_progress(
        &self,
        after: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<UserProgress>> {
        let limit = i64::try_from(limit)
            .map_err(|error| AppError::Validation(format!("invalid page limit: {error}")))?;

        let rows = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT user_id, total_xp, level, xp_to_next_level
            FROM player_progress
            WHERE ($1::uuid IS NULL OR user_id > $1)
            ORDER BY user_id ASC
            LIMIT $2
            "#,
        )
        .bind(after.map(|user_id| user_id.as_uuid()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user progress: {error}")))?;

        rows.into_iter().map(ProgressRow::into_domain).collect()
    }
}

#[async_trait]
impl LeaderboardRepository for PostgresProgressRepository {
    async fn top_by_xp(&self, limit: usize) -> AppResult<Vec<LeaderboardEntry>> {
        let limit = i64::try_from(limit)
            .map_err(|error| AppError::Validation(format!("invalid leaderboard limit: {error}")))?;

        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT user_id, display_name, avatar_url, level, total_xp
            FROM player_progress
            ORDER BY total_xp DESC, user_id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load leaderboard: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(LeaderboardEntry {
                    user_id: UserId::from_uuid(row.user_id),
                    display_name: row.display_name,
                    avatar_url: row.avatar_url,
                    level: from_db_level(row.level)?,
                    total_xp: from_db_xp(row.total_xp)?,
                })
            })
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    user_id: Uuid,
    total_xp: i64,
    level: i32,
    xp_to_next_level: i64,
}

impl ProgressRow {
    fn into_domain(self) -> AppResult<UserProgress> {
        Ok(UserProgress {
            user_id: UserId::from_uuid(self.user_id),
            total_xp: from_db_xp(self.total_xp)?,
            level: from_db_level(self.level)?,
            xp_to_next_level: from_db_xp(self.xp_to_next_level)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct IncrementRow {
    previous_total_xp: i64,
    previous_level: i32,
    total_xp: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LeaderboardRow {
    user_id: Uuid,
    display_name: String,
    avatar_url: Option<String>,
    level: i32,
    total_xp: i64,
}

fn to_db_xp(value: u64) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|error| AppError::Validation(format!("xp value {value} out of range: {error}")))
}

fn from_db_xp(value: i64) -> AppResult<u64> {
    u64::try_from(value)
        .map_err(|error| AppError::Internal(format!("invalid stored xp value {value}: {error}")))
}

fn to_db_level(value: u32) -> AppResult<i32> {
    i32::try_from(value)
        .map_err(|error| AppError::Validation(format!("level {value} out of range: {error}")))
}

fn from_db_level(value: i32) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|error| AppError::Internal(format!("invalid stored level {value}: {error}")))
}
