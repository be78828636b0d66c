use async_trait::async_trait;
use sqlx::PgPool;

use courtside_application::XpEventRepository;
use courtside_core::{AppError, AppResult};
use courtside_domain::XpEvent;

/// PostgreSQL-backed repository for the append-only XP event log.
#[derive(Clone)]
pub struct PostgresXpEventRepository {
    pool: PgPool,
}

impl PostgresXpEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl XpEventRepository for PostgresXpEventRepository {
    async fn append_event(&self, event: XpEvent) -> AppResult<()> {
        let xp_amount = i64::try_from(event.xp_amount).map_err(|error| {
            AppError::Validation(format!("xp amount {} out of range: {error}", event.xp_amount))
        })?;

        sqlx::query(
            r#"
            INSERT INTO xp_events (
                user_id,
                event_type,
                xp_amount,
                metadata,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.user_id.as_uuid())
        .bind(event.event_type.as_str())
        .bind(xp_amount)
        .bind(event.metadata)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append xp event: {error}")))?;

        Ok(())
    }
}
