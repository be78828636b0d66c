//! Courtside level reconciliation worker.
//!
//! Periodically rewrites cached player levels that no longer match their
//! cumulative XP, e.g. after a leveling curve change.

#![forbid(unsafe_code)]

mod config;

use std::sync::Arc;

use courtside_application::GamificationService;
use courtside_core::{AppError, AppResult};
use courtside_infrastructure::{
    InMemorySessionProvider, PostgresProgressRepository, PostgresXpEventRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::WorkerConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(&config).await?;
    if config.run_migrations {
        sqlx::migrate!("../../crates/infrastructure/migrations")
            .run(&pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
    }
    let gamification_service = build_gamification_service(pool);

    info!(
        interval_ms = u64::try_from(config.reconcile_interval.as_millis()).unwrap_or(u64::MAX),
        batch_size = config.reconcile_batch_size,
        "courtside-worker started"
    );

    let mut ticker = tokio::time::interval(config.reconcile_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match gamification_service
                    .reconcile_levels(config.reconcile_batch_size)
                    .await
                {
                    Ok(0) => {}
                    Ok(fixed) => info!(fixed, "reconciled stale player levels"),
                    Err(error) => warn!(error = %error, "level reconciliation failed"),
                }
            }
            signal = &mut shutdown => {
                if let Err(error) = signal {
                    warn!(error = %error, "failed to listen for shutdown signal");
                }
                info!("courtside-worker stopping");
                return Ok(());
            }
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

async fn connect_pool(config: &WorkerConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_gamification_service(pool: PgPool) -> GamificationService {
    let progress_repository = Arc::new(PostgresProgressRepository::new(pool.clone()));
    let event_repository = Arc::new(PostgresXpEventRepository::new(pool));

    // Reconciliation is not tied to a signed-in user.
    GamificationService::new(
        Arc::new(InMemorySessionProvider::new()),
        progress_repository.clone(),
        event_repository,
        progress_repository,
    )
}
