use std::env;
use std::time::Duration;

use courtside_application::MAX_RECONCILE_BATCH_SIZE;
use courtside_core::AppError;

const DEFAULT_INTERVAL_MS: u64 = 60_000;
const DEFAULT_BATCH_SIZE: usize = 500;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings for the level reconciliation worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub database_url: String,
    pub reconcile_interval: Duration,
    pub reconcile_batch_size: usize,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl WorkerConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;

        let interval_ms =
            parse_or("LEVEL_RECONCILE_INTERVAL_MS", &lookup, DEFAULT_INTERVAL_MS)?;
        if interval_ms == 0 {
            return Err(AppError::Validation(
                "LEVEL_RECONCILE_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        let reconcile_batch_size =
            parse_or("LEVEL_RECONCILE_BATCH_SIZE", &lookup, DEFAULT_BATCH_SIZE)?;
        if reconcile_batch_size == 0 || reconcile_batch_size > MAX_RECONCILE_BATCH_SIZE {
            return Err(AppError::Validation(format!(
                "LEVEL_RECONCILE_BATCH_SIZE must be between 1 and {MAX_RECONCILE_BATCH_SIZE}"
            )));
        }

        let max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", &lookup, DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let run_migrations = lookup("RUN_MIGRATIONS")
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_bool("RUN_MIGRATIONS", value.as_str()))
            .transpose()?
            .unwrap_or(true);

        Ok(Self {
            database_url,
            reconcile_interval: Duration::from_millis(interval_ms),
            reconcile_batch_size,
            max_connections,
            run_migrations,
        })
    }
}

fn parse_or<T, F>(name: &str, lookup: &F, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{name} must be one of true, false, 1, 0; got '{other}'"
        ))),
    }
}
