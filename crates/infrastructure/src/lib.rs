//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_progress_repository;
mod in_memory_rate_limit_store;
mod in_memory_session_provider;
mod postgres_progress_repository;
mod postgres_xp_event_repository;

pub use in_memory_progress_repository::InMemoryProgressRepository;
pub use in_memory_rate_limit_store::InMemoryRateLimitStore;
pub use in_memory_session_provider::InMemorySessionProvider;
pub use postgres_progress_repository::PostgresProgressRepository;
pub use postgres_xp_event_repository::PostgresXpEventRepository;
