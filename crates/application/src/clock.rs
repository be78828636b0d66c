use chrono::{DateTime, Utc};

/// Time source port. Services read the current instant through this so tests
/// can move time explicitly.
pub trait Clock: Send + Sync {
    /// Returns the current wall-clock instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
