use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Wrapper that runs at most once per `limit`.
///
/// The first call runs immediately. Calls arriving before `limit` has passed
/// since the last executed call are dropped, not queued.
pub struct Throttled<A> {
    callback: Box<dyn Fn(A) + Send + Sync>,
    limit: Duration,
    last_run: Mutex<Option<Instant>>,
}

/// Wraps `callback` so it executes at most once per `limit`.
pub fn throttle<A, F>(callback: F, limit: Duration) -> Throttled<A>
where
    F: Fn(A) + Send + Sync + 'static,
{
    Throttled {
        callback: Box::new(callback),
        limit,
        last_run: Mutex::new(None),
    }
}

impl<A> Throttled<A> {
    /// Runs the callback with `args` unless the current window is still
    /// open. Returns whether the callback ran.
    pub fn call(&self, args: A) -> bool {
        let now = Instant::now();
        {
            let mut last_run = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
            if last_run.is_some_and(|last| now.duration_since(last) < self.limit) {
                return false;
            }
            *last_run = Some(now);
        }

        // Lock released first so the callback may re-enter the wrapper.
        (self.callback)(args);
        true
    }
}
