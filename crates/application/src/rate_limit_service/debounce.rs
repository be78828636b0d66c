use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Wrapper that coalesces rapid calls into one delayed call.
///
/// Each [`Debounced::call`] cancels the pending invocation and schedules a
/// new one `delay` later, so only the last call of a burst runs. Must be
/// called from within a Tokio runtime. Dropping the wrapper cancels any
/// pending call.
pub struct Debounced<A> {
    callback: Arc<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Wraps `callback` so it runs only after `delay` has passed without another
/// call.
pub fn debounce<A, F>(callback: F, delay: Duration) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        callback: Arc::new(callback),
        delay,
        pending: Mutex::new(None),
    }
}

impl<A> Debounced<A>
where
    A: Send + 'static,
{
    /// Schedules the callback with `args`, replacing any pending call.
    pub fn call(&self, args: A) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let callback = Arc::clone(&self.callback);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(args);
        }));
    }

    /// Drops the pending call without running it.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Returns whether a scheduled call has not run yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> Drop for Debounced<A> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
