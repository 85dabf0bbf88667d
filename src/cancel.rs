use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Shared cancellation flag with a timed wait.
///
/// Cloned handles observe the same flag. `wait` returns early as soon as
/// `cancel` is called from any thread, e.g. a Ctrl-C handler.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, condvar) = &*self.inner;
        let mut cancelled = flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *cancelled = true;
        condvar.notify_all();
    }

    /// Clears a previous cancellation so later waits run their full timeout.
    pub fn reset(&self) {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = false;
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits for `timeout` or until cancelled. Returns true if cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let cancelled = flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (cancelled, _) = condvar
            .wait_timeout_while(cancelled, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cancelled
    }
}
