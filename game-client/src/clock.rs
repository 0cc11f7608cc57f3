use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockHandle(Uuid);

impl ClockHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repeating timers backed by tokio tasks.
///
/// Each `start` spawns a task that calls the callback once per period, first
/// after one full period, until the handle is cancelled. Dropping the clock
/// cancels every timer it still owns.
pub struct SessionClock {
    timers: Mutex<HashMap<ClockHandle, JoinHandle<()>>>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, period: Duration, mut on_tick: F) -> ClockHandle
    where
        F: FnMut() + Send + 'static,
    {
        let handle = ClockHandle::new();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });

        debug!("Started timer {} every {:?}", handle, period);
        self.timers().insert(handle, task);
        handle
    }

    /// Stop a timer. Unknown or already cancelled handles are ignored.
    pub fn cancel(&self, handle: ClockHandle) {
        if let Some(task) = self.timers().remove(&handle) {
            task.abort();
            debug!("Cancelled timer {}", handle);
        }
    }

    pub fn cancel_all(&self) {
        for (_, task) in self.timers().drain() {
            task.abort();
        }
    }

    pub fn is_active(&self, handle: ClockHandle) -> bool {
        self.timers().contains_key(&handle)
    }

    pub fn active_count(&self) -> usize {
        self.timers().len()
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<ClockHandle, JoinHandle<()>>> {
        // The map stays consistent even if a holder panicked.
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
