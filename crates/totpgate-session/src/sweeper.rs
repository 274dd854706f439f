//! Background eviction of expired sessions.
//!
//! Expired sessions are already rejected when they are read, so the sweeper
//! exists purely to stop the map from growing forever with sessions whose
//! owners never came back.
//!
//! # Lifecycle
//!
//! ```text
//! Sweeper::spawn() ──→ [task: interval tick → store.sweep(clock.now())]
//!                                   │
//!        stop() or drop(Sweeper) ───┘──→ loop exits, timer dropped
//! ```
//!
//! The task runs inside `tokio::select!` between the interval and a
//! `watch` shutdown channel, the same shape as an actor loop waiting on
//! its command channel and its tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::{Clock, SessionError, SessionStore};

/// Shortest interval the sweeper accepts.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running sweep task.
///
/// The task stops when [`stop`](Self::stop) is called or when this handle
/// is dropped, whichever comes first. It never outlives its owner.
#[derive(Debug)]
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawns the sweep loop on the current Tokio runtime.
    ///
    /// The first sweep happens one `every` after spawning, not immediately.
    /// Intervals shorter than one second are raised to one second.
    ///
    /// # Errors
    /// Returns [`SessionError::NoRuntime`] when called outside a runtime.
    pub fn spawn(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        every: Duration,
    ) -> Result<Self, SessionError> {
        let handle = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let every = every.max(MIN_INTERVAL);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let task = handle.spawn(run(store, clock, every, shutdown_rx));
        debug!(interval_secs = every.as_secs(), "session sweeper started");

        Ok(Self {
            shutdown,
            task: Some(task),
        })
    }

    /// Signals the loop to exit. Idempotent.
    pub fn stop(&self) {
        // `send_replace` never fails, even when the task already exited.
        self.shutdown.send_replace(true);
    }

    /// Stops the loop and waits for the task to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Returns `true` once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + every, every);
    // After a long stall one sweep catches up on everything; no bursts.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // Err means the handle was dropped without `stop()`; same thing.
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let removed = store.sweep(clock.now());
                if removed > 0 {
                    debug!(removed, remaining = store.len(), "swept expired sessions");
                } else {
                    trace!("sweep found nothing to remove");
                }
            }
        }
    }

    debug!("session sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    #[test]
    fn test_spawn_outside_runtime_returns_no_runtime() {
        let store = Arc::new(SessionStore::new());
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_unix(0));

        let result = Sweeper::spawn(store, clock, Duration::from_secs(60));

        assert!(matches!(result, Err(SessionError::NoRuntime)));
    }
}
