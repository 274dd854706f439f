//! Time source for session expiry and code validation.
//!
//! The gate never calls `SystemTime::now()` directly. It asks a [`Clock`],
//! so that tests can move time forward by an hour without sleeping for an
//! hour.
//!
//! # Why a trait?
//!
//! Same reason the gate takes any `tower::Service` as its inner handler:
//! production wires in [`SystemClock`], tests wire in [`ManualClock`], and
//! none of the gate code changes.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Supplies the current wall-clock time.
///
/// `Send + Sync + 'static` because one clock is shared by every request
/// task and by the background sweeper.
pub trait Clock: Send + Sync + 'static {
    /// The current time.
    fn now(&self) -> SystemTime;

    /// Seconds since the Unix epoch (0 for times before it).
    fn unix_secs(&self) -> u64 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// Meant for tests and simulations:
///
/// ```rust
/// use std::time::{Duration, UNIX_EPOCH};
/// use totpgate_session::{Clock, ManualClock};
///
/// let clock = ManualClock::at_unix(59);
/// assert_eq!(clock.unix_secs(), 59);
/// clock.advance(Duration::from_secs(30));
/// assert_eq!(clock.now(), UNIX_EPOCH + Duration::from_secs(89));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    /// Starts the clock at `start`.
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Starts the clock `secs` seconds after the Unix epoch.
    pub fn at_unix(secs: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Jumps to an arbitrary time (backwards is allowed).
    pub fn set(&self, to: SystemTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
