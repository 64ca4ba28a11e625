//! Injectable monotonic time source for expiring caches.
//!
//! Time is a [`Duration`] measured from an arbitrary per-timer epoch.  Only
//! differences matter, so a test can drive a [`ManualTimer`] from zero while
//! production code uses [`MonotonicTimer`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonically non-decreasing clock.
pub trait Timer: Send + Sync + 'static {
    /// Current time, relative to this timer's epoch.
    fn now(&self) -> Duration;
}

/// Wall-clock monotonic time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTimer {
    epoch: Instant,
}

impl MonotonicTimer {
    pub fn new() -> Self {
        MonotonicTimer {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for MonotonicTimer {
    #[inline]
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A hand-driven clock for deterministic tests.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give the other to the cache.
///
/// ```
/// use boundcache::timer::{ManualTimer, Timer};
/// use std::time::Duration;
///
/// let timer = ManualTimer::new();
/// let handle = timer.clone();
/// handle.advance(Duration::from_secs(2));
/// assert_eq!(timer.now(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    nanos: Arc<AtomicU64>,
}

impl ManualTimer {
    /// Starts at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.nanos
            .fetch_add(saturating_nanos(by), Ordering::SeqCst);
    }

    /// Jumps the clock to `to`.  Moving backwards is ignored.
    pub fn set(&self, to: Duration) {
        self.nanos.fetch_max(saturating_nanos(to), Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    #[inline]
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
