//! The wait seam.
//!
//! Every timed action on the rig (step pulses, actuator drives, servo holds,
//! settle pauses, the scan budget) goes through a [`Clock`]. Production uses
//! [`SystemClock`]; tests and `--virtual-time` runs use [`ManualClock`],
//! whose `sleep` advances virtual time instantly.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Monotonic time source plus blocking wait.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Block for `duration`.
    fn sleep(&self, duration: Duration);

    /// Block for `secs` seconds. Negative or non-finite values are a no-op.
    fn sleep_secs(&self, secs: f64) {
        if let Ok(duration) = Duration::try_from_secs_f64(secs) {
            if !duration.is_zero() {
                self.sleep(duration);
            }
        }
    }
}

/// Seconds from configuration as a [`Duration`]. Negative or non-finite
/// input maps to zero.
pub fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock. `sleep` returns immediately after advancing `now`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    slept: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward without counting it as a sleep.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Total time spent in `sleep` so far.
    pub fn total_slept(&self) -> Duration {
        *self.slept.lock()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) {
        *self.now.lock() += duration;
        *self.slept.lock() += duration;
    }
}
