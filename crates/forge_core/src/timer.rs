//! Fixed-interval tick timer.
//!
//! Accumulates frame time and reports a tick once the interval has elapsed.
//! At most one tick fires per [`ActionTimer::update`] call, so the work
//! driven by the timer stays bounded no matter how long a frame took.

use tracing::warn;

/// Accumulating interval timer.
#[derive(Debug, Clone)]
pub struct ActionTimer {
    /// Seconds between ticks.
    interval: f32,
    /// Seconds accumulated since the last tick.
    elapsed: f32,
    /// Paused timers ignore updates.
    running: bool,
    /// Ticks fired since creation.
    ticks: u64,
}

impl ActionTimer {
    /// Creates a stopped timer that fires every `interval` seconds.
    ///
    /// Non-positive or non-finite intervals fire on every update.
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            interval: if interval.is_finite() { interval.max(0.0) } else { 0.0 },
            elapsed: 0.0,
            running: false,
            ticks: 0,
        }
    }

    /// Starts (or resumes) the timer.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stops the timer and discards accumulated time.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = 0.0;
    }

    /// Returns true while the timer accepts updates.
    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the tick interval in seconds.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> f32 {
        self.interval
    }

    /// Returns the seconds accumulated towards the next tick.
    #[inline]
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns how many ticks have fired.
    #[inline]
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances the timer by `delta` seconds.
    ///
    /// Returns true when a tick fires.
    pub fn update(&mut self, delta: f32) -> bool {
        if !self.running || !delta.is_finite() || delta < 0.0 {
            return false;
        }

        self.elapsed += delta;
        if self.elapsed < self.interval {
            return false;
        }

        self.elapsed -= self.interval;
        if self.elapsed >= self.interval {
            // Only one tick per update; a long stall does not replay ticks.
            if self.interval > 0.0 {
                warn!(
                    "timer dropped {:.3}s of backlog (interval {:.3}s)",
                    self.elapsed, self.interval
                );
            }
            self.elapsed = 0.0;
        }
        self.ticks += 1;
        true
    }
}
