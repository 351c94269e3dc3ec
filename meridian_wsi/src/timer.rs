//! Frame timer
//!
//! Monotonic timer driven once per frame by the sequencer. The platform
//! adapter owns the timer; the WSI ticks it after each successful acquire
//! (or adopts an externally supplied frame time in external-frame mode).

use std::time::Instant;

/// Monotonic per-frame timer.
///
/// `frame()` returns the time since the previous tick in seconds and
/// advances the tick. In external-frame mode the host supplies the frame
/// time instead of sampling the clock, so that an embedding with its own
/// pacing drives elapsed time consistently.
#[derive(Debug)]
pub struct FrameTimer {
    start: Instant,
    last: Instant,
    elapsed: f64,
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            elapsed: 0.0,
        }
    }

    /// Restart the timer. Called after the chain is (re)created so the
    /// first frame does not observe the build time as a frame delta.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last = now;
        self.elapsed = 0.0;
    }

    /// Tick the timer and return the frame delta in seconds.
    pub fn frame(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.elapsed = now.duration_since(self.start).as_secs_f64();
        delta
    }

    /// Tick the timer with an externally supplied frame time in seconds.
    ///
    /// Used in external-frame mode where the host paces presentation.
    pub fn frame_external(&mut self, frame_time: f64) -> f64 {
        self.last = Instant::now();
        self.elapsed += frame_time;
        frame_time
    }

    /// Total elapsed time in seconds since the last reset.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
