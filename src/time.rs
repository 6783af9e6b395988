use std::fmt;
use std::time::{Duration, Instant};

/// Wall-clock stopwatch used to measure frame durations.
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Restart the timer, returning the seconds elapsed since the previous reset.
    pub fn reset(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start).as_secs_f32();
        self.start = now;
        elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed_seconds() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration of the previous frame, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct TimeStep(f32);

impl TimeStep {
    pub const fn new(seconds: f32) -> Self {
        Self(seconds)
    }

    pub fn seconds(self) -> f32 {
        self.0
    }

    pub fn millis(self) -> f32 {
        self.0 * 1000.0
    }
}

impl From<f32> for TimeStep {
    fn from(seconds: f32) -> Self {
        Self(seconds)
    }
}

impl From<Duration> for TimeStep {
    fn from(duration: Duration) -> Self {
        Self(duration.as_secs_f32())
    }
}

impl From<TimeStep> for f32 {
    fn from(ts: TimeStep) -> Self {
        ts.0
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}ms", self.millis())
    }
}
