//! Time sources
//!
//! All waiting in the engine is cooperative: the control loop polls, checks
//! elapsed time and sleeps for one short poll interval.

use std::time::{Duration, Instant};

/// Monotonic time in seconds since the clock was created
pub trait Clock {
    fn now(&self) -> f64;
    fn sleep(&mut self, secs: f64);
}

/// Wall-clock time backed by `Instant`
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, secs: f64) {
        if secs > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(secs));
        }
    }
}

/// Virtual clock that only advances when slept on
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    pub fn starting_at(now: f64) -> Self {
        Self { now }
    }
}

impl Clock for SimClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn sleep(&mut self, secs: f64) {
        self.now += secs.max(0.0);
    }
}
