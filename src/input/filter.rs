//! Accelerometer smoothing and rest calibration.
//!
//! Raw samples go through a short moving-average window. The mean of a
//! handful of rest samples taken at power-on is subtracted from the window
//! average, so a stationary device reads close to zero on every axis.

use std::collections::VecDeque;

use glam::Vec3;

use crate::consts::{CALIBRATION_INTERVAL, CALIBRATION_SAMPLES, FILTER_WINDOW};
use crate::platform::{Accelerometer, Clock, RawSample};

/// Smoothed, offset-corrected acceleration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilteredSample {
    pub accel: Vec3,
}

impl FilteredSample {
    pub const ZERO: Self = Self { accel: Vec3::ZERO };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            accel: Vec3::new(x, y, z),
        }
    }

    /// Euclidean norm of the filtered vector
    pub fn magnitude(&self) -> f32 {
        self.accel.length()
    }
}

/// Moving-average filter with a one-shot rest calibration
#[derive(Debug, Clone)]
pub struct SignalFilter {
    window: VecDeque<RawSample>,
    offset: Vec3,
    calibrated: bool,
    last: FilteredSample,
    /// Reads that failed and were replaced by the previous value
    dropped: u64,
}

impl Default for SignalFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalFilter {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(FILTER_WINDOW),
            offset: Vec3::ZERO,
            calibrated: false,
            last: FilteredSample::ZERO,
            dropped: 0,
        }
    }

    /// Collect rest samples from the sensor and store their mean as the offset.
    ///
    /// The device is assumed stationary. Failed reads are skipped; if none
    /// succeed the filter stays uncalibrated with a zero offset. Runs once:
    /// later calls keep the existing offset.
    pub fn calibrate(&mut self, sensor: &mut dyn Accelerometer, clock: &mut dyn Clock) -> bool {
        if self.calibrated {
            log::warn!(
                "Accelerometer already calibrated, keeping offset {:?}",
                self.offset
            );
            return true;
        }

        let mut samples = Vec::with_capacity(CALIBRATION_SAMPLES);
        for i in 0..CALIBRATION_SAMPLES {
            match sensor.read() {
                Ok(raw) => samples.push(raw),
                Err(e) => log::debug!("Calibration read {} failed: {}", i, e),
            }
            clock.sleep(CALIBRATION_INTERVAL);
        }

        self.calibrate_from(&samples)
    }

    /// Calibrate from samples already collected at rest
    pub fn calibrate_from(&mut self, samples: &[RawSample]) -> bool {
        if self.calibrated {
            return true;
        }
        let Some(mean) = mean(samples) else {
            log::warn!("No calibration samples, using zero offset");
            return false;
        };

        self.offset = mean;
        self.calibrated = true;
        self.window.clear();
        self.last = FilteredSample::ZERO;
        log::info!(
            "Accelerometer calibrated from {} samples, offset {:?}",
            samples.len(),
            mean
        );
        true
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Most recent filtered value
    pub fn last(&self) -> FilteredSample {
        self.last
    }

    pub fn dropped_reads(&self) -> u64 {
        self.dropped
    }

    /// Push a raw sample (oldest evicted) and return the window average minus offset
    pub fn update(&mut self, raw: RawSample) -> FilteredSample {
        if self.window.len() == FILTER_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(raw);

        let sum: Vec3 = self.window.iter().copied().sum();
        let avg = sum / self.window.len() as f32;
        self.last = FilteredSample {
            accel: avg - self.offset,
        };
        self.last
    }

    /// Read the sensor and filter; a failed read yields the previous value unchanged
    pub fn poll(&mut self, sensor: &mut dyn Accelerometer) -> FilteredSample {
        match sensor.read() {
            Ok(raw) => self.update(raw),
            Err(e) => {
                self.dropped += 1;
                log::trace!("Accelerometer read failed ({}), reusing last sample", e);
                self.last
            }
        }
    }
}

fn mean(samples: &[RawSample]) -> Option<Vec3> {
    if samples.is_empty() {
        return None;
    }
    let sum: Vec3 = samples.iter().copied().sum();
    Some(sum / samples.len() as f32)
}
