//! Shake detection with a hold requirement.
//!
//! A shake triggers the first tick any of three conditions holds:
//! - filtered magnitude above [`SHAKE_MAGNITUDE_THRESHOLD`]
//! - accumulated magnitude change over a ~0.2 s rolling window above [`SHAKE_CHANGE_THRESHOLD`]
//! - single-tick magnitude delta above [`SHAKE_DELTA_THRESHOLD`]
//!
//! After the trigger the gesture latches; hold progress is time since the
//! trigger over [`SHAKE_HOLD_DURATION`]. Thresholds do not depend on difficulty.

use super::filter::FilteredSample;
use crate::consts::{
    SHAKE_CHANGE_THRESHOLD, SHAKE_CHANGE_WINDOW, SHAKE_DELTA_THRESHOLD, SHAKE_HOLD_DURATION,
    SHAKE_MAGNITUDE_THRESHOLD,
};

/// Detector state, reset at the start of every shake move
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    pub triggered: bool,
    pub trigger_time: Option<f64>,
    pub accumulated_change: f32,
}

/// Which condition fired the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Magnitude,
    Accumulated,
    Spike,
}

/// Result of one detector update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    pub triggered: bool,
    /// 0.0 until triggered, 1.0 once held for the full duration
    pub hold_progress: f32,
}

impl GestureReading {
    pub const IDLE: Self = Self {
        triggered: false,
        hold_progress: 0.0,
    };

    pub fn is_held(&self) -> bool {
        self.hold_progress >= 1.0
    }
}

#[derive(Debug, Clone)]
pub struct GestureDetector {
    state: GestureState,
    last_magnitude: Option<f32>,
    window_start: f64,
    last_update: Option<f64>,
    trigger_kind: Option<TriggerKind>,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDetector {
    pub fn new() -> Self {
        Self {
            state: GestureState::default(),
            last_magnitude: None,
            window_start: 0.0,
            last_update: None,
            trigger_kind: None,
        }
    }

    /// Clear to the untriggered state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn trigger_kind(&self) -> Option<TriggerKind> {
        self.trigger_kind
    }

    /// Feed one filtered sample taken at `now` (seconds).
    ///
    /// A repeated call with the same or an older timestamp changes nothing.
    pub fn update(&mut self, sample: FilteredSample, now: f64) -> GestureReading {
        if let Some(last) = self.last_update {
            if now <= last {
                return self.reading(last);
            }
        }
        self.last_update = Some(now);

        if !self.state.triggered {
            let magnitude = sample.magnitude();
            let delta = match self.last_magnitude {
                Some(prev) => (magnitude - prev).abs(),
                None => {
                    self.window_start = now;
                    0.0
                }
            };
            self.last_magnitude = Some(magnitude);

            if now - self.window_start > SHAKE_CHANGE_WINDOW {
                self.state.accumulated_change = 0.0;
                self.window_start = now;
            } else {
                self.state.accumulated_change += delta;
            }

            if let Some(kind) = classify(magnitude, self.state.accumulated_change, delta) {
                self.state.triggered = true;
                self.state.trigger_time = Some(now);
                self.trigger_kind = Some(kind);
                log::debug!(
                    "Shake triggered by {:?} at {:.3}s (mag {:.2}, acc {:.2}, delta {:.2})",
                    kind,
                    now,
                    magnitude,
                    self.state.accumulated_change,
                    delta
                );
            }
        }

        self.reading(now)
    }

    /// Hold progress as of `now` without feeding a sample
    pub fn reading(&self, now: f64) -> GestureReading {
        let Some(trigger_time) = self.state.trigger_time else {
            return GestureReading::IDLE;
        };
        let held = now - trigger_time;
        let hold_progress = if held >= SHAKE_HOLD_DURATION {
            1.0
        } else {
            // Stay strictly below 1.0 until the full duration has elapsed
            ((held.max(0.0) / SHAKE_HOLD_DURATION) as f32).min(1.0 - f32::EPSILON)
        };
        GestureReading {
            triggered: true,
            hold_progress,
        }
    }
}

fn classify(magnitude: f32, accumulated: f32, delta: f32) -> Option<TriggerKind> {
    if magnitude > SHAKE_MAGNITUDE_THRESHOLD {
        Some(TriggerKind::Magnitude)
    } else if accumulated > SHAKE_CHANGE_THRESHOLD {
        Some(TriggerKind::Accumulated)
    } else if delta > SHAKE_DELTA_THRESHOLD {
        Some(TriggerKind::Spike)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(mag: f32) -> FilteredSample {
        FilteredSample::new(0.0, 0.0, mag)
    }

    #[test]
    fn test_reset_clears_state() {
        let mut detector = GestureDetector::new();
        detector.update(sample(20.0), 1.0);
        assert!(detector.state().triggered);

        detector.reset();
        assert_eq!(detector.state(), GestureState::default());
        assert_eq!(detector.reading(5.0).hold_progress, 0.0);
    }

    #[test]
    fn test_still_device_never_triggers() {
        let mut detector = GestureDetector::new();
        for i in 0..500 {
            let reading = detector.update(sample(0.05), i as f64 * 0.01);
            assert!(!reading.triggered);
        }
    }

    #[test]
    fn test_magnitude_threshold_triggers() {
        let mut detector = GestureDetector::new();
        assert!(!detector.update(sample(12.9), 0.0).triggered);
        // 12.9 -> 13.5 is a small delta; only the magnitude condition holds
        let reading = detector.update(sample(13.5), 0.01);
        assert!(reading.triggered);
        assert_eq!(detector.trigger_kind(), Some(TriggerKind::Magnitude));
    }

    #[test]
    fn test_single_spike_triggers() {
        let mut detector = GestureDetector::new();
        // Outside the accumulation window so only the spike can fire
        detector.update(sample(0.0), 0.0);
        let reading = detector.update(sample(4.5), 0.5);
        assert!(reading.triggered);
        assert_eq!(detector.trigger_kind(), Some(TriggerKind::Spike));
    }

    #[test]
    fn test_accumulated_change_triggers_within_window() {
        let mut detector = GestureDetector::new();
        let mags = [0.0, 1.0, 0.0, 1.0, 0.0];
        let mut triggered_at = None;
        for (i, mag) in mags.iter().enumerate() {
            let now = i as f64 * 0.02;
            if detector.update(sample(*mag), now).triggered {
                triggered_at = Some(i);
                break;
            }
        }
        // 1 + 1 + 1 + 1 = 4 > 3 on the fourth change
        assert_eq!(triggered_at, Some(4));
        assert_eq!(detector.trigger_kind(), Some(TriggerKind::Accumulated));
    }

    #[test]
    fn test_accumulated_change_resets_after_window() {
        let mut detector = GestureDetector::new();
        detector.update(sample(0.0), 0.0);
        detector.update(sample(1.0), 0.05);
        detector.update(sample(0.0), 0.1);
        assert!((detector.state().accumulated_change - 2.0).abs() < 1e-6);

        // Window expired: accumulation restarts from zero
        detector.update(sample(1.0), 0.35);
        assert_eq!(detector.state().accumulated_change, 0.0);
        assert!(!detector.state().triggered);
    }

    #[test]
    fn test_hold_progress_reaches_one_after_hold_duration() {
        let mut detector = GestureDetector::new();
        detector.update(sample(0.0), 0.0);
        let trigger = detector.update(sample(20.0), 0.25);
        assert!(trigger.triggered);
        assert_eq!(trigger.hold_progress, 0.0);

        // Sample content no longer matters once latched
        let mid = detector.update(sample(0.0), 1.0);
        assert!((mid.hold_progress - 0.5).abs() < 1e-6);

        let almost = detector.update(sample(0.0), 0.25 + SHAKE_HOLD_DURATION - 1e-9);
        assert!(almost.hold_progress < 1.0);
        assert!(!almost.is_held());

        let done = detector.update(sample(0.0), 0.25 + SHAKE_HOLD_DURATION);
        assert_eq!(done.hold_progress, 1.0);
        assert!(done.is_held());
    }

    #[test]
    fn test_repeated_timestamp_is_idempotent() {
        let mut detector = GestureDetector::new();
        detector.update(sample(0.0), 0.0);
        detector.update(sample(1.0), 0.05);
        let before = detector.state();

        let reading = detector.update(sample(3.0), 0.05);
        assert_eq!(detector.state(), before);
        assert!(!reading.triggered);
    }
}
