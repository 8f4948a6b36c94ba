//! Runtime settings
//!
//! Loaded from an optional JSON file. Nothing here changes game rules; missing
//! fields take their defaults and an unreadable file yields `Settings::default()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Sleep between polls of the control loop (seconds)
    pub poll_interval: f64,
    /// Display redraw cadence (seconds); phase changes draw immediately
    pub ui_refresh_interval: f64,

    // === Audio ===
    /// Silence every cue
    pub muted: bool,
    /// Buzzer volume (0.0 - 1.0), scales the PWM duty cycle
    pub volume: f32,

    // === Storage ===
    /// High score record location
    pub high_score_path: PathBuf,

    /// Fixed RNG seed for reproducible move sequences
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: 0.001,
            ui_refresh_interval: 0.05,

            muted: false,
            volume: 1.0,

            high_score_path: PathBuf::from("highscores.txt"),

            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings JSON; unknown fields are ignored, missing ones defaulted
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No settings at {} ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!(
                    "Malformed settings in {} ({}), using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.poll_interval.is_nan() || self.poll_interval <= 0.0 {
            self.poll_interval = defaults.poll_interval;
        }
        if self.ui_refresh_interval.is_nan() || self.ui_refresh_interval < 0.0 {
            self.ui_refresh_interval = defaults.ui_refresh_interval;
        }
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            defaults.volume
        };
    }
}
