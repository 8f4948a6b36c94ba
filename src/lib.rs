//! Bomb Master - handheld reaction game engine
//!
//! Core modules:
//! - `input`: Accelerometer filtering, shake detection, encoder and button decoding
//! - `sim`: Deterministic game logic (moves, levels, session state machine)
//! - `platform`: Hardware collaborator contracts (clock, pins, sensor, display, buzzer)
//! - `device`: Cooperative control loop tying collaborators to the game logic
//! - `highscores` / `persistence`: Top-3 table and its record store
//! - `audio` / `ui`: Buzzer cues and semantic screen frames
//! - `settings`: Runtime configuration

pub mod audio;
pub mod device;
pub mod error;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod ui;

pub use device::Device;
pub use error::{HalError, StoreError};
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Rest samples averaged during calibration
    pub const CALIBRATION_SAMPLES: usize = 10;
    /// Spacing between calibration reads (seconds)
    pub const CALIBRATION_INTERVAL: f64 = 0.05;
    /// Moving-average window length (samples)
    pub const FILTER_WINDOW: usize = 5;

    /// Filtered magnitude above which a shake triggers
    pub const SHAKE_MAGNITUDE_THRESHOLD: f32 = 13.0;
    /// Accumulated magnitude change within the rolling window that triggers a shake
    pub const SHAKE_CHANGE_THRESHOLD: f32 = 3.0;
    /// Single-tick magnitude delta that triggers a shake
    pub const SHAKE_DELTA_THRESHOLD: f32 = 4.0;
    /// Rolling window for accumulated change (seconds)
    pub const SHAKE_CHANGE_WINDOW: f64 = 0.2;
    /// Time a triggered shake must be held before the move completes (seconds)
    pub const SHAKE_HOLD_DURATION: f64 = 1.5;

    /// Minimum spacing between accepted encoder edges (seconds)
    pub const ENCODER_DEBOUNCE: f64 = 0.002;
    /// Push button must be stable this long before a level change is accepted (seconds)
    pub const BUTTON_DEBOUNCE: f64 = 0.02;

    /// Progress added per correctly-directed detent
    pub const KNOB_INCREMENT: f32 = 30.0;
    /// Progress needed to complete a rotation move
    pub const ROTATION_TARGET: f32 = 60.0;

    /// Score for each completed move
    pub const MOVE_BONUS: u32 = 10;
    /// Score for clearing a level
    pub const LEVEL_BONUS: u32 = 50;

    /// Instruction shown before input is evaluated (seconds, counts against the budget)
    pub const REACTION_DELAY: f64 = 1.0;
    /// Countdown digits shown before a level (3, 2, 1)
    pub const COUNTDOWN_FROM: u8 = 3;
    /// Duration of each countdown digit (seconds)
    pub const COUNTDOWN_STEP: f64 = 1.0;
    /// Duration of the GO banner (seconds)
    pub const COUNTDOWN_GO: f64 = 0.5;

    /// Number of levels in a game
    pub const LEVEL_COUNT: usize = 10;
    /// Entries kept on the high score board
    pub const MAX_HIGH_SCORES: usize = 3;
    /// Characters in a player name
    pub const NAME_LEN: usize = 3;
}
