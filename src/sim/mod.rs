//! Deterministic game logic
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Time comes in through `TickInput::now`, never read from a clock
//! - Seeded RNG only
//! - No hardware, display or sound dependencies (cues are returned, not played)

pub mod level;
pub mod machine;
pub mod moves;
pub mod name_entry;
pub mod state;

pub use level::{
    CountdownStep, LevelOutcome, LevelPhase, LevelRunner, LevelStatus, PlayStatus, generate_moves,
};
pub use machine::{GameEvent, GameMachine, GamePhase, StepOutput, level_frame, transition};
pub use moves::{MoveEvaluator, MoveInput, MoveProgress, ProgressUpdate};
pub use name_entry::NameEntry;
pub use state::{
    Action, Difficulty, GameSession, LEVELS, LevelConfig, MoveSpec, RngState, TickInput,
};
