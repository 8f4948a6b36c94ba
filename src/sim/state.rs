//! Game data model
//!
//! Static level table, difficulty scaling, move specs and the session record
//! threaded through the state machine.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_COUNT;
use crate::input::{ButtonEvent, Direction, FilteredSample};

/// A commanded action the player must perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    RotateLeft,
    RotateRight,
    Press,
    Shake,
}

impl Action {
    /// Actions drawn for every move except the last
    pub const NON_SHAKE: [Action; 3] = [Action::RotateLeft, Action::RotateRight, Action::Press];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::RotateLeft => "LEFT",
            Action::RotateRight => "RIGHT",
            Action::Press => "PRESS",
            Action::Shake => "SHAKE",
        }
    }

    /// Two-line on-screen instruction
    pub fn instruction(&self) -> (&'static str, &'static str) {
        match self {
            Action::RotateLeft => ("CUT BLUE", "<< LEFT"),
            Action::RotateRight => ("CUT RED", "RIGHT >>"),
            Action::Press => ("ENTER CODE", "PRESS"),
            Action::Shake => ("DISARM!!", "SHAKE IT"),
        }
    }

    /// Rotation direction this action expects, if any
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Action::RotateLeft => Some(Direction::Left),
            Action::RotateRight => Some(Direction::Right),
            _ => None,
        }
    }

    /// Uniform draw from the non-shake actions
    pub fn random_non_shake<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::NON_SHAKE[rng.random_range(0..Self::NON_SHAKE.len())]
    }
}

/// One move slot of a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveSpec {
    pub action: Action,
    /// Level budget the move must complete within (seconds)
    pub time_limit: f64,
}

/// Static per-level parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Time budget at MEDIUM difficulty (seconds)
    pub base_time: f64,
    pub move_count: usize,
}

/// Level table, index 0 is level 1
pub const LEVELS: [LevelConfig; LEVEL_COUNT] = [
    LevelConfig {
        base_time: 25.0,
        move_count: 3,
    },
    LevelConfig {
        base_time: 22.0,
        move_count: 4,
    },
    LevelConfig {
        base_time: 19.0,
        move_count: 5,
    },
    LevelConfig {
        base_time: 17.0,
        move_count: 6,
    },
    LevelConfig {
        base_time: 14.0,
        move_count: 7,
    },
    LevelConfig {
        base_time: 12.0,
        move_count: 8,
    },
    LevelConfig {
        base_time: 10.0,
        move_count: 9,
    },
    LevelConfig {
        base_time: 8.5,
        move_count: 10,
    },
    LevelConfig {
        base_time: 7.0,
        move_count: 11,
    },
    LevelConfig {
        base_time: 6.0,
        move_count: 12,
    },
];

impl LevelConfig {
    /// Config for a 1-based level number
    pub fn for_level(level: u8) -> Option<LevelConfig> {
        let index = usize::from(level).checked_sub(1)?;
        LEVELS.get(index).copied()
    }

    /// Base time scaled by the difficulty factor
    pub fn effective_time_limit(&self, difficulty: Difficulty) -> f64 {
        self.base_time * difficulty.time_factor()
    }
}

/// Difficulty scales level time budgets only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Menu order
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier applied to a level's base time
    pub fn time_factor(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 0.8,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

/// Inputs sampled in one poll of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickInput {
    /// Monotonic time of the poll (seconds)
    pub now: f64,
    /// Decoded encoder step, if an edge was accepted this poll
    pub encoder: Option<Direction>,
    /// Debounced button edge
    pub button: Option<ButtonEvent>,
    /// Raw button level this poll (active-low already applied)
    pub button_pressed: bool,
    pub accel: FilteredSample,
}

impl TickInput {
    pub fn at(now: f64) -> Self {
        Self {
            now,
            ..Default::default()
        }
    }

    pub fn pressed_edge(&self) -> bool {
        self.button == Some(ButtonEvent::Pressed)
    }
}

/// Per-game mutable record, owned by the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// 0-based index into [`LEVELS`]
    pub level_index: usize,
    pub score: u32,
    pub difficulty: Difficulty,
    pub player_name: String,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            level_index: 0,
            score: 0,
            difficulty: Difficulty::Easy,
            player_name: String::from("AAA"),
        }
    }
}

impl GameSession {
    /// 1-based level number shown to the player
    pub fn level_number(&self) -> u8 {
        (self.level_index + 1) as u8
    }

    pub fn level_config(&self) -> Option<LevelConfig> {
        LEVELS.get(self.level_index).copied()
    }

    pub fn is_final_level(&self) -> bool {
        self.level_index + 1 >= LEVEL_COUNT
    }
}

/// RNG seed wrapper; move sequences are reproducible from the seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_table_lookup() {
        assert_eq!(LevelConfig::for_level(0), None);
        assert_eq!(LevelConfig::for_level(11), None);
        let first = LevelConfig::for_level(1).unwrap();
        assert_eq!(first.base_time, 25.0);
        assert_eq!(first.move_count, 3);
        let last = LevelConfig::for_level(10).unwrap();
        assert_eq!(last.move_count, 12);
    }

    #[test]
    fn test_effective_time_limit() {
        let level1 = LevelConfig::for_level(1).unwrap();
        let easy = level1.effective_time_limit(Difficulty::Easy);
        assert!((easy - 30.0).abs() < 1e-9);
        let level7 = LevelConfig::for_level(7).unwrap();
        assert_eq!(level7.effective_time_limit(Difficulty::Medium), 10.0);
        let hard = level7.effective_time_limit(Difficulty::Hard);
        assert!((hard - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(Difficulty::from_str("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("med"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str("Hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
            assert_eq!(Difficulty::ALL[d.index()], d);
        }
    }

    #[test]
    fn test_session_final_level() {
        let mut session = GameSession::default();
        assert_eq!(session.level_number(), 1);
        assert!(!session.is_final_level());
        session.level_index = LEVEL_COUNT - 1;
        assert!(session.is_final_level());
        assert_eq!(session.level_number(), 10);
    }

    #[test]
    fn test_random_action_never_shake() {
        let mut rng = RngState::new(7).to_rng();
        for _ in 0..200 {
            assert_ne!(Action::random_non_shake(&mut rng), Action::Shake);
        }
    }
}
