//! Semantic screen frames
//!
//! The engine never draws pixels. Each frame carries only what the screen must
//! show; the display collaborator decides the layout. `lines()` gives a plain
//! text rendition used by the host display and in logs.

use crate::highscores::HighScoreEntry;
use crate::sim::{Action, CountdownStep, Difficulty};

/// In-level status line data
#[derive(Debug, Clone, PartialEq)]
pub struct PlayFrame {
    pub level: u8,
    pub action: Action,
    pub move_index: usize,
    pub move_count: usize,
    /// False while the instruction is shown but input is not yet evaluated
    pub armed: bool,
    /// Move progress, 0.0 - 1.0
    pub progress: f32,
    /// Level budget used, 0.0 - 1.0
    pub time_used: f32,
    pub time_remaining: f64,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Splash,
    NameEntry {
        letters: [char; 3],
        cursor: usize,
    },
    DifficultyMenu {
        selected: Difficulty,
    },
    LevelStart {
        level: u8,
        difficulty: Difficulty,
        score: u32,
    },
    Countdown(CountdownStep),
    Play(PlayFrame),
    LevelClear {
        level: u8,
        score: u32,
    },
    Win {
        score: u32,
    },
    GameOver {
        level: u8,
        score: u32,
    },
    HighScoreBoard {
        entries: Vec<HighScoreEntry>,
        /// Rank just achieved (1-based), if the last game made the board
        new_rank: Option<usize>,
    },
}

impl Frame {
    /// Short screen name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Frame::Splash => "splash",
            Frame::NameEntry { .. } => "name-entry",
            Frame::DifficultyMenu { .. } => "difficulty",
            Frame::LevelStart { .. } => "level-start",
            Frame::Countdown(_) => "countdown",
            Frame::Play(_) => "play",
            Frame::LevelClear { .. } => "level-clear",
            Frame::Win { .. } => "win",
            Frame::GameOver { .. } => "game-over",
            Frame::HighScoreBoard { .. } => "high-scores",
        }
    }

    /// Text rendition, one entry per screen line
    pub fn lines(&self) -> Vec<String> {
        match self {
            Frame::Splash => vec![
                "BOMB MASTER".into(),
                "PRESS BUTTON".into(),
                "TO CONTINUE".into(),
            ],
            Frame::NameEntry { letters, cursor } => {
                let name: String = letters
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        if i == *cursor {
                            format!("[{}]", c)
                        } else {
                            format!(" {} ", c)
                        }
                    })
                    .collect();
                vec!["ENTER NAME".into(), name, "ROTATE / PRESS".into()]
            }
            Frame::DifficultyMenu { selected } => {
                let mut lines = vec!["DIFFICULTY".to_string()];
                lines.extend(Difficulty::ALL.iter().map(|d| {
                    let marker = if d == selected { ">" } else { " " };
                    format!("{} {}", marker, d.as_str())
                }));
                lines
            }
            Frame::LevelStart {
                level,
                difficulty,
                score,
            } => vec![
                format!("LEVEL {}", level),
                difficulty.as_str().to_string(),
                format!("SCORE {}", score),
                "PRESS TO START".into(),
            ],
            Frame::Countdown(CountdownStep::Digit(n)) => vec![n.to_string()],
            Frame::Countdown(CountdownStep::Go) => vec!["GO!".into()],
            Frame::Play(play) => {
                let (top, bottom) = play.action.instruction();
                let bar = |fraction: f32| {
                    let filled = (fraction.clamp(0.0, 1.0) * 10.0).round() as usize;
                    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
                };
                let time_bar = bar(1.0 - play.time_used);
                vec![
                    format!(
                        "L{} {}/{} S{}",
                        play.level,
                        play.move_index + 1,
                        play.move_count,
                        play.score
                    ),
                    top.to_string(),
                    bottom.to_string(),
                    format!("DONE {}", bar(play.progress)),
                    format!("TIME {} {:.1}s", time_bar, play.time_remaining),
                ]
            }
            Frame::LevelClear { level, score } => vec![
                format!("LEVEL {} CLEAR", level),
                format!("Score: {}", score),
                "PRESS -> NEXT".into(),
            ],
            Frame::Win { score } => vec![
                "MISSION".into(),
                "COMPLETE!".into(),
                format!("Score: {}", score),
            ],
            Frame::GameOver { level, score } => vec![
                "GAME OVER".into(),
                format!("Level {}", level),
                format!("Score: {}", score),
                "PRESS -> BOARD".into(),
            ],
            Frame::HighScoreBoard { entries, new_rank } => {
                let mut lines = vec![match new_rank {
                    Some(rank) => format!("NEW HIGH SCORE #{}", rank),
                    None => "HIGH SCORES".to_string(),
                }];
                if entries.is_empty() {
                    lines.push("No scores yet".into());
                }
                lines.extend(
                    entries
                        .iter()
                        .enumerate()
                        .map(|(i, e)| format!("{}. {} {}", i + 1, e.name, e.score)),
                );
                lines
            }
        }
    }
}
