//! High score leaderboard
//!
//! Top 3 `{name, score}` entries, sorted descending. Stored as plain text,
//! one `NAME,SCORE` line per entry. Unreadable or corrupt tables load as empty.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_HIGH_SCORES, NAME_LEN};
use crate::error::StoreError;
use crate::persistence::ScoreStore;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Three-letter player name
    pub name: String,
    pub score: u32,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify.
    /// Equal scores keep insertion order: the newcomer ranks below them.
    pub fn add_score(&mut self, name: &str, score: u32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                name: name.to_string(),
                score,
            },
        );

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Parse the text form; any malformed line rejects the whole table
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let corrupt = |reason: &str| StoreError::Corrupt {
                line: i + 1,
                reason: reason.to_string(),
            };
            let (name, score) = line.split_once(',').ok_or_else(|| corrupt("missing comma"))?;
            let name = name.trim();
            if name.chars().count() != NAME_LEN {
                return Err(corrupt("name must be 3 characters"));
            }
            let score = score
                .trim()
                .parse::<u32>()
                .map_err(|e| corrupt(&e.to_string()))?;
            entries.push(HighScoreEntry {
                name: name.to_string(),
                score,
            });
        }

        // Stable sort keeps file order among equal scores
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Ok(Self { entries })
    }

    /// Text form, one `NAME,SCORE` line per entry
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{},{}\n", e.name, e.score))
            .collect()
    }

    /// Load high scores from the store; missing or corrupt data yields an empty table
    pub fn load(store: &mut dyn ScoreStore) -> Self {
        match store.read() {
            Ok(Some(text)) => match Self::parse(&text) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(e) => {
                    log::warn!("High score table unreadable ({}), starting fresh", e);
                    Self::new()
                }
            },
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("High score store failed ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    /// Save high scores to the store
    pub fn save(&self, store: &mut dyn ScoreStore) -> Result<(), StoreError> {
        store.write(&self.to_text())?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
