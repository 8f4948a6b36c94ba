//! Three-letter player name editor driven by the encoder

use crate::consts::NAME_LEN;
use crate::input::Direction;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    /// Alphabet index per position
    letters: [usize; NAME_LEN],
    cursor: usize,
}

impl Default for NameEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl NameEntry {
    /// Starts as "AAA" with the cursor on the first letter
    pub fn new() -> Self {
        Self {
            letters: [0; NAME_LEN],
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn letters(&self) -> [char; NAME_LEN] {
        self.letters.map(|i| char::from(ALPHABET[i]))
    }

    pub fn name(&self) -> String {
        self.letters().iter().collect()
    }

    /// Right steps forward through the alphabet, left backward, wrapping
    pub fn rotate(&mut self, direction: Direction) {
        let Some(letter) = self.letters.get_mut(self.cursor) else {
            return;
        };
        *letter = match direction {
            Direction::Right => (*letter + 1) % ALPHABET.len(),
            Direction::Left => (*letter + ALPHABET.len() - 1) % ALPHABET.len(),
        };
    }

    /// Confirm the current letter; returns the finished name after the last one
    pub fn confirm(&mut self) -> Option<String> {
        if self.cursor < NAME_LEN {
            self.cursor += 1;
        }
        (self.cursor >= NAME_LEN).then(|| self.name())
    }
}
