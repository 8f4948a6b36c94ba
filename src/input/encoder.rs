//! Rotary encoder decoding
//!
//! A step is emitted on each falling edge of CLK; the DT level at that instant
//! gives the direction. Edges closer together than the debounce interval are
//! contact bounce and are dropped. The caller must poll at a millisecond-scale
//! cadence or edges will be missed.

use serde::{Deserialize, Serialize};

use crate::consts::ENCODER_DEBOUNCE;

/// One detent of rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

/// Menu view of a rotation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuNav {
    Up,
    Down,
}

/// Direction reported when DT is high at the CLK falling edge (board wiring)
const DT_HIGH_DIRECTION: Direction = Direction::Right;

/// Remap a rotation for menus: right moves down, left moves up
pub fn as_menu_navigation(direction: Direction) -> MenuNav {
    match direction {
        Direction::Right => MenuNav::Down,
        Direction::Left => MenuNav::Up,
    }
}

/// Last-seen pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderRawState {
    pub clk_prev: bool,
    pub dt_prev: bool,
}

#[derive(Debug, Clone)]
pub struct EncoderDecoder {
    raw: EncoderRawState,
    last_edge: Option<f64>,
    debounce: f64,
    bounced: u64,
}

impl EncoderDecoder {
    /// Start from the current pin levels so power-on state is not read as an edge
    pub fn new(clk: bool, dt: bool) -> Self {
        Self {
            raw: EncoderRawState {
                clk_prev: clk,
                dt_prev: dt,
            },
            last_edge: None,
            debounce: ENCODER_DEBOUNCE,
            bounced: 0,
        }
    }

    /// Re-seed pin levels and forget the debounce window
    pub fn reset(&mut self, clk: bool, dt: bool) {
        self.raw = EncoderRawState {
            clk_prev: clk,
            dt_prev: dt,
        };
        self.last_edge = None;
    }

    pub fn raw_state(&self) -> EncoderRawState {
        self.raw
    }

    /// Edges rejected as bounce since creation
    pub fn bounced_edges(&self) -> u64 {
        self.bounced
    }

    /// Sample the pins at `now` (seconds) and decode at most one step
    pub fn poll(&mut self, clk: bool, dt: bool, now: f64) -> Option<Direction> {
        let falling = self.raw.clk_prev && !clk;
        self.raw = EncoderRawState {
            clk_prev: clk,
            dt_prev: dt,
        };
        if !falling {
            return None;
        }

        if let Some(last) = self.last_edge {
            if now - last < self.debounce {
                self.bounced += 1;
                return None;
            }
        }
        self.last_edge = Some(now);

        Some(if dt {
            DT_HIGH_DIRECTION
        } else {
            opposite(DT_HIGH_DIRECTION)
        })
    }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
    }
}
