//! Per-move progress evaluation
//!
//! Turns the live input of one tick into completion progress for the active
//! move. Progress lives only as long as the move; `start` wipes it.

use super::state::Action;
use crate::consts::{KNOB_INCREMENT, ROTATION_TARGET};
use crate::input::{Direction, GestureDetector, GestureReading};

/// Accumulated progress toward the active move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveProgress {
    pub accumulated: f32,
    pub target: f32,
}

impl MoveProgress {
    fn for_action(action: Action) -> Self {
        let target = match action {
            Action::RotateLeft | Action::RotateRight => ROTATION_TARGET,
            Action::Press | Action::Shake => 1.0,
        };
        Self {
            accumulated: 0.0,
            target,
        }
    }
}

/// Inputs relevant to a move in one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveInput {
    /// Encoder step decoded this tick (already consumed by the decoder)
    pub encoder: Option<Direction>,
    pub button_pressed: bool,
    /// Detector output; only present while a shake move is active
    pub gesture: Option<GestureReading>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// 0.0 - 1.0
    pub pct: f32,
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct MoveEvaluator {
    action: Action,
    progress: MoveProgress,
    complete: bool,
}

impl MoveEvaluator {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            progress: MoveProgress::for_action(action),
            complete: false,
        }
    }

    /// Make `action` the active move, discarding all previous progress
    pub fn start(&mut self, action: Action, gesture: &mut GestureDetector) {
        *self = Self::new(action);
        if action == Action::Shake {
            gesture.reset();
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn progress(&self) -> MoveProgress {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Evaluate one tick of input against the active move
    pub fn tick(&mut self, input: &MoveInput) -> ProgressUpdate {
        if !self.complete {
            match self.action {
                Action::RotateLeft | Action::RotateRight => {
                    if input.encoder.is_some() && input.encoder == self.action.direction() {
                        self.progress.accumulated += KNOB_INCREMENT;
                    }
                    self.complete = self.progress.accumulated >= self.progress.target;
                }
                Action::Press => {
                    if input.button_pressed {
                        self.progress.accumulated = self.progress.target;
                        self.complete = true;
                    }
                }
                Action::Shake => {
                    if let Some(reading) = input.gesture {
                        self.progress.accumulated = reading.hold_progress;
                        self.complete = reading.is_held();
                    }
                }
            }
        }

        ProgressUpdate {
            pct: (self.progress.accumulated / self.progress.target).clamp(0.0, 1.0),
            complete: self.complete,
        }
    }
}
