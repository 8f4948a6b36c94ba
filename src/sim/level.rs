//! Level execution
//!
//! `AwaitReady -> Countdown -> (Reaction -> Action) x N -> Complete | Failed`
//!
//! The runner is advanced one poll at a time by [`LevelRunner::tick`]; it never
//! blocks or reads hardware. The level timer starts when the countdown ends and
//! keeps running through every reaction delay. Time-limit expiry is a hard
//! cutoff checked before any input of the tick is evaluated.

use rand::Rng;

use super::moves::{MoveEvaluator, MoveInput};
use super::state::{Action, Difficulty, LevelConfig, MoveSpec, TickInput};
use crate::audio::SoundEffect;
use crate::consts::{
    COUNTDOWN_FROM, COUNTDOWN_GO, COUNTDOWN_STEP, LEVEL_BONUS, MOVE_BONUS, REACTION_DELAY,
};
use crate::input::GestureDetector;

/// Countdown display step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Digit(u8),
    Go,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelPhase {
    /// Instruction screen, waiting for the player to confirm
    AwaitReady,
    Countdown { started_at: f64 },
    /// Instruction visible, input not yet evaluated
    Reaction { move_index: usize, shown_at: f64 },
    Action { move_index: usize },
    Complete,
    Failed,
}

/// Snapshot of an in-progress move for the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayStatus {
    pub move_index: usize,
    pub action: Action,
    /// False during the reaction delay
    pub armed: bool,
    pub progress: f32,
    pub elapsed: f64,
    pub time_limit: f64,
    pub score_delta: u32,
}

impl PlayStatus {
    pub fn time_remaining(&self) -> f64 {
        (self.time_limit - self.elapsed).max(0.0)
    }

    pub fn time_fraction(&self) -> f32 {
        (self.elapsed / self.time_limit).clamp(0.0, 1.0) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelStatus {
    AwaitingReady,
    Countdown(CountdownStep),
    Playing(PlayStatus),
    Passed { score_delta: u32 },
    Failed { score_delta: u32 },
}

/// Final result of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOutcome {
    pub passed: bool,
    /// Score earned in this level only
    pub score_delta: u32,
}

/// Draw the move list: uniform non-shake actions, last move always a shake
pub fn generate_moves<R: Rng + ?Sized>(
    config: &LevelConfig,
    time_limit: f64,
    rng: &mut R,
) -> Vec<MoveSpec> {
    (0..config.move_count)
        .map(|i| {
            let action = if i + 1 == config.move_count {
                Action::Shake
            } else {
                Action::random_non_shake(rng)
            };
            MoveSpec { action, time_limit }
        })
        .collect()
}

/// Countdown step shown `t` seconds after the countdown began, `None` once over
fn countdown_step(t: f64) -> Option<CountdownStep> {
    let digits = f64::from(COUNTDOWN_FROM) * COUNTDOWN_STEP;
    if t < digits {
        let shown = (t.max(0.0) / COUNTDOWN_STEP).floor() as u8;
        Some(CountdownStep::Digit(COUNTDOWN_FROM - shown))
    } else if t < digits + COUNTDOWN_GO {
        Some(CountdownStep::Go)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct LevelRunner {
    level: u8,
    difficulty: Difficulty,
    time_limit: f64,
    moves: Vec<MoveSpec>,
    phase: LevelPhase,
    level_start: f64,
    score_delta: u32,
    evaluator: MoveEvaluator,
    gesture: GestureDetector,
    progress: f32,
    /// Countdown step already announced
    last_countdown: Option<CountdownStep>,
}

impl LevelRunner {
    pub fn new<R: Rng + ?Sized>(
        level: u8,
        config: LevelConfig,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Self {
        let time_limit = config.effective_time_limit(difficulty);
        let moves = generate_moves(&config, time_limit, rng);
        Self::with_moves(level, difficulty, time_limit, moves)
    }

    /// Runner over a fixed move list
    pub fn with_moves(
        level: u8,
        difficulty: Difficulty,
        time_limit: f64,
        moves: Vec<MoveSpec>,
    ) -> Self {
        let first = moves.first().map(|m| m.action).unwrap_or(Action::Shake);
        Self {
            level,
            difficulty,
            time_limit,
            moves,
            phase: LevelPhase::AwaitReady,
            level_start: 0.0,
            score_delta: 0,
            evaluator: MoveEvaluator::new(first),
            gesture: GestureDetector::new(),
            progress: 0.0,
            last_countdown: None,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn time_limit(&self) -> f64 {
        self.time_limit
    }

    pub fn moves(&self) -> &[MoveSpec] {
        &self.moves
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn score_delta(&self) -> u32 {
        self.score_delta
    }

    pub fn outcome(&self) -> Option<LevelOutcome> {
        match self.phase {
            LevelPhase::Complete => Some(LevelOutcome {
                passed: true,
                score_delta: self.score_delta,
            }),
            LevelPhase::Failed => Some(LevelOutcome {
                passed: false,
                score_delta: self.score_delta,
            }),
            _ => None,
        }
    }

    /// Player confirmed the level start; begin the countdown
    pub fn ready(&mut self, now: f64) {
        if self.phase == LevelPhase::AwaitReady {
            self.phase = LevelPhase::Countdown { started_at: now };
            self.last_countdown = None;
        }
    }

    /// Beep for a countdown status, once per step shown
    pub fn countdown_cue(&mut self, status: &LevelStatus) -> Option<SoundEffect> {
        let LevelStatus::Countdown(step) = *status else {
            return None;
        };
        if self.last_countdown == Some(step) {
            return None;
        }
        self.last_countdown = Some(step);
        Some(match step {
            CountdownStep::Digit(_) => SoundEffect::Countdown,
            CountdownStep::Go => SoundEffect::Go,
        })
    }

    /// Start the move sequence immediately, skipping ready and countdown
    pub fn begin(&mut self, now: f64) {
        self.level_start = now;
        self.score_delta = 0;
        log::info!(
            "Level {} ({}) started: {} moves in {:.1}s",
            self.level,
            self.difficulty.as_str(),
            self.moves.len(),
            self.time_limit
        );
        if self.moves.is_empty() {
            self.finish(now);
        } else {
            self.show_move(0, now);
        }
    }

    /// Advance by one poll
    pub fn tick(&mut self, input: &TickInput) -> LevelStatus {
        let now = input.now;
        match self.phase {
            LevelPhase::AwaitReady => return LevelStatus::AwaitingReady,
            LevelPhase::Countdown { started_at } => {
                if let Some(step) = countdown_step(now - started_at) {
                    return LevelStatus::Countdown(step);
                }
                self.begin(now);
            }
            LevelPhase::Reaction { move_index, shown_at } => {
                if self.expired(now) {
                    return self.fail(now);
                }
                if now - shown_at >= REACTION_DELAY {
                    let action = self.moves[move_index].action;
                    self.evaluator.start(action, &mut self.gesture);
                    self.progress = 0.0;
                    self.phase = LevelPhase::Action { move_index };
                }
            }
            LevelPhase::Action { move_index } => {
                if self.expired(now) {
                    return self.fail(now);
                }
                let gesture = (self.evaluator.action() == Action::Shake)
                    .then(|| self.gesture.update(input.accel, now));
                let update = self.evaluator.tick(&MoveInput {
                    encoder: input.encoder,
                    button_pressed: input.button_pressed,
                    gesture,
                });
                self.progress = update.pct;

                if update.complete {
                    self.score_delta += MOVE_BONUS;
                    log::debug!(
                        "Move {}/{} ({}) complete at {:.2}s",
                        move_index + 1,
                        self.moves.len(),
                        self.evaluator.action().as_str(),
                        now - self.level_start
                    );
                    if move_index + 1 < self.moves.len() {
                        self.show_move(move_index + 1, now);
                    } else {
                        self.finish(now);
                    }
                }
            }
            LevelPhase::Complete | LevelPhase::Failed => {}
        }
        self.status(now)
    }

    /// Current status without advancing
    pub fn status(&self, now: f64) -> LevelStatus {
        match self.phase {
            LevelPhase::AwaitReady => LevelStatus::AwaitingReady,
            LevelPhase::Countdown { started_at } => LevelStatus::Countdown(
                countdown_step(now - started_at).unwrap_or(CountdownStep::Go),
            ),
            LevelPhase::Reaction { move_index, .. } => self.playing(move_index, false, now),
            LevelPhase::Action { move_index } => self.playing(move_index, true, now),
            LevelPhase::Complete => LevelStatus::Passed {
                score_delta: self.score_delta,
            },
            LevelPhase::Failed => LevelStatus::Failed {
                score_delta: self.score_delta,
            },
        }
    }

    fn playing(&self, move_index: usize, armed: bool, now: f64) -> LevelStatus {
        LevelStatus::Playing(PlayStatus {
            move_index,
            action: self.moves[move_index].action,
            armed,
            progress: if armed { self.progress } else { 0.0 },
            elapsed: now - self.level_start,
            time_limit: self.time_limit,
            score_delta: self.score_delta,
        })
    }

    fn expired(&self, now: f64) -> bool {
        now - self.level_start >= self.time_limit
    }

    fn show_move(&mut self, move_index: usize, now: f64) {
        self.progress = 0.0;
        self.phase = LevelPhase::Reaction {
            move_index,
            shown_at: now,
        };
    }

    fn finish(&mut self, now: f64) {
        self.score_delta += LEVEL_BONUS;
        self.phase = LevelPhase::Complete;
        log::info!(
            "Level {} cleared in {:.2}s, +{} points",
            self.level,
            now - self.level_start,
            self.score_delta
        );
    }

    fn fail(&mut self, now: f64) -> LevelStatus {
        let completed = match self.phase {
            LevelPhase::Reaction { move_index, .. } | LevelPhase::Action { move_index } => {
                move_index
            }
            _ => 0,
        };
        self.phase = LevelPhase::Failed;
        log::info!(
            "Level {} failed: time up at {:.2}s after {}/{} moves",
            self.level,
            now - self.level_start,
            completed,
            self.moves.len()
        );
        self.status(now)
    }
}
