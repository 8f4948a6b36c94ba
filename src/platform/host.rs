//! Simulated board for running on a desktop
//!
//! Pins and accelerometer replay a queue of per-poll [`Step`]s. The display
//! logs each frame and can hand it to an [`Autoplayer`], which looks at the
//! screen the way a player would and queues the inputs for it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Accelerometer, Buzzer, Display, InputPins, PinLevels, RawSample};
use crate::consts::{KNOB_INCREMENT, ROTATION_TARGET};
use crate::error::HalError;
use crate::input::Direction;
use crate::sim::{Action, Difficulty};
use crate::ui::{Frame, PlayFrame};

/// Standard gravity seen by a board lying flat (m/s²)
pub const GRAVITY: Vec3 = Vec3::new(0.0, 0.0, 9.81);

/// Polls per held level when scripting a detent or a press
const HOLD_POLLS: usize = 4;
const PRESS_POLLS: usize = 40;
const SHAKE_POLLS: usize = 60;

/// Pin levels and extra acceleration for one poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub pins: PinLevels,
    pub jolt: Vec3,
}

impl Step {
    pub const IDLE: Self = Self {
        pins: PinLevels::IDLE,
        jolt: Vec3::ZERO,
    };
}

/// Script for one encoder detent
pub fn detent(direction: Direction) -> Vec<Step> {
    let dt = direction == Direction::Right;
    let mut steps = Vec::with_capacity(3 * HOLD_POLLS);
    for clk in [true, false] {
        steps.extend(std::iter::repeat_n(
            Step {
                pins: PinLevels {
                    clk,
                    dt,
                    button: true,
                },
                jolt: Vec3::ZERO,
            },
            HOLD_POLLS,
        ));
    }
    steps.extend(std::iter::repeat_n(Step::IDLE, HOLD_POLLS));
    steps
}

/// Script for one button press and release
pub fn press() -> Vec<Step> {
    let down = Step {
        pins: PinLevels {
            button: false,
            ..PinLevels::IDLE
        },
        jolt: Vec3::ZERO,
    };
    let mut steps = vec![down; PRESS_POLLS];
    steps.extend(std::iter::repeat_n(Step::IDLE, PRESS_POLLS));
    steps
}

/// Script for a vigorous shake
pub fn shake() -> Vec<Step> {
    (0..SHAKE_POLLS)
        .map(|i| Step {
            pins: PinLevels::IDLE,
            jolt: if i % 20 < 10 {
                Vec3::new(16.0, 4.0, 0.0)
            } else {
                Vec3::new(-16.0, -4.0, 0.0)
            },
        })
        .collect()
}

#[derive(Debug, Default)]
struct BoardState {
    script: VecDeque<Step>,
    current: Option<Step>,
    reads: u64,
}

/// Shared state behind the simulated peripherals
#[derive(Debug, Clone, Default)]
pub struct HostBoard {
    state: Rc<RefCell<BoardState>>,
}

impl HostBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append steps to the input script
    pub fn queue(&self, steps: impl IntoIterator<Item = Step>) {
        self.state.borrow_mut().script.extend(steps);
    }

    /// Scripted polls not yet consumed
    pub fn pending(&self) -> usize {
        self.state.borrow().script.len()
    }

    pub fn pins(&self) -> HostPins {
        HostPins {
            board: self.clone(),
        }
    }

    /// Accelerometer that fails every `fail_every`-th read when set
    pub fn accelerometer(&self, fail_every: Option<u64>) -> HostAccelerometer {
        HostAccelerometer {
            board: self.clone(),
            fail_every,
        }
    }

    pub fn display(&self, player: Option<Autoplayer>) -> HostDisplay {
        HostDisplay {
            board: self.clone(),
            player,
            last_name: "",
        }
    }
}

pub struct HostPins {
    board: HostBoard,
}

impl InputPins for HostPins {
    fn sample(&mut self) -> PinLevels {
        let mut state = self.board.state.borrow_mut();
        let step = state.script.pop_front();
        state.current = step;
        step.unwrap_or(Step::IDLE).pins
    }
}

pub struct HostAccelerometer {
    board: HostBoard,
    fail_every: Option<u64>,
}

impl Accelerometer for HostAccelerometer {
    fn read(&mut self) -> Result<RawSample, HalError> {
        let mut state = self.board.state.borrow_mut();
        state.reads += 1;
        if let Some(n) = self.fail_every {
            if n > 0 && state.reads % n == 0 {
                let reason = format!("simulated read failure #{}", state.reads);
                return Err(HalError::Bus(reason));
            }
        }
        let jolt = state.current.map(|s| s.jolt).unwrap_or(Vec3::ZERO);
        Ok(GRAVITY + jolt)
    }
}

/// Logs frames; feeds them to the autoplayer when one is attached
pub struct HostDisplay {
    board: HostBoard,
    player: Option<Autoplayer>,
    last_name: &'static str,
}

impl Display for HostDisplay {
    fn draw(&mut self, frame: &Frame) -> Result<(), HalError> {
        if frame.name() != self.last_name {
            log::info!("[{}] {}", frame.name(), frame.lines().join(" | "));
            self.last_name = frame.name();
        } else {
            log::trace!("[{}] {}", frame.name(), frame.lines().join(" | "));
        }

        if let Some(player) = self.player.as_mut() {
            // Only decide once the previous inputs have been played out
            if self.board.pending() == 0 {
                self.board.queue(player.decide(frame));
            }
        }
        Ok(())
    }
}

/// Buzzer that logs tones
#[derive(Debug, Default)]
pub struct LogBuzzer;

impl Buzzer for LogBuzzer {
    fn start(&mut self, freq_hz: u32, duty: f32) -> Result<(), HalError> {
        log::trace!("buzzer {} Hz, duty {:.2}", freq_hz, duty);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        log::trace!("buzzer off");
        Ok(())
    }
}

/// Scripted player that reads the screen and acts on it
#[derive(Debug, Clone)]
pub struct Autoplayer {
    rng: Pcg32,
    name: [char; 3],
    difficulty: Difficulty,
    /// Chance of freezing up on a move
    miss_chance: f64,
    /// Longest hesitation before acting (polls)
    max_hesitation: usize,
    /// Move already handled, so a stale frame does not repeat it
    acted_on: Option<(u8, usize)>,
}

impl Autoplayer {
    pub fn new(seed: u64, name: [char; 3], difficulty: Difficulty) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            name,
            difficulty,
            miss_chance: 0.0,
            max_hesitation: 200,
            acted_on: None,
        }
    }

    pub fn with_miss_chance(mut self, chance: f64) -> Self {
        self.miss_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_hesitation(mut self, polls: usize) -> Self {
        self.max_hesitation = polls;
        self
    }

    /// Inputs to queue for the screen currently shown
    pub fn decide(&mut self, frame: &Frame) -> Vec<Step> {
        match frame {
            Frame::Countdown(_) => Vec::new(),
            Frame::NameEntry { letters, cursor } => {
                let target = self.name.get(*cursor).copied().unwrap_or('A');
                match letters.get(*cursor) {
                    Some(&shown) if shown != target => detent(letter_direction(shown, target)),
                    _ => press(),
                }
            }
            Frame::DifficultyMenu { selected } => {
                if *selected == self.difficulty {
                    press()
                } else {
                    detent(Direction::Right)
                }
            }
            Frame::Play(play) => self.play(play),
            Frame::LevelStart { .. } => {
                self.acted_on = None;
                press()
            }
            Frame::Splash
            | Frame::LevelClear { .. }
            | Frame::Win { .. }
            | Frame::GameOver { .. }
            | Frame::HighScoreBoard { .. } => press(),
        }
    }

    fn play(&mut self, play: &PlayFrame) -> Vec<Step> {
        let key = (play.level, play.move_index);
        if !play.armed || self.acted_on == Some(key) {
            return Vec::new();
        }
        self.acted_on = Some(key);

        if self.rng.random_bool(self.miss_chance) {
            log::info!(
                "Autoplayer froze on {} (move {})",
                play.action.as_str(),
                play.move_index + 1
            );
            return Vec::new();
        }

        let hesitation = if self.max_hesitation > 0 {
            self.rng.random_range(0..self.max_hesitation)
        } else {
            0
        };
        let mut steps = vec![Step::IDLE; hesitation];
        match play.action {
            Action::RotateLeft | Action::RotateRight => {
                let direction = play.action.direction().unwrap_or(Direction::Right);
                let detents = (ROTATION_TARGET / KNOB_INCREMENT).ceil() as usize;
                for _ in 0..detents {
                    steps.extend(detent(direction));
                }
            }
            Action::Press => steps.extend(press()),
            Action::Shake => steps.extend(shake()),
        }
        steps
    }
}

/// Shortest way around the alphabet from `from` to `to`
fn letter_direction(from: char, to: char) -> Direction {
    let forward = (to as i32 - from as i32).rem_euclid(26);
    if forward <= 13 {
        Direction::Right
    } else {
        Direction::Left
    }
}
