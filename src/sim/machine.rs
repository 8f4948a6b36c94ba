//! Session state machine
//!
//! `Splash -> NameEntry -> DifficultySelect -> (LevelStart -> Countdown -> LevelPlay) x 10
//! -> Win | GameOver -> HighScoreCheck -> HighScoreBoard -> Splash`
//!
//! [`transition`] is the whole transition table. [`GameMachine::step`] turns one
//! tick of input into at most one [`GameEvent`], applies the transition and runs
//! the entry actions of the new phase.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::level::{LevelRunner, LevelStatus};
use super::name_entry::NameEntry;
use super::state::{Difficulty, GameSession, TickInput};
use crate::audio::SoundEffect;
use crate::highscores::HighScores;
use crate::input::{MenuNav, as_menu_navigation};
use crate::persistence::ScoreStore;
use crate::ui::{Frame, PlayFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Splash,
    NameEntry,
    DifficultySelect,
    LevelStart,
    Countdown,
    LevelPlay,
    Win,
    GameOver,
    HighScoreCheck,
    HighScoreBoard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Button press edge on a screen that only waits for confirmation
    Pressed,
    NameConfirmed,
    DifficultyChosen,
    CountdownDone,
    /// Level cleared and the player moved on
    LevelPassed,
    /// Final level cleared
    LastLevelPassed,
    LevelFailed,
    ScoresChecked,
}

/// Transition table; `None` means the event is not valid in `phase`
pub fn transition(phase: GamePhase, event: GameEvent) -> Option<GamePhase> {
    use GameEvent as E;
    use GamePhase as P;

    match (phase, event) {
        (P::Splash, E::Pressed) => Some(P::NameEntry),
        (P::NameEntry, E::NameConfirmed) => Some(P::DifficultySelect),
        (P::DifficultySelect, E::DifficultyChosen) => Some(P::LevelStart),
        (P::LevelStart, E::Pressed) => Some(P::Countdown),
        (P::Countdown, E::CountdownDone) => Some(P::LevelPlay),
        (P::LevelPlay, E::LevelPassed) => Some(P::LevelStart),
        (P::LevelPlay, E::LastLevelPassed) => Some(P::Win),
        (P::LevelPlay, E::LevelFailed) => Some(P::GameOver),
        (P::Win | P::GameOver, E::Pressed) => Some(P::HighScoreCheck),
        (P::HighScoreCheck, E::ScoresChecked) => Some(P::HighScoreBoard),
        (P::HighScoreBoard, E::Pressed) => Some(P::Splash),
        _ => None,
    }
}

/// Result of one machine step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub frame: Frame,
    pub cues: Vec<SoundEffect>,
    pub phase_changed: bool,
}

pub struct GameMachine {
    phase: GamePhase,
    session: GameSession,
    name_entry: NameEntry,
    menu_cursor: usize,
    runner: Option<LevelRunner>,
    rng: Pcg32,
    high_scores: HighScores,
    store: Box<dyn ScoreStore>,
    new_rank: Option<usize>,
    pending_cues: Vec<SoundEffect>,
    games_played: u32,
}

impl GameMachine {
    /// Load the high score table and show the splash screen
    pub fn new(mut store: Box<dyn ScoreStore>, seed: u64) -> Self {
        let high_scores = HighScores::load(store.as_mut());
        let mut machine = Self {
            phase: GamePhase::Splash,
            session: GameSession::default(),
            name_entry: NameEntry::new(),
            menu_cursor: 0,
            runner: None,
            rng: Pcg32::seed_from_u64(seed),
            high_scores,
            store,
            new_rank: None,
            pending_cues: Vec::new(),
            games_played: 0,
        };
        let mut cues = Vec::new();
        machine.enter(GamePhase::Splash, 0.0, &mut cues);
        machine.pending_cues = cues;
        machine
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Active level, from level start until the next one begins
    pub fn runner(&self) -> Option<&LevelRunner> {
        self.runner.as_ref()
    }

    /// Rank achieved by the last finished game, if it made the board
    pub fn new_rank(&self) -> Option<usize> {
        self.new_rank
    }

    /// Games that reached the high score check
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    /// Advance by one poll of the control loop
    pub fn step(&mut self, input: &TickInput) -> StepOutput {
        let mut cues = std::mem::take(&mut self.pending_cues);
        let mut phase_changed = false;

        if let Some(event) = self.handle(input, &mut cues) {
            match transition(self.phase, event) {
                Some(next) => {
                    self.enter(next, input.now, &mut cues);
                    phase_changed = true;
                }
                None => log::warn!("Event {:?} ignored in {:?}", event, self.phase),
            }
        }

        StepOutput {
            frame: self.frame(input.now),
            cues,
            phase_changed,
        }
    }

    /// Per-phase input handling; returns the event this tick produced
    fn handle(&mut self, input: &TickInput, cues: &mut Vec<SoundEffect>) -> Option<GameEvent> {
        let pressed = input.pressed_edge();
        match self.phase {
            GamePhase::Splash
            | GamePhase::Win
            | GamePhase::GameOver
            | GamePhase::HighScoreBoard => {
                if pressed {
                    cues.push(SoundEffect::Confirm);
                    return Some(GameEvent::Pressed);
                }
                None
            }
            GamePhase::NameEntry => {
                if let Some(direction) = input.encoder {
                    self.name_entry.rotate(direction);
                    cues.push(SoundEffect::NameTick);
                }
                if pressed {
                    cues.push(SoundEffect::Confirm);
                    if let Some(name) = self.name_entry.confirm() {
                        log::info!("Player name: {}", name);
                        self.session.player_name = name;
                        return Some(GameEvent::NameConfirmed);
                    }
                }
                None
            }
            GamePhase::DifficultySelect => {
                let count = Difficulty::ALL.len();
                if let Some(direction) = input.encoder {
                    self.menu_cursor = match as_menu_navigation(direction) {
                        MenuNav::Down => (self.menu_cursor + 1) % count,
                        MenuNav::Up => (self.menu_cursor + count - 1) % count,
                    };
                    cues.push(SoundEffect::MenuTick);
                }
                if pressed {
                    cues.push(SoundEffect::Confirm);
                    self.session.difficulty = Difficulty::ALL[self.menu_cursor];
                    log::info!("Difficulty: {}", self.session.difficulty.as_str());
                    return Some(GameEvent::DifficultyChosen);
                }
                None
            }
            GamePhase::LevelStart => {
                if pressed {
                    cues.push(SoundEffect::Confirm);
                    if let Some(runner) = self.runner.as_mut() {
                        runner.ready(input.now);
                    }
                    return Some(GameEvent::Pressed);
                }
                None
            }
            GamePhase::Countdown => {
                let Some(runner) = self.runner.as_mut() else {
                    return Some(GameEvent::CountdownDone);
                };
                let status = runner.tick(input);
                if let Some(cue) = runner.countdown_cue(&status) {
                    cues.push(cue);
                }
                match status {
                    LevelStatus::Countdown(_) | LevelStatus::AwaitingReady => None,
                    _ => Some(GameEvent::CountdownDone),
                }
            }
            GamePhase::LevelPlay => self.handle_play(input, cues),
            // Entry action resolves the check immediately
            GamePhase::HighScoreCheck => Some(GameEvent::ScoresChecked),
        }
    }

    fn handle_play(&mut self, input: &TickInput, cues: &mut Vec<SoundEffect>) -> Option<GameEvent> {
        let Some(runner) = self.runner.as_mut() else {
            log::warn!("No level loaded, ending game");
            return Some(GameEvent::LevelFailed);
        };

        // Cleared level waits on its result screen for a press
        if runner.outcome().is_some() {
            if input.pressed_edge() {
                cues.push(SoundEffect::Confirm);
                self.session.level_index += 1;
                return Some(GameEvent::LevelPassed);
            }
            return None;
        }

        match runner.tick(input) {
            LevelStatus::Passed { score_delta } => {
                self.session.score += score_delta;
                if self.session.is_final_level() {
                    Some(GameEvent::LastLevelPassed)
                } else {
                    cues.push(SoundEffect::LevelClear);
                    None
                }
            }
            LevelStatus::Failed { score_delta } => {
                self.session.score += score_delta;
                Some(GameEvent::LevelFailed)
            }
            _ => None,
        }
    }

    /// Switch to `phase` and run its entry actions, following automatic transitions
    fn enter(&mut self, phase: GamePhase, now: f64, cues: &mut Vec<SoundEffect>) {
        let mut next = Some(phase);
        while let Some(phase) = next {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            let follow = match phase {
                GamePhase::Splash => {
                    self.session = GameSession::default();
                    self.runner = None;
                    self.new_rank = None;
                    cues.push(SoundEffect::Explosion);
                    cues.push(SoundEffect::Title);
                    None
                }
                GamePhase::NameEntry => {
                    self.name_entry = NameEntry::new();
                    None
                }
                GamePhase::DifficultySelect => {
                    self.menu_cursor = Difficulty::default().index();
                    None
                }
                GamePhase::LevelStart => {
                    self.load_level();
                    None
                }
                GamePhase::Countdown | GamePhase::LevelPlay => None,
                GamePhase::Win => {
                    log::info!("All levels cleared, final score {}", self.session.score);
                    cues.push(SoundEffect::Win);
                    None
                }
                GamePhase::GameOver => {
                    log::info!(
                        "Game over on level {}, final score {}",
                        self.session.level_number(),
                        self.session.score
                    );
                    cues.push(SoundEffect::Fail);
                    None
                }
                GamePhase::HighScoreCheck => {
                    self.check_high_score(now);
                    if self.new_rank.is_some() {
                        cues.push(SoundEffect::HighScore);
                    }
                    Some(GameEvent::ScoresChecked)
                }
                GamePhase::HighScoreBoard => None,
            };
            next = follow.and_then(|event| transition(phase, event));
        }
    }

    fn load_level(&mut self) {
        let level = self.session.level_number();
        self.runner = self.session.level_config().map(|config| {
            LevelRunner::new(level, config, self.session.difficulty, &mut self.rng)
        });
        if self.runner.is_none() {
            log::warn!("No configuration for level {}", level);
        }
    }

    fn check_high_score(&mut self, now: f64) {
        self.games_played += 1;
        let score = self.session.score;
        let name = self.session.player_name.clone();
        self.new_rank = self.high_scores.add_score(&name, score);

        match self.new_rank {
            Some(rank) => {
                log::info!("{} scored {} - new high score, rank {}", name, score, rank);
                if let Err(e) = self.high_scores.save(self.store.as_mut()) {
                    log::warn!("Failed to save high scores at {:.1}s: {}", now, e);
                }
            }
            None => log::info!("{} scored {} - no high score", name, score),
        }
    }

    /// Frame for the current phase
    pub fn frame(&self, now: f64) -> Frame {
        match self.phase {
            GamePhase::Splash => Frame::Splash,
            GamePhase::NameEntry => Frame::NameEntry {
                letters: self.name_entry.letters(),
                cursor: self.name_entry.cursor(),
            },
            GamePhase::DifficultySelect => Frame::DifficultyMenu {
                selected: Difficulty::ALL[self.menu_cursor],
            },
            GamePhase::LevelStart => Frame::LevelStart {
                level: self.session.level_number(),
                difficulty: self.session.difficulty,
                score: self.session.score,
            },
            GamePhase::Countdown | GamePhase::LevelPlay => self.level_frame(now),
            GamePhase::Win => Frame::Win {
                score: self.session.score,
            },
            GamePhase::GameOver => Frame::GameOver {
                level: self.session.level_number(),
                score: self.session.score,
            },
            GamePhase::HighScoreCheck | GamePhase::HighScoreBoard => Frame::HighScoreBoard {
                entries: self.high_scores.entries.clone(),
                new_rank: self.new_rank,
            },
        }
    }

    fn level_frame(&self, now: f64) -> Frame {
        match self.runner.as_ref() {
            Some(runner) => level_frame(runner, self.session.score, now),
            None => Frame::GameOver {
                level: self.session.level_number(),
                score: self.session.score,
            },
        }
    }
}

/// Screen for a level in progress; `base_score` is the score banked before this level
pub fn level_frame(runner: &LevelRunner, base_score: u32, now: f64) -> Frame {
    let level = runner.level();
    match runner.status(now) {
        LevelStatus::AwaitingReady => Frame::LevelStart {
            level,
            difficulty: runner.difficulty(),
            score: base_score,
        },
        LevelStatus::Countdown(step) => Frame::Countdown(step),
        LevelStatus::Playing(play) => Frame::Play(PlayFrame {
            level,
            action: play.action,
            move_index: play.move_index,
            move_count: runner.moves().len(),
            armed: play.armed,
            progress: play.progress,
            time_used: play.time_fraction(),
            time_remaining: play.time_remaining(),
            score: base_score + play.score_delta,
        }),
        LevelStatus::Passed { .. } => Frame::LevelClear {
            level,
            score: base_score,
        },
        LevelStatus::Failed { .. } => Frame::GameOver {
            level,
            score: base_score,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::LEVEL_COUNT;
    use crate::input::{ButtonEvent, Direction, FilteredSample};
    use crate::persistence::MemoryStore;
    use crate::sim::level::{LevelPhase, LevelRunner};
    use crate::sim::state::{Action, MoveSpec};

    const DT: f64 = 0.01;

    struct Driver {
        machine: GameMachine,
        now: f64,
        cues: Vec<SoundEffect>,
    }

    impl Driver {
        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn with_store(store: MemoryStore) -> Self {
            Self {
                machine: GameMachine::new(Box::new(store), 9),
                now: 0.0,
                cues: Vec::new(),
            }
        }

        fn step(&mut self, input: TickInput) -> StepOutput {
            self.now += DT;
            let out = self.machine.step(&TickInput {
                now: self.now,
                ..input
            });
            self.cues.extend(out.cues.iter().copied());
            out
        }

        fn idle(&mut self) -> StepOutput {
            self.step(TickInput::default())
        }

        fn press(&mut self) -> StepOutput {
            self.step(TickInput {
                button: Some(ButtonEvent::Pressed),
                button_pressed: true,
                ..Default::default()
            })
        }

        fn turn(&mut self, direction: Direction) -> StepOutput {
            self.step(TickInput {
                encoder: Some(direction),
                ..Default::default()
            })
        }

        /// Splash -> name "AAA" -> difficulty at `cursor_moves` downward steps
        fn start_game(&mut self, downs: usize) {
            self.press();
            for _ in 0..3 {
                self.press();
            }
            for _ in 0..downs {
                self.turn(Direction::Right);
            }
            self.press();
            assert_eq!(self.machine.phase(), GamePhase::LevelStart);
        }

        fn idle_until(&mut self, phase: GamePhase, limit: usize) {
            for _ in 0..limit {
                if self.machine.phase() == phase {
                    return;
                }
                self.idle();
            }
            let stuck = self.machine.phase();
            panic!("never reached {:?}, stuck in {:?}", phase, stuck);
        }

        /// Perform the active move of the current level
        fn play_move(&mut self) {
            let Some(runner) = self.machine.runner() else {
                panic!("no level loaded");
            };
            let LevelPhase::Action { move_index } = runner.phase() else {
                self.idle();
                return;
            };
            match runner.moves()[move_index].action {
                Action::RotateLeft => {
                    self.turn(Direction::Left);
                }
                Action::RotateRight => {
                    self.turn(Direction::Right);
                }
                Action::Press => {
                    self.step(TickInput {
                        button_pressed: true,
                        ..Default::default()
                    });
                }
                Action::Shake => {
                    self.step(TickInput {
                        accel: FilteredSample::new(0.0, 20.0, 0.0),
                        ..Default::default()
                    });
                }
            }
        }

        fn play_level(&mut self, limit: usize) {
            for _ in 0..limit {
                if self.machine.phase() != GamePhase::LevelPlay
                    || self.machine.runner().and_then(|r| r.outcome()).is_some()
                {
                    return;
                }
                self.play_move();
            }
            panic!("level did not finish");
        }
    }

    #[test]
    fn test_transition_table() {
        use GameEvent as E;
        use GamePhase as P;

        let allowed = [
            (P::Splash, E::Pressed, P::NameEntry),
            (P::LevelPlay, E::LevelPassed, P::LevelStart),
            (P::LevelPlay, E::LastLevelPassed, P::Win),
            (P::LevelPlay, E::LevelFailed, P::GameOver),
            (P::Win, E::Pressed, P::HighScoreCheck),
            (P::GameOver, E::Pressed, P::HighScoreCheck),
            (P::HighScoreCheck, E::ScoresChecked, P::HighScoreBoard),
            (P::HighScoreBoard, E::Pressed, P::Splash),
        ];
        for (phase, event, next) in allowed {
            let context = format!("{:?} on {:?}", phase, event);
            assert_eq!(transition(phase, event), Some(next), "{}", context);
        }

        assert_eq!(transition(P::Splash, E::LevelPassed), None);
        assert_eq!(transition(P::LevelPlay, E::Pressed), None);
        assert_eq!(transition(P::Countdown, E::LevelFailed), None);
    }

    #[test]
    fn test_splash_plays_title_cues_on_boot() {
        let mut d = Driver::new();
        let out = d.idle();
        assert_eq!(out.frame, Frame::Splash);
        assert_eq!(out.cues, vec![SoundEffect::Explosion, SoundEffect::Title]);
    }

    #[test]
    fn test_name_entry_and_difficulty_menu() {
        let mut d = Driver::new();
        d.press();
        assert_eq!(d.machine.phase(), GamePhase::NameEntry);

        d.turn(Direction::Right);
        d.press();
        d.turn(Direction::Left);
        d.press();
        d.press();
        assert_eq!(d.machine.session().player_name, "BZA");
        assert_eq!(d.machine.phase(), GamePhase::DifficultySelect);

        // Menu starts on EASY; UP wraps to HARD
        let menu = |selected| Frame::DifficultyMenu { selected };
        assert_eq!(d.idle().frame, menu(Difficulty::Easy));
        let out = d.turn(Direction::Left);
        assert_eq!(out.frame, menu(Difficulty::Hard));
        assert!(out.cues.contains(&SoundEffect::MenuTick));
        d.press();
        assert_eq!(d.machine.session().difficulty, Difficulty::Hard);
        assert_eq!(d.machine.phase(), GamePhase::LevelStart);
    }

    #[test]
    fn test_countdown_cues_then_play() {
        let mut d = Driver::new();
        d.start_game(1);
        assert_eq!(d.machine.session().difficulty, Difficulty::Medium);
        d.cues.clear();
        d.press();
        assert_eq!(d.machine.phase(), GamePhase::Countdown);

        d.idle_until(GamePhase::LevelPlay, 500);
        let countdown: Vec<_> = d
            .cues
            .iter()
            .filter(|c| matches!(c, SoundEffect::Countdown | SoundEffect::Go))
            .copied()
            .collect();
        assert_eq!(
            countdown,
            vec![
                SoundEffect::Countdown,
                SoundEffect::Countdown,
                SoundEffect::Countdown,
                SoundEffect::Go
            ]
        );
        match d.idle().frame {
            Frame::Play(play) => {
                assert!(!play.armed);
                assert_eq!(play.move_index, 0);
            }
            other => panic!("expected play, got {:?}", other),
        }
    }

    #[test]
    fn test_cleared_level_waits_for_press_then_advances() {
        let mut d = Driver::new();
        d.start_game(0);
        d.press();
        d.idle_until(GamePhase::LevelPlay, 500);
        d.play_level(10_000);

        let out = d.idle();
        let cleared = Frame::LevelClear {
            level: 1,
            score: 80,
        };
        assert_eq!(out.frame, cleared);
        assert_eq!(d.machine.phase(), GamePhase::LevelPlay);
        assert!(d.cues.contains(&SoundEffect::LevelClear));

        d.press();
        assert_eq!(d.machine.phase(), GamePhase::LevelStart);
        let next = Frame::LevelStart {
            level: 2,
            difficulty: Difficulty::Easy,
            score: 80,
        };
        assert_eq!(d.idle().frame, next);
    }

    #[test]
    fn test_timeout_goes_to_game_over_and_board() {
        let mut d = Driver::new();
        d.start_game(2);
        d.press();
        // Hard level 1: 20s budget, nobody touches the controls
        d.idle_until(GamePhase::GameOver, 5_000);
        assert_eq!(d.machine.session().score, 0);
        assert!(d.cues.contains(&SoundEffect::Fail));

        let out = d.press();
        assert_eq!(d.machine.phase(), GamePhase::HighScoreBoard);
        // Zero still makes an empty board
        assert_eq!(d.machine.new_rank(), Some(1));
        assert!(out.cues.contains(&SoundEffect::HighScore));
        assert_eq!(d.machine.games_played(), 1);

        d.press();
        assert_eq!(d.machine.phase(), GamePhase::Splash);
        assert_eq!(d.machine.session(), &GameSession::default());
    }

    #[test]
    fn test_low_score_misses_full_board() {
        let store = MemoryStore::with_contents("AAA,900\nBBB,800\nCCC,700\n");
        let mut d = Driver::with_store(store);
        d.start_game(0);
        d.press();
        d.idle_until(GamePhase::GameOver, 10_000);
        d.press();
        assert_eq!(d.machine.new_rank(), None);
        assert_eq!(d.machine.high_scores().entries.len(), 3);
        assert!(matches!(
            d.machine.frame(d.now),
            Frame::HighScoreBoard { new_rank: None, .. }
        ));
    }

    #[test]
    fn test_final_level_goes_straight_to_win() {
        let mut d = Driver::new();
        d.start_game(0);
        d.machine.session.level_index = LEVEL_COUNT - 1;
        d.machine.session.score = 1000;
        let moves = [Action::Press, Action::Shake]
            .into_iter()
            .map(|action| MoveSpec {
                action,
                time_limit: 30.0,
            })
            .collect();
        d.machine.runner = Some(LevelRunner::with_moves(10, Difficulty::Easy, 30.0, moves));

        d.press();
        d.idle_until(GamePhase::LevelPlay, 500);
        d.play_level(10_000);

        assert_eq!(d.machine.phase(), GamePhase::Win);
        assert_eq!(d.machine.session().score, 1000 + 2 * 10 + 50);
        assert!(d.cues.contains(&SoundEffect::Win));

        d.press();
        assert_eq!(d.machine.new_rank(), Some(1));
        assert_eq!(d.machine.high_scores().top_score(), Some(1070));
    }
}
