//! End-to-end sessions on the simulated board with a virtual clock

use bomb_master::persistence::{FileStore, MemoryStore, ScoreStore};
use bomb_master::platform::host::{Autoplayer, HostBoard, LogBuzzer};
use bomb_master::platform::{Peripherals, SimClock};
use bomb_master::sim::{Difficulty, GameMachine, GamePhase, LevelOutcome, RngState};
use bomb_master::{Device, HighScores, Settings};

/// Virtual polls allowed per session before the test gives up
const POLL_LIMIT: u64 = 1_000_000;

fn device(board: &HostBoard, player: Autoplayer, fail_every: Option<u64>) -> Device {
    let peripherals = Peripherals::new(
        Box::new(SimClock::new()),
        Box::new(board.pins()),
        Some(Box::new(board.accelerometer(fail_every))),
        Some(Box::new(board.display(Some(player)))),
        Some(Box::new(LogBuzzer)),
    );
    let mut device = Device::new(peripherals, &Settings::default());
    assert!(device.calibrate());
    device
}

/// Play one full game; returns the machine after it is back on the splash screen
fn play_session(store: Box<dyn ScoreStore>, player: Autoplayer, seed: u64) -> GameMachine {
    let board = HostBoard::new();
    let mut device = device(&board, player, Some(7));
    let mut machine = GameMachine::new(store, seed);
    let mut polls = 0u64;
    let mut deepest_level = 0;

    device.run(&mut machine, |m| {
        polls += 1;
        deepest_level = deepest_level.max(m.session().level_number());
        polls < POLL_LIMIT && (m.games_played() == 0 || m.phase() != GamePhase::Splash)
    });

    assert!(polls < POLL_LIMIT, "session stuck in {:?}", machine.phase());
    assert!(deepest_level >= 2, "autoplayer never cleared level 1");
    machine
}

#[test]
fn test_full_session_reaches_high_score_board() {
    let player = Autoplayer::new(11, ['K', 'A', 'T'], Difficulty::Easy);
    let machine = play_session(Box::new(MemoryStore::new()), player, 11);

    assert_eq!(machine.phase(), GamePhase::Splash);
    assert_eq!(machine.games_played(), 1);
    let top = &machine.high_scores().entries[0];
    assert_eq!(top.name, "KAT");
    // Level 1 alone is worth 3 moves and the clear bonus
    assert!(top.score >= 80);
    assert_eq!(top.score % 10, 0);
}

#[test]
fn test_same_seed_same_game() {
    let score = |seed| {
        let player = Autoplayer::new(seed, ['A', 'B', 'C'], Difficulty::Medium);
        let machine = play_session(Box::new(MemoryStore::new()), player, seed);
        machine.high_scores().top_score()
    };
    assert_eq!(score(5), score(5));
}

#[test]
fn test_session_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("highscores.txt");
    std::fs::write(&path, "OLD,20\n").unwrap();

    let player = Autoplayer::new(3, ['Z', 'E', 'D'], Difficulty::Easy);
    play_session(Box::new(FileStore::new(&path)), player, 3);

    let text = std::fs::read_to_string(&path).unwrap();
    let table = HighScores::parse(&text).unwrap();
    assert_eq!(table.entries.len(), 2);
    assert_eq!(table.entries[0].name, "ZED");
    assert_eq!(table.entries[1].name, "OLD");
}

#[test]
fn test_corrupt_score_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("highscores.txt");
    std::fs::write(&path, "this is not a score table").unwrap();

    let machine = GameMachine::new(Box::new(FileStore::new(&path)), 1);
    assert!(machine.high_scores().is_empty());
}

#[test]
fn test_run_level_with_autoplayer() {
    let board = HostBoard::new();
    let player = Autoplayer::new(8, ['A'; 3], Difficulty::Easy);
    let mut device = device(&board, player, None);
    let mut rng = RngState::new(8).to_rng();

    let outcome = device.run_level(1, Difficulty::Easy, &mut rng);
    let expected = LevelOutcome {
        passed: true,
        score_delta: 80,
    };
    assert_eq!(outcome, Some(expected));
}

#[test]
fn test_frozen_player_fails_level() {
    let board = HostBoard::new();
    let player = Autoplayer::new(8, ['A'; 3], Difficulty::Hard).with_miss_chance(1.0);
    let mut device = device(&board, player, None);
    let mut rng = RngState::new(8).to_rng();

    let outcome = device.run_level(2, Difficulty::Hard, &mut rng);
    let expected = LevelOutcome {
        passed: false,
        score_delta: 0,
    };
    assert_eq!(outcome, Some(expected));
}
