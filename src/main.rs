//! Bomb Master host entry point
//!
//! Runs the engine against the simulated board with an autoplayer at the
//! controls. Usage: `bomb-master [seed] [sessions] [--realtime]`
//!
//! Settings are read from `bomb-master.json` in the working directory when present.

use std::path::Path;

use bomb_master::persistence::FileStore;
use bomb_master::platform::host::{Autoplayer, HostBoard, LogBuzzer};
use bomb_master::platform::{Clock, MonotonicClock, Peripherals, SimClock};
use bomb_master::sim::{Difficulty, GameMachine, GamePhase};
use bomb_master::{Device, Settings};

const SETTINGS_FILE: &str = "bomb-master.json";
const NAMES: [[char; 3]; 4] = [['B', 'O', 'B'], ['A', 'M', 'Y'], ['Z', 'E', 'D'], ['K', 'A', 'T']];

fn main() {
    env_logger::init();
    log::info!("Bomb Master (host) starting...");

    let settings = Settings::load(Path::new(SETTINGS_FILE));
    let args: Vec<String> = std::env::args().skip(1).collect();
    let realtime = args.iter().any(|a| a == "--realtime");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));

    let seed = positional
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .or(settings.seed)
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });
    let sessions = positional
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);
    log::info!("Seed {}, {} session(s)", seed, sessions);

    let name = NAMES[(seed % NAMES.len() as u64) as usize];
    let difficulty = Difficulty::ALL[(seed / 7 % 3) as usize];
    let player = Autoplayer::new(seed, name, difficulty).with_miss_chance(0.05);

    let board = HostBoard::new();
    let clock: Box<dyn Clock> = if realtime {
        Box::new(MonotonicClock::new())
    } else {
        Box::new(SimClock::new())
    };
    let peripherals = Peripherals::new(
        clock,
        Box::new(board.pins()),
        Some(Box::new(board.accelerometer(Some(97)))),
        Some(Box::new(board.display(Some(player)))),
        Some(Box::new(LogBuzzer)),
    );

    let mut device = Device::new(peripherals, &settings);
    if !device.calibrate() {
        log::warn!("Running without accelerometer calibration");
    }

    let store = FileStore::new(&settings.high_score_path);
    let mut machine = GameMachine::new(Box::new(store), seed);
    device.run(&mut machine, |m| {
        m.games_played() < sessions || m.phase() != GamePhase::Splash
    });

    for (i, entry) in machine.high_scores().entries.iter().enumerate() {
        println!("{}. {} {}", i + 1, entry.name, entry.score);
    }
    log::info!("Finished at {:.1}s", device.now());
}
