//! Cooperative control loop
//!
//! One thread, one loop: sample the pins and the sensor, step the game logic,
//! switch the buzzer, redraw at a coarse cadence, sleep one poll interval.
//! Every wait in the game is this loop continuing to poll.

use rand::Rng;

use crate::audio::{AudioManager, SoundEffect};
use crate::input::{Button, EncoderDecoder, SignalFilter};
use crate::platform::{Accelerometer, Clock, Display, InputPins, Peripherals};
use crate::settings::Settings;
use crate::sim::{
    Difficulty, GameMachine, LevelConfig, LevelOutcome, LevelPhase, LevelRunner, TickInput,
    level_frame,
};
use crate::ui::Frame;

/// Board plus the input decoders that run on every poll
pub struct Device {
    clock: Box<dyn Clock>,
    pins: Box<dyn InputPins>,
    accel: Box<dyn Accelerometer>,
    display: Box<dyn Display>,
    audio: AudioManager,
    filter: SignalFilter,
    encoder: EncoderDecoder,
    button: Button,
    poll_interval: f64,
    ui_refresh_interval: f64,
    last_draw: Option<f64>,
    display_errors: u64,
    polls: u64,
}

impl Device {
    pub fn new(peripherals: Peripherals, settings: &Settings) -> Self {
        let Peripherals {
            clock,
            mut pins,
            accel,
            display,
            buzzer,
        } = peripherals;

        let idle = pins.sample();
        let mut audio = AudioManager::new(buzzer);
        audio.set_volume(settings.volume);
        audio.set_muted(settings.muted);

        Self {
            clock,
            pins,
            accel,
            display,
            audio,
            filter: SignalFilter::new(),
            encoder: EncoderDecoder::new(idle.clk, idle.dt),
            button: Button::new(),
            poll_interval: settings.poll_interval,
            ui_refresh_interval: settings.ui_refresh_interval,
            last_draw: None,
            display_errors: 0,
            polls: 0,
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn filter(&self) -> &SignalFilter {
        &self.filter
    }

    pub fn encoder(&self) -> &EncoderDecoder {
        &self.encoder
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn display_errors(&self) -> u64 {
        self.display_errors
    }

    /// Establish the accelerometer rest baseline; the board must be still
    pub fn calibrate(&mut self) -> bool {
        self.filter.calibrate(self.accel.as_mut(), self.clock.as_mut())
    }

    /// Sample every input once
    pub fn poll(&mut self) -> TickInput {
        let now = self.clock.now();
        let levels = self.pins.sample();
        let encoder = self.encoder.poll(levels.clk, levels.dt, now);
        let button = self.button.update(levels.button, now);
        let accel = self.filter.poll(self.accel.as_mut());
        self.audio.update(now);
        self.polls += 1;

        TickInput {
            now,
            encoder,
            button,
            button_pressed: levels.button_pressed(),
            accel,
        }
    }

    pub fn play(&mut self, cue: SoundEffect) {
        let now = self.clock.now();
        self.audio.play(cue, now);
    }

    /// Hand a frame to the display; skipped inside the refresh interval unless forced
    pub fn present(&mut self, frame: &Frame, force: bool) {
        let now = self.clock.now();
        let due = self
            .last_draw
            .is_none_or(|last| now - last >= self.ui_refresh_interval);
        if !force && !due {
            return;
        }
        self.last_draw = Some(now);
        if let Err(e) = self.display.draw(frame) {
            self.display_errors += 1;
            log::debug!("Display draw of {} failed: {}", frame.name(), e);
        }
    }

    /// Sleep one poll interval
    pub fn idle(&mut self) {
        self.clock.sleep(self.poll_interval);
    }

    /// Play one level to its end: wait for ready, count down, run the moves
    pub fn run_level<R: Rng + ?Sized>(
        &mut self,
        level: u8,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<LevelOutcome> {
        let config = LevelConfig::for_level(level)?;
        let mut runner = LevelRunner::new(level, config, difficulty, rng);
        let mut last_phase = runner.phase();

        loop {
            let input = self.poll();
            if runner.phase() == LevelPhase::AwaitReady && input.pressed_edge() {
                self.play(SoundEffect::Confirm);
                runner.ready(input.now);
            }

            let status = runner.tick(&input);
            if let Some(cue) = runner.countdown_cue(&status) {
                self.play(cue);
            }

            let changed =
                std::mem::discriminant(&runner.phase()) != std::mem::discriminant(&last_phase);
            last_phase = runner.phase();
            self.present(&level_frame(&runner, 0, input.now), changed);

            if let Some(outcome) = runner.outcome() {
                self.play(if outcome.passed {
                    SoundEffect::LevelClear
                } else {
                    SoundEffect::Fail
                });
                return Some(outcome);
            }
            self.idle();
        }
    }

    /// Drive the session state machine until `keep_running` says stop
    pub fn run<F>(&mut self, machine: &mut GameMachine, mut keep_running: F)
    where
        F: FnMut(&GameMachine) -> bool,
    {
        log::info!("Control loop started at {:.3}s", self.clock.now());
        while keep_running(machine) {
            let input = self.poll();
            let out = machine.step(&input);
            for cue in out.cues {
                self.audio.play(cue, input.now);
            }
            self.present(&out.frame, out.phase_changed);
            self.idle();
        }
        self.audio.silence();
        log::info!(
            "Control loop stopped after {} polls ({} sensor reads dropped, {} encoder bounces)",
            self.polls,
            self.filter.dropped_reads(),
            self.encoder.bounced_edges()
        );
    }
}
