//! Buzzer sound cues
//!
//! Each cue is a short sequence of square-wave tones. Playback is non-blocking:
//! `play` queues the tones and `update`, called from the control loop, switches
//! the buzzer as each tone's time runs out.

use std::collections::VecDeque;

use crate::platform::Buzzer;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Button confirm
    Confirm,
    /// Menu cursor moved
    MenuTick,
    /// Name letter changed
    NameTick,
    /// Splash screen explosion
    Explosion,
    /// Splash screen title
    Title,
    /// Countdown digit
    Countdown,
    /// Countdown GO
    Go,
    /// Level cleared
    LevelClear,
    /// Level failed
    Fail,
    /// All levels cleared
    Win,
    /// New high score
    HighScore,
}

/// One tone; a frequency of 0 is a rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq_hz: u32,
    /// Seconds
    pub duration: f64,
}

const fn tone(freq_hz: u32, duration: f64) -> Tone {
    Tone { freq_hz, duration }
}

const fn rest(duration: f64) -> Tone {
    Tone {
        freq_hz: 0,
        duration,
    }
}

const CONFIRM: &[Tone] = &[tone(1500, 0.1)];
const MENU_TICK: &[Tone] = &[tone(800, 0.02)];
const NAME_TICK: &[Tone] = &[tone(600, 0.02)];
const EXPLOSION: &[Tone] = &[tone(200, 0.1)];
const TITLE: &[Tone] = &[
    tone(800, 0.1),
    rest(0.25),
    tone(1200, 0.1),
    rest(0.2),
    tone(1500, 0.1),
];
const COUNTDOWN: &[Tone] = &[tone(1000, 0.1)];
const GO: &[Tone] = &[tone(2000, 0.5)];
const LEVEL_CLEAR: &[Tone] = &[tone(1000, 0.1), tone(1500, 0.1), tone(2000, 0.15)];
// Descending flashes, then a final low tone
const FAIL: &[Tone] = &[
    tone(600, 0.08),
    rest(0.05),
    tone(500, 0.08),
    rest(0.05),
    tone(400, 0.08),
    tone(300, 0.2),
];
const WIN: &[Tone] = &[tone(1000, 0.2), tone(2000, 0.4)];
const HIGH_SCORE: &[Tone] = &[
    tone(1000, 0.1),
    rest(0.2),
    tone(1000, 0.1),
    rest(0.2),
    tone(1000, 0.1),
];

impl SoundEffect {
    pub fn tones(&self) -> &'static [Tone] {
        match self {
            SoundEffect::Confirm => CONFIRM,
            SoundEffect::MenuTick => MENU_TICK,
            SoundEffect::NameTick => NAME_TICK,
            SoundEffect::Explosion => EXPLOSION,
            SoundEffect::Title => TITLE,
            SoundEffect::Countdown => COUNTDOWN,
            SoundEffect::Go => GO,
            SoundEffect::LevelClear => LEVEL_CLEAR,
            SoundEffect::Fail => FAIL,
            SoundEffect::Win => WIN,
            SoundEffect::HighScore => HIGH_SCORE,
        }
    }

    /// Total playback time (seconds)
    pub fn duration(&self) -> f64 {
        self.tones().iter().map(|t| t.duration).sum()
    }
}

/// Audio manager for the game
pub struct AudioManager {
    buzzer: Option<Box<dyn Buzzer>>,
    volume: f32,
    muted: bool,
    queue: VecDeque<Tone>,
    /// End time of the tone currently sounding
    current_until: Option<f64>,
}

impl AudioManager {
    pub fn new(buzzer: Option<Box<dyn Buzzer>>) -> Self {
        Self {
            buzzer,
            volume: 1.0,
            muted: false,
            queue: VecDeque::new(),
            current_until: None,
        }
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, vol: f32) {
        self.volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.silence();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current_until.is_some() || !self.queue.is_empty()
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Queue a sound effect behind anything already playing
    pub fn play(&mut self, effect: SoundEffect, now: f64) {
        if self.buzzer.is_none() || self.effective_volume() <= 0.0 {
            return;
        }
        self.queue.extend(effect.tones().iter().copied());
        self.update(now);
    }

    /// Advance playback; call once per poll
    pub fn update(&mut self, now: f64) {
        if let Some(until) = self.current_until {
            if now < until {
                return;
            }
            // Next tone starts where the previous one ended, keeping sequences in rhythm
            let mut start = until;
            self.current_until = None;
            while let Some(next) = self.queue.front().copied() {
                if start + next.duration > now {
                    break;
                }
                start += next.duration;
                self.queue.pop_front();
            }
            self.advance(start, now);
        } else {
            self.advance(now, now);
        }
    }

    fn advance(&mut self, start: f64, now: f64) {
        let Some(next) = self.queue.pop_front() else {
            self.buzzer_stop();
            return;
        };
        self.current_until = Some(start + next.duration);
        if next.freq_hz == 0 {
            self.buzzer_stop();
        } else {
            let duty = 0.5 * self.effective_volume();
            if let Some(buzzer) = self.buzzer.as_mut() {
                if let Err(e) = buzzer.start(next.freq_hz, duty) {
                    log::debug!("Buzzer start failed at {:.3}s: {}", now, e);
                }
            }
        }
    }

    /// Stop the buzzer and drop queued tones
    pub fn silence(&mut self) {
        self.queue.clear();
        self.current_until = None;
        self.buzzer_stop();
    }

    fn buzzer_stop(&mut self) {
        if let Some(buzzer) = self.buzzer.as_mut() {
            if let Err(e) = buzzer.stop() {
                log::debug!("Buzzer stop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HalError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Start(u32, f32),
        Stop,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Call>>>);

    impl Buzzer for Recorder {
        fn start(&mut self, freq_hz: u32, duty: f32) -> Result<(), HalError> {
            self.0.borrow_mut().push(Call::Start(freq_hz, duty));
            Ok(())
        }

        fn stop(&mut self) -> Result<(), HalError> {
            self.0.borrow_mut().push(Call::Stop);
            Ok(())
        }
    }

    fn starts(calls: &[Call]) -> Vec<u32> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::Start(f, _) => Some(*f),
                Call::Stop => None,
            })
            .collect()
    }

    #[test]
    fn test_every_cue_has_a_sounding_tone() {
        let all = [
            SoundEffect::Confirm,
            SoundEffect::MenuTick,
            SoundEffect::NameTick,
            SoundEffect::Explosion,
            SoundEffect::Title,
            SoundEffect::Countdown,
            SoundEffect::Go,
            SoundEffect::LevelClear,
            SoundEffect::Fail,
            SoundEffect::Win,
            SoundEffect::HighScore,
        ];
        for effect in all {
            let sounding = effect.tones().iter().any(|t| t.freq_hz > 0);
            assert!(sounding, "{:?} is silent", effect);
        }
        let tones = SoundEffect::LevelClear.tones();
        let clear: Vec<u32> = tones.iter().map(|t| t.freq_hz).collect();
        assert_eq!(clear, vec![1000, 1500, 2000]);
        assert!((SoundEffect::Title.duration() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_sequence_plays_in_order_without_blocking() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::new(Some(Box::new(recorder.clone())));

        audio.play(SoundEffect::LevelClear, 0.0);
        assert_eq!(starts(&recorder.0.borrow()), vec![1000]);

        let mut t = 0.0;
        while audio.is_playing() {
            t += 0.01;
            audio.update(t);
        }
        assert_eq!(starts(&recorder.0.borrow()), vec![1000, 1500, 2000]);
        assert_eq!(recorder.0.borrow().last(), Some(&Call::Stop));
        assert!(t >= SoundEffect::LevelClear.duration() - 1e-9);
    }

    #[test]
    fn test_rests_stop_the_buzzer() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::new(Some(Box::new(recorder.clone())));
        audio.play(SoundEffect::HighScore, 0.0);
        audio.update(0.15);
        assert_eq!(recorder.0.borrow().last(), Some(&Call::Stop));
        assert!(audio.is_playing());
    }

    #[test]
    fn test_volume_scales_duty_and_mute_skips() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::new(Some(Box::new(recorder.clone())));
        audio.set_volume(0.5);
        audio.play(SoundEffect::Confirm, 0.0);
        assert_eq!(recorder.0.borrow()[0], Call::Start(1500, 0.25));

        audio.set_muted(true);
        recorder.0.borrow_mut().clear();
        audio.play(SoundEffect::Go, 1.0);
        assert!(starts(&recorder.0.borrow()).is_empty());
        assert!(!audio.is_playing());
    }

    #[test]
    fn test_absent_buzzer_is_noop() {
        let mut audio = AudioManager::new(None);
        audio.play(SoundEffect::Win, 0.0);
        audio.update(1.0);
        assert!(!audio.is_playing());
    }
}
