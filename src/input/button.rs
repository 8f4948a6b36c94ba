//! Debounced push button (encoder switch)
//!
//! The line is pulled up, so electrically low means pressed. Menus act on the
//! debounced press edge; gameplay reads the raw level for the current tick.

use crate::consts::BUTTON_DEBOUNCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

#[derive(Debug, Clone)]
pub struct Button {
    last_raw: bool,
    last_change: f64,
    stable_pressed: bool,
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

impl Button {
    /// Idle: pull-up high, released
    pub fn new() -> Self {
        Self {
            last_raw: false,
            last_change: 0.0,
            stable_pressed: false,
        }
    }

    /// Debounced state
    pub fn is_pressed(&self) -> bool {
        self.stable_pressed
    }

    /// Feed the line level sampled at `now`; returns an edge once the level is stable
    pub fn update(&mut self, level: bool, now: f64) -> Option<ButtonEvent> {
        let pressed = !level;
        if pressed != self.last_raw {
            self.last_raw = pressed;
            self.last_change = now;
        }

        if now - self.last_change < BUTTON_DEBOUNCE || pressed == self.stable_pressed {
            return None;
        }

        self.stable_pressed = pressed;
        Some(if pressed {
            ButtonEvent::Pressed
        } else {
            ButtonEvent::Released
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: bool = false;
    const HIGH: bool = true;

    #[test]
    fn test_press_reported_after_stable_low() {
        let mut button = Button::new();
        assert_eq!(button.update(LOW, 0.0), None);
        assert_eq!(button.update(LOW, 0.01), None);
        assert_eq!(button.update(LOW, 0.03), Some(ButtonEvent::Pressed));
        assert!(button.is_pressed());
        assert_eq!(button.update(LOW, 0.05), None);
    }

    #[test]
    fn test_bounce_restarts_debounce() {
        let mut button = Button::new();
        button.update(LOW, 0.0);
        button.update(HIGH, 0.015);
        button.update(LOW, 0.018);
        assert_eq!(button.update(LOW, 0.03), None);
        assert_eq!(button.update(LOW, 0.04), Some(ButtonEvent::Pressed));
    }

    #[test]
    fn test_release_edge() {
        let mut button = Button::new();
        button.update(LOW, 0.0);
        button.update(LOW, 0.05);
        assert!(button.is_pressed());
        button.update(HIGH, 0.1);
        assert_eq!(button.update(HIGH, 0.13), Some(ButtonEvent::Released));
        assert!(!button.is_pressed());
    }

    #[test]
    fn test_idle_line_never_presses() {
        let mut button = Button::new();
        for i in 0..100 {
            assert_eq!(button.update(HIGH, i as f64 * 0.01), None);
        }
    }
}
