//! Platform abstraction layer
//!
//! Contracts for the hardware collaborators the engine talks to:
//! - Time/ticks (`Clock`)
//! - Input pins (encoder CLK/DT and the push button)
//! - Accelerometer
//! - Display and buzzer outputs
//!
//! Optional peripherals are probed once at startup and replaced with no-op
//! stand-ins when absent.

pub mod clock;
pub mod host;

use glam::Vec3;

use crate::error::HalError;
use crate::ui::Frame;

pub use clock::{Clock, MonotonicClock, SimClock};

/// One raw accelerometer reading (m/s²)
pub type RawSample = Vec3;

/// Electrical levels of the input pins sampled in one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLevels {
    pub clk: bool,
    pub dt: bool,
    /// Button line level (pulled up, low while pressed)
    pub button: bool,
}

impl PinLevels {
    /// All lines pulled high: encoder at rest, button released
    pub const IDLE: Self = Self {
        clk: true,
        dt: true,
        button: true,
    };

    /// Active-low button convention
    pub fn button_pressed(&self) -> bool {
        !self.button
    }
}

impl Default for PinLevels {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Synchronous 3-axis accelerometer read
pub trait Accelerometer {
    fn read(&mut self) -> Result<RawSample, HalError>;
}

/// Encoder and button GPIO
pub trait InputPins {
    fn sample(&mut self) -> PinLevels;
}

/// Display collaborator; receives semantic frames only
pub trait Display {
    fn draw(&mut self, frame: &Frame) -> Result<(), HalError>;
}

/// PWM buzzer
pub trait Buzzer {
    /// Start a tone; `duty` is the PWM duty cycle in 0.0 - 1.0
    fn start(&mut self, freq_hz: u32, duty: f32) -> Result<(), HalError>;
    fn stop(&mut self) -> Result<(), HalError>;
}

/// Stand-in for a missing accelerometer
#[derive(Debug, Default)]
pub struct NoAccelerometer;

impl Accelerometer for NoAccelerometer {
    fn read(&mut self) -> Result<RawSample, HalError> {
        Err(HalError::Absent("accelerometer"))
    }
}

/// Display that discards every frame
#[derive(Debug, Default)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn draw(&mut self, _frame: &Frame) -> Result<(), HalError> {
        Ok(())
    }
}

/// Everything the control loop needs from the board
pub struct Peripherals {
    pub clock: Box<dyn Clock>,
    pub pins: Box<dyn InputPins>,
    pub accel: Box<dyn Accelerometer>,
    pub display: Box<dyn Display>,
    pub buzzer: Option<Box<dyn Buzzer>>,
}

impl Peripherals {
    /// Assemble the board from probed devices, downgrading missing optional ones
    pub fn new(
        clock: Box<dyn Clock>,
        pins: Box<dyn InputPins>,
        accel: Option<Box<dyn Accelerometer>>,
        display: Option<Box<dyn Display>>,
        buzzer: Option<Box<dyn Buzzer>>,
    ) -> Self {
        let accel = accel.unwrap_or_else(|| {
            log::warn!("Accelerometer not detected - shake moves cannot complete");
            Box::new(NoAccelerometer)
        });
        let display = display.unwrap_or_else(|| {
            log::warn!("Display not detected - frames dropped");
            Box::new(NullDisplay)
        });
        if buzzer.is_none() {
            log::warn!("Buzzer not detected - sound disabled");
        }
        Self {
            clock,
            pins,
            accel,
            display,
            buzzer,
        }
    }
}
