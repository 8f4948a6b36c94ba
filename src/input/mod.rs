//! Input sensing
//!
//! Leaf components polled every tick by the control loop. None of them
//! touch hardware directly: callers pass in pin levels, samples and time.

pub mod button;
pub mod encoder;
pub mod filter;
pub mod gesture;

pub use button::{Button, ButtonEvent};
pub use encoder::{Direction, EncoderDecoder, EncoderRawState, MenuNav, as_menu_navigation};
pub use filter::{FilteredSample, SignalFilter};
pub use gesture::{GestureDetector, GestureReading, GestureState, TriggerKind};
