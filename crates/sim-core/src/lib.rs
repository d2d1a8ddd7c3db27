//! Core traits and types for real-time stepped hardware models.
//!
//! A model is advanced one clock half-period at a time by driving its clock
//! pin and calling [`SteppedModel::evaluate`]. Everything above this crate
//! counts time in those half-periods.

mod clock;
mod error;
mod model;
mod observable;
mod ticks;

pub use clock::TickRate;
pub use error::ModelError;
pub use model::{BUTTON_COUNT, BoardInputs, BoardOutputs, LED_COUNT, PIN_PATHS, SteppedModel};
pub use observable::{Observable, Value};
pub use ticks::Ticks;
