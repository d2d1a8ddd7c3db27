//! The stepped-model contract and its pin bundles.

use crate::{ModelError, Observable, Value};

/// Push buttons on the board (`B2`..`B5`).
pub const BUTTON_COUNT: usize = 4;

/// Indicator LEDs on the board (`led1`..`led5`).
pub const LED_COUNT: usize = 5;

const BUTTON_NAMES: [&str; BUTTON_COUNT] = ["B2", "B3", "B4", "B5"];
const LED_NAMES: [&str; LED_COUNT] = ["led1", "led2", "led3", "led4", "led5"];

/// Input pin levels, exactly as the model sees them.
///
/// The board's reset line and buttons are active-low: `true` is the idle
/// (released) level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardInputs {
    pub clk: bool,
    pub reset: bool,
    pub buttons: [bool; BUTTON_COUNT],
}

impl BoardInputs {
    /// Clock low, reset released, every button released.
    pub const IDLE: Self = Self {
        clk: false,
        reset: true,
        buttons: [true; BUTTON_COUNT],
    };

    /// Look up an input pin by its port name.
    #[must_use]
    pub fn query(&self, path: &str) -> Option<Value> {
        match path {
            "clk" => Some(self.clk.into()),
            "reset" => Some(self.reset.into()),
            _ => BUTTON_NAMES
                .iter()
                .position(|name| *name == path)
                .map(|i| self.buttons[i].into()),
        }
    }
}

impl Default for BoardInputs {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Output pin levels after the most recent evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardOutputs {
    pub h_sync: bool,
    pub v_sync: bool,
    /// RGB565 colour bus.
    pub rgb: u16,
    /// LED drive levels. The board's LEDs are lit when driven low.
    pub leds: [bool; LED_COUNT],
}

impl BoardOutputs {
    /// Look up an output pin by its port name.
    #[must_use]
    pub fn query(&self, path: &str) -> Option<Value> {
        match path {
            "h_sync" => Some(self.h_sync.into()),
            "v_sync" => Some(self.v_sync.into()),
            "rgb" => Some(self.rgb.into()),
            _ => LED_NAMES
                .iter()
                .position(|name| *name == path)
                .map(|i| self.leds[i].into()),
        }
    }
}

/// Pin names understood by [`BoardInputs::query`] and [`BoardOutputs::query`].
pub const PIN_PATHS: &[&str] = &[
    "clk", "reset", "B2", "B3", "B4", "B5", "h_sync", "v_sync", "rgb", "led1", "led2", "led3",
    "led4", "led5",
];

/// A cycle-stepped hardware model.
///
/// The caller drives the clock by writing `inputs_mut().clk` and calling
/// [`evaluate`](Self::evaluate) once per level change. The model is treated
/// as a black box: only its pins are visible.
pub trait SteppedModel: Observable {
    /// Input pins, written by the caller before each evaluation.
    fn inputs_mut(&mut self) -> &mut BoardInputs;

    /// Output pins as of the last evaluation.
    fn outputs(&self) -> BoardOutputs;

    /// Propagate the current inputs through the model.
    fn evaluate(&mut self) -> Result<(), ModelError>;

    /// Run end-of-simulation hooks. Called once, after the last evaluation.
    fn finalize(&mut self) {}

    /// Whether the model has asked for the simulation to end.
    fn finished(&self) -> bool {
        false
    }
}
