//! Seams to the windowing layer.
//!
//! The runtime never talks to a window system directly. A frontend supplies
//! input events and displays frames; it holds no simulation logic.

use sim_core::LED_COUNT;

use crate::error::PresentError;
use crate::exchange::{FrameStatus, FrameView};
use crate::session::Control;

/// A user input, already mapped to a board control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Press(Control),
    Release(Control),
    /// Window closed or quit key pressed.
    Quit,
}

/// Polled, non-blocking source of input events.
pub trait EventSource {
    /// Append every event that arrived since the last poll.
    fn poll_events(&mut self, out: &mut Vec<InputEvent>);
}

/// Displays frames and indicator lamps.
pub trait PresentationSink {
    /// Show `frame` with the lamps in `indicators` (`true` = lit).
    ///
    /// `status` says whether this is a new frame or a repeat of the last.
    fn present(
        &mut self,
        frame: FrameView<'_>,
        status: FrameStatus,
        indicators: &[bool; LED_COUNT],
    ) -> Result<(), PresentError>;
}
