//! Scripted input for unattended runs.
//!
//! Presses and releases are keyed by presented-frame number and replayed in
//! order.

use std::collections::VecDeque;

use crate::presentation::InputEvent;
use crate::session::Control;

/// A control change scheduled for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedInput {
    /// Frame number at which this event fires.
    pub frame: u64,
    pub control: Control,
    /// True = press, false = release.
    pub pressed: bool,
}

impl TimedInput {
    #[must_use]
    pub fn event(&self) -> InputEvent {
        if self.pressed {
            InputEvent::Press(self.control)
        } else {
            InputEvent::Release(self.control)
        }
    }
}

/// Timed input queue, ordered by frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<TimedInput>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert after every event scheduled for the same or an earlier frame.
    pub fn push(&mut self, input: TimedInput) {
        let pos = self
            .events
            .iter()
            .position(|e| e.frame > input.frame)
            .unwrap_or(self.events.len());
        self.events.insert(pos, input);
    }

    /// Press `control` at `at_frame` and release it `hold_frames` later.
    pub fn enqueue_press(&mut self, control: Control, at_frame: u64, hold_frames: u64) {
        self.push(TimedInput {
            frame: at_frame,
            control,
            pressed: true,
        });
        self.push(TimedInput {
            frame: at_frame + hold_frames.max(1),
            control,
            pressed: false,
        });
    }

    /// Emit every event due at or before `frame`.
    pub fn process<F: FnMut(InputEvent)>(&mut self, frame: u64, mut emit: F) {
        while let Some(input) = self.events.front().copied() {
            if input.frame > frame {
                break;
            }
            self.events.pop_front();
            emit(input.event());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Parse a `--press` argument: `<control>@<frame>` or
/// `<control>@<frame>+<hold>`.
pub fn parse_press(arg: &str) -> Result<(Control, u64, u64), String> {
    let (control, timing) = arg
        .split_once('@')
        .ok_or_else(|| format!("expected <control>@<frame>[+hold], got {arg:?}"))?;
    let control: Control = control.parse()?;
    let (frame, hold) = match timing.split_once('+') {
        Some((frame, hold)) => (frame, hold),
        None => (timing, "1"),
    };
    let frame = frame
        .parse()
        .map_err(|_| format!("invalid frame number: {frame:?}"))?;
    let hold = hold
        .parse()
        .map_err(|_| format!("invalid hold length: {hold:?}"))?;
    Ok((control, frame, hold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_in_frame_order() {
        let mut q = InputQueue::new();
        q.enqueue_press(Control::Button(0), 10, 5);
        q.enqueue_press(Control::Reset, 3, 1);
        assert_eq!(q.len(), 4);

        let mut fired = Vec::new();
        q.process(3, |e| fired.push(e));
        assert_eq!(fired, vec![InputEvent::Press(Control::Reset)]);

        fired.clear();
        q.process(12, |e| fired.push(e));
        assert_eq!(
            fired,
            vec![
                InputEvent::Release(Control::Reset),
                InputEvent::Press(Control::Button(0)),
            ]
        );

        fired.clear();
        q.process(15, |e| fired.push(e));
        assert_eq!(fired, vec![InputEvent::Release(Control::Button(0))]);
        assert!(q.is_empty());
    }

    #[test]
    fn zero_hold_still_releases_later() {
        let mut q = InputQueue::new();
        q.enqueue_press(Control::Button(3), 0, 0);
        let mut fired = Vec::new();
        q.process(0, |e| fired.push(e));
        assert_eq!(fired, vec![InputEvent::Press(Control::Button(3))]);
    }

    #[test]
    fn press_spec_parses() {
        assert_eq!(parse_press("B3@20"), Ok((Control::Button(1), 20, 1)));
        assert_eq!(parse_press("reset@5+30"), Ok((Control::Reset, 5, 30)));
        assert!(parse_press("B3").is_err());
        assert!(parse_press("B9@1").is_err());
        assert!(parse_press("B2@x").is_err());
    }
}
