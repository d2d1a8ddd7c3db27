//! State shared between the simulation and render threads.
//!
//! Everything here is lock-free. Input and indicator lines are independent
//! relaxed scalars: a reader may see a change one step late, never a torn
//! value. Quit, restart and shutdown use read-modify-write operations so
//! each request is observed exactly once.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use sim_core::{BUTTON_COUNT, LED_COUNT};

use crate::exchange::FrameExchange;
use crate::timing::VgaTiming;

/// Number of input lines: the reset line plus the buttons.
pub const INPUT_LINES: usize = 1 + BUTTON_COUNT;

/// A physical control on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// The reset push button.
    Reset,
    /// Push button `B2 + n`.
    Button(u8),
}

impl Control {
    /// Index into the input line array, or `None` for an unknown button.
    #[must_use]
    pub fn line(self) -> Option<usize> {
        match self {
            Control::Reset => Some(0),
            Control::Button(n) if usize::from(n) < BUTTON_COUNT => Some(1 + usize::from(n)),
            Control::Button(_) => None,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Reset => write!(f, "reset"),
            Control::Button(n) => write!(f, "B{}", u32::from(*n) + 2),
        }
    }
}

impl std::str::FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reset" | "rst" => Ok(Control::Reset),
            "b2" => Ok(Control::Button(0)),
            "b3" => Ok(Control::Button(1)),
            "b4" => Ok(Control::Button(2)),
            "b5" => Ok(Control::Button(3)),
            other => Err(format!("unknown control: {other}")),
        }
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Phase::Idle,
            1 => Phase::Running,
            2 => Phase::Stopping,
            _ => Phase::Stopped,
        }
    }
}

/// Shared state for one simulation session.
pub struct Session {
    /// Logical pressed state per input line.
    inputs: [AtomicBool; INPUT_LINES],
    /// Logical lit state per indicator.
    indicators: [AtomicBool; LED_COUNT],
    quit: AtomicBool,
    restart: AtomicBool,
    shutdown_started: AtomicBool,
    phase: AtomicU8,
    frames: FrameExchange,
}

impl Session {
    #[must_use]
    pub fn new(timing: &VgaTiming) -> Self {
        Self {
            inputs: Default::default(),
            indicators: Default::default(),
            quit: AtomicBool::new(false),
            restart: AtomicBool::new(false),
            shutdown_started: AtomicBool::new(false),
            phase: AtomicU8::new(Phase::Idle as u8),
            frames: FrameExchange::new(timing.visible_width, timing.visible_height),
        }
    }

    #[must_use]
    pub fn frames(&self) -> &FrameExchange {
        &self.frames
    }

    // ===== Inputs =====

    /// Record a press or release. Pressing reset also requests a restart.
    pub fn set_control(&self, control: Control, pressed: bool) {
        let Some(line) = control.line() else {
            return;
        };
        self.inputs[line].store(pressed, Ordering::Relaxed);
        if control == Control::Reset && pressed {
            self.request_restart();
        }
    }

    #[must_use]
    pub fn is_pressed(&self, control: Control) -> bool {
        control
            .line()
            .is_some_and(|line| self.inputs[line].load(Ordering::Relaxed))
    }

    /// Snapshot of every input line (reset first, then buttons).
    #[must_use]
    pub fn inputs(&self) -> [bool; INPUT_LINES] {
        std::array::from_fn(|i| self.inputs[i].load(Ordering::Relaxed))
    }

    pub fn release_all(&self) {
        for line in &self.inputs {
            line.store(false, Ordering::Relaxed);
        }
    }

    // ===== Indicators =====

    pub fn set_indicator(&self, index: usize, lit: bool) {
        if let Some(slot) = self.indicators.get(index) {
            slot.store(lit, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn indicators(&self) -> [bool; LED_COUNT] {
        std::array::from_fn(|i| self.indicators[i].load(Ordering::Relaxed))
    }

    pub fn clear_indicators(&self) {
        for slot in &self.indicators {
            slot.store(false, Ordering::Relaxed);
        }
    }

    // ===== Flags =====

    /// Ask both loops to stop. Returns `true` for the first request.
    pub fn request_quit(&self) -> bool {
        let first = !self.quit.swap(true, Ordering::AcqRel);
        if first {
            let _ = self.phase.compare_exchange(
                Phase::Running as u8,
                Phase::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        first
    }

    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    pub fn request_restart(&self) {
        self.restart.store(true, Ordering::Release);
    }

    /// Consume a pending restart request.
    pub fn take_restart(&self) -> bool {
        self.restart.swap(false, Ordering::AcqRel)
    }

    /// Claim the right to run shutdown. Only the first caller gets `true`.
    pub fn begin_shutdown(&self) -> bool {
        !self.shutdown_started.swap(true, Ordering::AcqRel)
    }

    // ===== Phase =====

    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&VgaTiming::VGA_640X480_60)
    }

    #[test]
    fn reset_press_requests_restart_once() {
        let s = session();
        s.set_control(Control::Reset, true);
        assert!(s.is_pressed(Control::Reset));
        assert!(s.take_restart());
        assert!(!s.take_restart());
        s.set_control(Control::Reset, false);
        assert!(!s.take_restart());
    }

    #[test]
    fn buttons_map_to_lines() {
        let s = session();
        s.set_control(Control::Button(2), true);
        assert_eq!(s.inputs(), [false, false, false, true, false]);
        s.set_control(Control::Button(9), true);
        assert_eq!(s.inputs(), [false, false, false, true, false]);
        s.release_all();
        assert_eq!(s.inputs(), [false; INPUT_LINES]);
    }

    #[test]
    fn first_quit_moves_running_to_stopping() {
        let s = session();
        s.set_phase(Phase::Running);
        assert!(s.request_quit());
        assert!(!s.request_quit());
        assert!(s.quit_requested());
        assert_eq!(s.phase(), Phase::Stopping);
    }

    #[test]
    fn shutdown_claim_is_exclusive() {
        let s = session();
        assert!(s.begin_shutdown());
        assert!(!s.begin_shutdown());
    }

    #[test]
    fn control_names_round_trip() {
        for name in ["reset", "B2", "B3", "B4", "B5"] {
            let control: Control = name.parse().expect("known control");
            assert_eq!(control.to_string(), name);
        }
        assert!("B6".parse::<Control>().is_err());
    }

    #[test]
    fn indicators_out_of_range_ignored() {
        let s = session();
        s.set_indicator(1, true);
        s.set_indicator(LED_COUNT, true);
        assert_eq!(s.indicators(), [false, true, false, false, false]);
        s.clear_indicators();
        assert_eq!(s.indicators(), [false; LED_COUNT]);
    }
}
