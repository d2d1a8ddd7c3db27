//! Headless frontend: scripted input, optional screenshot, fixed frame count.

use std::path::PathBuf;

use board_runtime::capture::save_screenshot;
use board_runtime::input::InputQueue;
use board_runtime::{
    Control, EventSource, FrameStatus, FrameView, InputEvent, PresentError, PresentationSink,
};
use log::{info, warn};
use sim_core::LED_COUNT;

/// Runs for a number of fresh frames, replaying `--press` events by frame
/// number.
pub struct HeadlessFrontend {
    frames: u64,
    fresh: u64,
    queue: InputQueue,
    screenshot: Option<PathBuf>,
    indicators: [bool; LED_COUNT],
}

impl HeadlessFrontend {
    #[must_use]
    pub fn new(frames: u64, screenshot: Option<PathBuf>) -> Self {
        Self {
            frames: frames.max(1),
            fresh: 0,
            queue: InputQueue::new(),
            screenshot,
            indicators: [false; LED_COUNT],
        }
    }

    /// Press `control` once `at_frame` fresh frames are out, holding it for
    /// `hold_frames`.
    pub fn press(&mut self, control: Control, at_frame: u64, hold_frames: u64) {
        self.queue
            .enqueue_press(control, at_frame.max(1), hold_frames);
    }

    /// Scripted events not yet fired.
    #[must_use]
    pub fn pending_inputs(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn fresh_frames(&self) -> u64 {
        self.fresh
    }

    /// Indicator state at the last presented frame.
    #[must_use]
    pub fn indicators(&self) -> [bool; LED_COUNT] {
        self.indicators
    }
}

impl EventSource for HeadlessFrontend {
    fn poll_events(&mut self, out: &mut Vec<InputEvent>) {
        // Presses before the first frame would be lost to the power-on reset.
        if self.fresh > 0 {
            self.queue.process(self.fresh, |e| out.push(e));
        }
        if self.fresh >= self.frames {
            if !self.queue.is_empty() {
                warn!(
                    "{} scripted inputs past frame {} never fired",
                    self.queue.len(),
                    self.frames
                );
            }
            out.push(InputEvent::Quit);
        }
    }
}

impl PresentationSink for HeadlessFrontend {
    fn present(
        &mut self,
        frame: FrameView<'_>,
        status: FrameStatus,
        indicators: &[bool; LED_COUNT],
    ) -> Result<(), PresentError> {
        self.indicators = *indicators;
        if status != FrameStatus::Fresh {
            return Ok(());
        }
        self.fresh += 1;
        if self.fresh == self.frames
            && let Some(path) = &self.screenshot
        {
            save_screenshot(&frame, path)
                .map_err(|e| PresentError::new(format!("screenshot {}: {e}", path.display())))?;
            info!("Screenshot saved to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_runtime::FrameExchange;

    #[test]
    fn quits_after_frame_count() {
        let exchange = FrameExchange::new(2, 2);
        let mut frontend = HeadlessFrontend::new(2, None);
        let mut events = Vec::new();

        for _ in 0..2 {
            frontend.poll_events(&mut events);
            assert!(events.is_empty());
            exchange.publish_frame();
            let (view, status) = exchange.acquire();
            frontend
                .present(view, status, &[false; LED_COUNT])
                .expect("present");
        }
        frontend.poll_events(&mut events);
        assert_eq!(events, vec![InputEvent::Quit]);
    }

    #[test]
    fn repeats_do_not_count() {
        let exchange = FrameExchange::new(2, 2);
        let mut frontend = HeadlessFrontend::new(5, None);
        let (view, status) = exchange.acquire();
        assert_eq!(status, FrameStatus::Repeat);
        frontend
            .present(view, status, &[true; LED_COUNT])
            .expect("present");
        assert_eq!(frontend.fresh_frames(), 0);
        assert_eq!(frontend.indicators(), [true; LED_COUNT]);
    }

    #[test]
    fn scripted_press_fires_after_first_frame() {
        let exchange = FrameExchange::new(2, 2);
        let mut frontend = HeadlessFrontend::new(10, None);
        frontend.press(Control::Button(2), 0, 2);

        let mut events = Vec::new();
        frontend.poll_events(&mut events);
        assert!(events.is_empty());

        exchange.publish_frame();
        let (view, status) = exchange.acquire();
        frontend
            .present(view, status, &[false; LED_COUNT])
            .expect("present");
        frontend.poll_events(&mut events);
        assert_eq!(events, vec![InputEvent::Press(Control::Button(2))]);
        assert_eq!(frontend.pending_inputs(), 1);
    }

    #[test]
    fn inputs_beyond_last_frame_stay_queued() {
        let exchange = FrameExchange::new(2, 2);
        let mut frontend = HeadlessFrontend::new(1, None);
        frontend.press(Control::Reset, 5, 1);

        exchange.publish_frame();
        let (view, status) = exchange.acquire();
        frontend
            .present(view, status, &[false; LED_COUNT])
            .expect("present");
        let mut events = Vec::new();
        frontend.poll_events(&mut events);
        assert_eq!(events, vec![InputEvent::Quit]);
        assert_eq!(frontend.pending_inputs(), 2);
    }

    #[test]
    fn screenshot_written_on_last_frame() {
        let path = std::env::temp_dir().join(format!("board-sim-shot-{}.png", std::process::id()));
        let exchange = FrameExchange::new(4, 3);
        exchange.write_pixel(1, 1, [1.0, 0.0, 0.0]);
        exchange.publish_frame();

        let mut frontend = HeadlessFrontend::new(1, Some(path.clone()));
        let (view, status) = exchange.acquire();
        frontend
            .present(view, status, &[false; LED_COUNT])
            .expect("present");
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
