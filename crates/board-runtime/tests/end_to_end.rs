//! Full-frame decode through the driver, without threads.

mod common;

use std::sync::Arc;

use board_runtime::{
    FrameStatus, RuntimeConfig, Session, SimulationDriver, VgaTiming, VirtualClock,
};
use common::{PatternModel, TINY};

fn driver_for(timing: VgaTiming, colour: u16) -> SimulationDriver<PatternModel, VirtualClock> {
    let mut config = RuntimeConfig::headless();
    config.driver.timing = timing;
    let session = Arc::new(Session::new(&timing));
    SimulationDriver::new(
        PatternModel::new(timing, colour),
        VirtualClock::new(),
        session,
        &config,
    )
}

/// Step until the decoder has seen `frames` frame boundaries, counting
/// false-to-true transitions of the pending flag along the way.
fn run_until_frames(
    driver: &mut SimulationDriver<PatternModel, VirtualClock>,
    frames: u64,
    limit: u64,
) -> u32 {
    let mut transitions = 0;
    let mut was_pending = driver.session().frames().is_pending();
    for _ in 0..limit {
        driver.run_once().expect("step");
        let pending = driver.session().frames().is_pending();
        if pending && !was_pending {
            transitions += 1;
        }
        was_pending = pending;
        if driver.decoder().frames() >= frames {
            return transitions;
        }
    }
    panic!("decoder did not reach {frames} frames in {limit} periods");
}

#[test]
fn vga_frame_of_white_fills_visible_area() {
    let timing = VgaTiming::VGA_640X480_60;
    let mut driver = driver_for(timing, 0xFFFF);
    driver.reset().expect("reset");

    // The first sample already carries both sync edges.
    assert_eq!(run_until_frames(&mut driver, 1, 4), 1);
    let (_, status) = driver.session().frames().acquire();
    assert_eq!(status, FrameStatus::Fresh);

    // One whole frame: 800 x 525 pixel clocks at two periods each.
    let limit = timing.total_pixels() * 2 + 4;
    assert_eq!(run_until_frames(&mut driver, 2, limit), 1);
    assert_eq!(driver.decoder().position(), (0, 0));

    let frames = driver.session().frames();
    let (view, status) = frames.acquire();
    assert_eq!(status, FrameStatus::Fresh);
    assert!(!frames.is_pending());
    assert_ne!(view.buffer_index(), frames.writable_index());
    for x in 0..timing.visible_width {
        for y in 0..timing.visible_height {
            assert_eq!(view.pixel(x, y), [1.0, 1.0, 1.0], "pixel ({x}, {y})");
        }
    }
}

#[test]
fn decoder_tracks_generator_after_first_line() {
    let mut driver = driver_for(TINY, 0xF800);
    driver.reset().expect("reset");
    run_until_frames(&mut driver, 1, 4);

    // From the second line on, the decoder's raster position equals the
    // generator's counters at every sample.
    for _ in 0..(TINY.total_pixels() * 2 * 3) {
        driver.run_once().expect("step");
        let (h, v) = driver.model().position();
        let sampled = driver.time().periods() % 2 == 0;
        if sampled && (v >= 1 || driver.decoder().frames() > 1) {
            assert_eq!(driver.decoder().position(), (h, v));
        }
    }
}

#[test]
fn restart_clears_published_frame() {
    let mut driver = driver_for(TINY, 0x07E0);
    driver.reset().expect("reset");
    run_until_frames(&mut driver, 2, TINY.total_pixels() * 4 + 4);
    assert!(driver.session().frames().is_pending());

    driver.session().request_restart();
    driver.run_once().expect("step");
    let frames = driver.session().frames();
    assert!(!frames.is_pending());
    assert_eq!(driver.decoder().frames(), 0);
    let (view, status) = frames.acquire();
    assert_eq!(status, FrameStatus::Repeat);
    assert_eq!(view.pixel(0, 0), [0.0, 0.0, 0.0]);
}
