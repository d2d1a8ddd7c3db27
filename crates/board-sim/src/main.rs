//! Real-time simulator for the colour-bar development board.
//!
//! Opens a window showing the VGA output and the five board LEDs. Keys
//! A/S/D/F/G press reset and buttons B2-B5; Esc, Q or closing the window
//! quits. `--headless` runs unpaced without a window, for scripted runs and
//! screenshots.

mod headless;
mod window;

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use board_runtime::input::parse_press;
use board_runtime::{
    ConsumerConfig, Control, Coordinator, DriverReport, EventSource, MonotonicClock,
    PresentationSink, RuntimeConfig,
};
use clap::Parser;
use colorbar_board::ColorBar;
use log::{error, info, warn};
use sim_core::TickRate;

use crate::headless::HeadlessFrontend;
use crate::window::WindowFrontend;

#[derive(Parser, Debug)]
#[command(name = "board-sim", version, about = "Colour-bar board simulator")]
struct Args {
    /// Wall-clock nanoseconds per clock half-period; 0 runs unpaced.
    /// Defaults to 80 in a window and 0 headless.
    #[arg(long)]
    ns_per_tick: Option<u64>,

    /// Lag (microseconds) counted as a pacing warning.
    #[arg(long, default_value_t = 1000)]
    warn_lag_us: u64,

    /// Lag (milliseconds) after which the pacer re-baselines.
    #[arg(long, default_value_t = 50)]
    max_lag_ms: u64,

    /// Presentation rate. Defaults to a 16 ms frame interval.
    #[arg(long)]
    fps: Option<u32>,

    /// Window scale factor.
    #[arg(long, default_value_t = 2)]
    scale: u32,

    /// Run without a window.
    #[arg(long)]
    headless: bool,

    /// Fresh frames to run in headless mode.
    #[arg(long, default_value_t = 2)]
    frames: u64,

    /// Save the last headless frame as PNG.
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Scripted press, `<control>@<frame>[+hold]`, e.g. `B3@2+4` or `reset@5`.
    #[arg(long = "press", value_parser = parse_press)]
    presses: Vec<(Control, u64, u64)>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn build_config(args: &Args) -> RuntimeConfig {
    let mut config = if args.headless {
        RuntimeConfig::headless()
    } else {
        RuntimeConfig::default()
    };
    if let Some(ns) = args.ns_per_tick {
        config.pacer.rate = TickRate::new(ns);
    }
    config.pacer.warn_lag = Duration::from_micros(args.warn_lag_us);
    config.pacer.max_lag = Duration::from_millis(args.max_lag_ms);
    if let Some(fps) = args.fps {
        config.consumer = ConsumerConfig::with_fps(fps);
    }
    config
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Start the simulation, run `frontend` until quit, and shut down.
fn run_session<F>(config: &RuntimeConfig, frontend: &mut F) -> Result<DriverReport, Box<dyn Error>>
where
    F: EventSource + PresentationSink,
{
    let mut coordinator = Coordinator::start(ColorBar::new(), MonotonicClock::new(), config)?;

    let handle = coordinator.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || handle.trigger()) {
        warn!("Ctrl-C handler not installed: {e}");
    }

    let frontend_result = coordinator.run_frontend(frontend);
    let producer_result = coordinator.shutdown();
    frontend_result?;
    match producer_result {
        Some(result) => Ok(result?),
        None => Err("simulation already shut down".into()),
    }
}

fn run_windowed(args: &Args, config: &RuntimeConfig) -> Result<DriverReport, Box<dyn Error>> {
    let timing = config.driver.timing;
    let mut frontend =
        WindowFrontend::open(timing.visible_width, timing.visible_height, args.scale)?;
    run_session(config, &mut frontend)
}

fn run_headless(args: &Args, config: &RuntimeConfig) -> Result<DriverReport, Box<dyn Error>> {
    let mut frontend = HeadlessFrontend::new(args.frames, args.screenshot.clone());
    for &(control, frame, hold) in &args.presses {
        frontend.press(control, frame, hold);
    }
    let report = run_session(config, &mut frontend)?;
    info!(
        "Headless run: {} fresh frames, {} scripted inputs unused, LEDs {:?}",
        frontend.fresh_frames(),
        frontend.pending_inputs(),
        frontend.indicators()
    );
    Ok(report)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = build_config(&args);
    if !args.headless && !args.presses.is_empty() {
        warn!("--press only applies in headless mode");
    }
    info!(
        "Starting: {} ns/tick, frame interval {:.1} ms{}",
        config.pacer.rate.ns_per_tick,
        config.consumer.frame_interval.as_secs_f64() * 1e3,
        if args.headless { ", headless" } else { "" }
    );

    let result = if args.headless {
        run_headless(&args, &config)
    } else {
        run_windowed(&args, &config)
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_defaults_to_unpaced() {
        let args = Args::parse_from(["board-sim", "--headless"]);
        let config = build_config(&args);
        assert!(config.pacer.rate.is_free_running());
        assert_eq!(config.driver.startup_delay, Duration::ZERO);
    }

    #[test]
    fn flags_override_pacing() {
        let args = Args::parse_from([
            "board-sim",
            "--ns-per-tick",
            "40",
            "--warn-lag-us",
            "500",
            "--max-lag-ms",
            "20",
            "--fps",
            "50",
        ]);
        let config = build_config(&args);
        assert_eq!(config.pacer.rate.ns_per_tick, 40);
        assert_eq!(config.pacer.warn_lag, Duration::from_micros(500));
        assert_eq!(config.pacer.max_lag, Duration::from_millis(20));
        assert_eq!(config.consumer.frame_interval, Duration::from_millis(20));
    }

    #[test]
    fn press_flags_parse() {
        let args = Args::parse_from([
            "board-sim",
            "--headless",
            "--press",
            "B3@2+4",
            "--press",
            "reset@5",
        ]);
        assert_eq!(
            args.presses,
            vec![(Control::Button(1), 2, 4), (Control::Reset, 5, 1)]
        );
    }

    #[test]
    fn bad_press_is_rejected() {
        assert!(Args::try_parse_from(["board-sim", "--press", "B9@1"]).is_err());
    }
}
