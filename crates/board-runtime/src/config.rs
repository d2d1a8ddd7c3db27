//! Runtime configuration and presets.
//!
//! Every field has a sensible default matching the development board at
//! real-time speed. Individual fields can be overridden from the command line.

use std::time::Duration;

use sim_core::TickRate;

use crate::timing::VgaTiming;

/// Real-time pacing thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerConfig {
    /// Wall-clock length of one half-period. Zero disables pacing.
    pub rate: TickRate,
    /// Lag beyond this is counted as a warning.
    pub warn_lag: Duration,
    /// Lag beyond this re-baselines the pacer.
    pub max_lag: Duration,
    /// Log one line per this many lag warnings.
    pub warn_log_every: u64,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            rate: TickRate::from_frequency_hz(BOARD_CLOCK_HZ),
            warn_lag: Duration::from_millis(1),
            max_lag: Duration::from_millis(50),
            warn_log_every: 20,
        }
    }
}

/// Board oscillator frequency.
pub const BOARD_CLOCK_HZ: u64 = 6_250_000;

/// Producer-side settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub timing: VgaTiming,
    /// Simulated length of one half-period, independent of pacing.
    pub model_rate: TickRate,
    /// Full clock periods to hold reset during a board reset.
    pub reset_periods: u32,
    /// Full clock periods between decoder samples (the pixel clock divider).
    pub sample_divider: u32,
    /// Pause before the first reset so the frontend can come up.
    pub startup_delay: Duration,
    /// Buttons and reset drive low when pressed.
    pub active_low_inputs: bool,
    /// LEDs light when driven low.
    pub active_low_indicators: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timing: VgaTiming::VGA_640X480_60,
            model_rate: TickRate::from_frequency_hz(BOARD_CLOCK_HZ),
            reset_periods: 10,
            sample_divider: 2,
            startup_delay: Duration::from_millis(100),
            active_low_inputs: true,
            active_low_indicators: true,
        }
    }
}

/// Consumer-side (event and render loop) settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Target time between presented frames.
    pub frame_interval: Duration,
    /// Frames this far over the interval are reported as slow.
    pub slow_frame_margin: Duration,
    /// Period of the frame statistics log line.
    pub stats_interval: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            slow_frame_margin: Duration::from_millis(5),
            stats_interval: Duration::from_secs(1),
        }
    }
}

impl ConsumerConfig {
    /// Interval for a target frame rate. Zero falls back to the default.
    #[must_use]
    pub fn with_fps(fps: u32) -> Self {
        let mut config = Self::default();
        if fps > 0 {
            config.frame_interval = Duration::from_secs(1) / fps;
        }
        config
    }
}

/// Complete configuration for a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    pub pacer: PacerConfig,
    pub driver: DriverConfig,
    pub consumer: ConsumerConfig,
}

impl RuntimeConfig {
    /// Unpaced simulation with a fast consumer, for batch runs and tests.
    #[must_use]
    pub fn headless() -> Self {
        let mut config = Self::default();
        config.pacer.rate = TickRate::FREE_RUNNING;
        config.driver.startup_delay = Duration::ZERO;
        config.consumer.frame_interval = Duration::from_millis(1);
        config
    }
}
