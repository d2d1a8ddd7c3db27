//! The producer loop: clocks the model and feeds the decoder.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{Level, debug, error, info, log_enabled};
use sim_core::{BUTTON_COUNT, SteppedModel, Ticks};

use crate::config::{DriverConfig, RuntimeConfig};
use crate::decoder::SignalDecoder;
use crate::error::RuntimeError;
use crate::pacer::{ClockPacer, PacerClock, PacerStats};
use crate::session::{Control, Session};

/// Summary of one producer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverReport {
    /// Full clock periods stepped by the main loop.
    pub iterations: u64,
    /// Half-periods evaluated, including reset sequences.
    pub sim_ticks: Ticks,
    /// `sim_ticks` at the model's clock rate, whatever the pacing.
    pub sim_time: Duration,
    pub wall_time: Duration,
    /// Frame boundaries decoded across all resets.
    pub frames_decoded: u64,
    pub pacer: PacerStats,
}

impl DriverReport {
    /// Main-loop periods per wall-clock second.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        let secs = self.wall_time.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log(&self) {
        info!(
            "Simulation stopped: {} periods in {:.3} s ({:.0} periods/s), {} frames, simulated {:.3} ms",
            self.iterations,
            self.wall_time.as_secs_f64(),
            self.iterations_per_second(),
            self.frames_decoded,
            self.sim_time.as_secs_f64() * 1e3,
        );
    }
}

/// Owns the model and steps it in real time.
pub struct SimulationDriver<M: SteppedModel, C: PacerClock> {
    model: M,
    pacer: ClockPacer<C>,
    decoder: SignalDecoder,
    session: Arc<Session>,
    config: DriverConfig,
    time: Ticks,
    periods_since_sample: u32,
    iterations: u64,
    frames_decoded: u64,
}

impl<M: SteppedModel, C: PacerClock> SimulationDriver<M, C> {
    pub fn new(model: M, clock: C, session: Arc<Session>, config: &RuntimeConfig) -> Self {
        Self {
            model,
            pacer: ClockPacer::new(clock, config.pacer),
            decoder: SignalDecoder::new(config.driver.timing),
            session,
            config: config.driver,
            time: Ticks::ZERO,
            periods_since_sample: 0,
            iterations: 0,
            frames_decoded: 0,
        }
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn decoder(&self) -> &SignalDecoder {
        &self.decoder
    }

    #[must_use]
    pub fn pacer(&self) -> &ClockPacer<C> {
        &self.pacer
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Half-periods evaluated since construction.
    #[must_use]
    pub fn time(&self) -> Ticks {
        self.time
    }

    fn input_level(&self, pressed: bool) -> bool {
        pressed != self.config.active_low_inputs
    }

    fn indicator_lit(&self, level: bool) -> bool {
        level != self.config.active_low_indicators
    }

    // ===== Stepping =====

    fn half_period(&mut self, clk: bool) -> Result<(), RuntimeError> {
        self.pacer.tick();
        self.time += Ticks::ONE;
        self.model.inputs_mut().clk = clk;
        self.model.evaluate()?;
        Ok(())
    }

    fn full_period(&mut self) -> Result<(), RuntimeError> {
        self.half_period(true)?;
        self.half_period(false)
    }

    fn apply_inputs(&mut self) {
        let reset = self.input_level(self.session.is_pressed(Control::Reset));
        let buttons: [bool; BUTTON_COUNT] = std::array::from_fn(|i| {
            self.input_level(self.session.is_pressed(Control::Button(i as u8)))
        });
        let inputs = self.model.inputs_mut();
        inputs.reset = reset;
        inputs.buttons = buttons;
    }

    fn read_indicators(&self) {
        let leds = self.model.outputs().leds;
        for (i, &level) in leds.iter().enumerate() {
            self.session.set_indicator(i, self.indicator_lit(level));
        }
    }

    /// Hold the board in reset for the configured number of periods, then
    /// release it and clear all decode and panel state.
    pub fn reset(&mut self) -> Result<(), RuntimeError> {
        let released = self.input_level(false);
        let asserted = self.input_level(true);
        {
            let inputs = self.model.inputs_mut();
            inputs.clk = false;
            inputs.reset = asserted;
            inputs.buttons = [released; BUTTON_COUNT];
        }
        self.model.evaluate()?;
        for _ in 0..self.config.reset_periods {
            self.full_period()?;
        }
        self.model.inputs_mut().reset = released;

        self.session.frames().clear();
        self.decoder.reset();
        self.session.release_all();
        self.session.clear_indicators();
        self.periods_since_sample = 0;
        info!("Board reset ({} periods)", self.config.reset_periods);
        Ok(())
    }

    /// One full clock period of the main loop.
    pub fn run_once(&mut self) -> Result<(), RuntimeError> {
        if self.session.take_restart() {
            info!("Restart requested");
            self.reset()?;
            self.pacer.reset();
        }

        self.apply_inputs();
        self.full_period()?;
        self.read_indicators();
        self.iterations += 1;

        self.periods_since_sample += 1;
        if self.periods_since_sample >= self.config.sample_divider.max(1) {
            self.periods_since_sample = 0;
            let sample = self.model.outputs().into();
            if self.decoder.sample(sample, self.session.frames()) {
                self.frames_decoded += 1;
            }
        }
        Ok(())
    }

    fn run_loop(&mut self) -> Result<(), RuntimeError> {
        if !self.config.startup_delay.is_zero() {
            thread::sleep(self.config.startup_delay);
        }
        self.reset()?;
        self.pacer.reset();
        info!("Simulation running");

        while !self.session.quit_requested() {
            if self.model.finished() {
                info!("Model finished");
                break;
            }
            self.run_once()?;
        }
        Ok(())
    }

    /// Reset the board and step it until quit is requested or the model
    /// finishes, then finalise the model.
    ///
    /// Whatever the outcome, quit is requested on return so the consumer
    /// loop stops too.
    pub fn run(&mut self) -> Result<DriverReport, RuntimeError> {
        let started = Instant::now();
        let outcome = self.run_loop();
        self.session.request_quit();
        self.model.finalize();
        self.pacer.log_summary();
        self.log_final_state();

        let report = self.report(started.elapsed());
        match outcome {
            Ok(()) => {
                report.log();
                Ok(report)
            }
            Err(e) => {
                error!("Simulation aborted: {e}");
                Err(e)
            }
        }
    }

    fn log_final_state(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        debug!("Final model state:");
        for path in self.model.query_paths() {
            if let Some(value) = self.model.query(path) {
                debug!("  {path} = {value}");
            }
        }
    }

    #[must_use]
    pub fn report(&self, wall_time: Duration) -> DriverReport {
        DriverReport {
            iterations: self.iterations,
            sim_ticks: self.time,
            sim_time: self.config.model_rate.duration_of(self.time),
            wall_time,
            frames_decoded: self.frames_decoded,
            pacer: self.pacer.stats(),
        }
    }
}
