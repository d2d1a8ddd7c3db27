//! Two-thread session lifecycle.
//!
//! `Idle -> Running` when [`Coordinator::start`] spawns the simulation
//! thread. `Running -> Stopping` on the first quit request from either side.
//! `Stopping -> Stopped` once [`Coordinator::shutdown`] has joined the
//! simulation thread. Shutdown runs at most once however many paths ask for
//! it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use sim_core::SteppedModel;

use crate::config::{ConsumerConfig, RuntimeConfig};
use crate::driver::{DriverReport, SimulationDriver};
use crate::error::RuntimeError;
use crate::exchange::FrameStatus;
use crate::pacer::PacerClock;
use crate::presentation::{EventSource, InputEvent, PresentationSink};
use crate::session::{Phase, Session};

const PRODUCER_THREAD_NAME: &str = "simulation";

/// Consumer loop totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrontendStats {
    /// Frames handed to the sink, repeats included.
    pub frames: u64,
    pub fresh_frames: u64,
    pub events: u64,
    pub slow_frames: u64,
    pub longest_frame: Duration,
}

/// Per-interval counters for the periodic stats line.
struct StatsWindow {
    started: Instant,
    frames: u64,
    fresh: u64,
    events: u64,
    longest: Duration,
}

impl StatsWindow {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            frames: 0,
            fresh: 0,
            events: 0,
            longest: Duration::ZERO,
        }
    }

    fn maybe_log(&mut self, interval: Duration) {
        let elapsed = self.started.elapsed();
        if elapsed < interval {
            return;
        }
        debug!(
            "Frontend: {:.1} fps, {} fresh, {} events, longest frame {:.1} ms",
            self.frames as f64 / elapsed.as_secs_f64(),
            self.fresh,
            self.events,
            self.longest.as_secs_f64() * 1e3,
        );
        *self = Self::new();
    }
}

/// Lets another context (a signal hook, a test) stop the session without
/// owning the coordinator.
#[derive(Clone)]
pub struct ShutdownHandle {
    session: Arc<Session>,
}

impl ShutdownHandle {
    /// Request quit. Safe to call any number of times from any thread.
    pub fn trigger(&self) {
        if self.session.request_quit() {
            info!("Shutdown requested");
        }
    }
}

/// Owns the simulation thread and runs the consumer loop.
pub struct Coordinator {
    session: Arc<Session>,
    consumer: ConsumerConfig,
    producer: Option<JoinHandle<Result<DriverReport, RuntimeError>>>,
}

impl Coordinator {
    /// Spawn the simulation thread for `model`.
    pub fn start<M, C>(model: M, clock: C, config: &RuntimeConfig) -> Result<Self, RuntimeError>
    where
        M: SteppedModel + Send + 'static,
        C: PacerClock + Send + 'static,
    {
        let session = Arc::new(Session::new(&config.driver.timing));
        let mut driver = SimulationDriver::new(model, clock, Arc::clone(&session), config);

        session.set_phase(Phase::Running);
        let spawned = thread::Builder::new()
            .name(PRODUCER_THREAD_NAME.into())
            .spawn(move || driver.run());
        let producer = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                session.set_phase(Phase::Stopped);
                return Err(RuntimeError::Spawn(e));
            }
        };
        info!("Simulation thread started");

        Ok(Self {
            session,
            consumer: config.consumer,
            producer: Some(producer),
        })
    }

    /// Start, run the consumer loop against `frontend`, then shut down.
    ///
    /// A presentation failure takes precedence over the simulation result.
    pub fn run<M, C, F>(
        model: M,
        clock: C,
        config: &RuntimeConfig,
        frontend: &mut F,
    ) -> Result<DriverReport, RuntimeError>
    where
        M: SteppedModel + Send + 'static,
        C: PacerClock + Send + 'static,
        F: EventSource + PresentationSink,
    {
        let mut coordinator = Self::start(model, clock, config)?;
        let frontend_result = coordinator.run_frontend(frontend);
        let producer_result = coordinator
            .shutdown()
            .unwrap_or(Err(RuntimeError::AlreadyShutDown));
        frontend_result?;
        producer_result
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            session: Arc::clone(&self.session),
        }
    }

    fn handle_event(&self, event: InputEvent) {
        match event {
            InputEvent::Press(control) => {
                debug!("{control} pressed");
                self.session.set_control(control, true);
            }
            InputEvent::Release(control) => {
                debug!("{control} released");
                self.session.set_control(control, false);
            }
            InputEvent::Quit => {
                if self.session.request_quit() {
                    info!("Quit requested by frontend");
                }
            }
        }
    }

    /// Run the consumer loop on the calling thread until quit.
    ///
    /// Each frame drains every pending event, claims the newest frame,
    /// presents it with the indicators, and sleeps out the rest of the frame
    /// interval.
    pub fn run_frontend<F>(&mut self, frontend: &mut F) -> Result<FrontendStats, RuntimeError>
    where
        F: EventSource + PresentationSink,
    {
        let interval = self.consumer.frame_interval;
        let slow_threshold = interval + self.consumer.slow_frame_margin;
        let mut stats = FrontendStats::default();
        let mut window = StatsWindow::new();
        let mut events = Vec::new();

        while !self.session.quit_requested() {
            let frame_start = Instant::now();

            events.clear();
            frontend.poll_events(&mut events);
            for &event in &events {
                self.handle_event(event);
            }
            stats.events += events.len() as u64;
            window.events += events.len() as u64;
            if self.session.quit_requested() {
                break;
            }

            let (view, status) = self.session.frames().acquire();
            let indicators = self.session.indicators();
            if let Err(e) = frontend.present(view, status, &indicators) {
                error!("Presentation failed: {e}");
                self.session.request_quit();
                return Err(e.into());
            }
            stats.frames += 1;
            window.frames += 1;
            if status == FrameStatus::Fresh {
                stats.fresh_frames += 1;
                window.fresh += 1;
            }

            let work = frame_start.elapsed();
            stats.longest_frame = stats.longest_frame.max(work);
            window.longest = window.longest.max(work);
            if work > slow_threshold {
                stats.slow_frames += 1;
                warn!(
                    "Slow frame: {:.1} ms (target {:.1} ms)",
                    work.as_secs_f64() * 1e3,
                    interval.as_secs_f64() * 1e3
                );
            } else if work < interval {
                thread::sleep(interval - work);
            }

            window.maybe_log(self.consumer.stats_interval);
        }

        info!(
            "Frontend stopped: {} frames ({} fresh), {} events, {} slow, longest {:.1} ms",
            stats.frames,
            stats.fresh_frames,
            stats.events,
            stats.slow_frames,
            stats.longest_frame.as_secs_f64() * 1e3,
        );
        Ok(stats)
    }

    /// Stop the simulation thread and wait for it.
    ///
    /// The first call returns the simulation result; later calls (and the
    /// one from `Drop`) return `None` without doing anything.
    pub fn shutdown(&mut self) -> Option<Result<DriverReport, RuntimeError>> {
        if !self.session.begin_shutdown() {
            return None;
        }
        self.session.request_quit();

        let result = self.producer.take().map(|handle| {
            handle
                .join()
                .map_err(|_| RuntimeError::ProducerPanicked)
                .and_then(|r| r)
        });
        self.session.set_phase(Phase::Stopped);
        info!("Shutdown complete");
        result
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
