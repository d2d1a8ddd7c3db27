//! Real-time pacing of simulated ticks.
//!
//! Each tick has a deadline `epoch + ticks * ns_per_tick`. Running ahead of
//! the deadline spins until it arrives; running slightly behind is counted
//! and logged; running far behind gives up on catching up and moves the
//! epoch to the present.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use sim_core::Ticks;

use crate::config::PacerConfig;

/// Time source for the pacer.
pub trait PacerClock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Block until [`now`](Self::now) reaches `deadline`.
    fn spin_until(&self, deadline: Duration);
}

/// Wall-clock time with a busy-wait.
///
/// Deadlines are tens of nanoseconds apart, far below scheduler sleep
/// granularity, so waiting never yields the thread.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PacerClock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn spin_until(&self, deadline: Duration) {
        while self.origin.elapsed() < deadline {
            std::hint::spin_loop();
        }
    }
}

/// Deterministic clock for tests.
///
/// Time only moves when [`advance`](Self::advance) is called, when a spin
/// jumps to its deadline, or by `cost_per_read` on every [`now`] call (to
/// model per-tick work). Clones share the same time.
///
/// [`now`]: PacerClock::now
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_ns: Arc<AtomicU64>,
    cost_per_read_ns: u64,
}

impl VirtualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that advances by `cost` each time it is read.
    #[must_use]
    pub fn with_cost_per_read(cost: Duration) -> Self {
        Self {
            now_ns: Arc::default(),
            cost_per_read_ns: duration_ns(cost),
        }
    }

    /// Move time forward, e.g. to simulate a stall.
    pub fn advance(&self, by: Duration) {
        self.now_ns.fetch_add(duration_ns(by), Ordering::SeqCst);
    }

    /// Current time without the per-read cost.
    #[must_use]
    pub fn peek(&self) -> Duration {
        Duration::from_nanos(self.now_ns.load(Ordering::SeqCst))
    }
}

impl PacerClock for VirtualClock {
    fn now(&self) -> Duration {
        let ns = self
            .now_ns
            .fetch_add(self.cost_per_read_ns, Ordering::SeqCst)
            + self.cost_per_read_ns;
        Duration::from_nanos(ns)
    }

    fn spin_until(&self, deadline: Duration) {
        self.now_ns
            .fetch_max(duration_ns(deadline), Ordering::SeqCst);
    }
}

fn duration_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// What one [`ClockPacer::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceOutcome {
    /// Pacing disabled.
    Unpaced,
    /// Ahead of real time; spun until the deadline.
    Waited,
    /// At or slightly behind the deadline.
    OnTime,
    /// Behind by more than the warning threshold.
    Lagging(Duration),
    /// Behind by more than the maximum; the epoch moved to now.
    Rebaselined(Duration),
}

/// Pacing statistics since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacerStats {
    pub ticks: u64,
    /// Ticks that spun waiting for their deadline.
    pub waits: u64,
    pub lag_warnings: u64,
    pub lag_resets: u64,
    /// Sum of lag over all warned ticks.
    pub total_warned_lag: Duration,
    pub max_lag: Duration,
}

impl PacerStats {
    /// Mean lag over warned ticks.
    #[must_use]
    pub fn average_warned_lag(&self) -> Duration {
        match u32::try_from(self.lag_warnings) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_warned_lag / n,
            Err(_) => Duration::from_nanos(duration_ns(self.total_warned_lag) / self.lag_warnings),
        }
    }
}

/// Keeps simulated ticks in step with a [`PacerClock`].
pub struct ClockPacer<C: PacerClock> {
    clock: C,
    config: PacerConfig,
    epoch: Duration,
    ticks: Ticks,
    stats: PacerStats,
}

impl<C: PacerClock> ClockPacer<C> {
    pub fn new(clock: C, config: PacerConfig) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            config,
            epoch,
            ticks: Ticks::ZERO,
            stats: PacerStats::default(),
        }
    }

    /// Ticks since the epoch.
    #[must_use]
    pub fn ticks(&self) -> Ticks {
        self.ticks
    }

    #[must_use]
    pub fn stats(&self) -> PacerStats {
        self.stats
    }

    /// Advance one tick and hold the caller until its deadline.
    pub fn tick(&mut self) -> PaceOutcome {
        self.ticks += Ticks::ONE;
        self.stats.ticks += 1;

        if self.config.rate.is_free_running() {
            return PaceOutcome::Unpaced;
        }

        let target = self.epoch + self.config.rate.duration_of(self.ticks);
        let now = self.clock.now();

        if now < target {
            self.clock.spin_until(target);
            self.stats.waits += 1;
            return PaceOutcome::Waited;
        }

        let lag = now - target;
        if lag > self.config.max_lag {
            self.stats.lag_resets += 1;
            warn!(
                "Simulation fell {:.1} ms behind real time; re-baselining (reset #{})",
                lag.as_secs_f64() * 1e3,
                self.stats.lag_resets
            );
            self.epoch = now;
            self.ticks = Ticks::ZERO;
            return PaceOutcome::Rebaselined(lag);
        }

        if lag > self.config.warn_lag {
            self.stats.lag_warnings += 1;
            self.stats.total_warned_lag += lag;
            self.stats.max_lag = self.stats.max_lag.max(lag);
            if self.config.warn_log_every > 0
                && (self.stats.lag_warnings - 1) % self.config.warn_log_every == 0
            {
                warn!(
                    "Simulation lagging by {:.3} ms ({} warnings)",
                    lag.as_secs_f64() * 1e3,
                    self.stats.lag_warnings
                );
            }
            return PaceOutcome::Lagging(lag);
        }

        PaceOutcome::OnTime
    }

    /// Move the epoch to now and zero the tick counter and statistics.
    pub fn reset(&mut self) {
        self.epoch = self.clock.now();
        self.ticks = Ticks::ZERO;
        self.stats = PacerStats::default();
        debug!("Pacer re-baselined");
    }

    /// Log the statistics gathered since the last reset.
    pub fn log_summary(&self) {
        let s = &self.stats;
        info!(
            "Pacer: {} ticks, {} waits, {} lag warnings, {} lag resets, max lag {:.3} ms, avg warned lag {:.3} ms",
            s.ticks,
            s.waits,
            s.lag_warnings,
            s.lag_resets,
            s.max_lag.as_secs_f64() * 1e3,
            s.average_warned_lag().as_secs_f64() * 1e3,
        );
    }
}
