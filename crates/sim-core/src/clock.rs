//! Mapping between simulated ticks and wall-clock time.

use std::time::Duration;

use crate::Ticks;

/// Wall-clock length of one simulated half-period.
///
/// A rate of zero nanoseconds means "as fast as possible": no tick has a
/// real-time deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate {
    /// Nanoseconds per half-period (e.g. `80` for a 6.25 MHz clock).
    pub ns_per_tick: u64,
}

impl TickRate {
    pub const FREE_RUNNING: Self = Self { ns_per_tick: 0 };

    #[must_use]
    pub const fn new(ns_per_tick: u64) -> Self {
        Self { ns_per_tick }
    }

    /// Rate for a clock of the given frequency: two ticks per period.
    #[must_use]
    pub const fn from_frequency_hz(frequency_hz: u64) -> Self {
        if frequency_hz == 0 {
            return Self::FREE_RUNNING;
        }
        Self {
            ns_per_tick: 1_000_000_000 / (frequency_hz * 2),
        }
    }

    #[must_use]
    pub const fn is_free_running(&self) -> bool {
        self.ns_per_tick == 0
    }

    /// Wall-clock time that `ticks` half-periods should take.
    #[must_use]
    pub fn duration_of(&self, ticks: Ticks) -> Duration {
        let nanos = u128::from(ticks.get()) * u128::from(self.ns_per_tick);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_maps_to_half_period() {
        assert_eq!(TickRate::from_frequency_hz(6_250_000).ns_per_tick, 80);
        assert_eq!(TickRate::from_frequency_hz(50_000_000).ns_per_tick, 10);
        assert!(TickRate::from_frequency_hz(0).is_free_running());
    }

    #[test]
    fn duration_scales_with_ticks() {
        let rate = TickRate::new(80);
        assert_eq!(
            rate.duration_of(Ticks::new(1_000)),
            Duration::from_micros(80)
        );
        assert_eq!(
            TickRate::FREE_RUNNING.duration_of(Ticks::new(5)),
            Duration::ZERO
        );
    }
}
