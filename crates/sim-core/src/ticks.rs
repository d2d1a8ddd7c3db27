//! The fundamental unit of simulated time.

/// A count of clock half-periods.
///
/// Each half-period is one call to the model's evaluate step with the clock
/// pin at a new level. A full clock period is two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Number of complete clock periods (two ticks each).
    #[must_use]
    pub const fn periods(self) -> u64 {
        self.0 / 2
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::ops::Sub for Ticks {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_saturates_at_zero() {
        assert_eq!(Ticks::new(3) - Ticks::new(5), Ticks::ZERO);
    }

    #[test]
    fn periods_round_down() {
        assert_eq!(Ticks::new(7).periods(), 3);
        let mut t = Ticks::ZERO;
        t += Ticks::ONE;
        t += Ticks::ONE;
        assert_eq!(t.periods(), 1);
    }
}
