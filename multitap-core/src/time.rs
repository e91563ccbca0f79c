//! Millisecond time base shared by the scan loop, the decoder and the renderer.
//!
//! Timestamps come from a free-running `u32` millisecond counter. Elapsed time
//! is computed with wrapping subtraction so counter rollover is harmless.

use core::fmt;
use core::ops::Add;

/// A span of milliseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(pub u32);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl Add for Millis {
    type Output = Millis;

    fn add(self, rhs: Millis) -> Millis {
        Millis(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A reading of the millisecond counter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Instant(pub u32);

impl Instant {
    pub const ZERO: Instant = Instant(0);

    /// Time elapsed since `earlier`, tolerant of counter rollover.
    pub fn since(self, earlier: Instant) -> Millis {
        Millis(self.0.wrapping_sub(earlier.0))
    }
}

impl Add<Millis> for Instant {
    type Output = Instant;

    fn add(self, rhs: Millis) -> Instant {
        Instant(self.0.wrapping_add(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_counter_rollover() {
        let before = Instant(u32::MAX - 9);
        let after = before + Millis(25);
        assert_eq!(after, Instant(15));
        assert_eq!(after.since(before), Millis(25));
    }
}
