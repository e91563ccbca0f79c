//! Consecutive-sample debounce logic.
//!
//! A reading must be observed `threshold` scans in a row before the stable
//! state changes. This prevents false triggers from contact bounce on both
//! press and release.

pub struct Debouncer<T> {
    /// Last accepted reading.
    stable: T,
    /// Reading currently accumulating agreement.
    candidate: T,
    /// Consecutive scans that returned `candidate`.
    count: u8,
    threshold: u8,
}

impl<T: Copy + PartialEq> Debouncer<T> {
    /// A threshold of 0 is treated as 1 (no filtering).
    pub const fn new(initial: T, threshold: u8) -> Self {
        Self {
            stable: initial,
            candidate: initial,
            count: 0,
            threshold: if threshold == 0 { 1 } else { threshold },
        }
    }

    /// Feed one raw scan. Returns the debounced reading.
    pub fn update(&mut self, raw: T) -> T {
        if raw == self.stable {
            // Raw matches debounced state, reset counter
            self.count = 0;
            self.candidate = raw;
            return self.stable;
        }

        if raw != self.candidate {
            // A different reading interrupted the streak
            self.candidate = raw;
            self.count = 0;
        }

        self.count = self.count.saturating_add(1);
        if self.count >= self.threshold {
            self.stable = raw;
            self.count = 0;
        }

        self.stable
    }

    /// A different reading is partway through its streak.
    pub fn is_settling(&self) -> bool {
        self.count > 0
    }
}
