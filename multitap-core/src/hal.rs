//! Contracts for the collaborators around the input/display pipeline.
//!
//! Board support (GPIO keypad, LCD, segment readout) and the scheduler live
//! outside this crate. The firmware implements these traits against real
//! registers; the host CLI implements them with threads and a terminal.

use crate::key::Position;
use crate::time::{Instant, Millis};

/// Matrix keypad plus the dedicated backspace input.
pub trait Keypad {
    /// Position of the pressed matrix key, or `None` when the matrix is idle.
    fn scan_matrix(&mut self) -> Option<Position>;

    /// Whether the backspace input is asserted.
    ///
    /// The physical input is active-low; implementations perform the inversion.
    fn backspace_active(&mut self) -> bool;
}

/// Character display addressed by row.
pub trait Display {
    fn clear(&mut self);
    fn write_row(&mut self, row: usize, text: &str);
}

/// Single-digit auxiliary readout (7-segment).
pub trait Readout {
    fn show_digit(&mut self, pattern: u8);
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Suspends the calling task for a fixed duration.
pub trait Sleep {
    fn sleep(&mut self, duration: Millis);
}

impl<T: Keypad + ?Sized> Keypad for &mut T {
    fn scan_matrix(&mut self) -> Option<Position> {
        (**self).scan_matrix()
    }

    fn backspace_active(&mut self) -> bool {
        (**self).backspace_active()
    }
}

impl<T: Display + ?Sized> Display for &mut T {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn write_row(&mut self, row: usize, text: &str) {
        (**self).write_row(row, text)
    }
}

impl<T: Sleep + ?Sized> Sleep for &mut T {
    fn sleep(&mut self, duration: Millis) {
        (**self).sleep(duration)
    }
}
