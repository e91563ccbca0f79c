//! Seven-segment patterns for the key echo readout.
//!
//! Bit 0 drives segment a through bit 6 for segment g; bit 7 is the decimal
//! point. A set bit lights the segment. Boards with common-anode wiring invert
//! the pattern themselves.

use crate::hal::Readout;
use crate::key::KeyEvent;
use crate::scanner::Echo;

const DIGITS: [u8; 10] = [
    0x3F, // 0
    0x06, // 1
    0x5B, // 2
    0x4F, // 3
    0x66, // 4
    0x6D, // 5
    0x7D, // 6
    0x07, // 7
    0x7F, // 8
    0x6F, // 9
];

/// Segment g only.
pub const DASH: u8 = 0x40;
pub const BLANK: u8 = 0x00;

/// Pattern shown for `event`.
pub fn pattern(event: KeyEvent) -> u8 {
    match event {
        KeyEvent::Digit(d) => DIGITS[d.index()],
        KeyEvent::Backspace => DASH,
        KeyEvent::None => BLANK,
    }
}

/// Echo adapter that shows each key on a [`Readout`].
pub struct SegmentEcho<R>(pub R);

impl<R: Readout> Echo for SegmentEcho<R> {
    fn echo(&mut self, event: KeyEvent) {
        self.0.show_digit(pattern(event));
    }
}
