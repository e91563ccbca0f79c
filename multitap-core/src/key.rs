//! Key identifiers and the physical keypad layout.
//!
//! The keypad is a 4x3 phone pad. Each matrix position maps to at most one
//! digit; positions without a digit are still reported as pressed by the
//! scanner so release detection sees them, but never produce an event.

use core::fmt;

/// Number of matrix rows on the phone pad.
pub const PAD_ROWS: usize = 4;
/// Number of matrix columns on the phone pad.
pub const PAD_COLS: usize = 3;

/// A digit key, 0 through 9.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digit(u8);

impl Digit {
    /// Returns `None` outside `0..=9`.
    pub const fn new(n: u8) -> Option<Digit> {
        if n <= 9 {
            Some(Digit(n))
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All ten digits in ascending order.
    pub fn all() -> impl Iterator<Item = Digit> {
        (0..=9).map(Digit)
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A decoded key press.
///
/// Produced once per debounced press, never repeated while the key is held.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// No key, or a matrix position without a digit.
    None,
    Digit(Digit),
    Backspace,
}

impl KeyEvent {
    /// Digit event for `n`, or `KeyEvent::None` when `n` is not a digit.
    pub fn digit(n: u8) -> KeyEvent {
        Digit::new(n).map_or(KeyEvent::None, KeyEvent::Digit)
    }

    pub fn is_none(self) -> bool {
        self == KeyEvent::None
    }
}

/// Matrix coordinates of a pressed key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Table from matrix position to digit.
pub struct KeypadLayout {
    keys: [[Option<Digit>; PAD_COLS]; PAD_ROWS],
}

impl KeypadLayout {
    pub const fn new(keys: [[Option<Digit>; PAD_COLS]; PAD_ROWS]) -> Self {
        Self { keys }
    }

    /// Digit at `pos`. Out-of-range positions map to nothing.
    pub fn lookup(&self, pos: Position) -> Option<Digit> {
        self.keys
            .get(pos.row as usize)
            .and_then(|row| row.get(pos.col as usize))
            .copied()
            .flatten()
    }

    /// Matrix position of `digit`, if the layout has one.
    pub fn position_of(&self, digit: Digit) -> Option<Position> {
        for (r, row) in self.keys.iter().enumerate() {
            for (c, key) in row.iter().enumerate() {
                if *key == Some(digit) {
                    return Some(Position::new(r as u8, c as u8));
                }
            }
        }
        None
    }

    pub fn rows(&self) -> &[[Option<Digit>; PAD_COLS]; PAD_ROWS] {
        &self.keys
    }
}

/// Unassigned matrix position.
const ___: Option<Digit> = None;

const fn d(n: u8) -> Option<Digit> {
    Some(Digit(n))
}

/// Standard telephone arrangement. The two bottom corners are unassigned.
pub static PHONE_PAD: KeypadLayout = KeypadLayout::new([
    [d(1), d(2), d(3)],
    [d(4), d(5), d(6)],
    [d(7), d(8), d(9)],
    [___, d(0), ___],
]);
