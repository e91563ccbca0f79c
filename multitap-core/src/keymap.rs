//! Character sets assigned to each digit key.
//!
//! Repeated taps of a digit cycle through its set in order, wrapping back to
//! the first candidate. Sets are static configuration and never mutated.

use crate::key::Digit;

/// Ordered candidate characters for one digit. ASCII only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CharacterSet(&'static [u8]);

impl CharacterSet {
    pub const EMPTY: CharacterSet = CharacterSet(b"");

    pub const fn new(chars: &'static [u8]) -> Self {
        Self(chars)
    }

    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Candidate for the given tap count, wrapping modulo the set length.
    pub fn get(&self, tap: usize) -> Option<u8> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0[tap % self.0.len()])
    }

    pub fn chars(&self) -> &'static [u8] {
        self.0
    }
}

/// One character set per digit.
pub struct Keymap {
    sets: [CharacterSet; 10],
}

impl Keymap {
    pub const fn new(sets: [CharacterSet; 10]) -> Self {
        Self { sets }
    }

    pub fn set(&self, digit: Digit) -> &CharacterSet {
        &self.sets[digit.index()]
    }
}

const fn cs(chars: &'static [u8]) -> CharacterSet {
    CharacterSet::new(chars)
}

/// Classic phone letter assignment. Each set ends with its own digit.
pub static PHONE: Keymap = Keymap::new([
    cs(b" 0"),
    cs(b".,?!1"),
    cs(b"ABC2"),
    cs(b"DEF3"),
    cs(b"GHI4"),
    cs(b"JKL5"),
    cs(b"MNO6"),
    cs(b"PQRS7"),
    cs(b"TUV8"),
    cs(b"WXYZ9"),
]);
