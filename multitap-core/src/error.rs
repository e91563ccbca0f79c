//! Error taxonomy for the input pipeline.
//!
//! Nothing here is fatal. Callers on the device drop these silently; hosts and
//! tests inspect them. Deleting at the buffer origin is a no-op, not an error.

use crate::key::Digit;

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Append rejected because every cell of the text buffer is in use.
    #[error("text buffer is full")]
    InputOverflow,
    /// The pressed digit has no characters assigned in the active keymap.
    #[error("no characters assigned to key {0}")]
    UndefinedCharacterSet(Digit),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
