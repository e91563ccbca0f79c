//! Multi-tap text entry.
//!
//! Repeated taps of one digit within the tap timeout cycle through that
//! digit's character set, replacing the pending character in place. A
//! different digit, or the same digit after the timeout, finalizes the pending
//! character and starts a new one in a fresh cell. There is no commit key:
//! elapsed time and key identity are the only disambiguators.

use crate::buffer::TextBuffer;
use crate::config::TAP_TIMEOUT;
use crate::error::{Error, Result};
use crate::key::{Digit, KeyEvent};
use crate::keymap::{Keymap, PHONE};
use crate::time::{Instant, Millis};

/// Decoder state between key events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DecoderState {
    /// No character can be replaced; the next digit appends.
    #[default]
    Idle,
    /// `ch` was written to the buffer and may still be cycled.
    Pending {
        key: Digit,
        /// Index of `ch` within the key's character set.
        tap: usize,
        ch: u8,
        /// Time of the most recent tap.
        at: Instant,
    },
}

/// What the buffer should do in response to an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    Nothing,
    /// Finalize any pending character and write this one in a new cell.
    Append(u8),
    /// Overwrite the pending character in place.
    Replace(u8),
    /// Remove the character before the cursor.
    Delete,
}

impl Edit {
    /// The `(char_to_append, forced_commit)` view of the edit.
    ///
    /// `forced_commit` is set when the cursor moves: a new cell is started or
    /// the previous one is deleted. A replacement carries its character
    /// without a commit.
    pub fn as_pair(self) -> (Option<u8>, bool) {
        match self {
            Edit::Nothing => (None, false),
            Edit::Append(ch) => (Some(ch), true),
            Edit::Replace(ch) => (Some(ch), false),
            Edit::Delete => (None, true),
        }
    }
}

impl DecoderState {
    /// Pure transition function.
    ///
    /// Fails with [`Error::UndefinedCharacterSet`] for a digit with no
    /// characters; the caller keeps its current state in that case.
    pub fn transition(
        self,
        event: KeyEvent,
        now: Instant,
        keymap: &Keymap,
        timeout: Millis,
    ) -> Result<(DecoderState, Edit)> {
        let key = match event {
            KeyEvent::None => return Ok((self, Edit::Nothing)),
            KeyEvent::Backspace => return Ok((DecoderState::Idle, Edit::Delete)),
            KeyEvent::Digit(key) => key,
        };

        let set = keymap.set(key);
        if set.is_empty() {
            return Err(Error::UndefinedCharacterSet(key));
        }

        let continues = self.continues(key, now, timeout);
        let tap = match self {
            DecoderState::Pending { tap, .. } if continues => (tap + 1) % set.len(),
            _ => 0,
        };
        let ch = set.get(tap).ok_or(Error::UndefinedCharacterSet(key))?;
        let next = DecoderState::Pending {
            key,
            tap,
            ch,
            at: now,
        };

        let edit = if continues {
            Edit::Replace(ch)
        } else {
            Edit::Append(ch)
        };
        Ok((next, edit))
    }

    /// Whether a tap of `key` at `now` continues the pending character.
    fn continues(&self, key: Digit, now: Instant, timeout: Millis) -> bool {
        match *self {
            DecoderState::Pending { key: last, at, .. } => last == key && now.since(at) <= timeout,
            DecoderState::Idle => false,
        }
    }

    pub fn pending_char(&self) -> Option<u8> {
        match *self {
            DecoderState::Pending { ch, .. } => Some(ch),
            DecoderState::Idle => None,
        }
    }
}

pub struct MultitapDecoder {
    keymap: &'static Keymap,
    timeout: Millis,
    state: DecoderState,
}

impl MultitapDecoder {
    /// Phone keymap with the default tap timeout.
    pub fn new() -> Self {
        Self::with_keymap(&PHONE, TAP_TIMEOUT)
    }

    pub const fn with_keymap(keymap: &'static Keymap, timeout: Millis) -> Self {
        Self {
            keymap,
            timeout,
            state: DecoderState::Idle,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Advance the state machine. On error the state is left untouched.
    pub fn feed(&mut self, event: KeyEvent, now: Instant) -> Result<Edit> {
        let (next, edit) = self
            .state
            .transition(event, now, self.keymap, self.timeout)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(?event, ?edit, state = ?next, "multitap transition");

        self.state = next;
        Ok(edit)
    }

    /// Drop the pending character so the next digit appends.
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
    }

    /// Feed `event` and apply the resulting edit to `buffer`.
    ///
    /// A rejected append resets the decoder, so a later tap of the same key
    /// cannot overwrite a cell it never wrote.
    pub fn enter<const ROWS: usize, const COLS: usize>(
        &mut self,
        event: KeyEvent,
        now: Instant,
        buffer: &mut TextBuffer<'_, ROWS, COLS>,
    ) -> Result<Edit> {
        let edit = self.feed(event, now)?;
        match edit {
            Edit::Append(ch) => {
                if let Err(e) = buffer.append(ch) {
                    self.reset();
                    return Err(e);
                }
            }
            Edit::Replace(ch) => {
                buffer.replace_last(ch);
            }
            Edit::Delete => {
                buffer.delete_last();
            }
            Edit::Nothing => {}
        }
        Ok(edit)
    }
}

impl Default for MultitapDecoder {
    fn default() -> Self {
        Self::new()
    }
}
