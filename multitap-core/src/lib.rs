//! Keypad text entry core: matrix scan with repeat suppression, multi-tap
//! decoding, and the shared text grid an independent render task redraws.
//!
//! This crate is `no_std` so it can be used by both the AVR firmware and the
//! native CLI simulator.
//!
//! Data flows one way:
//!
//! ```text
//! KeyScanner -> KeyEvent -> MultitapDecoder -> Edit -> TextBuffer -> DirtySignal -> Renderer
//! ```
//!
//! The input task owns the scanner and decoder and is the only writer of the
//! buffer. The render task only reads. The dirty signal is the sole
//! handshake between them.

#![cfg_attr(not(test), no_std)]

pub mod buffer;
pub mod config;
pub mod debounce;
pub mod decoder;
pub mod error;
pub mod hal;
pub mod key;
pub mod keymap;
pub mod render;
pub mod scanner;
pub mod segment;
pub mod time;

pub use buffer::{DirtySignal, Frame, TextBuffer};
pub use config::Timing;
pub use decoder::{DecoderState, Edit, MultitapDecoder};
pub use error::{Error, Result};
pub use key::{Digit, KeyEvent, KeypadLayout, Position, PHONE_PAD};
pub use keymap::{CharacterSet, Keymap, PHONE};
pub use render::Renderer;
pub use scanner::{Echo, KeyScanner, NoEcho, Sample};
pub use time::{Instant, Millis};
