//! Offline decoding of a key script on a virtual timeline.

use multitap_core::config::{LCD_COLS, LCD_ROWS};
use multitap_core::{DirtySignal, Frame, Instant, MultitapDecoder, TextBuffer, Timing};
use multitap_core::{Keymap, Millis, PHONE};

use crate::script::Step;

/// Result of replaying a script.
pub struct Decoded {
    pub frame: Frame<LCD_ROWS, LCD_COLS>,
    /// Presses the buffer or keymap rejected.
    pub rejected: usize,
}

/// Feed every press to the decoder at the time it would occur on the device.
pub fn replay(steps: &[Step], timing: &Timing, gap: Millis) -> Decoded {
    replay_with(steps, &PHONE, timing, gap)
}

pub fn replay_with(steps: &[Step], keymap: &'static Keymap, timing: &Timing, gap: Millis) -> Decoded {
    let dirty = DirtySignal::new();
    let mut buffer = TextBuffer::<LCD_ROWS, LCD_COLS>::new(&dirty);
    let mut decoder = MultitapDecoder::with_keymap(keymap, timing.tap_timeout);
    let mut now = Instant::ZERO;
    let mut rejected = 0;

    for step in steps {
        match *step {
            Step::Press { key, hold } => {
                if let Err(e) = decoder.enter(key, now, &mut buffer) {
                    tracing::warn!(at = now.0, ?key, "rejected: {}", e);
                    rejected += 1;
                }
                now = now + hold + gap;
            }
            Step::Wait(ms) => now = now + ms,
        }
    }

    Decoded {
        frame: buffer.snapshot(),
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{parse, DEFAULT_GAP};
    use multitap_core::CharacterSet;

    fn text(script: &str) -> String {
        let steps = parse(script).unwrap();
        replay(&steps, &Timing::default(), DEFAULT_GAP).frame.to_string()
    }

    #[test]
    fn hello() {
        assert_eq!(text("44 33 555 w1200 555 666"), "HELLO");
    }

    #[test]
    fn cycling_wraps_to_digit_then_letter() {
        assert_eq!(text("2222"), "2");
        assert_eq!(text("22222"), "A");
    }

    #[test]
    fn pause_splits_same_key() {
        assert_eq!(text("2 w1500 2"), "AA");
    }

    #[test]
    fn backspace_after_pending() {
        assert_eq!(text("2 w1500 22 <"), "A");
        assert_eq!(text("< < 3"), "D");
    }

    #[test]
    fn long_text_wraps_onto_second_row() {
        let script = "2 w1100 ".repeat(LCD_COLS + 2);
        assert_eq!(text(&script), format!("{}\nAA", "A".repeat(LCD_COLS)));
    }

    static NO_ONES: Keymap = Keymap::new([
        CharacterSet::new(b" 0"),
        CharacterSet::EMPTY,
        CharacterSet::new(b"ABC2"),
        CharacterSet::new(b"DEF3"),
        CharacterSet::new(b"GHI4"),
        CharacterSet::new(b"JKL5"),
        CharacterSet::new(b"MNO6"),
        CharacterSet::new(b"PQRS7"),
        CharacterSet::new(b"TUV8"),
        CharacterSet::new(b"WXYZ9"),
    ]);

    #[test]
    fn undefined_sets_are_counted() {
        let steps = parse("1 2 1").unwrap();
        let decoded = replay_with(&steps, &NO_ONES, &Timing::default(), DEFAULT_GAP);
        assert_eq!(decoded.rejected, 2);
        assert_eq!(decoded.frame.to_string(), "A");
    }
}
