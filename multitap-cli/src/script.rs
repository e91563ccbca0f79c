//! Key script parsing.
//!
//! Scripts are whitespace-separated tokens:
//!
//! - `0`..`9`: press a digit. A run like `555` is three separate presses.
//! - `<` or `bs`: press backspace.
//! - `w<ms>` or `wait:<ms>`: pause without touching the keypad.
//! - `hold:<ms>`: hold time for the presses that follow.
//!
//! `#` starts a comment that runs to the end of the line.

use anyhow::{bail, Context, Result};
use multitap_core::{KeyEvent, Millis};

/// How long each key is held down unless a script says otherwise.
pub const DEFAULT_HOLD: Millis = Millis(80);
/// Pause between releasing one key and pressing the next.
pub const DEFAULT_GAP: Millis = Millis(120);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Press { key: KeyEvent, hold: Millis },
    Wait(Millis),
}

/// Parse `src` into steps.
pub fn parse(src: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut hold = DEFAULT_HOLD;

    for (line_no, line) in src.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        for token in line.split_whitespace() {
            parse_token(token, &mut hold, &mut steps)
                .with_context(|| format!("line {}: bad token {:?}", line_no + 1, token))?;
        }
    }

    Ok(steps)
}

fn parse_token(token: &str, hold: &mut Millis, steps: &mut Vec<Step>) -> Result<()> {
    if token == "<" || token.eq_ignore_ascii_case("bs") {
        steps.push(Step::Press {
            key: KeyEvent::Backspace,
            hold: *hold,
        });
    } else if let Some(ms) = token.strip_prefix("hold:") {
        *hold = parse_millis(ms)?;
    } else if let Some(ms) = token.strip_prefix("wait:").or_else(|| token.strip_prefix('w')) {
        steps.push(Step::Wait(parse_millis(ms)?));
    } else if token.bytes().all(|b| b.is_ascii_digit()) {
        for b in token.bytes() {
            steps.push(Step::Press {
                key: KeyEvent::digit(b - b'0'),
                hold: *hold,
            });
        }
    } else {
        bail!("expected a digit run, `<`, `w<ms>` or `hold:<ms>`");
    }
    Ok(())
}

fn parse_millis(text: &str) -> Result<Millis> {
    let ms = text
        .trim_end_matches("ms")
        .parse::<u32>()
        .with_context(|| format!("{:?} is not a millisecond count", text))?;
    Ok(Millis(ms))
}

/// Total playback time of `steps` with `gap` after each release.
pub fn duration(steps: &[Step], gap: Millis) -> Millis {
    let total = steps.iter().fold(0u32, |acc, step| {
        let span = match *step {
            Step::Press { hold, .. } => hold.0.saturating_add(gap.0),
            Step::Wait(ms) => ms.0,
        };
        acc.saturating_add(span)
    });
    Millis(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(n: u8) -> Step {
        Step::Press {
            key: KeyEvent::digit(n),
            hold: DEFAULT_HOLD,
        }
    }

    #[test]
    fn digit_runs_expand_to_presses() {
        assert_eq!(parse("22 3").unwrap(), [press(2), press(2), press(3)]);
    }

    #[test]
    fn waits_backspace_and_comments() {
        let steps = parse("2 w1200 # pause\n< wait:50ms bs").unwrap();
        assert_eq!(
            steps,
            [
                press(2),
                Step::Wait(Millis(1200)),
                Step::Press {
                    key: KeyEvent::Backspace,
                    hold: DEFAULT_HOLD
                },
                Step::Wait(Millis(50)),
                Step::Press {
                    key: KeyEvent::Backspace,
                    hold: DEFAULT_HOLD
                },
            ]
        );
    }

    #[test]
    fn hold_applies_to_following_presses() {
        let steps = parse("1 hold:300 1").unwrap();
        assert_eq!(
            steps[1],
            Step::Press {
                key: KeyEvent::digit(1),
                hold: Millis(300)
            }
        );
    }

    #[test]
    fn rejects_garbage_with_line_number() {
        let err = parse("2\n2 x").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(parse("wabc").is_err());
    }

    #[test]
    fn playback_duration() {
        let steps = parse("2 w1000 3").unwrap();
        assert_eq!(duration(&steps, Millis(20)), Millis(100 + 1000 + 100));
    }
}
