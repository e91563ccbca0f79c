//! Text rendering of the keypad and the characters on each key.

use std::fmt::Write;

use multitap_core::key::PAD_COLS;
use multitap_core::{Keymap, KeypadLayout};

/// Width of one key cell, excluding borders.
const CELL: usize = 7;

/// Draw `layout` as a grid, each key showing its digit and character set.
pub fn keypad_table(layout: &KeypadLayout, keymap: &Keymap) -> String {
    let border = format!("+{}\n", format!("{}+", "-".repeat(CELL)).repeat(PAD_COLS));
    let mut out = border.clone();

    for row in layout.rows() {
        let mut labels = String::from("|");
        let mut sets = String::from("|");
        for key in row {
            match key {
                Some(digit) => {
                    let chars = String::from_utf8_lossy(keymap.set(*digit).chars());
                    let _ = write!(labels, " {:<w$}|", digit, w = CELL - 1);
                    let _ = write!(sets, " {:<w$}|", chars.replace(' ', "\u{2423}"), w = CELL - 1);
                }
                None => {
                    let _ = write!(labels, "{}|", " ".repeat(CELL));
                    let _ = write!(sets, "{}|", " ".repeat(CELL));
                }
            }
        }
        out.push_str(&labels);
        out.push('\n');
        out.push_str(&sets);
        out.push('\n');
        out.push_str(&border);
    }

    out
}
