//! Timing and geometry constants.

use crate::time::Millis;

/// Longest gap between taps of the same key that still cycles the pending
/// character instead of starting a new one.
pub const TAP_TIMEOUT: Millis = Millis(1000);

/// Delay between idle keypad scans.
pub const SCAN_INTERVAL: Millis = Millis(1);

/// Pause after an accepted key event before release polling starts.
pub const SETTLE_DELAY: Millis = Millis(50);

/// Interval between release checks while a key is held.
pub const RELEASE_POLL: Millis = Millis(50);

/// Interval between dirty-signal checks in the render task.
pub const RENDER_POLL: Millis = Millis(100);

/// Consecutive identical samples required before a reading is accepted.
/// 1 disables filtering; the firmware raises it for its 1ms scan loop.
pub const DEBOUNCE_THRESHOLD: u8 = 1;

/// Text rows on the 128x64 panel with an 8x8 font.
pub const LCD_ROWS: usize = 8;
/// Text columns on the 128x64 panel with an 8x8 font.
pub const LCD_COLS: usize = 16;

/// Run-time timing knobs. `Default` yields the constants above.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    pub tap_timeout: Millis,
    pub scan_interval: Millis,
    pub settle_delay: Millis,
    pub release_poll: Millis,
    pub render_poll: Millis,
    pub debounce_threshold: u8,
}

impl Timing {
    pub const DEFAULT: Timing = Timing {
        tap_timeout: TAP_TIMEOUT,
        scan_interval: SCAN_INTERVAL,
        settle_delay: SETTLE_DELAY,
        release_poll: RELEASE_POLL,
        render_poll: RENDER_POLL,
        debounce_threshold: DEBOUNCE_THRESHOLD,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}
