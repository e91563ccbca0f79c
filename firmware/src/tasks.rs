//! The two cooperative tasks of the firmware super-loop.
//!
//! There is no RTOS on this board. Each task keeps a wake-up deadline on the
//! millisecond tick and the main loop steps whichever tasks are due, which
//! gives the same "sleep, poll, act" shape as two RTOS tasks sharing the text
//! buffer. Both tasks run on one core, so the buffer needs no lock.

use multitap_core::hal::{Display, Keypad};
use multitap_core::scanner::Echo;
use multitap_core::{DirtySignal, Error, Instant, KeyScanner, Millis, MultitapDecoder, Renderer, TextBuffer, Timing};

/// Whether `deadline` has been reached, tolerant of tick rollover.
fn due(now: Instant, deadline: Instant) -> bool {
    (now.0.wrapping_sub(deadline.0) as i32) >= 0
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum InputState {
    /// Waiting for a press.
    Scanning,
    /// A press was handled; waiting for every input to release.
    Releasing,
}

/// Scans the keypad and feeds the decoder, which writes the buffer.
pub struct InputTask<K, E> {
    scanner: KeyScanner<K, E>,
    decoder: MultitapDecoder,
    timing: Timing,
    state: InputState,
    wake_at: Instant,
    /// Most recent rejected keystroke. Never reported, kept for inspection.
    last_error: Option<Error>,
}

impl<K: Keypad, E: Echo> InputTask<K, E> {
    pub fn new(scanner: KeyScanner<K, E>, decoder: MultitapDecoder, timing: Timing) -> Self {
        Self {
            scanner,
            decoder,
            timing,
            state: InputState::Scanning,
            wake_at: Instant::ZERO,
            last_error: None,
        }
    }

    /// Run one iteration if due. Returns whether the task ran.
    pub fn step<const ROWS: usize, const COLS: usize>(
        &mut self,
        now: Instant,
        buffer: &mut TextBuffer<'_, ROWS, COLS>,
    ) -> bool {
        if !due(now, self.wake_at) {
            return false;
        }

        match self.state {
            InputState::Scanning => {
                let event = self.scanner.poll();
                if event.is_none() {
                    self.sleep(now, self.timing.scan_interval);
                } else {
                    if let Err(e) = self.decoder.enter(event, now, buffer) {
                        self.last_error = Some(e);
                    }
                    self.state = InputState::Releasing;
                    self.sleep(now, self.timing.settle_delay);
                }
            }
            InputState::Releasing => {
                self.scanner.poll();
                if self.scanner.is_latched() {
                    let interval = self.scanner.release_interval(&self.timing);
                    self.sleep(now, interval);
                } else {
                    self.state = InputState::Scanning;
                    self.sleep(now, self.timing.scan_interval);
                }
            }
        }
        true
    }

    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    pub fn echo_mut(&mut self) -> &mut E {
        self.scanner.echo_mut()
    }

    fn sleep(&mut self, now: Instant, duration: Millis) {
        self.wake_at = now + duration;
    }
}

/// Redraws the display whenever the dirty signal is raised.
pub struct RenderTask<D> {
    renderer: Renderer<D>,
    interval: Millis,
    wake_at: Instant,
}

impl<D: Display> RenderTask<D> {
    pub fn new(display: D, interval: Millis) -> Self {
        Self {
            renderer: Renderer::new(display),
            interval,
            wake_at: Instant::ZERO,
        }
    }

    /// Run one iteration if due. Returns whether the task ran.
    pub fn step<const ROWS: usize, const COLS: usize>(
        &mut self,
        now: Instant,
        dirty: &DirtySignal,
        buffer: &TextBuffer<'_, ROWS, COLS>,
    ) -> bool {
        if !due(now, self.wake_at) {
            return false;
        }
        self.renderer.try_render(dirty, || buffer.snapshot());
        self.wake_at = now + self.interval;
        true
    }

    pub fn display_mut(&mut self) -> &mut D {
        self.renderer.display_mut()
    }

    pub fn frames(&self) -> u32 {
        self.renderer.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multitap_core::{Position, PHONE_PAD};
    use std::cell::Cell;

    struct FakeKeypad<'a> {
        pressed: &'a Cell<Option<Position>>,
        backspace: &'a Cell<bool>,
    }

    impl Keypad for FakeKeypad<'_> {
        fn scan_matrix(&mut self) -> Option<Position> {
            self.pressed.get()
        }

        fn backspace_active(&mut self) -> bool {
            self.backspace.get()
        }
    }

    #[derive(Default)]
    struct FakeLcd(Vec<String>);

    impl Display for FakeLcd {
        fn clear(&mut self) {
            self.0.clear();
        }

        fn write_row(&mut self, _row: usize, text: &str) {
            self.0.push(text.to_string());
        }
    }

    const TWO: Option<Position> = Some(Position::new(0, 1));
    const THREE: Option<Position> = Some(Position::new(0, 2));

    #[test]
    fn held_key_enters_one_character_and_gets_drawn() {
        let pressed = Cell::new(None);
        let backspace = Cell::new(false);
        let keypad = FakeKeypad {
            pressed: &pressed,
            backspace: &backspace,
        };
        let timing = Timing::default();
        let scanner = KeyScanner::with_layout(keypad, &PHONE_PAD, 1);
        let mut input = InputTask::new(scanner, MultitapDecoder::new(), timing);
        let mut render = RenderTask::new(FakeLcd::default(), timing.render_poll);

        let dirty = DirtySignal::new();
        let mut buffer = TextBuffer::<2, 8>::new(&dirty);

        // Press 2 for 300 ticks, release, then tap 2 again at 400
        for tick in 0..600u32 {
            pressed.set(match tick {
                10..=309 => TWO,
                400..=440 => TWO,
                _ => None,
            });
            let now = Instant(tick);
            input.step(now, &mut buffer);
            render.step(now, &dirty, &buffer);
        }

        assert_eq!(buffer.snapshot().row(0), "B");
        assert_eq!(render.display_mut().0, ["B"]);
        assert!(input.last_error().is_none());
    }

    #[test]
    fn quick_retaps_cycle_with_board_debounce() {
        let pressed = Cell::new(None);
        let backspace = Cell::new(false);
        let keypad = FakeKeypad {
            pressed: &pressed,
            backspace: &backspace,
        };
        let timing = Timing {
            debounce_threshold: 5,
            ..Timing::default()
        };
        let scanner = KeyScanner::with_layout(keypad, &PHONE_PAD, timing.debounce_threshold);
        let mut input = InputTask::new(scanner, MultitapDecoder::new(), timing);
        let dirty = DirtySignal::new();
        let mut buffer = TextBuffer::<2, 8>::new(&dirty);

        // Two 80ms taps on 2 with a 120ms gap, then three quick taps on 3
        for tick in 0..1500u32 {
            pressed.set(match tick {
                10..=89 | 210..=289 => TWO,
                1300..=1339 | 1400..=1439 | 1480..=1499 => THREE,
                _ => None,
            });
            input.step(Instant(tick), &mut buffer);
        }

        assert_eq!(buffer.snapshot().row(0), "BF");
        assert!(input.last_error().is_none());
    }

    #[test]
    fn backspace_button_deletes() {
        let pressed = Cell::new(None);
        let backspace = Cell::new(false);
        let keypad = FakeKeypad {
            pressed: &pressed,
            backspace: &backspace,
        };
        let timing = Timing::default();
        let mut input = InputTask::new(KeyScanner::new(keypad), MultitapDecoder::new(), timing);
        let dirty = DirtySignal::new();
        let mut buffer = TextBuffer::<2, 8>::new(&dirty);

        for tick in 0..400u32 {
            pressed.set(if (0..100).contains(&tick) { TWO } else { None });
            backspace.set((200..300).contains(&tick));
            input.step(Instant(tick), &mut buffer);
        }

        assert!(buffer.is_empty());
    }

    #[test]
    fn render_task_waits_for_its_interval() {
        let dirty = DirtySignal::new();
        let buffer = TextBuffer::<1, 4>::new(&dirty);
        let mut render = RenderTask::new(FakeLcd::default(), Millis(100));

        assert!(render.step(Instant(0), &dirty, &buffer));
        dirty.mark();
        assert!(!render.step(Instant(50), &dirty, &buffer));
        assert!(render.step(Instant(100), &dirty, &buffer));
        assert_eq!(render.frames(), 1);
    }

    #[test]
    fn deadlines_survive_tick_rollover() {
        assert!(due(Instant(5), Instant(u32::MAX - 5)));
        assert!(!due(Instant(u32::MAX - 5), Instant(5)));
    }
}
