//! Redraws the text grid whenever the dirty signal is raised.

use crate::buffer::{DirtySignal, Frame};
use crate::hal::{Display, Sleep};
use crate::time::Millis;

pub struct Renderer<D> {
    display: D,
    /// Completed redraws, wrapping.
    frames: u32,
}

impl<D: Display> Renderer<D> {
    pub const fn new(display: D) -> Self {
        Self { display, frames: 0 }
    }

    /// Clear the display and write every populated row of `frame`.
    /// Returns the number of rows written.
    pub fn redraw<const ROWS: usize, const COLS: usize>(&mut self, frame: &Frame<ROWS, COLS>) -> usize {
        self.display.clear();
        let mut written = 0;
        for (row, text) in frame.populated_rows() {
            self.display.write_row(row, text);
            written += 1;
        }
        self.frames = self.frames.wrapping_add(1);

        #[cfg(feature = "tracing")]
        tracing::trace!(rows = written, frame = self.frames, "redraw");

        written
    }

    /// Redraw once if the signal is raised. Never blocks.
    ///
    /// The signal is taken before `read` runs: a write that lands during the
    /// redraw raises it again and is picked up by the next call.
    pub fn try_render<const ROWS: usize, const COLS: usize, F>(&mut self, dirty: &DirtySignal, read: F) -> bool
    where
        F: FnOnce() -> Frame<ROWS, COLS>,
    {
        if !dirty.take() {
            return false;
        }
        let frame = read();
        self.redraw(&frame);
        true
    }

    /// Sleep in `interval` steps until the signal is raised, then redraw.
    pub fn poll_and_render<const ROWS: usize, const COLS: usize, S, F>(
        &mut self,
        dirty: &DirtySignal,
        sleep: &mut S,
        interval: Millis,
        read: F,
    ) where
        S: Sleep,
        F: FnOnce() -> Frame<ROWS, COLS>,
    {
        while !dirty.take() {
            sleep.sleep(interval);
        }
        let frame = read();
        self.redraw(&frame);
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use std::string::{String, ToString};
    use std::vec::Vec;

    #[derive(Default)]
    struct FakeLcd {
        rows: Vec<(usize, String)>,
        clears: usize,
    }

    impl Display for FakeLcd {
        fn clear(&mut self) {
            self.rows.clear();
            self.clears += 1;
        }

        fn write_row(&mut self, row: usize, text: &str) {
            self.rows.push((row, text.to_string()));
        }
    }

    struct CountingSleep(u32);

    impl Sleep for CountingSleep {
        fn sleep(&mut self, _duration: Millis) {
            self.0 += 1;
        }
    }

    #[test]
    fn nothing_drawn_until_dirty() {
        let dirty = DirtySignal::new();
        let buf = TextBuffer::<2, 4>::new(&dirty);
        let mut renderer = Renderer::new(FakeLcd::default());
        assert!(!renderer.try_render(&dirty, || buf.snapshot()));
        assert_eq!(renderer.display().clears, 0);
    }

    #[test]
    fn redraws_populated_rows_and_clears_signal() {
        let dirty = DirtySignal::new();
        let mut buf = TextBuffer::<3, 4>::new(&dirty);
        for ch in b"HELLO" {
            buf.append(*ch).unwrap();
        }

        let mut renderer = Renderer::new(FakeLcd::default());
        assert!(renderer.try_render(&dirty, || buf.snapshot()));
        assert!(!dirty.is_set());
        assert_eq!(
            renderer.display().rows,
            [(0, "HELL".to_string()), (1, "O".to_string())]
        );
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn empty_buffer_draws_blank_screen() {
        let dirty = DirtySignal::new();
        let mut buf = TextBuffer::<2, 4>::new(&dirty);
        buf.append(b'A').unwrap();
        buf.delete_last();

        let mut renderer = Renderer::new(FakeLcd::default());
        assert!(renderer.try_render(&dirty, || buf.snapshot()));
        assert_eq!(renderer.display().clears, 1);
        assert!(renderer.display().rows.is_empty());
    }

    #[test]
    fn poll_sleeps_until_signal() {
        let dirty = DirtySignal::new();
        let mut renderer = Renderer::new(FakeLcd::default());
        let mut sleep = CountingSleep(0);

        dirty.mark();
        renderer.poll_and_render(&dirty, &mut sleep, Millis(100), Frame::<2, 4>::empty);
        assert_eq!(sleep.0, 0);
        assert_eq!(renderer.frames(), 1);
    }
}
