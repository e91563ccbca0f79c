//! Shared text grid and its dirty signal.
//!
//! The input task is the only writer and the render task the only reader.
//! Every mutating call raises the [`DirtySignal`] as its last step; the
//! renderer takes the signal before it reads, so a write landing mid-redraw
//! leaves the signal raised and triggers another redraw. Repeated raises
//! coalesce: only "something changed since the last redraw" is kept.
//!
//! Content is always a prefix of the grid in row-major order: appends go to
//! the cursor and deletes remove the cell just before it.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// "Unseen change" flag between the input task and the render task.
pub struct DirtySignal(AtomicBool);

impl DirtySignal {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Record that the buffer changed.
    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set.
    #[cfg(target_has_atomic = "8")]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Clear the flag, returning whether it was set.
    ///
    /// Targets without atomic swap (AVR) run both tasks on one core with no
    /// preemption between the load and the store.
    #[cfg(not(target_has_atomic = "8"))]
    pub fn take(&self) -> bool {
        let was_set = self.0.load(Ordering::Acquire);
        if was_set {
            self.0.store(false, Ordering::Release);
        }
        was_set
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for DirtySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed grid of ASCII cells with a write cursor. `0` marks an empty cell.
pub struct TextBuffer<'s, const ROWS: usize, const COLS: usize> {
    cells: [[u8; COLS]; ROWS],
    /// Row of the next append. Equal to `ROWS` when the grid is full.
    row: usize,
    /// Column of the next append.
    col: usize,
    dirty: &'s DirtySignal,
}

impl<'s, const ROWS: usize, const COLS: usize> TextBuffer<'s, ROWS, COLS> {
    pub const CAPACITY: usize = ROWS * COLS;

    pub const fn new(dirty: &'s DirtySignal) -> Self {
        Self {
            cells: [[0; COLS]; ROWS],
            row: 0,
            col: 0,
            dirty,
        }
    }

    /// `(row, col)` of the next append.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.row * COLS + self.col
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.row >= ROWS
    }

    /// Write `ch` at the cursor and advance, wrapping to the next row.
    pub fn append(&mut self, ch: u8) -> Result<()> {
        let result = if self.is_full() {
            #[cfg(feature = "tracing")]
            tracing::warn!(capacity = Self::CAPACITY, "text buffer full, dropping character");
            Err(Error::InputOverflow)
        } else {
            self.cells[self.row][self.col] = ch;
            self.col += 1;
            if self.col == COLS {
                self.col = 0;
                self.row += 1;
            }
            Ok(())
        };
        self.mark_dirty();
        result
    }

    /// Overwrite the cell just before the cursor without moving it.
    /// Returns `false` when the buffer is empty.
    pub fn replace_last(&mut self, ch: u8) -> bool {
        let replaced = match self.previous() {
            Some((row, col)) => {
                self.cells[row][col] = ch;
                true
            }
            None => false,
        };
        self.mark_dirty();
        replaced
    }

    /// Step the cursor back one cell and clear it, wrapping to the end of the
    /// previous row. A no-op at the origin; returns whether a cell was removed.
    pub fn delete_last(&mut self) -> bool {
        let deleted = match self.previous() {
            Some((row, col)) => {
                self.cells[row][col] = 0;
                self.row = row;
                self.col = col;
                true
            }
            None => false,
        };
        self.mark_dirty();
        deleted
    }

    /// Empty the grid and home the cursor.
    pub fn clear(&mut self) {
        self.cells = [[0; COLS]; ROWS];
        self.row = 0;
        self.col = 0;
        self.mark_dirty();
    }

    pub fn mark_dirty(&self) {
        self.dirty.mark();
    }

    /// Most recently written character.
    pub fn last(&self) -> Option<u8> {
        self.previous().map(|(row, col)| self.cells[row][col])
    }

    /// Copy of the grid for rendering outside any lock.
    pub fn snapshot(&self) -> Frame<ROWS, COLS> {
        Frame { cells: self.cells }
    }

    fn previous(&self) -> Option<(usize, usize)> {
        if self.col > 0 {
            Some((self.row, self.col - 1))
        } else if self.row > 0 {
            Some((self.row - 1, COLS - 1))
        } else {
            None
        }
    }
}

/// Point-in-time copy of a [`TextBuffer`] grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Frame<const ROWS: usize, const COLS: usize> {
    cells: [[u8; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> Frame<ROWS, COLS> {
    pub const fn empty() -> Self {
        Self {
            cells: [[0; COLS]; ROWS],
        }
    }

    /// Text of row `row`, up to its first empty cell.
    pub fn row(&self, row: usize) -> &str {
        let cells = &self.cells[row];
        let end = cells.iter().position(|&c| c == 0).unwrap_or(COLS);
        match core::str::from_utf8(&cells[..end]) {
            Ok(text) => text,
            // Keymaps are ASCII; keep the valid prefix if that ever breaks
            Err(e) => core::str::from_utf8(&cells[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Rows from the top up to the first empty one.
    pub fn populated_rows(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        (0..ROWS)
            .map(move |r| (r, self.row(r)))
            .take_while(|(_, text)| !text.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.populated_rows().next().is_none()
    }
}

impl<const ROWS: usize, const COLS: usize> fmt::Display for Frame<ROWS, COLS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, text)) in self.populated_rows().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::string::ToString;

    type Grid<'s> = TextBuffer<'s, 2, 3>;

    #[test]
    fn append_wraps_rows_and_rejects_overflow() {
        let dirty = DirtySignal::new();
        let mut buf = Grid::new(&dirty);
        for ch in b"ABCDEF" {
            buf.append(*ch).unwrap();
        }
        assert_eq!(buf.cursor(), (2, 0));
        assert!(buf.is_full());
        assert_eq!(buf.append(b'G'), Err(Error::InputOverflow));
        assert_eq!(buf.snapshot().to_string(), "ABC\nDEF");
    }

    #[test]
    fn delete_at_origin_is_a_no_op() {
        let dirty = DirtySignal::new();
        let mut buf = Grid::new(&dirty);
        assert!(!buf.delete_last());
        assert!(!buf.delete_last());
        assert_eq!(buf.cursor(), (0, 0));
        assert!(buf.snapshot().is_empty());
    }

    #[test]
    fn backspace_removes_last_character() {
        let dirty = DirtySignal::new();
        let mut buf = Grid::new(&dirty);
        buf.append(b'A').unwrap();
        buf.append(b'B').unwrap();
        assert!(buf.delete_last());
        assert_eq!(buf.snapshot().row(0), "A");
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.cursor(), (0, 1));
    }

    #[test]
    fn delete_wraps_to_previous_row() {
        let dirty = DirtySignal::new();
        let mut buf = Grid::new(&dirty);
        for ch in b"ABCD" {
            buf.append(*ch).unwrap();
        }
        assert!(buf.delete_last());
        assert!(buf.delete_last());
        assert_eq!(buf.cursor(), (0, 2));
        assert_eq!(buf.snapshot().to_string(), "AB");
    }

    #[test]
    fn replace_last_keeps_cursor() {
        let dirty = DirtySignal::new();
        let mut buf = Grid::new(&dirty);
        assert!(!buf.replace_last(b'X'));
        for ch in b"ABC" {
            buf.append(*ch).unwrap();
        }
        assert!(buf.replace_last(b'Z'));
        assert_eq!(buf.cursor(), (1, 0));
        assert_eq!(buf.last(), Some(b'Z'));
    }

    #[test]
    fn take_clears_and_marks_coalesce() {
        let dirty = DirtySignal::new();
        let mut buf = Grid::new(&dirty);
        buf.append(b'A').unwrap();
        buf.append(b'B').unwrap();
        assert!(dirty.take());
        assert!(!dirty.take());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append(u8),
        Replace(u8),
        Delete,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (b'A'..=b'Z').prop_map(Op::Append),
            (b'A'..=b'Z').prop_map(Op::Replace),
            Just(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn every_call_marks_dirty_and_content_stays_a_prefix(ops in prop::collection::vec(op(), 0..40)) {
            let dirty = DirtySignal::new();
            let mut buf = TextBuffer::<3, 4>::new(&dirty);
            let mut model: std::vec::Vec<u8> = std::vec::Vec::new();

            for op in ops {
                match op {
                    Op::Append(c) => {
                        let accepted = buf.append(c).is_ok();
                        prop_assert_eq!(accepted, model.len() < 12);
                        if accepted {
                            model.push(c);
                        }
                    }
                    Op::Replace(c) => {
                        prop_assert_eq!(buf.replace_last(c), !model.is_empty());
                        if let Some(last) = model.last_mut() {
                            *last = c;
                        }
                    }
                    Op::Delete => {
                        prop_assert_eq!(buf.delete_last(), model.pop().is_some());
                    }
                }
                prop_assert!(dirty.take());
                prop_assert_eq!(buf.len(), model.len());
            }

            let frame = buf.snapshot();
            let rendered: std::string::String = frame.populated_rows().map(|(_, t)| t).collect();
            prop_assert_eq!(rendered.as_bytes(), &model[..]);
        }
    }
}
