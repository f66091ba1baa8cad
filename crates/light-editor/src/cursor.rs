//! Cursor: the (row, col) insertion point and its movement rules.
//!
//! The cursor is a plain value. It does not reference the buffer; every
//! movement takes the buffer as a parameter and leaves the cursor inside it:
//!
//! - `row` is in `0..=row_count` (the append row is a legal stop)
//! - `col` is in `0..=len(line[row])`
//!
//! Vertical movement re-clamps the column to the new line's length. There is
//! no sticky column.

use std::fmt;

use crate::buffer::{Buffer, MAX_COLS};

/// Arrow-key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cursor in a [`Buffer`]. Both coordinates are 0-indexed bytes.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub(crate) row: usize,
    pub(crate) col: usize,
}

impl Cursor {
    /// The origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { row: 0, col: 0 }
    }

    /// A cursor at `(row, col)`. Not validated; see [`clamp`](Self::clamp).
    #[must_use]
    pub const fn at(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Current row.
    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Current column.
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.col
    }

    /// True if the cursor satisfies the buffer invariant.
    #[must_use]
    pub fn is_within(&self, buf: &Buffer) -> bool {
        self.row <= buf.row_count() && self.col <= buf.line_len(self.row)
    }

    /// Pull the cursor back inside `buf`: row first, then column.
    pub fn clamp(&mut self, buf: &Buffer) {
        self.row = self.row.min(buf.row_count());
        self.col = self.col.min(buf.line_len(self.row));
    }

    // -- Arrow keys ---------------------------------------------------------

    /// Move one step in `dir`.
    ///
    /// Up/Down stay within `0..=row_count` and re-clamp the column.
    /// Left/Right stay within `0..=min(len, MAX_COLS - 1)` and never change
    /// the row.
    pub fn move_in(&mut self, dir: Direction, buf: &Buffer) {
        match dir {
            Direction::Up => {
                self.row = self.row.saturating_sub(1);
                self.clamp(buf);
            }
            Direction::Down => {
                if self.row < buf.row_count() {
                    self.row += 1;
                }
                self.clamp(buf);
            }
            Direction::Left => {
                self.col = self.col.saturating_sub(1);
            }
            Direction::Right => {
                let limit = buf.line_len(self.row).min(MAX_COLS - 1);
                if self.col < limit {
                    self.col += 1;
                }
            }
        }
    }

    // -- Jumps --------------------------------------------------------------

    /// Column 0 (Ctrl+B).
    pub const fn to_line_start(&mut self) {
        self.col = 0;
    }

    /// Just past the last byte (Ctrl+E).
    pub fn to_line_end(&mut self, buf: &Buffer) {
        self.col = buf.line_len(self.row);
    }

    /// First row (Ctrl+W).
    pub fn to_first_row(&mut self, buf: &Buffer) {
        self.to_row(0, buf);
    }

    /// The append row (Ctrl+A).
    pub fn to_append_row(&mut self, buf: &Buffer) {
        self.to_row(buf.row_count(), buf);
    }

    /// Jump to `row`, keeping the column where the new line allows.
    pub fn to_row(&mut self, row: usize, buf: &Buffer) {
        self.row = row;
        self.clamp(buf);
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({}:{})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn buf() -> Buffer {
        Buffer::from_lines(["hello", "hi", "", "world!"])
    }

    #[test]
    fn new_is_origin() {
        assert_eq!(Cursor::new(), Cursor::at(0, 0));
        assert_eq!(Cursor::default(), Cursor::new());
    }

    #[test]
    fn up_clamps_at_top() {
        let b = buf();
        let mut c = Cursor::at(0, 3);
        c.move_in(Direction::Up, &b);
        assert_eq!(c, Cursor::at(0, 3));
    }

    #[test]
    fn down_reaches_append_row_and_stops() {
        let b = buf();
        let mut c = Cursor::at(3, 6);
        c.move_in(Direction::Down, &b);
        assert_eq!(c, Cursor::at(4, 0));
        c.move_in(Direction::Down, &b);
        assert_eq!(c, Cursor::at(4, 0));
    }

    #[test]
    fn vertical_move_reclamps_col() {
        let b = buf();
        let mut c = Cursor::at(0, 5);
        c.move_in(Direction::Down, &b);
        assert_eq!(c, Cursor::at(1, 2));
        c.move_in(Direction::Down, &b);
        assert_eq!(c, Cursor::at(2, 0));
        // No sticky column: coming back keeps the clamped column.
        c.move_in(Direction::Up, &b);
        c.move_in(Direction::Up, &b);
        assert_eq!(c, Cursor::at(0, 0));
    }

    #[test]
    fn left_stops_at_zero() {
        let b = buf();
        let mut c = Cursor::at(1, 1);
        c.move_in(Direction::Left, &b);
        c.move_in(Direction::Left, &b);
        assert_eq!(c, Cursor::at(1, 0));
    }

    #[test]
    fn right_stops_at_line_end() {
        let b = buf();
        let mut c = Cursor::at(1, 1);
        c.move_in(Direction::Right, &b);
        c.move_in(Direction::Right, &b);
        assert_eq!(c, Cursor::at(1, 2));
    }

    #[test]
    fn right_stops_before_max_cols_on_full_line() {
        let b = Buffer::from_lines([vec![b'x'; MAX_COLS]]);
        let mut c = Cursor::at(0, MAX_COLS - 2);
        c.move_in(Direction::Right, &b);
        c.move_in(Direction::Right, &b);
        assert_eq!(c.col(), MAX_COLS - 1);
    }

    #[test]
    fn line_start_and_end() {
        let b = buf();
        let mut c = Cursor::at(3, 2);
        c.to_line_end(&b);
        assert_eq!(c.col(), 6);
        c.to_line_start();
        assert_eq!(c.col(), 0);
    }

    #[test]
    fn first_and_append_row_reclamp() {
        let b = buf();
        let mut c = Cursor::at(3, 6);
        c.to_first_row(&b);
        assert_eq!(c, Cursor::at(0, 5));
        c.to_append_row(&b);
        assert_eq!(c, Cursor::at(4, 0));
    }

    #[test]
    fn clamp_repairs_both_axes() {
        let b = buf();
        let mut c = Cursor::at(40, 40);
        assert!(!c.is_within(&b));
        c.clamp(&b);
        assert_eq!(c, Cursor::at(4, 0));
        assert!(c.is_within(&b));
    }

    #[test]
    fn every_move_keeps_invariant() {
        let b = buf();
        let dirs = [
            Direction::Down,
            Direction::Right,
            Direction::Right,
            Direction::Right,
            Direction::Down,
            Direction::Up,
            Direction::Left,
            Direction::Down,
            Direction::Down,
            Direction::Down,
            Direction::Right,
        ];
        let mut c = Cursor::new();
        for dir in dirs {
            c.move_in(dir, &b);
            assert!(c.is_within(&b), "{c:?} after {dir:?}");
        }
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Cursor::at(2, 7)), "Cursor(2:7)");
    }
}
