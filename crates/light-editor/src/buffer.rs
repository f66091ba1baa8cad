//! Text buffer: bounded rows of bounded lines.
//!
//! A `Buffer` is an arena of byte lines indexed by row. It always holds
//! `row_count` *used* rows plus one *append row* at index `row_count`: the
//! line the cursor lands on past the end of the document. Typing into the
//! append row does not count it as used; pressing Enter there does.
//!
//! # Limits
//!
//! - A line holds at most [`MAX_COLS`] bytes.
//! - The buffer holds at most [`MAX_ROWS`] used rows.
//!
//! Every operation that grows a line or the row count checks the limit first
//! and returns an [`EditError`] instead of truncating. The caller treats both
//! errors as fatal (scratch save, then exit).
//!
//! # Cursor
//!
//! The buffer does not own the cursor. Editing primitives take it by
//! `&mut` because each one defines where the cursor ends up; on return the
//! cursor invariant `row <= row_count && col <= len(line[row])` holds.
//!
//! Columns are byte offsets. There is no Unicode-aware column arithmetic.

use std::fmt;

use thiserror::Error;

use crate::cursor::Cursor;

/// Maximum bytes per line.
pub const MAX_COLS: usize = 1024;

/// Maximum number of used rows.
pub const MAX_ROWS: usize = 65535;

/// Width of the indent inserted by [`Buffer::indent_current_row`].
pub const INDENT: &[u8] = b"    ";

/// An edit that would break a buffer limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    /// A line would grow past [`MAX_COLS`].
    #[error("row {row} would grow to {len} columns, beyond the limit of {limit}", limit = MAX_COLS)]
    RowOverflow { row: usize, len: usize },

    /// The buffer would grow past its row capacity.
    #[error("buffer would grow to {rows} rows, the limit is {limit}", limit = MAX_ROWS)]
    BufferOverflow { rows: usize },
}

/// Bounded line buffer with an append row.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    /// Always `row_count + 1` entries; the last one is the append row.
    lines: Vec<Vec<u8>>,
    row_count: usize,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer: no used rows, an empty append row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
            row_count: 0,
        }
    }

    /// A buffer whose used rows are `lines`.
    ///
    /// Lines longer than [`MAX_COLS`] are cut and rows past [`MAX_ROWS`] are
    /// dropped. Loading from disk applies its own, stricter limits first.
    #[must_use]
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        let mut rows: Vec<Vec<u8>> = lines
            .into_iter()
            .take(MAX_ROWS)
            .map(|line| {
                let mut line = line.into();
                line.truncate(MAX_COLS);
                line
            })
            .collect();
        let row_count = rows.len();
        rows.push(Vec::new());
        Self {
            lines: rows,
            row_count,
        }
    }

    // -- Access -------------------------------------------------------------

    /// Number of used rows.
    #[inline]
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when no row is used.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// The line at `row`. Rows past the append row read as empty.
    #[must_use]
    pub fn line(&self, row: usize) -> &[u8] {
        self.lines.get(row).map_or(&[], Vec::as_slice)
    }

    /// Length in bytes of the line at `row`.
    #[inline]
    #[must_use]
    pub fn line_len(&self, row: usize) -> usize {
        self.line(row).len()
    }

    /// The used rows, in order.
    pub fn used_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.lines[..self.row_count].iter().map(Vec::as_slice)
    }

    /// The last used row, if any.
    #[must_use]
    pub fn last_used_row(&self) -> Option<&[u8]> {
        self.row_count.checked_sub(1).map(|row| self.line(row))
    }

    /// Whether another row can be added.
    #[inline]
    #[must_use]
    pub const fn has_room(&self) -> bool {
        self.row_count < MAX_ROWS - 1
    }

    // -- Character editing --------------------------------------------------

    /// Insert `ch` at the cursor and advance it by one.
    ///
    /// Mid-line inserts shift the suffix right by one.
    ///
    /// # Errors
    ///
    /// [`EditError::RowOverflow`] if the line is already [`MAX_COLS`] long.
    pub fn insert_char(&mut self, cursor: &mut Cursor, ch: u8) -> Result<(), EditError> {
        let row = cursor.row;
        let line = &mut self.lines[row];
        if line.len() >= MAX_COLS {
            return Err(EditError::RowOverflow {
                row,
                len: line.len() + 1,
            });
        }

        let col = cursor.col.min(line.len());
        line.insert(col, ch);
        cursor.col = col + 1;
        Ok(())
    }

    /// Remove the byte before the cursor (Backspace). No-op at column 0;
    /// lines are never joined.
    pub fn delete_char_before(&mut self, cursor: &mut Cursor) {
        let line = &mut self.lines[cursor.row];
        let col = cursor.col.min(line.len());
        if col == 0 {
            return;
        }
        line.remove(col - 1);
        cursor.col = col - 1;
    }

    // -- Row editing --------------------------------------------------------

    /// Split the line at the cursor (Enter).
    ///
    /// The suffix from the cursor column moves into a new row below, every
    /// later row (append row included) shifts down by one, and the cursor
    /// lands at the start of the new row.
    ///
    /// # Errors
    ///
    /// [`EditError::BufferOverflow`] when the buffer is at capacity.
    pub fn split_line(&mut self, cursor: &mut Cursor) -> Result<(), EditError> {
        if !self.has_room() {
            return Err(EditError::BufferOverflow {
                rows: self.row_count + 1,
            });
        }

        let row = cursor.row;
        let col = cursor.col.min(self.lines[row].len());
        let tail = self.lines[row].split_off(col);
        self.lines.insert(row + 1, tail);
        self.row_count += 1;

        cursor.row = row + 1;
        cursor.col = 0;
        Ok(())
    }

    /// Open an empty row at the cursor, pushing the current row down
    /// (Ctrl+O). No-op at capacity.
    pub fn insert_row_above(&mut self, cursor: &mut Cursor) {
        if !self.has_room() {
            return;
        }
        self.lines.insert(cursor.row, Vec::new());
        self.row_count += 1;
        cursor.col = 0;
    }

    /// Open an empty row below the cursor and move onto it (Ctrl+L).
    /// No-op at capacity.
    pub fn insert_row_below(&mut self, cursor: &mut Cursor) {
        if !self.has_room() {
            return;
        }
        cursor.row += 1;
        self.insert_row_above(cursor);
    }

    /// Empty the line at `row` without removing it.
    pub fn clear_row(&mut self, row: usize) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear();
        }
    }

    /// Empty the cursor's line (Ctrl+X). No-op on an empty buffer.
    pub fn clear_current_row(&mut self, cursor: &mut Cursor) {
        if self.is_empty() {
            return;
        }
        self.clear_row(cursor.row);
        cursor.col = 0;
    }

    /// Remove the cursor's row, pulling later rows up (Ctrl+D). No-op on an
    /// empty buffer.
    ///
    /// Deleting the append row promotes the last used row to append row.
    pub fn delete_current_row(&mut self, cursor: &mut Cursor) {
        if self.is_empty() {
            return;
        }
        self.lines.remove(cursor.row);
        self.row_count -= 1;
        cursor.clamp(self);
    }

    /// Prefix the cursor's line with [`INDENT`] and move to its end
    /// (Ctrl+T). No-op on an empty buffer.
    ///
    /// # Errors
    ///
    /// [`EditError::RowOverflow`] if the indented line would exceed
    /// [`MAX_COLS`].
    pub fn indent_current_row(&mut self, cursor: &mut Cursor) -> Result<(), EditError> {
        if self.is_empty() {
            return Ok(());
        }

        let row = cursor.row;
        let line = &mut self.lines[row];
        let len = line.len() + INDENT.len();
        if len > MAX_COLS {
            return Err(EditError::RowOverflow { row, len });
        }

        line.splice(0..0, INDENT.iter().copied());
        cursor.col = len;
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("row_count", &self.row_count)
            .field("append_row_len", &self.line_len(self.row_count))
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
