//! View: the buffer rendered as one terminal frame.
//!
//! Every keystroke repaints the whole screen, so rendering is a pure
//! function from `(buffer, cursor, height)` to bytes:
//!
//! ```text
//!   1: first line
//!   2: sec█nd line        <- cursor row: inverse gutter, inverse byte
//!   3:                    <- append row
//! ```
//!
//! The window follows the cursor. Near the top it shows everything above the
//! cursor; further down the cursor sits in the middle of the screen. Rows
//! outside the window are simply not emitted.

use std::ops::RangeInclusive;

use light_term::ansi::{Attr, SGR_RESET};

use crate::buffer::Buffer;
use crate::cursor::Cursor;

/// Attributes for the cursor row's line number.
const GUTTER_ATTR: Attr = Attr::INVERSE;

/// Attributes for the byte under the cursor.
const CURSOR_ATTR: Attr = Attr::INVERSE.union(Attr::BOLD);

/// The rows that fit on screen around the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row.
    pub first: usize,
    /// Last visible row, inclusive. Never past the append row.
    pub last: usize,
}

impl Viewport {
    /// The window for a cursor on `cursor_row` in a buffer of `row_count`
    /// used rows, on a screen `height` rows tall.
    #[must_use]
    pub fn compute(cursor_row: usize, row_count: usize, height: usize) -> Self {
        let half = height / 2;
        let above = if cursor_row < half {
            cursor_row + 1
        } else {
            half
        };
        let below = height.saturating_sub(above + 1);

        Self {
            first: cursor_row.saturating_sub(above),
            last: (cursor_row + below).min(row_count),
        }
    }

    /// Visible rows, in order.
    #[must_use]
    pub const fn rows(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Render the visible part of `buf` into a frame.
///
/// Each row is `"NNN: "` followed by the raw line bytes and `\n`. The cursor
/// row's number is drawn in inverse video, as is the byte at the cursor
/// column. A cursor at end of line highlights nothing.
#[must_use]
pub fn render(buf: &Buffer, cursor: &Cursor, height: usize) -> Vec<u8> {
    let view = Viewport::compute(cursor.row(), buf.row_count(), height);
    let mut out = Vec::with_capacity(height * 16);

    for row in view.rows() {
        let line = buf.line(row);
        let gutter = format!("{:>3}: ", row + 1);

        if row != cursor.row() {
            out.extend_from_slice(gutter.as_bytes());
            out.extend_from_slice(line);
            out.push(b'\n');
            continue;
        }

        GUTTER_ATTR.push_sgr(&mut out);
        out.extend_from_slice(gutter.as_bytes());
        out.extend_from_slice(SGR_RESET);

        let col = cursor.col();
        match line.get(col) {
            Some(&byte) => {
                out.extend_from_slice(&line[..col]);
                CURSOR_ATTR.push_sgr(&mut out);
                out.push(byte);
                out.extend_from_slice(SGR_RESET);
                out.extend_from_slice(&line[col + 1..]);
            }
            None => out.extend_from_slice(line),
        }
        out.push(b'\n');
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
