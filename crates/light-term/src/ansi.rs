// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`, plus the
// `Attr` flag set the viewport uses for reverse-video highlighting. No state,
// no decisions about when to emit. The caller owns that.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).

use std::io::{self, Write};

use bitflags::bitflags;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
///
/// The original terminal content is preserved and comes back on exit, so
/// the exit summary prints on the user's normal scrollback.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags! {
    /// SGR text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        const BOLD    = 0b0000_0001;
        const INVERSE = 0b0000_0010;
    }
}

/// The SGR 0 sequence that ends an attributed span.
pub const SGR_RESET: &[u8] = b"\x1b[0m";

impl Attr {
    /// Append the SGR sequence for these attributes to a frame.
    ///
    /// Multiple attributes are semicolon-separated: `\x1b[1;7m` for
    /// bold + inverse. Appends nothing if no attributes are set.
    pub fn push_sgr(self, out: &mut Vec<u8>) {
        if self.is_empty() {
            return;
        }

        out.extend_from_slice(b"\x1b[");
        let codes = [(Self::BOLD, b'1'), (Self::INVERSE, b'7')];
        let mut first = true;
        for (flag, code) in codes {
            if self.contains(flag) {
                if !first {
                    out.push(b';');
                }
                out.push(code);
                first = false;
            }
        }
        out.push(b'm');
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
