// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into a closed set of key events. Only the legacy
// encodings the editor binds are recognized:
//
// - `ESC [ A/B/C/D` arrows
// - Backspace (0x7F or 0x08), Enter (LF or CR), Tab
// - Ctrl+letter (0x01..=0x1A, minus the bytes claimed above)
// - Printable ASCII (0x20..=0x7E)
//
// Everything else is dropped without producing an event.
//
// # Design
//
// An escape sequence can straddle two `read()` calls, so the decoder is a
// three-state machine (`Ground` → `Escape` → `Csi`) instead of a byte-by-byte
// lookup. Feed bytes with [`Decoder::advance`]. After an idle poll with no new
// bytes, call [`Decoder::flush`] to resolve a dangling `ESC` (or `ESC [`) as a
// real Escape keypress.
//
// An escape that turns out not to be an arrow collapses into a single `Esc`
// and the unmatched tail byte is discarded. That is a simplification, not a
// parse error.

/// A decoded keystroke.
///
/// Bytes are single-byte ASCII; column arithmetic in the editor is in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// A printable byte (or `\t` for the Tab key).
    Char(u8),
    /// Ctrl+letter, carried as the uppercase letter (`Ctrl+A` → `b'A'`).
    Ctrl(u8),
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Enter,
    /// The Tab key. Inserts a literal `\t`, same as `Char(b'\t')`.
    Tab,
    Esc,
    Unknown,
}

/// Decoder state between bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Ground,
    /// Saw `ESC`.
    Escape,
    /// Saw `ESC [`.
    Csi,
}

const ESC: u8 = 0x1B;

/// Streaming key decoder.
#[derive(Debug, Default)]
pub struct Decoder {
    state: State,
}

impl Decoder {
    /// Create a decoder in the ground state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every complete key event.
    ///
    /// A trailing partial escape sequence stays pending until the next
    /// `advance` or [`flush`](Self::flush).
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        let mut events = Vec::with_capacity(data.len());

        for &byte in data {
            match self.state {
                State::Ground => {
                    if byte == ESC {
                        self.state = State::Escape;
                    } else if let Some(event) = decode_byte(byte) {
                        events.push(event);
                    } else {
                        log::trace!("ignoring unmapped input byte {byte:#04x}");
                    }
                }
                State::Escape => {
                    if byte == b'[' {
                        self.state = State::Csi;
                    } else {
                        events.push(KeyEvent::Esc);
                        self.state = State::Ground;
                    }
                }
                State::Csi => {
                    events.push(match byte {
                        b'A' => KeyEvent::Up,
                        b'B' => KeyEvent::Down,
                        b'C' => KeyEvent::Right,
                        b'D' => KeyEvent::Left,
                        _ => KeyEvent::Esc,
                    });
                    self.state = State::Ground;
                }
            }
        }

        events
    }

    /// Is an escape sequence waiting for more bytes?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state != State::Ground
    }

    /// Resolve a pending escape prefix as a standalone `Esc`.
    pub fn flush(&mut self) -> Option<KeyEvent> {
        if self.has_pending() {
            self.state = State::Ground;
            Some(KeyEvent::Esc)
        } else {
            None
        }
    }
}

/// Decode a single non-escape byte.
fn decode_byte(byte: u8) -> Option<KeyEvent> {
    match byte {
        0x08 | 0x7F => Some(KeyEvent::Backspace),
        0x0A | 0x0D => Some(KeyEvent::Enter),
        0x09 => Some(KeyEvent::Char(b'\t')),
        b @ 0x01..=0x1A => Some(KeyEvent::Ctrl(b'A' + b - 1)),
        b @ 0x20..=0x7E => Some(KeyEvent::Char(b)),
        _ => None,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
