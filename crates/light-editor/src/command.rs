//! In-buffer commands.
//!
//! Commands are typed as ordinary buffer text and only take effect when
//! Enter is pressed:
//!
//! | Line          | Meaning                                    |
//! |---------------|--------------------------------------------|
//! | `:<N>`        | jump to line `N` (1-based)                 |
//! | `=<filename>` | write the buffer to `filename` and exit    |
//! | `=`           | write the buffer to the scratch file, exit |
//! | `=scratch`    | discard the buffer and exit                |
//!
//! This module only recognizes the forms. Which line is inspected, and
//! when, is the session's business.

use std::path::PathBuf;

/// The word that discards the buffer instead of naming a file.
pub const DISCARD_WORD: &[u8] = b"scratch";

/// A parsed `=` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitCommand {
    /// `=<filename>`
    SaveAs(PathBuf),
    /// `=`
    Scratch,
    /// `=scratch`
    Discard,
}

/// A parsed `:` command.
///
/// `line` is the 1-based target, or `None` when the text after `:` does
/// not start with a usable number. The command line is cleared either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goto {
    pub line: Option<usize>,
}

impl Goto {
    /// The 0-based row to jump to, if `line` names a row below `row_count`.
    #[must_use]
    pub fn target_row(self, row_count: usize) -> Option<usize> {
        self.line
            .filter(|&n| n > 0 && n < row_count)
            .map(|n| n - 1)
    }
}

/// Recognize `=`, `=scratch` or `=<filename>`.
///
/// The filename ends at the first space; anything after it is ignored.
#[must_use]
pub fn parse_exit(line: &[u8]) -> Option<ExitCommand> {
    let rest = line.strip_prefix(b"=")?;
    let name = rest.split(|&b| b == b' ').next().unwrap_or_default();

    Some(if name.is_empty() {
        ExitCommand::Scratch
    } else if name == DISCARD_WORD {
        ExitCommand::Discard
    } else {
        ExitCommand::SaveAs(PathBuf::from(String::from_utf8_lossy(name).into_owned()))
    })
}

/// Recognize `:<N>`.
///
/// Leading digits are parsed; trailing text is ignored. A number too large
/// for `usize` counts as no number.
#[must_use]
pub fn parse_goto(line: &[u8]) -> Option<Goto> {
    let rest = line.strip_prefix(b":")?;
    let len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    let value = std::str::from_utf8(&rest[..len])
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok());

    Some(Goto {
        line: value.filter(|&n| n > 0),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
