//! Persistence: loading a file into a buffer and writing it back.
//!
//! Files are plain bytes, one row per line, every line `\n`-terminated.
//! Saving never panics and never recurses: a failed write to the target
//! falls back to [`SCRATCH_FILE`] once, and if that fails too the buffer is
//! lost and the failures are reported to the caller.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IoSlice, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::buffer::{Buffer, MAX_COLS, MAX_ROWS};

/// The crash-safety file, relative to the working directory.
pub const SCRATCH_FILE: &str = ".scratch";

/// A file that could not be read or written.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot open '{}': {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

// ─── Load ────────────────────────────────────────────────────────────────────

/// A buffer read from disk, and what had to be cut to fit it.
#[derive(Debug)]
pub struct Loaded {
    pub buffer: Buffer,
    /// Lines cut to `MAX_COLS - 1` bytes.
    pub truncated_lines: usize,
    /// True if the file had more lines than the buffer holds.
    pub rows_dropped: bool,
}

impl Loaded {
    /// Human-readable notices for anything cut during the load.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.rows_dropped {
            out.push(format!("file too long, truncating at {MAX_ROWS} lines"));
        }
        if self.truncated_lines > 0 {
            out.push(format!(
                "{} line(s) longer than {} bytes were truncated",
                self.truncated_lines,
                MAX_COLS - 1
            ));
        }
        out
    }
}

/// Load `path` into a fresh buffer.
///
/// # Errors
///
/// [`PersistError::Open`] if the file cannot be opened,
/// [`PersistError::Read`] if reading it fails part way.
pub fn load(path: &Path) -> Result<Loaded, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let loaded = load_from(BufReader::new(file)).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "loaded {} rows from {}",
        loaded.buffer.row_count(),
        path.display()
    );
    Ok(loaded)
}

/// Read lines from `reader`.
///
/// One trailing `\n` (and a `\r` before it) is stripped per line. Lines are
/// cut to `MAX_COLS - 1` bytes, and reading stops after `MAX_ROWS` lines.
/// The append row is kept separately, so a full file still loads whole.
///
/// # Errors
///
/// Propagates read errors from `reader`.
pub fn load_from(mut reader: impl BufRead) -> io::Result<Loaded> {
    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut truncated_lines = 0;
    let mut rows_dropped = false;
    let mut line = Vec::new();

    loop {
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if lines.len() >= MAX_ROWS {
            rows_dropped = true;
            log::warn!("file too long, truncating at {MAX_ROWS} lines");
            break;
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        if line.len() > MAX_COLS - 1 {
            log::warn!("line {} truncated from {} bytes", lines.len() + 1, line.len());
            line.truncate(MAX_COLS - 1);
            truncated_lines += 1;
        }
        lines.push(std::mem::take(&mut line));
    }

    Ok(Loaded {
        buffer: Buffer::from_lines(lines),
        truncated_lines,
        rows_dropped,
    })
}

// ─── Save ────────────────────────────────────────────────────────────────────

/// The rows that go to disk: every used row, except a final `=` command.
pub fn rows_to_save(buf: &Buffer) -> impl Iterator<Item = &[u8]> {
    let skip_last = buf.last_used_row().is_some_and(|line| line.first() == Some(&b'='));
    let count = buf.row_count() - usize::from(skip_last);
    buf.used_rows().take(count)
}

/// Write the buffer to `path`, truncating any existing file.
///
/// # Errors
///
/// [`PersistError::Open`] if the file cannot be created,
/// [`PersistError::Write`] if writing fails.
pub fn save(buf: &Buffer, path: &Path) -> Result<(), PersistError> {
    let mut file = File::create(path).map_err(|source| PersistError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    write_rows(&mut file, buf)
        .and_then(|()| file.flush())
        .map_err(|source| PersistError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Gather every row and its newline into one vectored write.
fn write_rows(w: &mut impl Write, buf: &Buffer) -> io::Result<()> {
    let mut slices: Vec<IoSlice<'_>> = Vec::with_capacity(buf.row_count() * 2);
    for line in rows_to_save(buf) {
        slices.push(IoSlice::new(line));
        slices.push(IoSlice::new(b"\n"));
    }
    write_all_vectored(w, &mut slices)
}

fn write_all_vectored(w: &mut impl Write, mut bufs: &mut [IoSlice<'_>]) -> io::Result<()> {
    // Skip leading empty rows so a zero-length write means failure.
    IoSlice::advance_slices(&mut bufs, 0);
    while !bufs.is_empty() {
        match w.write_vectored(bufs) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ));
            }
            Ok(n) => IoSlice::advance_slices(&mut bufs, n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

// ─── Fallback ────────────────────────────────────────────────────────────────

/// Where the buffer ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to this path.
    Written(PathBuf),
    /// Not written, either on request or because every write failed.
    Scratched,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written(path) => write!(f, "buffer written to '{}', bye!", path.display()),
            Self::Scratched => f.write_str("buffer scratched away, bye!"),
        }
    }
}

/// The result of [`save_with_fallback`].
#[derive(Debug)]
pub struct SaveReport {
    pub outcome: Outcome,
    /// Every write that failed along the way, in order.
    pub failures: Vec<PersistError>,
}

/// Save to `target`, or to `scratch` if that fails.
///
/// The chain is: `target` → `scratch` (once) → give up. When `target` is
/// the scratch file itself it is only tried once.
pub fn save_with_fallback(buf: &Buffer, target: &Path, scratch: &Path) -> SaveReport {
    let mut failures = Vec::new();

    let mut attempts = vec![target];
    if target != scratch {
        attempts.push(scratch);
    }

    for path in attempts {
        match save(buf, path) {
            Ok(()) => {
                log::info!("saved {} rows to {}", buf.row_count(), path.display());
                return SaveReport {
                    outcome: Outcome::Written(path.to_path_buf()),
                    failures,
                };
            }
            Err(e) => {
                log::error!("{e}");
                failures.push(e);
            }
        }
    }

    log::error!("buffer lost: every save attempt failed");
    SaveReport {
        outcome: Outcome::Scratched,
        failures,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
