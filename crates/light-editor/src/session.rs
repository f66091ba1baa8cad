//! Session: the controller's state and its key bindings.
//!
//! A `Session` owns everything the controller actor mutates: the buffer,
//! the cursor, the exit flags and the warnings collected for the user. The
//! event loop drives it through the [`App`] trait; once the loop returns,
//! [`Session::finish`] performs whatever write the exit request calls for.
//!
//! # Key bindings
//!
//! | Key              | Effect                                   |
//! |------------------|------------------------------------------|
//! | printable, Tab   | insert at cursor                         |
//! | Enter            | exit command, split line, goto command   |
//! | Backspace        | delete the byte before the cursor        |
//! | arrows           | move                                     |
//! | Ctrl+O / Ctrl+L  | open a row above / below                 |
//! | Ctrl+X / Ctrl+D  | clear / delete the current row           |
//! | Ctrl+B / Ctrl+E  | line start / line end                    |
//! | Ctrl+T           | indent the current row                   |
//! | Ctrl+W / Ctrl+A  | first row / append row                   |
//!
//! Anything else is ignored. An edit that would break a buffer limit ends
//! the session with a scratch save.

use std::path::{Path, PathBuf};

use light_term::event_loop::{Action, App};
use light_term::input::KeyEvent;
use light_term::terminal::Size;

use crate::buffer::{Buffer, EditError};
use crate::command::{self, ExitCommand};
use crate::cursor::{Cursor, Direction};
use crate::persist::{self, Outcome, PersistError, SCRATCH_FILE};
use crate::view;

/// Why the buffer goes to the scratch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchReason {
    /// A bare `=` command.
    Requested,
    /// An edit hit a buffer limit.
    Overflow,
    /// SIGINT.
    Interrupted,
    /// Stdin reached EOF.
    InputClosed,
}

/// How the session wants to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitRequest {
    /// Write to this file.
    Save(PathBuf),
    /// Write to the scratch file.
    Scratch(ScratchReason),
    /// Write nothing.
    Discard,
}

/// Exit state as flags. Once `exit_requested` is set nothing here changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub exit_requested: bool,
    pub save_requested: bool,
    pub scratch_requested: bool,
    /// Where the buffer will be written, if anywhere.
    pub target: Option<PathBuf>,
}

/// The controller's state.
#[derive(Debug)]
pub struct Session {
    buffer: Buffer,
    cursor: Cursor,
    flags: SessionFlags,
    exit: Option<ExitRequest>,
    scratch_path: PathBuf,
    warnings: Vec<String>,
}

impl Session {
    /// A session editing `buffer`, cursor at the origin.
    #[must_use]
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            cursor: Cursor::new(),
            flags: SessionFlags::default(),
            exit: None,
            scratch_path: PathBuf::from(SCRATCH_FILE),
            warnings: Vec::new(),
        }
    }

    /// Start a session on `path`, or on an empty buffer when there is none.
    ///
    /// Load cuts become session warnings. A file that cannot be opened or
    /// read is not an error: editing starts empty and the returned notice
    /// says why.
    #[must_use]
    pub fn open(path: Option<&Path>) -> (Self, Option<String>) {
        let Some(path) = path else {
            return (Self::new(Buffer::new()), None);
        };

        match persist::load(path) {
            Ok(loaded) => {
                let warnings = loaded.warnings();
                let mut session = Self::new(loaded.buffer);
                for w in warnings {
                    log::warn!("{w}");
                    session.warn(w);
                }
                (session, None)
            }
            Err(PersistError::Open { source, .. }) => {
                log::info!("{}: {source}; starting empty", path.display());
                let notice = format!(
                    "File '{}' does not exist, opening a new buffer",
                    path.display()
                );
                (Self::new(Buffer::new()), Some(notice))
            }
            Err(e) => {
                log::warn!("{e}; starting empty");
                let notice = format!("{e}, opening a new buffer");
                (Self::new(Buffer::new()), Some(notice))
            }
        }
    }

    /// Use `path` instead of [`SCRATCH_FILE`] for scratch saves.
    #[must_use]
    pub fn with_scratch_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scratch_path = path.into();
        self
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub const fn flags(&self) -> &SessionFlags {
        &self.flags
    }

    /// The pending exit request, if the session is exiting.
    #[must_use]
    pub const fn exit_request(&self) -> Option<&ExitRequest> {
        self.exit.as_ref()
    }

    #[must_use]
    pub fn scratch_path(&self) -> &Path {
        &self.scratch_path
    }

    /// Notices for stderr, in the order they happened.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Record a notice for the user.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    // -- Dispatch -----------------------------------------------------------

    /// Apply one keystroke.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.flags.exit_requested {
            return Action::Quit;
        }

        match key {
            KeyEvent::Char(ch) => self.insert(ch),
            KeyEvent::Tab => self.insert(b'\t'),
            KeyEvent::Enter => self.enter(),
            KeyEvent::Backspace => {
                self.buffer.delete_char_before(&mut self.cursor);
                Action::Continue
            }
            KeyEvent::Up => self.move_cursor(Direction::Up),
            KeyEvent::Down => self.move_cursor(Direction::Down),
            KeyEvent::Left => self.move_cursor(Direction::Left),
            KeyEvent::Right => self.move_cursor(Direction::Right),
            KeyEvent::Ctrl(letter) => self.shortcut(letter),
            KeyEvent::Esc | KeyEvent::Unknown => Action::Continue,
        }
    }

    fn insert(&mut self, ch: u8) -> Action {
        match self.buffer.insert_char(&mut self.cursor, ch) {
            Ok(()) => Action::Continue,
            Err(e) => self.overflow(e),
        }
    }

    fn move_cursor(&mut self, dir: Direction) -> Action {
        self.cursor.move_in(dir, &self.buffer);
        Action::Continue
    }

    fn shortcut(&mut self, letter: u8) -> Action {
        let buf = &mut self.buffer;
        let cur = &mut self.cursor;
        match letter {
            b'O' => buf.insert_row_above(cur),
            b'L' => buf.insert_row_below(cur),
            b'X' => buf.clear_current_row(cur),
            b'D' => buf.delete_current_row(cur),
            b'B' => cur.to_line_start(),
            b'E' => cur.to_line_end(buf),
            b'T' => {
                if let Err(e) = buf.indent_current_row(cur) {
                    return self.overflow(e);
                }
            }
            b'W' => cur.to_first_row(buf),
            b'A' => cur.to_append_row(buf),
            _ => log::trace!("unbound Ctrl+{}", char::from(letter)),
        }
        Action::Continue
    }

    /// Enter: exit command on the last used row, then split, then a goto
    /// command on the row just completed.
    fn enter(&mut self) -> Action {
        if let Some(cmd) = self.buffer.last_used_row().and_then(command::parse_exit) {
            log::info!("exit command: {cmd:?}");
            let request = match cmd {
                ExitCommand::SaveAs(path) => ExitRequest::Save(path),
                ExitCommand::Scratch => ExitRequest::Scratch(ScratchReason::Requested),
                ExitCommand::Discard => ExitRequest::Discard,
            };
            return self.request_exit(request);
        }

        let completed = self.cursor.row();
        if let Err(e) = self.buffer.split_line(&mut self.cursor) {
            return self.overflow(e);
        }

        if let Some(goto) = command::parse_goto(self.buffer.line(completed)) {
            if let Some(row) = goto.target_row(self.buffer.row_count()) {
                log::debug!("goto row {row}");
                self.cursor.to_row(row, &self.buffer);
            }
            self.buffer.clear_row(completed);
            self.cursor.clamp(&self.buffer);
        }

        Action::Continue
    }

    fn overflow(&mut self, e: EditError) -> Action {
        log::error!("{e}");
        self.warn(format!("{e}: unrecoverable, saving to scratch"));
        self.request_exit(ExitRequest::Scratch(ScratchReason::Overflow))
    }

    // -- Exit ---------------------------------------------------------------

    /// Ask the session to end. Only the first request counts.
    pub fn request_exit(&mut self, request: ExitRequest) -> Action {
        if self.flags.exit_requested {
            return Action::Quit;
        }

        self.flags.exit_requested = true;
        match &request {
            ExitRequest::Save(path) => {
                self.flags.save_requested = true;
                self.flags.target = Some(path.clone());
            }
            ExitRequest::Scratch(_) => {
                self.flags.save_requested = true;
                self.flags.scratch_requested = true;
                self.flags.target = Some(self.scratch_path.clone());
            }
            ExitRequest::Discard => self.flags.scratch_requested = true,
        }
        log::info!("exit requested: {request:?}");
        self.exit = Some(request);
        Action::Quit
    }

    /// Carry out the exit flags and report where the buffer went.
    ///
    /// A session that ended without a request (the terminal failed under
    /// it) is saved to scratch.
    pub fn finish(&mut self) -> Outcome {
        if !self.flags.exit_requested {
            self.request_exit(ExitRequest::Scratch(ScratchReason::Interrupted));
        }

        let target = match &self.flags.target {
            Some(target) if self.flags.save_requested => target.clone(),
            _ => return Outcome::Scratched,
        };
        if self.flags.scratch_requested {
            log::info!("writing buffer to scratch file '{}'", target.display());
        } else {
            log::info!("writing buffer to '{}'", target.display());
        }

        let report = persist::save_with_fallback(&self.buffer, &target, &self.scratch_path);
        for failure in report.failures {
            self.warn(failure.to_string());
        }
        if report.outcome == Outcome::Scratched {
            self.warn("fatal: the buffer could not be saved anywhere");
        }
        report.outcome
    }
}

impl App for Session {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        self.handle_key(key)
    }

    fn on_interrupt(&mut self) -> Action {
        self.request_exit(ExitRequest::Scratch(ScratchReason::Interrupted))
    }

    fn on_input_closed(&mut self) {
        self.request_exit(ExitRequest::Scratch(ScratchReason::InputClosed));
    }

    fn paint(&mut self, size: Size) -> Vec<u8> {
        // One row short so the last newline does not scroll the screen.
        let height = usize::from(size.rows).saturating_sub(1).max(1);
        view::render(&self.buffer, &self.cursor, height)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{MAX_COLS, MAX_ROWS};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn rows(s: &Session) -> Vec<String> {
        s.buffer()
            .used_rows()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect()
    }

    fn type_str(s: &mut Session, text: &str) {
        for b in text.bytes() {
            assert_eq!(s.handle_key(KeyEvent::Char(b)), Action::Continue);
        }
    }

    fn session_in(dir: &TempDir, lines: &[&str]) -> Session {
        Session::new(Buffer::from_lines(lines.iter().copied()))
            .with_scratch_path(dir.path().join(SCRATCH_FILE))
    }

    fn at(s: &mut Session, row: usize, col: usize) {
        s.cursor = Cursor::at(row, col);
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn typing_fills_append_row() {
        let mut s = Session::new(Buffer::new());
        type_str(&mut s, "hi");
        assert_eq!(s.buffer().line(0), b"hi");
        assert_eq!(s.buffer().row_count(), 0);
        assert_eq!(s.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn tab_inserts_tab_byte() {
        let mut s = Session::new(Buffer::new());
        s.handle_key(KeyEvent::Tab);
        s.handle_key(KeyEvent::Char(b'\t'));
        assert_eq!(s.buffer().line(0), b"\t\t");
    }

    #[test]
    fn insert_then_backspace_restores() {
        let mut s = Session::new(Buffer::from_lines(["hello"]));
        at(&mut s, 0, 2);
        s.handle_key(KeyEvent::Char(b'X'));
        s.handle_key(KeyEvent::Backspace);
        assert_eq!(rows(&s), vec!["hello"]);
        assert_eq!(s.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn enter_splits_mid_line() {
        let mut s = Session::new(Buffer::from_lines(["hello world"]));
        at(&mut s, 0, 5);
        assert_eq!(s.handle_key(KeyEvent::Enter), Action::Continue);
        assert_eq!(rows(&s), vec!["hello", " world"]);
        assert_eq!(s.cursor(), Cursor::at(1, 0));
        assert_eq!(s.buffer().row_count(), 2);
    }

    #[test]
    fn arrows_move() {
        let mut s = Session::new(Buffer::from_lines(["ab", "c"]));
        s.handle_key(KeyEvent::Right);
        s.handle_key(KeyEvent::Right);
        s.handle_key(KeyEvent::Down);
        assert_eq!(s.cursor(), Cursor::at(1, 1));
        s.handle_key(KeyEvent::Left);
        s.handle_key(KeyEvent::Up);
        assert_eq!(s.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn ctrl_row_shortcuts() {
        let mut s = Session::new(Buffer::from_lines(["a", "b"]));
        at(&mut s, 1, 1);

        s.handle_key(KeyEvent::Ctrl(b'O'));
        assert_eq!(rows(&s), vec!["a", "", "b"]);
        assert_eq!(s.cursor(), Cursor::at(1, 0));

        s.handle_key(KeyEvent::Ctrl(b'L'));
        assert_eq!(rows(&s), vec!["a", "", "", "b"]);
        assert_eq!(s.cursor(), Cursor::at(2, 0));

        s.handle_key(KeyEvent::Ctrl(b'D'));
        s.handle_key(KeyEvent::Ctrl(b'D'));
        assert_eq!(rows(&s), vec!["a", ""]);

        s.handle_key(KeyEvent::Ctrl(b'W'));
        s.handle_key(KeyEvent::Ctrl(b'X'));
        assert_eq!(rows(&s), vec!["", ""]);
    }

    #[test]
    fn ctrl_cursor_shortcuts() {
        let mut s = Session::new(Buffer::from_lines(["abc", "de"]));
        s.handle_key(KeyEvent::Ctrl(b'E'));
        assert_eq!(s.cursor(), Cursor::at(0, 3));
        s.handle_key(KeyEvent::Ctrl(b'B'));
        assert_eq!(s.cursor(), Cursor::at(0, 0));
        s.handle_key(KeyEvent::Ctrl(b'A'));
        assert_eq!(s.cursor(), Cursor::at(2, 0));
        s.handle_key(KeyEvent::Ctrl(b'W'));
        assert_eq!(s.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn ctrl_t_indents() {
        let mut s = Session::new(Buffer::from_lines(["x"]));
        s.handle_key(KeyEvent::Ctrl(b'T'));
        assert_eq!(rows(&s), vec!["    x"]);
        assert_eq!(s.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn ignored_keys_change_nothing() {
        let mut s = Session::new(Buffer::from_lines(["abc"]));
        at(&mut s, 0, 1);
        for key in [KeyEvent::Esc, KeyEvent::Unknown, KeyEvent::Ctrl(b'Z'), KeyEvent::Ctrl(b'Q')] {
            assert_eq!(s.handle_key(key), Action::Continue);
        }
        assert_eq!(rows(&s), vec!["abc"]);
        assert_eq!(s.cursor(), Cursor::at(0, 1));
        assert!(!s.flags().exit_requested);
    }

    #[test]
    fn cursor_invariant_survives_key_storm() {
        let mut s = Session::new(Buffer::from_lines(["one", "", "three"]));
        let keys = [
            KeyEvent::Down,
            KeyEvent::Ctrl(b'E'),
            KeyEvent::Char(b'x'),
            KeyEvent::Enter,
            KeyEvent::Ctrl(b'D'),
            KeyEvent::Ctrl(b'A'),
            KeyEvent::Ctrl(b'D'),
            KeyEvent::Up,
            KeyEvent::Right,
            KeyEvent::Right,
            KeyEvent::Ctrl(b'X'),
            KeyEvent::Backspace,
            KeyEvent::Ctrl(b'L'),
            KeyEvent::Ctrl(b'O'),
            KeyEvent::Ctrl(b'T'),
            KeyEvent::Ctrl(b'W'),
            KeyEvent::Ctrl(b'D'),
            KeyEvent::Ctrl(b'D'),
            KeyEvent::Ctrl(b'D'),
            KeyEvent::Ctrl(b'D'),
            KeyEvent::Ctrl(b'D'),
            KeyEvent::Ctrl(b'D'),
        ];
        for key in keys {
            s.handle_key(key);
            assert!(s.cursor().is_within(s.buffer()), "{:?} after {key:?}", s.cursor());
        }
    }

    // -- Commands -----------------------------------------------------------

    #[test]
    fn goto_jumps_and_clears_command_line() {
        let mut s = Session::new(Buffer::from_lines(["a", "b", "c", "d", ":3"]));
        at(&mut s, 4, 2);

        assert_eq!(s.handle_key(KeyEvent::Enter), Action::Continue);
        assert_eq!(s.cursor().row(), 2);
        assert_eq!(s.buffer().line(4), b"");
        assert!(s.cursor().is_within(s.buffer()));
    }

    #[test]
    fn goto_out_of_range_still_clears() {
        let mut s = Session::new(Buffer::from_lines(["a", ":99"]));
        at(&mut s, 1, 3);
        s.handle_key(KeyEvent::Enter);
        assert_eq!(s.cursor(), Cursor::at(2, 0));
        assert_eq!(s.buffer().line(1), b"");
    }

    #[test]
    fn goto_to_the_command_row_reclamps() {
        let mut s = Session::new(Buffer::from_lines(["a", ":2"]));
        at(&mut s, 1, 2);
        s.handle_key(KeyEvent::Enter);
        assert_eq!(s.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn typed_goto_on_append_row() {
        let mut s = Session::new(Buffer::from_lines(["a", "b", "c"]));
        s.handle_key(KeyEvent::Ctrl(b'A'));
        type_str(&mut s, ":1");
        s.handle_key(KeyEvent::Enter);
        assert_eq!(s.cursor().row(), 0);
        assert_eq!(rows(&s), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn save_command_writes_and_quits() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let cmd = format!("={}", out.display());
        let mut s = session_in(&dir, &["abc", "def", cmd.as_str()]);

        assert_eq!(s.handle_key(KeyEvent::Enter), Action::Quit);
        assert_eq!(s.exit_request(), Some(&ExitRequest::Save(out.clone())));
        assert!(s.flags().save_requested);

        let outcome = s.finish();
        assert_eq!(outcome, Outcome::Written(out.clone()));
        assert_eq!(fs::read(&out).unwrap(), b"abc\ndef\n");
        assert!(outcome.to_string().contains("out.txt"));
        assert!(s.warnings().is_empty());
    }

    #[test]
    fn exit_command_fires_from_any_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session_in(&dir, &["abc", "="]);
        at(&mut s, 0, 1);
        assert_eq!(s.handle_key(KeyEvent::Enter), Action::Quit);
        // No split happened.
        assert_eq!(rows(&s), vec!["abc", "="]);
    }

    #[test]
    fn bare_equals_saves_to_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session_in(&dir, &["keep", "="]);

        s.handle_key(KeyEvent::Enter);
        assert_eq!(
            s.exit_request(),
            Some(&ExitRequest::Scratch(ScratchReason::Requested))
        );

        let scratch = s.scratch_path().to_path_buf();
        assert_eq!(s.finish(), Outcome::Written(scratch.clone()));
        assert_eq!(fs::read(&scratch).unwrap(), b"keep\n");
    }

    #[test]
    fn scratch_word_discards() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session_in(&dir, &["gone", "=scratch"]);

        assert_eq!(s.handle_key(KeyEvent::Enter), Action::Quit);
        assert_eq!(s.exit_request(), Some(&ExitRequest::Discard));
        assert!(!s.flags().save_requested);
        assert!(s.flags().scratch_requested);

        assert_eq!(s.finish(), Outcome::Scratched);
        assert!(!s.scratch_path().exists());
    }

    #[test]
    fn unwritable_target_falls_back_to_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no-such-dir").join("out.txt");
        let cmd = format!("={}", out.display());
        let mut s = session_in(&dir, &["abc", cmd.as_str()]);

        s.handle_key(KeyEvent::Enter);
        let scratch = s.scratch_path().to_path_buf();
        assert_eq!(s.finish(), Outcome::Written(scratch.clone()));
        assert_eq!(fs::read(&scratch).unwrap(), b"abc\n");
        assert_eq!(s.warnings().len(), 1);
    }

    // -- Overflow -----------------------------------------------------------

    #[test]
    fn split_at_capacity_scratches() {
        let dir = tempfile::tempdir().unwrap();
        let lines = vec!["x"; MAX_ROWS - 1];
        let mut s = session_in(&dir, &lines);
        at(&mut s, 3, 1);

        assert_eq!(s.handle_key(KeyEvent::Enter), Action::Quit);
        assert_eq!(
            s.exit_request(),
            Some(&ExitRequest::Scratch(ScratchReason::Overflow))
        );
        assert_eq!(s.buffer().row_count(), MAX_ROWS - 1);

        let scratch = s.scratch_path().to_path_buf();
        assert_eq!(s.finish(), Outcome::Written(scratch.clone()));
        assert_eq!(fs::read(&scratch).unwrap().len(), 2 * (MAX_ROWS - 1));
        assert_eq!(s.warnings().len(), 1);
    }

    #[test]
    fn full_line_insert_scratches() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Session::new(Buffer::from_lines([vec![b'y'; MAX_COLS]]))
            .with_scratch_path(dir.path().join(SCRATCH_FILE));
        at(&mut s, 0, MAX_COLS);

        assert_eq!(s.handle_key(KeyEvent::Char(b'z')), Action::Quit);
        assert_eq!(s.buffer().line_len(0), MAX_COLS);
        assert!(s.flags().scratch_requested);
    }

    #[test]
    fn indent_overflow_scratches() {
        let mut s = Session::new(Buffer::from_lines([vec![b'y'; MAX_COLS - 2]]));
        assert_eq!(s.handle_key(KeyEvent::Ctrl(b'T')), Action::Quit);
        assert_eq!(
            s.exit_request(),
            Some(&ExitRequest::Scratch(ScratchReason::Overflow))
        );
    }

    // -- Exit requests ------------------------------------------------------

    #[test]
    fn interrupt_requests_scratch_save() {
        let mut s = Session::new(Buffer::new());
        assert_eq!(s.on_interrupt(), Action::Quit);
        assert_eq!(
            s.exit_request(),
            Some(&ExitRequest::Scratch(ScratchReason::Interrupted))
        );
        assert_eq!(s.flags().target.as_deref(), Some(Path::new(SCRATCH_FILE)));
    }

    #[test]
    fn input_closed_requests_scratch_save() {
        let mut s = Session::new(Buffer::new());
        s.on_input_closed();
        assert_eq!(
            s.exit_request(),
            Some(&ExitRequest::Scratch(ScratchReason::InputClosed))
        );
    }

    #[test]
    fn first_exit_request_wins() {
        let mut s = Session::new(Buffer::new());
        s.request_exit(ExitRequest::Discard);
        s.on_interrupt();
        assert_eq!(s.exit_request(), Some(&ExitRequest::Discard));
        assert!(!s.flags().save_requested);
    }

    #[test]
    fn keys_after_exit_are_ignored() {
        let mut s = Session::new(Buffer::new());
        s.request_exit(ExitRequest::Discard);
        assert_eq!(s.handle_key(KeyEvent::Char(b'a')), Action::Quit);
        assert_eq!(s.buffer().line(0), b"");
    }

    #[test]
    fn open_without_path_is_empty() {
        let (s, notice) = Session::open(None);
        assert_eq!(s.buffer().row_count(), 0);
        assert_eq!(notice, None);
    }

    #[test]
    fn open_loads_file_and_keeps_cut_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        let long = "y".repeat(MAX_COLS + 5);
        fs::write(&path, format!("one\n{long}\n")).unwrap();

        let (s, notice) = Session::open(Some(&path));
        assert_eq!(notice, None);
        assert_eq!(s.buffer().line(0), b"one");
        assert_eq!(s.buffer().line_len(1), MAX_COLS - 1);
        assert_eq!(s.warnings().len(), 1);
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        let (s, notice) = Session::open(Some(&path));
        assert_eq!(s.buffer().row_count(), 0);
        assert!(notice.unwrap().contains("does not exist"));
    }

    #[test]
    fn open_directory_starts_empty() {
        let dir = tempfile::tempdir().unwrap();

        let (s, notice) = Session::open(Some(dir.path()));
        assert_eq!(s.buffer().row_count(), 0);
        assert_eq!(s.buffer().line(0), b"");
        assert!(notice.unwrap().ends_with("opening a new buffer"));
        assert!(s.warnings().is_empty());
    }

    #[test]
    fn finish_without_request_saves_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session_in(&dir, &["unsaved"]);
        let scratch = s.scratch_path().to_path_buf();
        assert_eq!(s.finish(), Outcome::Written(scratch.clone()));
        assert_eq!(fs::read(&scratch).unwrap(), b"unsaved\n");
        assert!(s.flags().exit_requested && s.flags().scratch_requested);
    }

    #[test]
    fn finish_writes_where_flags_point() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("flagged.txt");
        let mut s = session_in(&dir, &["kept"]);
        s.flags = SessionFlags {
            exit_requested: true,
            save_requested: true,
            scratch_requested: false,
            target: Some(out.clone()),
        };

        assert_eq!(s.finish(), Outcome::Written(out.clone()));
        assert_eq!(fs::read(&out).unwrap(), b"kept\n");
        assert!(!s.scratch_path().exists());
    }

    #[test]
    fn finish_without_save_flag_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session_in(&dir, &["gone"]);
        s.flags = SessionFlags {
            exit_requested: true,
            scratch_requested: true,
            ..SessionFlags::default()
        };

        assert_eq!(s.finish(), Outcome::Scratched);
        assert!(!s.scratch_path().exists());
    }

    #[test]
    fn total_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Session::new(Buffer::from_lines(["x"]))
            .with_scratch_path(dir.path().join("missing").join(SCRATCH_FILE));
        s.on_interrupt();

        assert_eq!(s.finish(), Outcome::Scratched);
        assert_eq!(s.warnings().len(), 2);
        assert!(s.warnings()[1].starts_with("fatal"));
    }

    // -- Paint --------------------------------------------------------------

    #[test]
    fn paint_leaves_last_screen_row_free() {
        let lines: Vec<String> = (1..=50).map(|n| n.to_string()).collect();
        let mut s = Session::new(Buffer::from_lines(lines));
        at(&mut s, 25, 0);

        let frame = s.paint(Size { cols: 80, rows: 11 });
        let text = String::from_utf8(frame).unwrap();
        assert_eq!(text.lines().count(), 10);
    }
}
