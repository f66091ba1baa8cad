// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: the controller actor.
//
// The thread that calls [`EventLoop::run`] becomes the controller: it is
// the only thread that touches the application's state. Input arrives
// from the background [`InputReader`] through a [`Mailbox`]; each input
// is handed to the application, and after every input the whole screen is
// repainted. There is no tick and no diffing: the loop sleeps in
// `Mailbox::recv` until the next keystroke.
//
// # SIGINT
//
// The signal handler only stores `true` into an `AtomicBool`, which is
// async-signal-safe and cannot race a render in progress. The input actor
// notices the flag on its next poll wake-up (the signal itself interrupts
// `poll()` with EINTR) and forwards it as `Input::Interrupt`, so the
// application sees the interrupt on the controller thread like any other
// input.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::input::KeyEvent;
use crate::mailbox::Mailbox;
use crate::reader::{Input, InputReader};
use crate::terminal::{Size, Terminal};

// ─── SIGINT ──────────────────────────────────────────────────────────────────

/// Global flag set by the SIGINT handler. Drained by the input actor.
static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigint_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigint_handler as *const () as usize;
        // No SA_RESTART: the reader's poll() should return early.
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGINT, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigint_handler(_sig: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigint_handler() {
    // No-op on non-unix platforms.
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Repaint and wait for the next input.
    Continue,
    /// Leave the loop. No further input is consumed.
    Quit,
}

/// Application interface for the event loop.
///
/// Only [`on_key`](App::on_key) and [`paint`](App::paint) are required.
pub trait App {
    /// Handle one decoded keystroke.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// Handle SIGINT. Quits by default.
    fn on_interrupt(&mut self) -> Action {
        Action::Quit
    }

    /// Stdin reached EOF. The loop quits after this returns.
    fn on_input_closed(&mut self) {}

    /// Produce the complete frame for a terminal of the given size.
    ///
    /// The frame replaces the whole screen; rows end with `\n`.
    fn paint(&mut self, size: Size) -> Vec<u8>;
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The controller loop.
///
/// Owns the terminal and the mailbox. Call [`run`](Self::run) to enter the
/// loop. It returns when the application signals [`Action::Quit`] or
/// input closes, with the terminal already restored.
pub struct EventLoop {
    terminal: Terminal,
    mailbox: Mailbox<Input>,
}

impl EventLoop {
    /// Create a new event loop with the default mailbox capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            mailbox: Mailbox::new(),
        })
    }

    /// Run until the application quits or stdin closes.
    ///
    /// This method:
    /// 1. Enters raw mode on the alternate screen
    /// 2. Installs the SIGINT handler
    /// 3. Spawns the input actor
    /// 4. Paints, then handles inputs one at a time, repainting after each
    /// 5. Stops and joins the input actor, restores the terminal
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave or drawing fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigint_handler();

        let mut reader = InputReader::spawn(self.mailbox.clone(), &SIGINT_RECEIVED);

        let result = self.run_inner(app);

        // Always clean up, even if the loop errored.
        reader.stop();
        let evicted = self.mailbox.evicted();
        if evicted > 0 {
            log::warn!("{evicted} keystrokes dropped under load");
        }
        self.terminal.leave()?;

        result
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        self.repaint(app)?;

        loop {
            let action = match self.mailbox.recv() {
                Some(Input::Key(key)) => app.on_key(key),
                Some(Input::Interrupt) => app.on_interrupt(),
                None => {
                    app.on_input_closed();
                    return Ok(());
                }
            };

            if action == Action::Quit {
                return Ok(());
            }

            self.repaint(app)?;
        }
    }

    fn repaint(&mut self, app: &mut impl App) -> io::Result<()> {
        let size = self.terminal.refresh_size();
        let frame = app.paint(size);
        self.terminal.draw(&frame)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
