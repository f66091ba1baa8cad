// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Input actor: reads stdin, decodes keys, feeds the mailbox.
//
// A dedicated thread reads stdin and runs the key decoder. Each decoded
// event goes into the shared [`Mailbox`]. The controller thread never
// reads stdin and this thread never touches editor state.
//
// The thread uses `poll()` with a short timeout instead of a bare blocking
// `read()`. Each timeout is a chance to:
//
//   - check the stop flag (cooperative shutdown, the thread is joined)
//   - forward a pending SIGINT as [`Input::Interrupt`]
//   - flush a dangling `ESC` as a real Escape keypress
//
// EOF on stdin closes the mailbox, which wakes the controller with `None`.

#[cfg(unix)]
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::input::{Decoder, KeyEvent};
use crate::mailbox::{Delivery, Mailbox};

/// Byte chunk read from stdin. A paste can be large; a keypress is 1-3 bytes.
const READ_BUF_SIZE: usize = 4096;

/// How often the reader thread wakes up without input (milliseconds).
///
/// Bounds both shutdown latency and the Escape-key disambiguation delay.
const POLL_TIMEOUT_MS: i32 = 50;

/// What the input actor delivers to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A decoded keystroke.
    Key(KeyEvent),
    /// The process received SIGINT.
    Interrupt,
}

/// Background input actor.
///
/// Runs until [`stop`](Self::stop) is called (or the reader is dropped), or
/// until stdin reaches EOF.
pub struct InputReader {
    /// The reader thread handle. `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    /// Shared flag to signal the thread to exit.
    stop: Arc<AtomicBool>,
}

impl InputReader {
    /// Spawn the input actor.
    ///
    /// `interrupt` is polled (and cleared) between reads; when set, an
    /// [`Input::Interrupt`] is pushed ahead of any further keys.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread (extremely rare).
    #[must_use]
    pub fn spawn(mailbox: Mailbox<Input>, interrupt: &'static AtomicBool) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                Self::reader_loop(&mailbox, &stop_flag, interrupt);
                mailbox.close();
            })
            .expect("failed to spawn stdin reader thread");

        Self {
            handle: Some(handle),
            stop,
        }
    }

    /// Signal the reader thread to stop and wait for it to exit.
    ///
    /// Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Push one input. Returns `false` when the mailbox is closed.
    fn deliver(mailbox: &Mailbox<Input>, input: Input) -> bool {
        match mailbox.push(input) {
            Delivery::Queued => true,
            Delivery::Evicted => {
                log::warn!("input mailbox full, dropped oldest pending key");
                true
            }
            Delivery::Closed => false,
        }
    }

    /// Forward a raised interrupt flag on the urgent lane, so no amount of
    /// queued keys can evict it. Returns `false` when the mailbox is closed.
    fn forward_interrupt(mailbox: &Mailbox<Input>, interrupt: &AtomicBool) -> bool {
        if interrupt.swap(false, Ordering::Relaxed) {
            log::info!("interrupt received");
            return mailbox.push_urgent(Input::Interrupt) != Delivery::Closed;
        }
        true
    }

    /// Decode a chunk and push every event. Returns `false` when the
    /// mailbox is closed.
    fn forward_keys(mailbox: &Mailbox<Input>, keys: impl IntoIterator<Item = KeyEvent>) -> bool {
        keys.into_iter()
            .all(|key| Self::deliver(mailbox, Input::Key(key)))
    }

    /// The reader thread's main loop.
    #[cfg(unix)]
    fn reader_loop(mailbox: &Mailbox<Input>, stop: &AtomicBool, interrupt: &AtomicBool) {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut decoder = Decoder::new();

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            if !Self::forward_interrupt(mailbox, interrupt) {
                break;
            }

            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd: stdin_fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
            };

            // Timeout or EINTR (SIGINT lands here): resolve a lone ESC and
            // loop back to the flag checks.
            if ready <= 0 {
                if !Self::forward_keys(mailbox, decoder.flush()) {
                    break;
                }
                continue;
            }

            let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };

            if n < 0 && io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                continue;
            }
            if n <= 0 {
                log::info!("stdin closed");
                break;
            }

            #[allow(clippy::cast_sign_loss)] // n > 0 guaranteed above.
            let keys = decoder.advance(&buf[..n as usize]);
            if !Self::forward_keys(mailbox, keys) {
                break;
            }
        }
    }

    /// Non-unix fallback using blocking reads with no poll.
    ///
    /// Less graceful shutdown (thread blocks in read), but functional.
    #[cfg(not(unix))]
    fn reader_loop(mailbox: &Mailbox<Input>, stop: &AtomicBool, interrupt: &AtomicBool) {
        use std::io::Read;

        let stdin = std::io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut decoder = Decoder::new();

        loop {
            if stop.load(Ordering::Relaxed) || !Self::forward_interrupt(mailbox, interrupt) {
                break;
            }

            match stdin.lock().read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if !Self::forward_keys(mailbox, decoder.advance(&buf[..n])) {
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
