// SPDX-License-Identifier: MIT
//
// light-term: Terminal layer for light.
//
// Everything that talks to the OS lives here: raw mode and terminal size
// (`terminal`), escape sequences (`ansi`), the key decoder (`input`), the
// bounded hand-off between threads (`mailbox`), the stdin-reading input
// actor (`reader`), and the controller loop with its SIGINT flag
// (`event_loop`).
//
// Direct termios and ANSI sequences, no TUI framework. The editor core in
// `light-editor` only ever sees `KeyEvent`s in and frame bytes out.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod mailbox;
pub mod reader;
pub mod terminal;
