//! # light-editor: Editor core for light
//!
//! - **[`buffer`]**: `Buffer`, bounded byte lines plus the append row
//! - **[`cursor`]**: `Cursor` and its movement rules
//! - **[`command`]**: the `:<N>` and `=<file>` in-buffer commands
//! - **[`view`]**: renders the cursor's neighbourhood as one frame
//! - **[`persist`]**: load, save, and the scratch-file fallback
//! - **[`session`]**: key bindings and exit handling; the event loop's `App`
//!
//! Nothing here touches the terminal directly. Keys come in as
//! `light_term::input::KeyEvent`, frames go out as bytes.

pub mod buffer;
pub mod command;
pub mod cursor;
pub mod persist;
pub mod session;
pub mod view;
