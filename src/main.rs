// SPDX-License-Identifier: MIT
//
// light: a minimal full-screen terminal text editor.
//
// This is the binary that wires the two crates together:
//
//   light-term   → raw mode, key decoding, input actor, event loop
//   light-editor → buffer, cursor, commands, rendering, persistence
//
// `Session` implements light-term's App trait. Each keypress flows through:
//
//   stdin → input actor → mailbox → on_key → buffer/cursor mutation
//   paint → view::render → one full-screen write
//
// When the loop returns the terminal is already restored, so the save
// summary and any warnings land on the user's normal screen.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use light_editor::session::Session;
use light_term::event_loop::EventLoop;

#[derive(Parser)]
#[command(name = "light", version, about = "A minimal full-screen terminal text editor")]
struct Args {
    /// File to edit. Missing files start an empty buffer.
    file: Option<PathBuf>,

    /// Write a debug log to this file.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

fn init_logging(path: &Path) {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match File::create(path) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Debug, config, file);
        }
        Err(e) => eprintln!("light: cannot open log file '{}': {e}", path.display()),
    }
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log {
        init_logging(path);
    }
    log::info!("light starting, file: {:?}", args.file);

    let (mut session, notice) = Session::open(args.file.as_deref());
    if let Some(notice) = notice {
        eprintln!("{notice}");
    }

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("light: failed to initialize terminal: {e}");
        process::exit(1);
    });

    let result = event_loop.run(&mut session);
    drop(event_loop);

    let outcome = session.finish();
    for warning in session.warnings() {
        eprintln!("light: {warning}");
    }

    if let Err(e) = result {
        log::error!("terminal error: {e}");
        eprintln!("light: {e}");
        process::exit(1);
    }

    println!("{outcome}");
}
