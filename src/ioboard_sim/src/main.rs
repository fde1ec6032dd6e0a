//! Host simulator of the I/O board.
//!
//! Speaks the board's command protocol on stdin/stdout:
//!
//! ```text
//! ioboard_sim [EEPROM_FILE]
//! ```
//!
//! With `EEPROM_FILE` the board parameters persist in that file, otherwise
//! they live in memory for the duration of the session.

mod file_store;
mod raw_mode;
mod runner;
mod transport;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use ioboard::{Board, Gpio, MemoryStore, ParamStore, TerminalBank};
use ioboard::nvparams::RECORD_LEN;

use file_store::FileStore;
use raw_mode::RawMode;
use transport::LineMode;

fn main() -> ExitCode {
    let interactive = io::stdin().is_terminal();
    let terminal = if interactive {
        match RawMode::new(0) {
            Ok(mode) => Some(mode),
            Err(e) => {
                eprintln!("⚠️ console stays line buffered: {}", e);
                None
            }
        }
    } else {
        None
    };
    let mode = if terminal.is_some() { LineMode::Raw } else { LineMode::Cooked };

    if interactive {
        eprintln!("❗ioboard simulator, Ctrl-D to exit❗");
    }

    let gpio = TerminalBank::new();
    let result = match std::env::args_os().nth(1) {
        Some(path) => serve(Board::new(gpio, FileStore::new(path)), mode),
        None => serve(Board::new(gpio, MemoryStore::<RECORD_LEN>::new()), mode),
    };
    drop(terminal);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("⛔ simulator stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn serve<G: Gpio, S: ParamStore>(mut board: Board<G, S>, mode: LineMode) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    runner::run(io::stdin(), &mut stdout, mode, &mut board)
}
