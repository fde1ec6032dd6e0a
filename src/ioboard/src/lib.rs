#![no_std]

//! # I/O board
//!
//! Device side of the serial I/O board: the command table, the terminal
//! model, the persisted board parameters and the [`Board`] that turns parsed
//! commands into reply lines.
//!
//! A firmware main loop looks like this:
//!
//! ```ignore
//! let mut processor = CommandProcessor::<INPUT_BUF_SIZE>::new(commands::registry());
//! let mut board = Board::new(gpio, eeprom);
//! loop {
//!     if let Some(byte) = uart.read() {
//!         processor.submit_byte(byte);
//!     }
//!     if processor.has_line_ready() {
//!         uart.write(board.respond(processor.parse_command()).as_bytes());
//!         if board.take_dfu_request() {
//!             enter_bootloader();
//!         }
//!     }
//! }
//! ```

#[macro_use]
mod fmt;

pub mod board;
pub mod commands;
pub mod gpio;
pub mod nvparams;

pub use board::{Board, ExecError, Reply, ReplyLine};
pub use gpio::{Capabilities, Direction, Gpio, GpioError, TerminalBank};
pub use nvparams::{MemoryStore, NvError, NvParams, ParamStore};
