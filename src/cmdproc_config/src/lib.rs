#![no_std]

//! Compile-time configuration shared by the command processor crates.
//!
//! Everything here is a protocol-fixed constant; nothing grows at runtime.

/// Byte that ends a command line.
pub const LINE_TERMINATOR: u8 = b'\r';

/// Bytes dropped wherever they appear in the input stream.
pub const IGNORE_CHARS: &[u8] = b"\n\t ";

/// Separates arguments inside a left or right argument list.
pub const ARG_DELIMITER: u8 = b',';

/// Introduces the left argument list after the mnemonic.
pub const LEFTARGS_START_CH: u8 = b':';

/// Set operator.
pub const SET_OP_CH: u8 = b'=';

/// Query operator.
pub const QUERY_OP_CH: u8 = b'?';

/// Raw line buffer size, one byte is kept free for the terminator.
pub const INPUT_BUF_SIZE: usize = 33;

/// Longest accepted mnemonic.
pub const MNEM_MAX_LEN: usize = 16;

/// Longest string argument; longer tokens are truncated.
pub const ARG_MAX_LEN: usize = 16;

/// Maximum number of arguments before the operator.
pub const MAX_N_LEFTARGS: usize = 4;

/// Maximum number of arguments after the operator.
pub const MAX_N_RIGHTARGS: usize = 4;

/// Capacity of one formatted reply line (without the line ending).
pub const REPLY_MAX_LEN: usize = 64;

/// Line ending appended to every reply.
pub const REPLY_LINE_END: &str = "\r\n";

/// Model string reported by `IDN?`.
pub const BOARD_MODEL: &str = "UXIB-DN12";

/// Board ID used when no valid one is stored.
pub const DEFAULT_BOARD_ID: &str = "000000";

/// Longest board ID accepted by `BID=`.
pub const BOARD_ID_MAX_LEN: usize = 16;
