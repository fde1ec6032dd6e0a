//! Byte-level adaptation between the host console and the board's serial line.

use cmdproc_config::LINE_TERMINATOR;

/// Ctrl-D, ends an interactive session.
const EOT: u8 = 0x04;

/// How the console delivers bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {

    /// Console in serial-line mode: bytes pass unchanged, Ctrl-D ends the session.
    Raw,

    /// Piped or line-buffered input: a bare `\n` ends a line.
    Cooked,
}

/// Per-byte filter applied before bytes reach the board.
#[derive(Debug)]
pub struct ByteFilter {
    mode: LineMode,
    prev: u8,
}

impl ByteFilter {
    pub fn new(mode: LineMode) -> Self {
        Self { mode, prev: 0 }
    }

    /// Maps one console byte to a serial byte; `None` ends the session.
    pub fn apply(&mut self, byte: u8) -> Option<u8> {
        let prev = core::mem::replace(&mut self.prev, byte);
        match self.mode {
            LineMode::Raw if byte == EOT => None,
            LineMode::Raw => Some(byte),
            // `\r\n` already carries its terminator
            LineMode::Cooked if byte == b'\n' && prev != LINE_TERMINATOR => Some(LINE_TERMINATOR),
            LineMode::Cooked => Some(byte),
        }
    }
}
