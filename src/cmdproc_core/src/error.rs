use core::fmt;

/// Outcome of a failed parse attempt.
///
/// Exactly one code is reported per line: the first check that fails wins
/// and the remaining checks are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {

    /// `parse_command` was called while no complete line was pending.
    NoLine,

    /// The line exceeded the input buffer; excess bytes were dropped.
    Overflow,

    /// Mnemonic too long, or not registered for the detected shape.
    UnknownCommand,

    /// Token count does not match the registered argument count on one side.
    WrongArgCount,

    /// A token does not parse as its declared type.
    ArgFormat,
}

impl ParseError {
    /// Token used after `ERROR:` in replies.
    pub const fn as_str(self) -> &'static str {
        match self {
            ParseError::NoLine => "NO_LINE",
            ParseError::Overflow => "OVERFLOW",
            ParseError::UnknownCommand => "CMD",
            ParseError::WrongArgCount => "N_ARGS",
            ParseError::ArgFormat => "ARG_FMT",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
