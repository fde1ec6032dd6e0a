use crate::error::ParseError;
use crate::input::LineAccumulator;
use crate::parser::{parse_line, Command};
use crate::registry::Registry;

/// Byte-in, command-out front end of the protocol.
///
/// Owns the raw line buffer and a view of the command table. Bytes are fed
/// with [`submit_byte`](Self::submit_byte); once [`has_line_ready`](Self::has_line_ready)
/// reports `true` the line is turned into a [`Command`] with
/// [`parse_command`](Self::parse_command), which also re-arms the buffer.
///
/// Every method takes `&self`/`&mut self`, so byte ingestion and parsing can
/// never interleave on the same processor.
pub struct CommandProcessor<const N: usize> {
    line: LineAccumulator<N>,
    registry: Registry,
}

impl<const N: usize> CommandProcessor<N> {
    pub const fn new(registry: Registry) -> Self {
        Self {
            line: LineAccumulator::new(),
            registry,
        }
    }

    /// Feeds one byte from the transport. Never blocks.
    pub fn submit_byte(&mut self, byte: u8) {
        self.line.submit(byte);
    }

    /// Returns `true` while a complete line waits for [`parse_command`](Self::parse_command).
    pub fn has_line_ready(&self) -> bool {
        self.line.is_ready()
    }

    /// Parses the pending line.
    ///
    /// Whatever the outcome, the line is consumed and the accumulator accepts
    /// new bytes immediately afterwards. Without a pending line nothing is
    /// consumed and `NoLine` is returned.
    pub fn parse_command(&mut self) -> Result<Command, ParseError> {
        if !self.line.is_ready() {
            return Err(ParseError::NoLine);
        }
        let result = if self.line.overflowed() {
            Err(ParseError::Overflow)
        } else {
            parse_line(self.line.as_bytes(), &self.registry)
        };
        self.line.clear();
        if let Err(e) = result {
            debug!("command rejected: {}", e);
        }
        result
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{ArgType, ArgValue};
    use crate::registry::{CommandShape, CommandSpec};

    static SPECS: &[CommandSpec] = &[
        CommandSpec { mnemonic: "OUT", shape: CommandShape::Set, left: &[ArgType::UInt8], right: &[ArgType::UInt8] },
        CommandSpec { mnemonic: "DIR", shape: CommandShape::Query, left: &[ArgType::UInt8], right: &[] },
        CommandSpec { mnemonic: "IDN", shape: CommandShape::Query, left: &[], right: &[] },
    ];

    fn processor() -> CommandProcessor<33> {
        CommandProcessor::new(Registry::new(SPECS))
    }

    fn feed(p: &mut CommandProcessor<33>, bytes: &[u8]) {
        for &b in bytes {
            p.submit_byte(b);
        }
    }

    #[test]
    fn test_scenario_set() {
        let mut p = processor();
        feed(&mut p, b"OUT:3=1\r");
        assert!(p.has_line_ready());
        let cmd = p.parse_command().unwrap();
        assert_eq!(cmd.left_args.as_slice(), &[ArgValue::UInt8(3)]);
        assert_eq!(cmd.right_args.as_slice(), &[ArgValue::UInt8(1)]);
        assert!(!p.has_line_ready());
    }

    #[test]
    fn test_scenario_errors_rearm() {
        let mut p = processor();
        for (line, err) in [
            (&b"FOO?\r"[..], ParseError::UnknownCommand),
            (&b"OUT:3,4=1\r"[..], ParseError::WrongArgCount),
            (&b"OUT:300=1\r"[..], ParseError::ArgFormat),
        ] {
            feed(&mut p, line);
            assert_eq!(p.parse_command(), Err(err));
            assert!(!p.has_line_ready());
        }

        feed(&mut p, b"DIR:5?\r");
        assert_eq!(p.parse_command().unwrap().left_args.as_slice(), &[ArgValue::UInt8(5)]);
    }

    #[test]
    fn test_backpressure_keeps_pending_line() {
        let mut p = processor();
        feed(&mut p, b"IDN?\r");
        feed(&mut p, b"OUT:3=1\r");
        assert!(p.parse_command().unwrap().is("IDN", CommandShape::Query));
        assert!(!p.has_line_ready());
    }

    #[test]
    fn test_overflow_rejected_then_recovers() {
        let mut p = processor();
        feed(&mut p, b"DIR:1111111111111111111111111111111111111?\r");
        assert!(p.has_line_ready());
        assert_eq!(p.parse_command(), Err(ParseError::Overflow));

        feed(&mut p, b"IDN?\r");
        assert!(p.parse_command().is_ok());
    }

    #[test]
    fn test_no_line_leaves_partial_input() {
        let mut p = processor();
        feed(&mut p, b"ID");
        assert_eq!(p.parse_command(), Err(ParseError::NoLine));
        feed(&mut p, b"N?\r");
        assert!(p.parse_command().unwrap().is("IDN", CommandShape::Query));
    }
}
