//! Command execution and reply formatting.

use core::fmt::{self, Write};

use cmdproc_config::{BOARD_MODEL, REPLY_LINE_END, REPLY_MAX_LEN};
use cmdproc_core::{ArgValue, Command, CommandShape, ParseError};
use heapless::String;

use crate::gpio::{Direction, Gpio, GpioError};
use crate::nvparams::{NvError, NvParams, ParamStore};

/// Reply body, without the line ending.
pub type Reply = String<REPLY_MAX_LEN>;

/// Capacity of a complete reply line.
pub const REPLY_LINE_LEN: usize = REPLY_MAX_LEN + REPLY_LINE_END.len();

/// One complete reply line, ready for the transport.
pub type ReplyLine = String<REPLY_LINE_LEN>;

/// Failure while executing an already parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecError {

    /// Terminal number does not exist.
    InvalidTerminal,

    /// Terminal or board cannot perform the request.
    Unsupported,

    /// Argument well-formed but out of the accepted set.
    ArgValue,

    /// Parameter store failed.
    Storage,

    /// Reply did not fit the reply buffer.
    ReplyOverflow,
}

impl ExecError {
    /// Token used after `ERROR:` in replies.
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecError::InvalidTerminal => "TERM_NO",
            ExecError::Unsupported => "UNSUPPORTED",
            ExecError::ArgValue => "ARG_VAL",
            ExecError::Storage => "STORAGE",
            ExecError::ReplyOverflow => "REPLY_LEN",
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GpioError> for ExecError {
    fn from(e: GpioError) -> Self {
        match e {
            GpioError::InvalidTerminal => ExecError::InvalidTerminal,
            GpioError::Unsupported => ExecError::Unsupported,
        }
    }
}

impl From<NvError> for ExecError {
    fn from(e: NvError) -> Self {
        match e {
            NvError::InvalidId => ExecError::ArgValue,
            NvError::Store | NvError::Checksum | NvError::Corrupt => ExecError::Storage,
        }
    }
}

impl From<fmt::Error> for ExecError {
    fn from(_: fmt::Error) -> Self {
        ExecError::ReplyOverflow
    }
}

/// The board: terminals, persisted parameters and the pending DFU request.
pub struct Board<G: Gpio, S: ParamStore> {
    gpio: G,
    store: S,
    params: NvParams,
    dfu_requested: bool,
}

impl<G: Gpio, S: ParamStore> Board<G, S> {
    /// Brings the board up, loading parameters from `store`.
    pub fn new(gpio: G, mut store: S) -> Self {
        let params = NvParams::init(&mut store);
        Self { gpio, store, params, dfu_requested: false }
    }

    /// Answers one parse outcome with a complete reply line.
    pub fn respond(&mut self, parsed: Result<Command, ParseError>) -> ReplyLine {
        let mut body = Reply::new();
        let outcome = match parsed {
            Ok(cmd) => self.execute(&cmd, &mut body).map_err(ExecError::as_str),
            Err(e) => Err(e.as_str()),
        };
        if let Err(kind) = outcome {
            debug!("replying with error {}", kind);
            body.clear();
            // Error tokens are far shorter than REPLY_MAX_LEN
            let _ = write!(body, "ERROR:{}", kind);
        }

        let mut line = ReplyLine::new();
        // REPLY_LINE_LEN covers the body plus the line end
        let _ = line.push_str(&body);
        let _ = line.push_str(REPLY_LINE_END);
        line
    }

    /// Executes `cmd`, writing the reply body to `reply`.
    pub fn execute(&mut self, cmd: &Command, reply: &mut Reply) -> Result<(), ExecError> {
        use CommandShape::{Do, Query, Set};

        match (cmd.mnemonic.as_str(), cmd.shape) {
            ("IDN", Query) => write!(reply, "IDN={},{}", BOARD_MODEL, self.params.board_id())?,
            ("TLS", Query) => {
                reply.write_str("TLS=")?;
                for (i, terminal) in self.gpio.terminal_nos().iter().enumerate() {
                    if i > 0 {
                        reply.write_char(',')?;
                    }
                    write!(reply, "{}", terminal)?;
                }
            }
            ("TCP", Query) => {
                let terminal = left_u8(cmd, 0)?;
                let caps = self.gpio.capabilities(terminal)?;
                write!(reply, "TCP:{}={}", terminal, caps.as_str())?;
            }
            ("INP", Query) => {
                let terminal = left_u8(cmd, 0)?;
                let level = self.gpio.input(terminal)?;
                write!(reply, "INP:{}={}", terminal, u8::from(level))?;
            }
            ("OUT", Query) => {
                let terminal = left_u8(cmd, 0)?;
                let level = self.gpio.output(terminal)?;
                write!(reply, "OUT:{}={}", terminal, u8::from(level))?;
            }
            ("OUT", Set) => {
                let terminal = left_u8(cmd, 0)?;
                let on = right_u8(cmd, 0)? != 0;
                self.gpio.set_output(terminal, on)?;
                reply.write_str("OK")?;
            }
            ("DIR", Query) => {
                let terminal = left_u8(cmd, 0)?;
                let dir = self.gpio.direction(terminal)?;
                write!(reply, "DIR:{}={}", terminal, dir.as_u8())?;
            }
            ("DIR", Set) => {
                let terminal = left_u8(cmd, 0)?;
                let dir = Direction::try_from(right_u8(cmd, 0)?).map_err(|_| ExecError::ArgValue)?;
                self.gpio.set_direction(terminal, dir)?;
                reply.write_str("OK")?;
            }
            ("BID", Query) => write!(reply, "BID={}", self.params.board_id())?,
            ("BID", Set) => {
                let id = cmd
                    .right_args
                    .first()
                    .and_then(ArgValue::as_str)
                    .ok_or(ExecError::ArgValue)?;
                let mut params = self.params.clone();
                params.set_board_id(id)?;
                params.save(&mut self.store)?;
                self.params = params;
                reply.write_str("OK")?;
            }
            ("DFU", Do) => {
                self.dfu_requested = true;
                reply.write_str("OK")?;
            }
            _ => {
                warn!("no handler for {}", cmd.mnemonic.as_str());
                return Err(ExecError::Unsupported);
            }
        }
        Ok(())
    }

    /// Returns and clears a pending bootloader request.
    ///
    /// Checked after the reply to `DFU` has been sent.
    pub fn take_dfu_request(&mut self) -> bool {
        core::mem::take(&mut self.dfu_requested)
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    pub fn params(&self) -> &NvParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn left_u8(cmd: &Command, idx: usize) -> Result<u8, ExecError> {
    cmd.left_args.get(idx).and_then(ArgValue::as_u8).ok_or(ExecError::ArgValue)
}

fn right_u8(cmd: &Command, idx: usize) -> Result<u8, ExecError> {
    cmd.right_args.get(idx).and_then(ArgValue::as_u8).ok_or(ExecError::ArgValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands;
    use crate::gpio::TerminalBank;
    use crate::nvparams::MemoryStore;
    use cmdproc_config::INPUT_BUF_SIZE;
    use cmdproc_core::CommandProcessor;

    struct Rig {
        processor: CommandProcessor<INPUT_BUF_SIZE>,
        board: Board<TerminalBank, MemoryStore<64>>,
    }

    impl Rig {
        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn with_store(store: MemoryStore<64>) -> Self {
            Self {
                processor: CommandProcessor::new(commands::registry()),
                board: Board::new(TerminalBank::new(), store),
            }
        }

        fn send(&mut self, line: &str) -> ReplyLine {
            for &b in line.as_bytes() {
                self.processor.submit_byte(b);
            }
            self.processor.submit_byte(b'\r');
            assert!(self.processor.has_line_ready());
            self.board.respond(self.processor.parse_command())
        }
    }

    #[test]
    fn test_identity() {
        let mut rig = Rig::new();
        assert_eq!(rig.send("IDN?").as_str(), "IDN=UXIB-DN12,000000\r\n");
        assert_eq!(rig.send("BID?").as_str(), "BID=000000\r\n");
    }

    #[test]
    fn test_terminal_listing() {
        let mut rig = Rig::new();
        assert_eq!(rig.send("TLS?").as_str(), "TLS=1,2,3,4,5,6,7,8,9,10,11,12,13,14\r\n");
        assert_eq!(rig.send("TCP:1?").as_str(), "TCP:1=O\r\n");
        assert_eq!(rig.send("TCP:14?").as_str(), "TCP:14=IO\r\n");
        assert_eq!(rig.send("TCP:15?").as_str(), "ERROR:TERM_NO\r\n");
    }

    #[test]
    fn test_outputs() {
        let mut rig = Rig::new();
        assert_eq!(rig.send("OUT:3?").as_str(), "OUT:3=0\r\n");
        assert_eq!(rig.send("OUT:3=1").as_str(), "OK\r\n");
        assert_eq!(rig.send("OUT:3?").as_str(), "OUT:3=1\r\n");
        assert_eq!(rig.send("OUT:3=7").as_str(), "OK\r\n");
        assert_eq!(rig.send("OUT:3?").as_str(), "OUT:3=1\r\n");
        assert_eq!(rig.send("OUT:3=0").as_str(), "OK\r\n");
        assert_eq!(rig.send("OUT:3?").as_str(), "OUT:3=0\r\n");
        assert_eq!(rig.send("OUT:0=1").as_str(), "ERROR:TERM_NO\r\n");
    }

    #[test]
    fn test_inputs_and_directions() {
        let mut rig = Rig::new();
        assert_eq!(rig.send("INP:3?").as_str(), "ERROR:UNSUPPORTED\r\n");
        assert_eq!(rig.send("DIR:3?").as_str(), "DIR:3=1\r\n");
        assert_eq!(rig.send("DIR:3=0").as_str(), "ERROR:UNSUPPORTED\r\n");

        rig.board.gpio_mut().drive_input(13, true).unwrap();
        assert_eq!(rig.send("DIR:13?").as_str(), "DIR:13=0\r\n");
        assert_eq!(rig.send("INP:13?").as_str(), "INP:13=1\r\n");
        assert_eq!(rig.send("DIR:13=1").as_str(), "OK\r\n");
        assert_eq!(rig.send("INP:13?").as_str(), "INP:13=0\r\n");
        assert_eq!(rig.send("DIR:13=2").as_str(), "ERROR:ARG_VAL\r\n");
    }

    #[test]
    fn test_board_id_persisted() {
        let mut rig = Rig::new();
        assert_eq!(rig.send("BID=SN-0042").as_str(), "OK\r\n");
        assert_eq!(rig.send("IDN?").as_str(), "IDN=UXIB-DN12,SN-0042\r\n");

        let store = rig.board.store().clone();
        let mut rebooted = Rig::with_store(store);
        assert_eq!(rebooted.send("BID?").as_str(), "BID=SN-0042\r\n");
    }

    #[test]
    fn test_board_id_storage_failure_keeps_old_id() {
        let mut processor: CommandProcessor<INPUT_BUF_SIZE> = CommandProcessor::new(commands::registry());
        let mut board = Board::new(TerminalBank::new(), MemoryStore::<4>::new());
        for &b in b"BID=NEW\r" {
            processor.submit_byte(b);
        }
        assert_eq!(board.respond(processor.parse_command()).as_str(), "ERROR:STORAGE\r\n");
        assert_eq!(board.params().board_id(), "000000");
    }

    #[test]
    fn test_parse_errors_are_reported() {
        let mut rig = Rig::new();
        assert_eq!(rig.send("FOO?").as_str(), "ERROR:CMD\r\n");
        assert_eq!(rig.send("OUT:3,4=1").as_str(), "ERROR:N_ARGS\r\n");
        assert_eq!(rig.send("OUT:300=1").as_str(), "ERROR:ARG_FMT\r\n");
        assert_eq!(rig.send("IDN=1").as_str(), "ERROR:CMD\r\n");
        assert_eq!(rig.send("DIR:1111111111111111111111111111111111111?").as_str(), "ERROR:OVERFLOW\r\n");
        assert_eq!(rig.send("IDN?").as_str(), "IDN=UXIB-DN12,000000\r\n");
    }

    #[test]
    fn test_dfu_request() {
        let mut rig = Rig::new();
        assert!(!rig.board.take_dfu_request());
        assert_eq!(rig.send("DFU").as_str(), "OK\r\n");
        assert!(rig.board.take_dfu_request());
        assert!(!rig.board.take_dfu_request());
    }

    #[test]
    fn test_error_tokens() {
        assert_eq!(ExecError::from(GpioError::InvalidTerminal).as_str(), "TERM_NO");
        assert_eq!(ExecError::from(GpioError::Unsupported).as_str(), "UNSUPPORTED");
        assert_eq!(ExecError::from(NvError::InvalidId), ExecError::ArgValue);
        assert_eq!(ExecError::from(NvError::Store), ExecError::Storage);
    }
}
