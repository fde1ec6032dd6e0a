//! Terminal I/O abstraction and the board's terminal bank.

use core::fmt;

/// Direction of a terminal. The numeric value is what `DIR` reports and accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input = 0,
    Output = 1,
}

impl Direction {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Direction {
    type Error = GpioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Input),
            1 => Ok(Direction::Output),
            _ => Err(GpioError::Unsupported),
        }
    }
}

/// What a terminal can physically do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    pub input: bool,
    pub output: bool,
}

impl Capabilities {
    pub const INPUT: Self = Self { input: true, output: false };
    pub const OUTPUT: Self = Self { input: false, output: true };
    pub const BIDIR: Self = Self { input: true, output: true };

    /// Token reported by `TCP`: `I`, `O` or `IO`.
    pub const fn as_str(self) -> &'static str {
        match (self.input, self.output) {
            (true, true) => "IO",
            (true, false) => "I",
            (false, true) => "O",
            (false, false) => "",
        }
    }

    pub const fn supports(self, dir: Direction) -> bool {
        match dir {
            Direction::Input => self.input,
            Direction::Output => self.output,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {

    /// No terminal with this number.
    InvalidTerminal,

    /// The terminal exists but cannot do this.
    Unsupported,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::InvalidTerminal => f.write_str("invalid terminal"),
            GpioError::Unsupported => f.write_str("unsupported operation"),
        }
    }
}

/// Access to the numbered I/O terminals of a board.
pub trait Gpio {

    /// Terminal numbers in board order.
    fn terminal_nos(&self) -> &[u8];

    fn capabilities(&self, terminal: u8) -> Result<Capabilities, GpioError>;

    /// Level seen on an input-capable terminal.
    fn input(&self, terminal: u8) -> Result<bool, GpioError>;

    /// Output latch of an output-capable terminal.
    fn output(&self, terminal: u8) -> Result<bool, GpioError>;

    fn set_output(&mut self, terminal: u8, on: bool) -> Result<(), GpioError>;

    fn direction(&self, terminal: u8) -> Result<Direction, GpioError>;

    fn set_direction(&mut self, terminal: u8, dir: Direction) -> Result<(), GpioError>;
}

/// Static description of one terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalDef {
    pub no: u8,
    pub caps: Capabilities,
    pub initial_dir: Direction,
}

const fn out_only(no: u8) -> TerminalDef {
    TerminalDef { no, caps: Capabilities::OUTPUT, initial_dir: Direction::Output }
}

const fn bidir(no: u8) -> TerminalDef {
    TerminalDef { no, caps: Capabilities::BIDIR, initial_dir: Direction::Input }
}

pub const NUM_TERMINALS: usize = 14;

/// Terminal layout: 1..=12 are output drivers, 13 and 14 are bidirectional.
pub const TERMINALS: [TerminalDef; NUM_TERMINALS] = [
    out_only(1), out_only(2), out_only(3), out_only(4),
    out_only(5), out_only(6), out_only(7), out_only(8),
    out_only(9), out_only(10), out_only(11), out_only(12),
    bidir(13), bidir(14),
];

const TERMINAL_NOS: [u8; NUM_TERMINALS] = {
    let mut nos = [0u8; NUM_TERMINALS];
    let mut i = 0;
    while i < NUM_TERMINALS {
        nos[i] = TERMINALS[i].no;
        i += 1;
    }
    nos
};

/// In-memory model of the board's terminals.
///
/// Holds the direction and output latches the port registers would hold on
/// hardware, plus the externally driven pin levels, which tests and the host
/// simulator set with [`drive_input`](Self::drive_input).
#[derive(Debug, Clone)]
pub struct TerminalBank {
    dirs: [Direction; NUM_TERMINALS],
    latches: [bool; NUM_TERMINALS],
    pins: [bool; NUM_TERMINALS],
}

impl TerminalBank {
    /// Bank in its power-on state.
    pub const fn new() -> Self {
        let mut dirs = [Direction::Input; NUM_TERMINALS];
        let mut i = 0;
        while i < NUM_TERMINALS {
            dirs[i] = TERMINALS[i].initial_dir;
            i += 1;
        }
        Self {
            dirs,
            latches: [false; NUM_TERMINALS],
            pins: [false; NUM_TERMINALS],
        }
    }

    fn index(terminal: u8) -> Result<usize, GpioError> {
        TERMINALS
            .iter()
            .position(|t| t.no == terminal)
            .ok_or(GpioError::InvalidTerminal)
    }

    /// Sets the external level applied to a terminal's pin.
    pub fn drive_input(&mut self, terminal: u8, level: bool) -> Result<(), GpioError> {
        let idx = Self::index(terminal)?;
        self.pins[idx] = level;
        Ok(())
    }
}

impl Default for TerminalBank {
    fn default() -> Self {
        Self::new()
    }
}

impl Gpio for TerminalBank {
    fn terminal_nos(&self) -> &[u8] {
        &TERMINAL_NOS
    }

    fn capabilities(&self, terminal: u8) -> Result<Capabilities, GpioError> {
        Ok(TERMINALS[Self::index(terminal)?].caps)
    }

    fn input(&self, terminal: u8) -> Result<bool, GpioError> {
        let idx = Self::index(terminal)?;
        if !TERMINALS[idx].caps.input {
            return Err(GpioError::Unsupported);
        }
        // A pin driven as output reads back its own latch.
        Ok(match self.dirs[idx] {
            Direction::Output => self.latches[idx],
            Direction::Input => self.pins[idx],
        })
    }

    fn output(&self, terminal: u8) -> Result<bool, GpioError> {
        let idx = Self::index(terminal)?;
        if !TERMINALS[idx].caps.output {
            return Err(GpioError::Unsupported);
        }
        Ok(self.latches[idx])
    }

    fn set_output(&mut self, terminal: u8, on: bool) -> Result<(), GpioError> {
        let idx = Self::index(terminal)?;
        if !TERMINALS[idx].caps.output {
            return Err(GpioError::Unsupported);
        }
        self.latches[idx] = on;
        Ok(())
    }

    fn direction(&self, terminal: u8) -> Result<Direction, GpioError> {
        Ok(self.dirs[Self::index(terminal)?])
    }

    fn set_direction(&mut self, terminal: u8, dir: Direction) -> Result<(), GpioError> {
        let idx = Self::index(terminal)?;
        if !TERMINALS[idx].caps.supports(dir) {
            return Err(GpioError::Unsupported);
        }
        self.dirs[idx] = dir;
        Ok(())
    }
}
