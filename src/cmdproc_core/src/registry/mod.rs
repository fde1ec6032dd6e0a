//! Static command table and lookup.
//!
//! Tables are normally generated with `define_commands!`; a `Registry` is a
//! thin read-only view over one.

use cmdproc_config::MNEM_MAX_LEN;

use crate::args::ArgType;

/// Structural form of a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandShape {

    /// No operator, a one-shot action (`DFU`).
    Do,

    /// `?` operator, a read request (`DIR:5?`).
    Query,

    /// `=` operator, a write request (`OUT:3=1`).
    Set,
}

impl CommandShape {
    /// Operator character, if the shape has one.
    pub const fn operator(self) -> Option<char> {
        match self {
            CommandShape::Do => None,
            CommandShape::Query => Some('?'),
            CommandShape::Set => Some('='),
        }
    }
}

/// Argument contract of one mnemonic+shape pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub mnemonic: &'static str,
    pub shape: CommandShape,
    pub left: &'static [ArgType],
    pub right: &'static [ArgType],
}

impl CommandSpec {
    pub const fn n_left_args(&self) -> usize {
        self.left.len()
    }

    pub const fn n_right_args(&self) -> usize {
        self.right.len()
    }
}

/// Read-only view over a static command table.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    specs: &'static [CommandSpec],
}

impl Registry {
    pub const fn new(specs: &'static [CommandSpec]) -> Self {
        Self { specs }
    }

    /// Looks up the contract for `mnemonic` in the given shape.
    ///
    /// Only the first `MNEM_MAX_LEN` bytes take part in the comparison.
    /// Returns a copy of the first matching entry.
    pub fn find(&self, mnemonic: &[u8], shape: CommandShape) -> Option<CommandSpec> {
        let wanted = bounded(mnemonic);
        self.specs
            .iter()
            .find(|spec| spec.shape == shape && bounded(spec.mnemonic.as_bytes()) == wanted)
            .copied()
    }

    pub fn specs(&self) -> &'static [CommandSpec] {
        self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

fn bounded(s: &[u8]) -> &[u8] {
    &s[..s.len().min(MNEM_MAX_LEN)]
}
