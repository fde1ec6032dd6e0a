#![no_std]

//! # Command processor core
//!
//! Byte-stream front end for the I/O board's ASCII command protocol. A host
//! sends short lines such as `OUT:3=1\r`, `DIR:5?\r` or `IDN?\r`; this crate
//! accumulates them without heap allocation, resolves the mnemonic against a
//! static command table and yields a typed [`Command`] or a single
//! [`ParseError`].
//!
//! Building blocks, leaf first:
//! - [`input::LineAccumulator`]: byte filter and fixed-size line buffer,
//! - [`registry::Registry`]: lookup of (mnemonic, shape) contracts,
//! - [`args::parse_arg`]: one token into one typed value,
//! - [`parser::parse_line`]: the grammar,
//! - [`CommandProcessor`]: the three-call facade used by firmware main loops.
//!
//! Command tables are declared with [`define_commands!`].

#[macro_use]
mod fmt;

pub mod args;
pub mod error;
pub mod input;
pub mod parser;
pub mod processor;
pub mod registry;

pub use cmdproc_config as config;
pub use cmdproc_macros::define_commands;

pub use args::{ArgType, ArgValue};
pub use error::ParseError;
pub use parser::Command;
pub use processor::CommandProcessor;
pub use registry::{CommandShape, CommandSpec, Registry};
