//! Turns one accumulated line into a typed `Command`.
//!
//! The grammar is a fixed sequence of structural decisions:
//!
//! ```text
//! line      := mnemonic [':' leftargs] operator [rightargs]
//!            | mnemonic [':' leftargs]
//! operator  := '?' | '='
//! leftargs  := arg (',' arg)*
//! rightargs := arg (',' arg)*
//! ```
//!
//! The shape comes from the first `?` (else the first `=`), the mnemonic from
//! everything before an optional `:`, and each argument list is parsed
//! against the registry entry of the (mnemonic, shape) pair.

use cmdproc_config::{
    ARG_DELIMITER, LEFTARGS_START_CH, MAX_N_LEFTARGS, MAX_N_RIGHTARGS, MNEM_MAX_LEN, QUERY_OP_CH,
    SET_OP_CH,
};
use heapless::{String, Vec};

use crate::args::{parse_arg, ArgType, ArgValue};
use crate::error::ParseError;
use crate::registry::{CommandShape, Registry};

/// A fully parsed and validated command, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub shape: CommandShape,
    pub mnemonic: String<MNEM_MAX_LEN>,
    pub left_args: Vec<ArgValue, MAX_N_LEFTARGS>,
    pub right_args: Vec<ArgValue, MAX_N_RIGHTARGS>,
}

impl Command {
    /// Returns `true` if this command is `mnemonic` in the given shape.
    pub fn is(&self, mnemonic: &str, shape: CommandShape) -> bool {
        self.shape == shape && self.mnemonic.as_str() == mnemonic
    }
}

/// Splits `line` at the first operator and reports the shape.
///
/// Returns `(shape, left side, right side)`; the right side is empty for
/// `Do` commands.
pub fn split_shape(line: &[u8]) -> (CommandShape, &[u8], &[u8]) {
    let operator = line
        .iter()
        .position(|&b| b == QUERY_OP_CH)
        .map(|pos| (CommandShape::Query, pos))
        .or_else(|| line.iter().position(|&b| b == SET_OP_CH).map(|pos| (CommandShape::Set, pos)));
    match operator {
        Some((shape, pos)) => (shape, &line[..pos], &line[pos + 1..]),
        None => (CommandShape::Do, line, &[]),
    }
}

/// Splits the left side into the mnemonic and an optional argument list.
pub fn split_mnemonic(left: &[u8]) -> (&[u8], Option<&[u8]>) {
    match left.iter().position(|&b| b == LEFTARGS_START_CH) {
        Some(pos) => (&left[..pos], Some(&left[pos + 1..])),
        None => (left, None),
    }
}

/// Parses one complete line against `registry`.
pub fn parse_line(line: &[u8], registry: &Registry) -> Result<Command, ParseError> {
    let (shape, left, right) = split_shape(line);
    let (mnemonic, left_list) = split_mnemonic(left);

    if mnemonic.len() > MNEM_MAX_LEN {
        debug!("mnemonic too long ({} bytes)", mnemonic.len());
        return Err(ParseError::UnknownCommand);
    }
    let spec = registry.find(mnemonic, shape).ok_or(ParseError::UnknownCommand)?;

    let mut command = Command {
        shape,
        mnemonic: String::new(),
        left_args: Vec::new(),
        right_args: Vec::new(),
    };
    command
        .mnemonic
        .push_str(spec.mnemonic)
        .map_err(|_| ParseError::UnknownCommand)?;

    match left_list {
        Some(list) => parse_args(list, spec.left, &mut command.left_args)?,
        None if !spec.left.is_empty() => return Err(ParseError::WrongArgCount),
        None => {}
    }

    if !right.is_empty() {
        parse_args(right, spec.right, &mut command.right_args)?;
    } else if !spec.right.is_empty() {
        return Err(ParseError::WrongArgCount);
    }

    trace!("parsed {} ({} left, {} right)", spec.mnemonic, command.left_args.len(), command.right_args.len());
    Ok(command)
}

/// Parses a comma separated list into `dest`, one token per slot of `types`.
///
/// Tokens are checked in order, so a surplus token is reported as soon as it
/// is reached and a malformed token stops parsing immediately. A single
/// trailing delimiter closes the list and does not start another token.
fn parse_args<const M: usize>(
    list: &[u8],
    types: &[ArgType],
    dest: &mut Vec<ArgValue, M>,
) -> Result<(), ParseError> {
    let list = list.strip_suffix(&[ARG_DELIMITER]).unwrap_or(list);
    if !list.is_empty() {
        for (idx, token) in list.split(|&b| b == ARG_DELIMITER).enumerate() {
            let arg_type = *types.get(idx).ok_or(ParseError::WrongArgCount)?;
            let value = parse_arg(token, arg_type)?;
            dest.push(value).map_err(|_| ParseError::WrongArgCount)?;
        }
    }
    if dest.len() != types.len() {
        return Err(ParseError::WrongArgCount);
    }
    Ok(())
}
