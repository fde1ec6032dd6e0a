//! Typed argument values and the token parser that produces them.

use cmdproc_config::ARG_MAX_LEN;
use heapless::String;

use crate::error::ParseError;

/// Declared type of one argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgType {
    String,
    UInt8,
    UInt16,
    Int8,
    Int16,
}

/// One parsed argument. The variant always matches the slot's `ArgType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String<ARG_MAX_LEN>),
    UInt8(u8),
    UInt16(u16),
    Int8(i8),
    Int16(i16),
}

impl ArgValue {
    pub fn arg_type(&self) -> ArgType {
        match self {
            ArgValue::Str(_) => ArgType::String,
            ArgValue::UInt8(_) => ArgType::UInt8,
            ArgValue::UInt16(_) => ArgType::UInt16,
            ArgValue::Int8(_) => ArgType::Int8,
            ArgValue::Int16(_) => ArgType::Int16,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match *self {
            ArgValue::UInt8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match *self {
            ArgValue::UInt16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match *self {
            ArgValue::Int8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match *self {
            ArgValue::Int16(v) => Some(v),
            _ => None,
        }
    }
}

/// Parses one token into a value of the declared type.
///
/// Numeric tokens must be plain decimal digits (signed types also accept a
/// single leading `-`) and must fit the destination width. String tokens
/// are truncated to `ARG_MAX_LEN` bytes instead of being rejected.
pub fn parse_arg(token: &[u8], arg_type: ArgType) -> Result<ArgValue, ParseError> {
    match arg_type {
        ArgType::String => parse_string(token).map(ArgValue::Str),
        ArgType::UInt8 => {
            let v = parse_unsigned(token)?;
            u8::try_from(v).map(ArgValue::UInt8).map_err(|_| ParseError::ArgFormat)
        }
        ArgType::UInt16 => {
            let v = parse_unsigned(token)?;
            u16::try_from(v).map(ArgValue::UInt16).map_err(|_| ParseError::ArgFormat)
        }
        ArgType::Int8 => {
            let v = parse_signed(token)?;
            i8::try_from(v).map(ArgValue::Int8).map_err(|_| ParseError::ArgFormat)
        }
        ArgType::Int16 => {
            let v = parse_signed(token)?;
            i16::try_from(v).map(ArgValue::Int16).map_err(|_| ParseError::ArgFormat)
        }
    }
}

/// Decimal digits only; saturates into an error instead of wrapping.
fn parse_unsigned(token: &[u8]) -> Result<u32, ParseError> {
    if token.is_empty() {
        return Err(ParseError::ArgFormat);
    }
    let mut acc: u32 = 0;
    for &b in token {
        if !b.is_ascii_digit() {
            return Err(ParseError::ArgFormat);
        }
        acc = acc
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .ok_or(ParseError::ArgFormat)?;
    }
    Ok(acc)
}

fn parse_signed(token: &[u8]) -> Result<i32, ParseError> {
    let (negative, digits) = match token.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, token),
    };
    let magnitude = i32::try_from(parse_unsigned(digits)?).map_err(|_| ParseError::ArgFormat)?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_string(token: &[u8]) -> Result<String<ARG_MAX_LEN>, ParseError> {
    let text = core::str::from_utf8(token).map_err(|_| ParseError::ArgFormat)?;
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint8_range() {
        assert_eq!(parse_arg(b"0", ArgType::UInt8), Ok(ArgValue::UInt8(0)));
        assert_eq!(parse_arg(b"255", ArgType::UInt8), Ok(ArgValue::UInt8(255)));
        assert_eq!(parse_arg(b"256", ArgType::UInt8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"300", ArgType::UInt8), Err(ParseError::ArgFormat));
    }

    #[test]
    fn test_uint16_range() {
        assert_eq!(parse_arg(b"65535", ArgType::UInt16), Ok(ArgValue::UInt16(65535)));
        assert_eq!(parse_arg(b"65536", ArgType::UInt16), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"99999999999", ArgType::UInt16), Err(ParseError::ArgFormat));
    }

    #[test]
    fn test_leading_zeros_accepted() {
        assert_eq!(parse_arg(b"007", ArgType::UInt8), Ok(ArgValue::UInt8(7)));
    }

    #[test]
    fn test_unsigned_rejects_signs() {
        assert_eq!(parse_arg(b"-1", ArgType::UInt8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"+1", ArgType::UInt8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"-1", ArgType::UInt16), Err(ParseError::ArgFormat));
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert_eq!(parse_arg(b"", ArgType::UInt8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"1a", ArgType::UInt8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"0x10", ArgType::UInt16), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"abc", ArgType::Int16), Err(ParseError::ArgFormat));
    }

    #[test]
    fn test_signed_ranges() {
        assert_eq!(parse_arg(b"-128", ArgType::Int8), Ok(ArgValue::Int8(-128)));
        assert_eq!(parse_arg(b"127", ArgType::Int8), Ok(ArgValue::Int8(127)));
        assert_eq!(parse_arg(b"128", ArgType::Int8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"-129", ArgType::Int8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"-32768", ArgType::Int16), Ok(ArgValue::Int16(-32768)));
        assert_eq!(parse_arg(b"32768", ArgType::Int16), Err(ParseError::ArgFormat));
    }

    #[test]
    fn test_signed_rejects_plus_and_bare_minus() {
        assert_eq!(parse_arg(b"+5", ArgType::Int8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"-", ArgType::Int8), Err(ParseError::ArgFormat));
        assert_eq!(parse_arg(b"--5", ArgType::Int16), Err(ParseError::ArgFormat));
    }

    #[test]
    fn test_string_truncated_not_rejected() {
        let v = parse_arg(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ", ArgType::String).unwrap();
        assert_eq!(v.as_str(), Some("ABCDEFGHIJKLMNOP"));
        assert_eq!(v.as_str().map(str::len), Some(ARG_MAX_LEN));
    }

    #[test]
    fn test_string_accepts_digits_and_empty() {
        assert_eq!(parse_arg(b"4E0101", ArgType::String).unwrap().as_str(), Some("4E0101"));
        assert_eq!(parse_arg(b"", ArgType::String).unwrap().as_str(), Some(""));
    }

    #[test]
    fn test_string_rejects_invalid_utf8() {
        assert_eq!(parse_arg(&[0xff, 0xfe], ArgType::String), Err(ParseError::ArgFormat));
    }

    #[test]
    fn test_variant_matches_declared_type() {
        for ty in [ArgType::String, ArgType::UInt8, ArgType::UInt16, ArgType::Int8, ArgType::Int16] {
            let v = parse_arg(b"12", ty).unwrap();
            assert_eq!(v.arg_type(), ty);
        }
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ArgValue::UInt8(3).as_u8(), Some(3));
        assert_eq!(ArgValue::UInt8(3).as_u16(), None);
        assert_eq!(ArgValue::UInt16(300).as_u16(), Some(300));
        assert_eq!(ArgValue::Int8(-3).as_i8(), Some(-3));
        assert_eq!(ArgValue::Int16(-300).as_i16(), Some(-300));
        assert_eq!(ArgValue::Int16(-300).as_str(), None);
    }
}
