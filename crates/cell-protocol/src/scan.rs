//! Lenient numeric prefix scanning
//!
//! Cell description fields are read the way the modem firmware's own tooling
//! reads them: leading whitespace is skipped, an optional sign is accepted, the
//! longest run of digits is taken and anything after it is ignored. A field
//! with no digits at all reads as zero.

use crate::error::ParseError;

/// Split off an optional sign after leading whitespace
fn sign_and_rest(s: &str) -> (bool, &str) {
    let s = s.trim_start();
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

/// Accumulate digits of `radix`, saturating instead of overflowing
fn digits(s: &str, radix: u32) -> i64 {
    s.chars()
        .map_while(|c| c.to_digit(radix))
        .fold(0i64, |acc, d| {
            acc.saturating_mul(i64::from(radix))
                .saturating_add(i64::from(d))
        })
}

/// Read a decimal integer prefix (`atoi` semantics)
pub(crate) fn decimal(s: &str) -> i64 {
    let (negative, rest) = sign_and_rest(s);
    let value = digits(rest, 10);
    if negative {
        -value
    } else {
        value
    }
}

/// Read a hexadecimal integer prefix, with or without a `0x` prefix
pub(crate) fn hex(s: &str) -> i64 {
    let (negative, rest) = sign_and_rest(s);
    let rest = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .filter(|r| r.starts_with(|c: char| c.is_ascii_hexdigit()))
        .unwrap_or(rest);
    let value = digits(rest, 16);
    if negative {
        -value
    } else {
        value
    }
}

/// Read a decimal floating point prefix (`atof` semantics, no exponent)
pub(crate) fn float(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Read an integer prefix of `radix` that must contain at least one digit
///
/// Used by the fixed reply grammars, where a field without digits means the
/// line does not match.
pub(crate) fn strict(s: &str, radix: u32) -> Option<i64> {
    let (negative, rest) = sign_and_rest(s);
    if !rest.starts_with(|c: char| c.is_digit(radix)) {
        return None;
    }
    let value = digits(rest, radix);
    Some(if negative { -value } else { value })
}

/// Read the leading comma separated integer fields of a reply line
///
/// Fails with the number of fields that did match when fewer than
/// `expected` can be read. Extra trailing fields are ignored.
pub(crate) fn integer_fields(line: &str, expected: usize) -> Result<Vec<i64>, ParseError> {
    let mut values = Vec::with_capacity(expected);
    for field in line.split(',').take(expected) {
        match strict(field, 10) {
            Some(value) => values.push(value),
            None => break,
        }
    }
    if values.len() < expected {
        return Err(ParseError::FieldCount {
            expected,
            actual: values.len(),
        });
    }
    Ok(values)
}

/// Clamp a scanned value into `u8`
pub(crate) fn to_u8(value: i64) -> u8 {
    u8::try_from(value.max(0)).unwrap_or(u8::MAX)
}

/// Clamp a scanned value into `u32`
pub(crate) fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Clamp a scanned value into `u16`
pub(crate) fn to_u16(value: i64) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

/// Clamp a scanned value into `i32`
pub(crate) fn to_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
