//! Numeric text conversion shared by parameter readers and result writers.
//!
//! Decimal program data may carry embedded whitespace (`-1 e 3`) and an
//! exponent; integer readers convert it exactly instead of going through
//! `f64`, so `10.0` and `1.5e1` are integral while `10.5` is not.

use std::fmt;

/// Why decimal text could not be read as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntError {
    /// Not a decimal number at all.
    Syntax,
    /// The value has a non-zero fractional part.
    Fraction,
}

impl fmt::Display for IntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("not a decimal number"),
            Self::Fraction => f.write_str("value has a fractional part"),
        }
    }
}

fn compact(text: &[u8]) -> Option<String> {
    let s = std::str::from_utf8(text).ok()?;
    Some(s.chars().filter(|c| !matches!(c, ' ' | '\t')).collect())
}

/// Parse decimal numeric text (as produced by the lexer) into an `f64`.
pub fn parse_decimal(text: &[u8]) -> Option<f64> {
    compact(text)?.parse().ok()
}

/// Parse decimal numeric text exactly into a two's-complement `u64`.
///
/// Values outside 64 bits wrap, so the caller truncates to its own width
/// with an `as` cast, the same as native fixed-width conversion.
pub fn decimal_to_bits(text: &[u8]) -> Result<u64, IntError> {
    let text = compact(text).ok_or(IntError::Syntax)?;
    let bytes = text.as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut digits = Vec::new();
    let mut frac_len: i64 = 0;
    let mut seen_point = false;
    while let Some(&c) = bytes.get(i) {
        match c {
            b'0'..=b'9' => {
                digits.push(c - b'0');
                if seen_point {
                    frac_len += 1;
                }
            }
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        i += 1;
    }
    if digits.is_empty() {
        return Err(IntError::Syntax);
    }

    let mut exponent: i64 = 0;
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let e = &text[i + 1..];
        let unsigned = e.strip_prefix(['+', '-']).unwrap_or(e);
        if unsigned.is_empty() || !unsigned.bytes().all(|c| c.is_ascii_digit()) {
            return Err(IntError::Syntax);
        }
        exponent = e.parse::<i64>().unwrap_or(if e.starts_with('-') {
            i64::MIN / 2
        } else {
            i64::MAX / 2
        });
        i = bytes.len();
    }
    if i != bytes.len() {
        return Err(IntError::Syntax);
    }

    let shift = exponent.saturating_sub(frac_len);
    let kept = if shift < 0 {
        let drop = usize::try_from(shift.unsigned_abs()).unwrap_or(usize::MAX);
        let keep = digits.len().saturating_sub(drop);
        if digits[keep..].iter().any(|&d| d != 0) {
            return Err(IntError::Fraction);
        }
        &digits[..keep]
    } else {
        &digits[..]
    };

    let mut value = kept
        .iter()
        .fold(0u64, |v, &d| v.wrapping_mul(10).wrapping_add(u64::from(d)));
    // 10^64 is a multiple of 2^64, so further zeros keep the value at 0.
    for _ in 0..shift.clamp(0, 64) {
        value = value.wrapping_mul(10);
    }
    Ok(if negative { value.wrapping_neg() } else { value })
}

/// Parse `#H`/`#Q`/`#B` digits (prefix already removed), wrapping at 64 bits.
pub fn radix_to_bits(digits: &[u8], radix: u32) -> Option<u64> {
    digits.iter().try_fold(0u64, |v, &c| {
        let d = char::from(c).to_digit(radix)?;
        Some(v.wrapping_mul(u64::from(radix)).wrapping_add(u64::from(d)))
    })
}

// ── Float formatting ───────────────────────────────────────────────────

/// SCPI-99 representation of not-a-number.
pub const NAN_TEXT: &str = "9.91E+37";
/// SCPI-99 representation of positive infinity.
pub const INF_TEXT: &str = "9.9E+37";
/// SCPI-99 representation of negative infinity.
pub const NINF_TEXT: &str = "-9.9E+37";

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Format like C's `%.<precision>g`, with SCPI text for NaN and infinities.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return NAN_TEXT.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { INF_TEXT } else { NINF_TEXT }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let precision = precision.max(1);

    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let p = i32::try_from(precision).unwrap_or(i32::MAX);

    if exp < -4 || exp >= p {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.unsigned_abs())
    } else {
        let decimals = usize::try_from(p - 1 - exp).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

/// Text for a double result (15 significant digits).
pub fn format_f64(value: f64) -> String {
    format_general(value, 15)
}

/// Text for a float result (6 significant digits).
pub fn format_f32(value: f32) -> String {
    format_general(f64::from(value), 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_with_embedded_whitespace() {
        assert_eq!(parse_decimal(b"-1 e 3"), Some(-1000.0));
        assert_eq!(parse_decimal(b"+1.5e-3"), Some(0.0015));
        assert_eq!(parse_decimal(b".5"), Some(0.5));
        assert_eq!(parse_decimal(b"5."), Some(5.0));
        assert_eq!(parse_decimal(b"abc"), None);
    }

    #[test]
    fn exact_integers() {
        assert_eq!(decimal_to_bits(b"42"), Ok(42));
        assert_eq!(decimal_to_bits(b"-7").map(|v| v as i64), Ok(-7));
        assert_eq!(decimal_to_bits(b"10.0"), Ok(10));
        assert_eq!(decimal_to_bits(b"1.5e1"), Ok(15));
        assert_eq!(decimal_to_bits(b"1200e-2"), Ok(12));
        assert_eq!(decimal_to_bits(b"0.000"), Ok(0));
    }

    #[test]
    fn fractions_are_rejected() {
        assert_eq!(decimal_to_bits(b"10.5"), Err(IntError::Fraction));
        assert_eq!(decimal_to_bits(b"1e-1"), Err(IntError::Fraction));
        assert_eq!(decimal_to_bits(b"x"), Err(IntError::Syntax));
    }

    #[test]
    fn out_of_width_values_wrap() {
        assert_eq!(decimal_to_bits(b"256").map(|v| v as u8), Ok(0));
        assert_eq!(decimal_to_bits(b"4294967297").map(|v| v as i32), Ok(1));
        assert_eq!(decimal_to_bits(b"1e70"), Ok(0));
    }

    #[test]
    fn radix_digits() {
        assert_eq!(radix_to_bits(b"20", 16), Some(32));
        assert_eq!(radix_to_bits(b"ff", 16), Some(255));
        assert_eq!(radix_to_bits(b"17", 8), Some(15));
        assert_eq!(radix_to_bits(b"101", 2), Some(5));
        assert_eq!(radix_to_bits(b"12", 2), None);
    }

    #[test]
    fn general_format() {
        assert_eq!(format_f64(1.0), "1");
        assert_eq!(format_f64(-0.5), "-0.5");
        assert_eq!(format_f64(1234.5678), "1234.5678");
        assert_eq!(format_f64(1e20), "1e+20");
        assert_eq!(format_f64(1.5e-5), "1.5e-05");
        assert_eq!(format_f32(3.1415927), "3.14159");
        assert_eq!(format_f32(1_000_000.0), "1e+06");
    }

    #[test]
    fn special_float_text() {
        assert_eq!(format_f64(f64::NAN), "9.91E+37");
        assert_eq!(format_f64(f64::INFINITY), "9.9E+37");
        assert_eq!(format_f64(f64::NEG_INFINITY), "-9.9E+37");
    }
}
