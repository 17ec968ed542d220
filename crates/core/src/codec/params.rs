//! Parameter cursor and typed conversions.
//!
//! [`ParamCursor`] walks the comma-separated parameter region of one
//! message unit. Conversions are pure functions from a [`Parameter`] to a
//! value or a SCPI error code; [`Call`](crate::engine::Call) wraps them so
//! that failures are queued.

use std::borrow::Cow;
use std::fmt;

use scpi_engine_diagnostics::codes;

use super::number::{decimal_to_bits, format_f64, parse_decimal, radix_to_bits};
use super::units::{ChoiceDef, SPECIAL_NUMBERS, Unit, choice_name, lookup_choice, lookup_unit, unit_name};
use crate::grammar::lexer::{Lexer, Token, TokenKind};

/// One parameter as lexed from the unit.
pub type Parameter<'a> = Token<'a>;

/// Sequential reader over a parameter region.
#[derive(Debug, Clone)]
pub struct ParamCursor<'a> {
    lexer: Lexer<'a>,
    consumed: usize,
}

impl<'a> ParamCursor<'a> {
    /// Cursor over the parameter bytes of one unit.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            consumed: 0,
        }
    }

    /// Parameters read so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// `true` when unread parameter text remains.
    pub fn has_more(&self) -> bool {
        self.lexer.rest().iter().any(|&c| !matches!(c, b' ' | b'\t'))
    }

    /// Read the next parameter.
    ///
    /// At the end of the region a mandatory read fails with -109 and an
    /// optional one returns `Ok(None)`. A missing comma fails with -103.
    pub fn next(&mut self, mandatory: bool) -> Result<Option<Parameter<'a>>, i16> {
        self.lexer.whitespace();
        if self.lexer.is_eos() {
            return if mandatory {
                Err(codes::MISSING_PARAMETER)
            } else {
                Ok(None)
            };
        }
        if self.consumed > 0 {
            if self.lexer.comma().kind != TokenKind::Comma {
                return Err(codes::INVALID_SEPARATOR);
            }
            self.lexer.whitespace();
        }
        let tok = self.lexer.program_data();
        match tok.kind {
            TokenKind::Unknown | TokenKind::Incomplete => Err(codes::INVALID_STRING_DATA),
            _ => {
                self.consumed += 1;
                Ok(Some(tok))
            }
        }
    }
}

// ── Scalars ─────────────────────────────────────────────────────────────

/// Types readable from a single parameter.
pub trait FromParameter: Sized {
    /// Convert, or return the SCPI error code describing the mismatch.
    fn from_parameter(param: &Parameter<'_>) -> Result<Self, i16>;
}

fn integer_bits(param: &Parameter<'_>) -> Result<u64, i16> {
    match param.kind {
        TokenKind::DecimalNumeric => decimal_to_bits(param.text).map_err(|_| codes::DATA_TYPE_ERROR),
        TokenKind::HexNum | TokenKind::OctNum | TokenKind::BinNum => {
            let radix = param.kind.radix().unwrap_or(10);
            radix_to_bits(param.text, radix).ok_or(codes::DATA_TYPE_ERROR)
        }
        TokenKind::DecimalNumericWithSuffix => Err(codes::SUFFIX_NOT_ALLOWED),
        _ => Err(codes::DATA_TYPE_ERROR),
    }
}

macro_rules! from_parameter_int {
    ($($t:ty),*) => {$(
        impl FromParameter for $t {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            fn from_parameter(param: &Parameter<'_>) -> Result<Self, i16> {
                integer_bits(param).map(|bits| bits as $t)
            }
        }
    )*};
}

from_parameter_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromParameter for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_parameter(param: &Parameter<'_>) -> Result<Self, i16> {
        match param.kind {
            TokenKind::DecimalNumeric => parse_decimal(param.text).ok_or(codes::DATA_TYPE_ERROR),
            TokenKind::HexNum | TokenKind::OctNum | TokenKind::BinNum => {
                integer_bits(param).map(|bits| bits as f64)
            }
            TokenKind::DecimalNumericWithSuffix => Err(codes::SUFFIX_NOT_ALLOWED),
            _ => Err(codes::DATA_TYPE_ERROR),
        }
    }
}

impl FromParameter for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_parameter(param: &Parameter<'_>) -> Result<Self, i16> {
        f64::from_parameter(param).map(|v| v as f32)
    }
}

impl FromParameter for bool {
    fn from_parameter(param: &Parameter<'_>) -> Result<Self, i16> {
        match param.kind {
            TokenKind::ProgramMnemonic => {
                if param.text.eq_ignore_ascii_case(b"ON") {
                    Ok(true)
                } else if param.text.eq_ignore_ascii_case(b"OFF") {
                    Ok(false)
                } else {
                    Err(codes::ILLEGAL_PARAMETER_VALUE)
                }
            }
            _ => integer_bits(param).map(|bits| bits != 0),
        }
    }
}

/// Tag of the `table` entry matching a mnemonic parameter.
pub fn choice(param: &Parameter<'_>, table: &[ChoiceDef]) -> Result<i32, i16> {
    match param.kind {
        TokenKind::ProgramMnemonic => {
            lookup_choice(table, param.text).ok_or(codes::ILLEGAL_PARAMETER_VALUE)
        }
        _ => Err(codes::DATA_TYPE_ERROR),
    }
}

// ── Numbers with units ──────────────────────────────────────────────────

/// A numeric parameter that may be a named value or carry a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A named value such as `MAX`; the tag comes from the special table.
    Special(i32),
    /// A value converted to the base unit.
    Value {
        /// Value in the base unit.
        value: f64,
        /// Quantity, or [`Unit::None`] when no suffix was given.
        unit: Unit,
        /// Radix the number was written in.
        base: u32,
    },
}

impl Number {
    /// Text form: the special name, or the value followed by the base unit.
    pub fn to_text(&self, specials: &[ChoiceDef]) -> String {
        match *self {
            Self::Special(tag) => choice_name(specials, tag)
                .map_or_else(|| tag.to_string(), str::to_owned),
            Self::Value { value, unit, .. } => match unit_name(unit) {
                Some(name) => format!("{} {name}", format_f64(value)),
                None => format_f64(value),
            },
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(SPECIAL_NUMBERS))
    }
}

/// Read a named value from `specials`, or a number with an optional unit.
#[allow(clippy::cast_precision_loss)]
pub fn number(param: &Parameter<'_>, specials: &[ChoiceDef]) -> Result<Number, i16> {
    match param.kind {
        TokenKind::ProgramMnemonic => lookup_choice(specials, param.text)
            .map(Number::Special)
            .ok_or(codes::ILLEGAL_PARAMETER_VALUE),
        TokenKind::DecimalNumeric => Ok(Number::Value {
            value: parse_decimal(param.text).ok_or(codes::DATA_TYPE_ERROR)?,
            unit: Unit::None,
            base: 10,
        }),
        TokenKind::HexNum | TokenKind::OctNum | TokenKind::BinNum => Ok(Number::Value {
            value: integer_bits(param)? as f64,
            unit: Unit::None,
            base: param.kind.radix().unwrap_or(10),
        }),
        TokenKind::DecimalNumericWithSuffix => {
            let mut lx = Lexer::new(param.text);
            let digits = lx.decimal();
            lx.whitespace();
            let suffix = lx.suffix();
            let value = parse_decimal(digits.text).ok_or(codes::DATA_TYPE_ERROR)?;
            let def = lookup_unit(suffix.text).ok_or(codes::INVALID_SUFFIX)?;
            Ok(Number::Value {
                value: value * def.mult,
                unit: def.unit,
                base: 10,
            })
        }
        _ => Err(codes::DATA_TYPE_ERROR),
    }
}

// ── Text and blocks ─────────────────────────────────────────────────────

fn unquote(quoted: &[u8]) -> Cow<'_, [u8]> {
    let quote = quoted[0];
    let inner = &quoted[1..quoted.len() - 1];
    if !inner.windows(2).any(|w| w[0] == quote && w[1] == quote) {
        return Cow::Borrowed(inner);
    }
    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        out.push(inner[i]);
        i += if inner[i] == quote { 2 } else { 1 };
    }
    Cow::Owned(out)
}

/// String-like content: a mnemonic, quoted text (quotes removed, doubled
/// quotes collapsed) or block payload.
pub fn text<'a>(param: &Parameter<'a>) -> Result<Cow<'a, [u8]>, i16> {
    match param.kind {
        TokenKind::SingleQuote | TokenKind::DoubleQuote if param.len() >= 2 => Ok(unquote(param.text)),
        TokenKind::ProgramMnemonic | TokenKind::ArbitraryBlock => Ok(Cow::Borrowed(param.text)),
        _ => Err(codes::DATA_TYPE_ERROR),
    }
}

/// Like [`text`], but quoted content is returned verbatim.
pub fn characters<'a>(param: &Parameter<'a>) -> Result<&'a [u8], i16> {
    match param.kind {
        TokenKind::SingleQuote | TokenKind::DoubleQuote if param.len() >= 2 => {
            Ok(&param.text[1..param.len() - 1])
        }
        TokenKind::ProgramMnemonic | TokenKind::ArbitraryBlock => Ok(param.text),
        _ => Err(codes::DATA_TYPE_ERROR),
    }
}

/// Outcome of copying text into a caller buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopiedText {
    /// Bytes written.
    pub len: usize,
    /// The text did not fit and was cut short.
    pub truncated: bool,
}

/// Copy [`text`] into `buf`, reporting truncation.
pub fn copy_text(param: &Parameter<'_>, buf: &mut [u8]) -> Result<CopiedText, i16> {
    let content = text(param)?;
    let len = content.len().min(buf.len());
    buf[..len].copy_from_slice(&content[..len]);
    Ok(CopiedText {
        len,
        truncated: len < content.len(),
    })
}

/// Raw payload of an arbitrary block parameter.
pub fn arbitrary_block<'a>(param: &Parameter<'a>) -> Result<&'a [u8], i16> {
    match param.kind {
        TokenKind::ArbitraryBlock => Ok(param.text),
        _ => Err(codes::DATA_TYPE_ERROR),
    }
}
