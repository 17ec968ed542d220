//! Numeric-list and channel-list expressions.
//!
//! `(1,3:5)` is a numeric list, `(@1!1:3!2,5)` a channel list. Entries are
//! read by index; every call re-lexes the parenthesized text from the
//! start, so nothing is cached between calls. Reading past the last entry
//! is `Ok(None)`.

use scpi_engine_diagnostics::codes;

use super::number::{decimal_to_bits, parse_decimal};
use crate::grammar::lexer::{Lexer, Token, TokenKind};

/// Largest channel dimension count (row and column).
pub const MAX_CHANNEL_DIMS: usize = 2;

/// Failure to read a list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ExprError {
    /// The parameter is not a parenthesized expression.
    #[error("parameter is not an expression")]
    NotExpression,
    /// The expression text does not follow the list grammar.
    #[error("malformed list expression")]
    Malformed,
}

impl ExprError {
    /// SCPI error code pushed for this failure.
    pub fn code(self) -> i16 {
        match self {
            Self::NotExpression => codes::DATA_TYPE_ERROR,
            Self::Malformed => codes::EXPRESSION_PARSING_ERROR,
        }
    }
}

/// One list entry: a single value or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListEntry<T> {
    /// `v`
    Single(T),
    /// `from:to`
    Range(T, T),
}

impl<T: Copy> ListEntry<T> {
    /// First value of the entry.
    pub fn from(&self) -> T {
        match *self {
            Self::Single(v) | Self::Range(v, _) => v,
        }
    }

    /// Last value of the entry (equal to [`from`](Self::from) for singles).
    pub fn to(&self) -> T {
        match *self {
            Self::Single(v) | Self::Range(_, v) => v,
        }
    }

    /// `true` for `from:to` entries.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range(..))
    }
}

/// A channel address with one or two `!`-joined dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    /// Number of dimensions used in `values`.
    pub dims: usize,
    /// Dimension values; entries past `dims` are 0.
    pub values: [i32; MAX_CHANNEL_DIMS],
}

impl Channel {
    /// The used dimension values.
    pub fn as_slice(&self) -> &[i32] {
        &self.values[..self.dims]
    }
}

enum Step<T> {
    Ok(T),
    NoMore,
    Error,
}

fn inner<'a>(param: &Token<'a>) -> Result<Lexer<'a>, ExprError> {
    if param.kind != TokenKind::ProgramExpression || param.len() < 2 {
        return Err(ExprError::NotExpression);
    }
    Ok(Lexer::new(&param.text[1..param.len() - 1]))
}

fn decimal<'a>(lx: &mut Lexer<'a>) -> Option<&'a [u8]> {
    lx.whitespace();
    let tok = lx.decimal();
    (tok.kind == TokenKind::DecimalNumeric).then_some(tok.text)
}

fn separator(lx: &mut Lexer<'_>, sep: fn(&mut Lexer<'_>) -> TokenKind) -> bool {
    lx.whitespace();
    sep(lx) != TokenKind::Unknown
}

fn comma(lx: &mut Lexer<'_>) -> TokenKind {
    lx.comma().kind
}

fn colon(lx: &mut Lexer<'_>) -> TokenKind {
    lx.colon().kind
}

fn bang(lx: &mut Lexer<'_>) -> TokenKind {
    lx.specific(b'!').kind
}

/// `Ok(None)` if only whitespace is left, otherwise malformed.
fn end_of_list<T>(lx: &mut Lexer<'_>) -> Result<Option<T>, ExprError> {
    lx.whitespace();
    if lx.is_eos() {
        Ok(None)
    } else {
        Err(ExprError::Malformed)
    }
}

/// Walk to entry `index`, reading each entry with `entry`.
///
/// An empty list has no entries; an empty entry after a comma is malformed.
fn walk<'a, T>(
    lx: &mut Lexer<'a>,
    index: usize,
    mut entry: impl FnMut(&mut Lexer<'a>) -> Step<T>,
) -> Result<Option<T>, ExprError> {
    let mut i = 0;
    loop {
        match entry(lx) {
            Step::Ok(v) if i == index => return Ok(Some(v)),
            Step::Ok(_) => {}
            Step::NoMore if i == 0 => return end_of_list(lx),
            Step::NoMore | Step::Error => return Err(ExprError::Malformed),
        }
        if !separator(lx, comma) {
            return end_of_list(lx);
        }
        i += 1;
    }
}

fn numeric_range<'a>(lx: &mut Lexer<'a>) -> Step<ListEntry<&'a [u8]>> {
    let Some(from) = decimal(lx) else {
        return Step::NoMore;
    };
    if !separator(lx, colon) {
        return Step::Ok(ListEntry::Single(from));
    }
    match decimal(lx) {
        Some(to) => Step::Ok(ListEntry::Range(from, to)),
        None => Step::Error,
    }
}

fn convert<'a, T>(
    entry: ListEntry<&'a [u8]>,
    f: impl Fn(&'a [u8]) -> Option<T>,
) -> Result<ListEntry<T>, ExprError> {
    let v = |text| f(text).ok_or(ExprError::Malformed);
    Ok(match entry {
        ListEntry::Single(a) => ListEntry::Single(v(a)?),
        ListEntry::Range(a, b) => ListEntry::Range(v(a)?, v(b)?),
    })
}

fn to_i32(text: &[u8]) -> Option<i32> {
    decimal_to_bits(text).ok().map(|bits| bits as i32)
}

/// Entry `index` of a numeric list, as doubles.
pub fn numeric_list_entry(param: &Token<'_>, index: usize) -> Result<Option<ListEntry<f64>>, ExprError> {
    let mut lx = inner(param)?;
    walk(&mut lx, index, numeric_range)?
        .map(|e| convert(e, parse_decimal))
        .transpose()
}

/// Entry `index` of a numeric list, as integers.
pub fn numeric_list_entry_int(
    param: &Token<'_>,
    index: usize,
) -> Result<Option<ListEntry<i32>>, ExprError> {
    let mut lx = inner(param)?;
    walk(&mut lx, index, numeric_range)?
        .map(|e| convert(e, to_i32))
        .transpose()
}

fn channel_spec(lx: &mut Lexer<'_>) -> Step<Channel> {
    let mut ch = Channel {
        dims: 0,
        values: [0; MAX_CHANNEL_DIMS],
    };
    loop {
        let Some(text) = decimal(lx) else {
            return if ch.dims == 0 { Step::NoMore } else { Step::Error };
        };
        if ch.dims == MAX_CHANNEL_DIMS {
            return Step::Error;
        }
        let Some(v) = to_i32(text) else {
            return Step::Error;
        };
        ch.values[ch.dims] = v;
        ch.dims += 1;
        if !separator(lx, bang) {
            return Step::Ok(ch);
        }
    }
}

fn channel_range(lx: &mut Lexer<'_>) -> Step<ListEntry<Channel>> {
    let from = match channel_spec(lx) {
        Step::Ok(c) => c,
        Step::NoMore | Step::Error => return Step::Error,
    };
    if !separator(lx, colon) {
        return Step::Ok(ListEntry::Single(from));
    }
    match channel_spec(lx) {
        Step::Ok(to) if to.dims == from.dims => Step::Ok(ListEntry::Range(from, to)),
        _ => Step::Error,
    }
}

/// Entry `index` of a channel list (`(@...)`).
pub fn channel_list_entry(
    param: &Token<'_>,
    index: usize,
) -> Result<Option<ListEntry<Channel>>, ExprError> {
    let mut lx = inner(param)?;
    lx.whitespace();
    if lx.specific(b'@').kind != TokenKind::Specific {
        return Err(ExprError::Malformed);
    }
    walk(&mut lx, index, channel_range)
}
