//! Program-message-unit detection.
//!
//! A unit is `[ws] header [ws data] (";" | newline | end)`. [`scan_unit`]
//! classifies one unit at the start of a buffer and reports how many bytes
//! it spans, so the framer can walk a line unit by unit.

use std::borrow::Cow;

use super::lexer::{Lexer, Token, TokenKind};

/// What ended a message unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// End of buffer without a terminator.
    None,
    /// `;`, another unit follows on the same line.
    Semicolon,
    /// Line terminator.
    Newline,
    /// The unit runs past the end of the buffer; more bytes are needed.
    Incomplete(Pending),
}

/// The construct that was cut off when a unit is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// Header ended in `:` or was a bare `*`.
    Header,
    /// Unterminated quoted string.
    String,
    /// Block whose declared length exceeds the buffered bytes.
    Block,
    /// Unterminated `( ... )`.
    Expression,
}

/// One detected program message unit.
#[derive(Debug, Clone, Copy)]
pub struct MessageUnit<'a> {
    /// Header token; [`TokenKind::Invalid`] when the unit contains a stray
    /// character, [`TokenKind::Unknown`] for an empty unit.
    pub header: Token<'a>,
    /// Parameter region ([`TokenKind::AllProgramData`]), possibly empty.
    pub data: Token<'a>,
    /// Number of parameters in `data`.
    pub param_count: usize,
    /// What ended the unit.
    pub termination: Termination,
    /// Bytes consumed, including leading whitespace and the terminator.
    pub len: usize,
}

impl MessageUnit<'_> {
    /// The unit contained a character that starts no valid production.
    pub fn is_invalid(&self) -> bool {
        self.header.kind == TokenKind::Invalid
    }
}

fn pending_of(tok: &Token<'_>) -> Pending {
    match tok.text.first() {
        Some(b'\'' | b'"') => Pending::String,
        Some(b'#') => Pending::Block,
        Some(b'(') => Pending::Expression,
        _ => Pending::Header,
    }
}

/// Detect the message unit at the start of `buf`.
///
/// A stray character marks the unit invalid; scanning then resumes after
/// the next `;` or line terminator, so one bad unit yields one error.
pub fn scan_unit(buf: &[u8]) -> MessageUnit<'_> {
    let mut lx = Lexer::new(buf);
    lx.whitespace();

    let header = lx.header();
    let mut data = Token::empty(TokenKind::AllProgramData, buf, lx.pos());
    let mut param_count = 0;

    if header.kind.is_incomplete_header() && lx.is_eos() {
        return MessageUnit {
            header,
            data,
            param_count,
            termination: Termination::Incomplete(Pending::Header),
            len: buf.len(),
        };
    }

    let mut malformed = false;
    if header.kind != TokenKind::Unknown && lx.whitespace().kind == TokenKind::Whitespace {
        let (region, count) = lx.all_program_data();
        match (region.kind, count) {
            (TokenKind::Incomplete, _) => {
                return MessageUnit {
                    header,
                    data: region,
                    param_count,
                    termination: Termination::Incomplete(pending_of(&region)),
                    len: buf.len(),
                };
            }
            (_, Some(n)) => {
                data = region;
                param_count = n;
            }
            (_, None) => malformed = true,
        }
    }

    if !malformed {
        if lx.semicolon().kind == TokenKind::Semicolon {
            return unit(header, data, param_count, Termination::Semicolon, lx.pos());
        }
        if lx.newline().kind == TokenKind::Newline {
            return unit(header, data, param_count, Termination::Newline, lx.pos());
        }
        if lx.is_eos() {
            return unit(header, data, param_count, Termination::None, lx.pos());
        }
    }

    // Stray character: report it and resynchronise on the next terminator.
    let bad = lx.pos();
    let invalid = Token {
        kind: TokenKind::Invalid,
        text: &buf[bad..bad + 1],
        start: bad,
    };
    let mut end = bad + 1;
    while end < buf.len() && !matches!(buf[end], b';' | b'\r' | b'\n') {
        end += 1;
    }
    let mut rest = Lexer::new(&buf[end..]);
    let termination = if rest.semicolon().kind == TokenKind::Semicolon {
        Termination::Semicolon
    } else if rest.newline().kind == TokenKind::Newline {
        Termination::Newline
    } else {
        Termination::None
    };
    unit(
        invalid,
        Token::empty(TokenKind::AllProgramData, buf, bad),
        0,
        termination,
        end + rest.pos(),
    )
}

fn unit<'a>(
    header: Token<'a>,
    data: Token<'a>,
    param_count: usize,
    termination: Termination,
    len: usize,
) -> MessageUnit<'a> {
    MessageUnit {
        header,
        data,
        param_count,
        termination,
        len,
    }
}

/// Resolve a relative header against the previous unit's effective header.
///
/// `current` is left alone when it is rooted (`:`), a common command
/// (`*`), or when `previous` has no `:`-separated path to inherit. Otherwise
/// the last segment of `previous` is replaced: after `:A:B`, `C` becomes
/// `:A:C`.
pub fn compose_header<'h>(previous: &[u8], current: &'h [u8]) -> Cow<'h, [u8]> {
    if matches!(current.first(), None | Some(b':' | b'*')) {
        return Cow::Borrowed(current);
    }
    if matches!(previous.first(), None | Some(b'*')) {
        return Cow::Borrowed(current);
    }
    match previous.iter().rposition(|&c| c == b':') {
        Some(at) => {
            let mut composed = Vec::with_capacity(at + 1 + current.len());
            composed.extend_from_slice(&previous[..=at]);
            composed.extend_from_slice(current);
            Cow::Owned(composed)
        }
        None => Cow::Borrowed(current),
    }
}
