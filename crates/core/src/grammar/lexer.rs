//! Byte-level tokenizer for SCPI program messages (IEEE 488.2 §7).
//!
//! Each production is a method on [`Lexer`]. A production either consumes
//! the longest match at the cursor and returns a classified [`Token`], or
//! leaves the cursor where it was and returns a zero-length
//! [`TokenKind::Unknown`] token. Lexing never fails by itself; callers decide
//! what an unknown or incomplete token means.
//!
//! Tokens borrow from the lexed buffer, so the buffer cannot be mutated
//! while any token derived from it is alive.

/// Classification of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
    /// `,` between parameters.
    Comma,
    /// `;` between message units.
    Semicolon,
    /// `:` (used inside numeric and channel ranges).
    Colon,
    /// A caller-requested single character such as `@` or `!`.
    Specific,
    /// `\r`, `\n`, or `\r\n`.
    Newline,
    /// Run of spaces and tabs.
    Whitespace,
    /// Character program data: `[A-Za-z][A-Za-z0-9_]*`.
    ProgramMnemonic,
    /// Decimal number without a unit suffix.
    DecimalNumeric,
    /// Decimal number followed (after optional whitespace) by a unit suffix.
    DecimalNumericWithSuffix,
    /// `#H` digits. Token text excludes the prefix.
    HexNum,
    /// `#Q` digits. Token text excludes the prefix.
    OctNum,
    /// `#B` digits. Token text excludes the prefix.
    BinNum,
    /// Unit suffix such as `MV`, `/S`, or `M.S-2`.
    Suffix,
    /// `'...'` including the quotes.
    SingleQuote,
    /// `"..."` including the quotes.
    DoubleQuote,
    /// Definite-length block. Token text is the payload only.
    ArbitraryBlock,
    /// `( ... )` including the parentheses.
    ProgramExpression,
    /// `[:]A:B:C`.
    CompoundHeader,
    /// `[:]A:B:C?`.
    CompoundQueryHeader,
    /// `*ABC`.
    CommonHeader,
    /// `*ABC?`.
    CommonQueryHeader,
    /// Compound header with a dangling `:`.
    IncompleteCompoundHeader,
    /// `*` without a mnemonic.
    IncompleteCommonHeader,
    /// String, block, or expression data cut off by the end of the buffer.
    Incomplete,
    /// The whole comma-separated parameter region of a unit.
    AllProgramData,
    /// A character that starts no valid production.
    Invalid,
    /// Nothing matched; the token is empty.
    Unknown,
}

impl TokenKind {
    /// Any header kind, including incomplete ones.
    pub fn is_header(self) -> bool {
        matches!(
            self,
            Self::CompoundHeader
                | Self::CompoundQueryHeader
                | Self::CommonHeader
                | Self::CommonQueryHeader
                | Self::IncompleteCompoundHeader
                | Self::IncompleteCommonHeader
        )
    }

    /// Header kinds that did not finish before the end of input.
    pub fn is_incomplete_header(self) -> bool {
        matches!(
            self,
            Self::IncompleteCompoundHeader | Self::IncompleteCommonHeader
        )
    }

    /// Numeric program data of any form.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::DecimalNumeric
                | Self::DecimalNumericWithSuffix
                | Self::HexNum
                | Self::OctNum
                | Self::BinNum
        )
    }

    /// Radix of a numeric token (10 for decimal forms).
    pub fn radix(self) -> Option<u32> {
        match self {
            Self::DecimalNumeric | Self::DecimalNumericWithSuffix => Some(10),
            Self::HexNum => Some(16),
            Self::OctNum => Some(8),
            Self::BinNum => Some(2),
            _ => None,
        }
    }

    /// Stable snake-case name, used by tooling output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Colon => "colon",
            Self::Specific => "specific",
            Self::Newline => "newline",
            Self::Whitespace => "whitespace",
            Self::ProgramMnemonic => "program_mnemonic",
            Self::DecimalNumeric => "decimal_numeric",
            Self::DecimalNumericWithSuffix => "decimal_numeric_with_suffix",
            Self::HexNum => "hex_num",
            Self::OctNum => "oct_num",
            Self::BinNum => "bin_num",
            Self::Suffix => "suffix",
            Self::SingleQuote => "single_quote",
            Self::DoubleQuote => "double_quote",
            Self::ArbitraryBlock => "arbitrary_block",
            Self::ProgramExpression => "program_expression",
            Self::CompoundHeader => "compound_header",
            Self::CompoundQueryHeader => "compound_query_header",
            Self::CommonHeader => "common_header",
            Self::CommonQueryHeader => "common_query_header",
            Self::IncompleteCompoundHeader => "incomplete_compound_header",
            Self::IncompleteCommonHeader => "incomplete_common_header",
            Self::Incomplete => "incomplete",
            Self::AllProgramData => "all_program_data",
            Self::Invalid => "invalid",
            Self::Unknown => "unknown",
        }
    }
}

/// A classified byte range borrowed from the lexed buffer.
///
/// `text` is always `&buf[start..start + text.len()]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokenKind,
    /// Borrowed bytes of the token.
    pub text: &'a [u8],
    /// Offset of the first byte of `text` in the lexed buffer.
    pub start: usize,
}

impl<'a> Token<'a> {
    /// Empty token of the given kind at `start`.
    pub fn empty(kind: TokenKind, buf: &'a [u8], start: usize) -> Self {
        let start = start.min(buf.len());
        Self {
            kind,
            text: &buf[start..start],
            start,
        }
    }

    /// Offset one past the last byte.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Length of `text` in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// `true` when the token covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn is_ws(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn is_expression_char(c: u8) -> bool {
    (0x20..=0x7e).contains(&c) && !matches!(c, b'"' | b'#' | b'\'' | b'(' | b')' | b';')
}

/// Cursor over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Lexer positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The whole buffer being lexed.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Bytes from the cursor to the end.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// `true` when the cursor is at the end of the buffer.
    pub fn is_eos(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, f: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(&f) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.buf[start..self.pos],
            start,
        }
    }

    fn unknown(&mut self, start: usize) -> Token<'a> {
        self.pos = start;
        Token::empty(TokenKind::Unknown, self.buf, start)
    }

    fn incomplete(&mut self, start: usize) -> Token<'a> {
        self.pos = self.buf.len();
        self.token(TokenKind::Incomplete, start)
    }

    fn single(&mut self, c: u8, kind: TokenKind) -> Token<'a> {
        let start = self.pos;
        if self.eat(c) {
            self.token(kind, start)
        } else {
            self.unknown(start)
        }
    }

    // ── Separators ──────────────────────────────────────────────────────

    /// Spaces and tabs.
    pub fn whitespace(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.eat_while(is_ws) > 0 {
            self.token(TokenKind::Whitespace, start)
        } else {
            self.unknown(start)
        }
    }

    /// `\r\n`, `\r`, or `\n`.
    pub fn newline(&mut self) -> Token<'a> {
        let start = self.pos;
        self.eat(b'\r');
        self.eat(b'\n');
        if self.pos > start {
            self.token(TokenKind::Newline, start)
        } else {
            self.unknown(start)
        }
    }

    /// `,`.
    pub fn comma(&mut self) -> Token<'a> {
        self.single(b',', TokenKind::Comma)
    }

    /// `;`.
    pub fn semicolon(&mut self) -> Token<'a> {
        self.single(b';', TokenKind::Semicolon)
    }

    /// `:`.
    pub fn colon(&mut self) -> Token<'a> {
        self.single(b':', TokenKind::Colon)
    }

    /// One specific byte.
    pub fn specific(&mut self, c: u8) -> Token<'a> {
        self.single(c, TokenKind::Specific)
    }

    // ── Headers ─────────────────────────────────────────────────────────

    fn skip_mnemonic(&mut self) -> usize {
        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return 0;
        }
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == b'_')
    }

    /// Common (`*IDN?`) or compound (`:MEAS:VOLT?`) program header.
    ///
    /// A header cut short by a dangling `:` or a bare `*` is returned as an
    /// incomplete header rather than unknown, so the framer can wait for
    /// more input.
    pub fn header(&mut self) -> Token<'a> {
        let start = self.pos;

        if self.eat(b'*') {
            if self.skip_mnemonic() == 0 {
                return self.token(TokenKind::IncompleteCommonHeader, start);
            }
            let kind = if self.eat(b'?') {
                TokenKind::CommonQueryHeader
            } else {
                TokenKind::CommonHeader
            };
            return self.token(kind, start);
        }

        let rooted = self.eat(b':');
        if self.skip_mnemonic() == 0 {
            return if rooted {
                self.token(TokenKind::IncompleteCompoundHeader, start)
            } else {
                self.unknown(start)
            };
        }
        while self.eat(b':') {
            if self.skip_mnemonic() == 0 {
                return self.token(TokenKind::IncompleteCompoundHeader, start);
            }
        }
        let kind = if self.eat(b'?') {
            TokenKind::CompoundQueryHeader
        } else {
            TokenKind::CompoundHeader
        };
        self.token(kind, start)
    }

    // ── Program data ────────────────────────────────────────────────────

    /// Character program data (a bare mnemonic such as `MAX` or `ON`).
    pub fn character_data(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.skip_mnemonic() > 0 {
            self.token(TokenKind::ProgramMnemonic, start)
        } else {
            self.unknown(start)
        }
    }

    fn skip_sign(&mut self) {
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
    }

    fn skip_mantissa(&mut self) -> usize {
        self.skip_sign();
        let mut digits = self.eat_while(|c| c.is_ascii_digit());
        if self.eat(b'.') {
            digits += self.eat_while(|c| c.is_ascii_digit());
        }
        digits
    }

    fn skip_exponent(&mut self) -> usize {
        if !matches!(self.peek(), Some(b'e' | b'E')) {
            return 0;
        }
        self.pos += 1;
        self.eat_while(is_ws);
        self.skip_sign();
        self.eat_while(|c| c.is_ascii_digit())
    }

    /// Decimal numeric data: `[+-]digits[.digits][ws][E[ws][+-]digits]`.
    ///
    /// An exponent marker without digits is not part of the number, so
    /// `5 EV` lexes as `5` followed by the suffix `EV`.
    pub fn decimal(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.skip_mantissa() == 0 {
            return self.unknown(start);
        }
        let rollback = self.pos;
        self.eat_while(is_ws);
        if self.skip_exponent() == 0 {
            self.pos = rollback;
        }
        self.token(TokenKind::DecimalNumeric, start)
    }

    /// Unit suffix: `[/]ALPHA+[-][DIGIT]` chained by `/` or `.`.
    pub fn suffix(&mut self) -> Token<'a> {
        let start = self.pos;
        self.eat(b'/');
        if self.eat_while(|c| c.is_ascii_alphabetic()) == 0 {
            return self.unknown(start);
        }
        self.eat(b'-');
        self.eat_one_digit();
        while matches!(self.peek(), Some(b'/' | b'.')) {
            self.pos += 1;
            self.eat_while(|c| c.is_ascii_alphabetic());
            self.eat(b'-');
            self.eat_one_digit();
        }
        self.token(TokenKind::Suffix, start)
    }

    fn eat_one_digit(&mut self) {
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// `#H`, `#Q`, or `#B` numbers. The returned text excludes the prefix.
    pub fn nondecimal(&mut self) -> Token<'a> {
        let start = self.pos;
        if !self.eat(b'#') {
            return self.unknown(start);
        }
        let (kind, radix) = match self.peek() {
            Some(b'H' | b'h') => (TokenKind::HexNum, 16),
            Some(b'Q' | b'q') => (TokenKind::OctNum, 8),
            Some(b'B' | b'b') => (TokenKind::BinNum, 2),
            _ => return self.unknown(start),
        };
        self.pos += 1;
        let digits = self.pos;
        if self.eat_while(|c| char::from(c).is_digit(radix)) == 0 {
            return self.unknown(start);
        }
        self.token(kind, digits)
    }

    /// Single- or double-quoted string; the quote is escaped by doubling.
    ///
    /// Reaching the end of the buffer inside the string yields
    /// [`TokenKind::Incomplete`]. A non-ASCII byte makes the string unknown.
    pub fn string(&mut self) -> Token<'a> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return self.unknown(start),
        };
        self.pos += 1;
        loop {
            match self.peek() {
                None => return self.incomplete(start),
                Some(c) if c == quote => {
                    self.pos += 1;
                    if !self.eat(quote) {
                        break;
                    }
                }
                Some(c) if c.is_ascii() => self.pos += 1,
                Some(_) => return self.unknown(start),
            }
        }
        let kind = if quote == b'"' {
            TokenKind::DoubleQuote
        } else {
            TokenKind::SingleQuote
        };
        self.token(kind, start)
    }

    /// Definite-length arbitrary block: `#<n><n digits of length><bytes>`.
    ///
    /// The payload is never re-lexed. A declared length that runs past the
    /// buffer yields [`TokenKind::Incomplete`]; `#0` (indefinite length) is
    /// not accepted.
    pub fn block(&mut self) -> Token<'a> {
        let start = self.pos;
        if !self.eat(b'#') {
            return self.unknown(start);
        }
        let width = match self.peek() {
            None => return self.incomplete(start),
            Some(d @ b'1'..=b'9') => usize::from(d - b'0'),
            Some(_) => return self.unknown(start),
        };
        self.pos += 1;

        let mut len = 0usize;
        for _ in 0..width {
            match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    len = len * 10 + usize::from(d - b'0');
                    self.pos += 1;
                }
                None => return self.incomplete(start),
                Some(_) => return self.unknown(start),
            }
        }

        let payload = self.pos;
        if self.buf.len() - payload < len {
            return self.incomplete(start);
        }
        self.pos += len;
        self.token(TokenKind::ArbitraryBlock, payload)
    }

    /// Parenthesized expression; the content is kept opaque.
    pub fn expression(&mut self) -> Token<'a> {
        let start = self.pos;
        if !self.eat(b'(') {
            return self.unknown(start);
        }
        self.eat_while(is_expression_char);
        if self.eat(b')') {
            self.token(TokenKind::ProgramExpression, start)
        } else if self.is_eos() {
            self.incomplete(start)
        } else {
            self.unknown(start)
        }
    }

    /// One parameter, with surrounding whitespace skipped.
    ///
    /// Alternatives are tried in order: non-decimal number, mnemonic,
    /// decimal number (with optional suffix), string, block, expression.
    pub fn program_data(&mut self) -> Token<'a> {
        self.eat_while(is_ws);

        let mut tok = self.nondecimal();
        if tok.kind == TokenKind::Unknown {
            tok = self.character_data();
        }
        if tok.kind == TokenKind::Unknown {
            tok = self.decimal();
            if tok.kind == TokenKind::DecimalNumeric {
                let after_number = self.pos;
                self.eat_while(is_ws);
                if self.suffix().kind == TokenKind::Suffix {
                    tok = self.token(TokenKind::DecimalNumericWithSuffix, tok.start);
                } else {
                    self.pos = after_number;
                }
            }
        }
        if tok.kind == TokenKind::Unknown {
            tok = self.string();
        }
        if tok.kind == TokenKind::Unknown {
            tok = self.block();
        }
        if tok.kind == TokenKind::Unknown {
            tok = self.expression();
        }

        if tok.kind != TokenKind::Incomplete {
            self.eat_while(is_ws);
        }
        tok
    }

    fn at_unit_end(&self) -> bool {
        matches!(self.peek(), None | Some(b';' | b'\r' | b'\n'))
    }

    /// The comma-separated parameter region of a unit and its count.
    ///
    /// An empty region (only whitespace before the terminator) counts as
    /// zero parameters. A malformed region resets the cursor and returns an
    /// unknown token with no count. Data cut off by the end of the buffer
    /// returns that [`TokenKind::Incomplete`] token.
    pub fn all_program_data(&mut self) -> (Token<'a>, Option<usize>) {
        let start = self.pos;
        let mut count = 0usize;
        loop {
            let tok = self.program_data();
            match tok.kind {
                TokenKind::Incomplete => return (tok, None),
                TokenKind::Unknown => {
                    if count == 0 && self.at_unit_end() {
                        return (self.token(TokenKind::AllProgramData, start), Some(0));
                    }
                    return (self.unknown(start), None);
                }
                _ => count += 1,
            }
            if self.comma().kind == TokenKind::Unknown {
                break;
            }
        }
        (self.token(TokenKind::AllProgramData, start), Some(count))
    }
}
