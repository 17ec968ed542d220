//! Program-message grammar: tokens, message units and header patterns.

/// Byte-level lexer for IEEE 488.2 program data.
pub mod lexer;
/// Header patterns and the matcher.
pub mod pattern;
/// Splitting a buffer into message units.
pub mod unit;

pub use lexer::{Lexer, Token, TokenKind};
pub use pattern::{MatchResult, Pattern, PatternError, match_pattern, matches};
pub use unit::{MessageUnit, Pending, Termination, compose_header, scan_unit};
