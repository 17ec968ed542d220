//! Command pattern matching.
//!
//! Patterns use the SCPI notation found in instrument manuals:
//!
//! - `MEASure` matches any leading part of `MEASURE` in any case (`M`,
//!   `MEAS`, `measur`); the upper-case prefix is the canonical short form
//! - `[:SCALar]` is optional and may be omitted from the input
//! - `OUTPut#` accepts a numeric suffix (`OUTP3`); with no digits the value
//!   defaults to 1
//! - a trailing `?` marks a query; input must agree on it
//!
//! A compiled [`Pattern`] reports one suffix value per `#` placeholder, in
//! pattern order, whether or not the input spelled that segment.

use std::fmt;

/// Result of matching one header against one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// The header does not match.
    No,
    /// The header matches; one suffix value per `#` in the pattern.
    Yes(Vec<i32>),
    /// The header matches but a numeric suffix does not fit in an `i32`.
    SuffixOutOfRange,
}

impl MatchResult {
    /// `true` for [`MatchResult::Yes`] and [`MatchResult::SuffixOutOfRange`].
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::No)
    }
}

/// A pattern that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid command pattern `{pattern}`: {reason}")]
pub struct PatternError {
    /// The offending pattern text.
    pub pattern: String,
    /// What is wrong with it.
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'p> {
    long: &'p str,
    numeric: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Group<'p> {
    segments: Vec<Segment<'p>>,
    optional: bool,
}

/// A compiled command pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern<'p> {
    text: &'p str,
    groups: Vec<Group<'p>>,
    query: bool,
}

fn segment<'p>(pattern: &str, raw: &'p str) -> Result<Segment<'p>, PatternError> {
    let (name, numeric) = match raw.strip_suffix('#') {
        Some(name) => (name, true),
        None => (raw, false),
    };
    if name.is_empty() {
        return Err(PatternError {
            pattern: pattern.to_string(),
            reason: "empty segment",
        });
    }
    if name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(PatternError {
            pattern: pattern.to_string(),
            reason: "segment has no upper-case short form",
        });
    }
    Ok(Segment { long: name, numeric })
}

fn split_segments<'p>(pattern: &str, body: &'p str) -> Result<Vec<Segment<'p>>, PatternError> {
    let body = body.strip_prefix(':').unwrap_or(body);
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split(':').map(|raw| segment(pattern, raw)).collect()
}

impl<'p> Pattern<'p> {
    /// Compile a pattern such as `MEASure[:SCALar]:CURRent[:DC]?`.
    pub fn parse(text: &'p str) -> Result<Self, PatternError> {
        let err = |reason| PatternError {
            pattern: text.to_string(),
            reason,
        };
        let (body, query) = match text.strip_suffix('?') {
            Some(body) => (body, true),
            None => (text, false),
        };

        let mut groups = Vec::new();
        let mut rest = body;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let close = after.find(']').ok_or_else(|| err("unclosed `[`"))?;
                let inner = &after[..close];
                if inner.contains('[') {
                    return Err(err("nested `[`"));
                }
                let segments = split_segments(text, inner)?;
                if segments.is_empty() {
                    return Err(err("empty optional group"));
                }
                groups.push(Group {
                    segments,
                    optional: true,
                });
                rest = &after[close + 1..];
            } else {
                let end = rest.find('[').unwrap_or(rest.len());
                let mandatory = &rest[..end];
                if mandatory.contains(']') {
                    return Err(err("unmatched `]`"));
                }
                for seg in split_segments(text, mandatory.strip_suffix(':').unwrap_or(mandatory))? {
                    groups.push(Group {
                        segments: vec![seg],
                        optional: false,
                    });
                }
                rest = &rest[end..];
            }
        }

        Ok(Self {
            text,
            groups,
            query,
        })
    }

    /// Original pattern text.
    pub fn as_str(&self) -> &'p str {
        self.text
    }

    /// `true` when the pattern ends in `?`.
    pub fn is_query(&self) -> bool {
        self.query
    }

    /// Number of `#` placeholders.
    pub fn suffix_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.segments)
            .filter(|s| s.numeric)
            .count()
    }

    /// Match a header (e.g. `outp3:mod10:fm`) against this pattern.
    pub fn match_header(&self, header: &[u8]) -> MatchResult {
        let (body, query) = match header.strip_suffix(b"?") {
            Some(body) => (body, true),
            None => (header, false),
        };
        if query != self.query {
            return MatchResult::No;
        }
        if body.starts_with(b":*") {
            return MatchResult::No;
        }
        let body = body.strip_prefix(b":").unwrap_or(body);
        let inputs: Vec<&[u8]> = if body.is_empty() {
            Vec::new()
        } else {
            body.split(|&c| c == b':').collect()
        };

        let mut suffixes = Vec::with_capacity(self.suffix_count());
        if !match_groups(&self.groups, &inputs, &mut suffixes) {
            return MatchResult::No;
        }
        let mut values = Vec::with_capacity(suffixes.len());
        for v in suffixes {
            match i32::try_from(v) {
                Ok(v) => values.push(v),
                Err(_) => return MatchResult::SuffixOutOfRange,
            }
        }
        MatchResult::Yes(values)
    }
}

impl fmt::Display for Pattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Suffix value accumulated during matching; `u64::MAX` marks overflow.
type Suffix = u64;

fn match_groups(groups: &[Group<'_>], inputs: &[&[u8]], suffixes: &mut Vec<Suffix>) -> bool {
    let Some((group, rest)) = groups.split_first() else {
        return inputs.is_empty();
    };
    let mark = suffixes.len();

    if inputs.len() >= group.segments.len() {
        let (head, tail) = inputs.split_at(group.segments.len());
        let consumed = group
            .segments
            .iter()
            .zip(head)
            .all(|(seg, input)| match match_segment(seg, input) {
                Some(Some(v)) => {
                    suffixes.push(v);
                    true
                }
                Some(None) => true,
                None => false,
            });
        if consumed && match_groups(rest, tail, suffixes) {
            return true;
        }
        suffixes.truncate(mark);
    }

    if group.optional {
        suffixes.extend(group.segments.iter().filter(|s| s.numeric).map(|_| 1));
        if match_groups(rest, inputs, suffixes) {
            return true;
        }
        suffixes.truncate(mark);
    }
    false
}

/// `None` on mismatch, `Some(None)` for a plain match, `Some(Some(v))` for a
/// numeric segment with suffix `v`.
fn match_segment(seg: &Segment<'_>, input: &[u8]) -> Option<Option<Suffix>> {
    if !seg.numeric {
        return mnemonic_matches(seg.long, input).then_some(None);
    }
    let digits = input.iter().rev().take_while(|c| c.is_ascii_digit()).count();
    let (name, digits) = input.split_at(input.len() - digits);
    if !mnemonic_matches(seg.long, name) {
        return None;
    }
    if digits.is_empty() {
        return Some(Some(1));
    }
    let value = digits.iter().try_fold(0u64, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    });
    Some(Some(value.unwrap_or(u64::MAX)))
}

/// Abbreviation match of one mnemonic: `input` must be a non-empty leading
/// part of the long form, in any case. `MINimum` accepts `m`, `min`, `MINI`
/// and `MINIMUM`.
pub fn mnemonic_matches(mnemonic: &str, input: &[u8]) -> bool {
    !input.is_empty()
        && input.len() <= mnemonic.len()
        && input.eq_ignore_ascii_case(&mnemonic.as_bytes()[..input.len()])
}

/// Match `header` against `pattern` text. An invalid pattern never matches.
pub fn match_pattern(pattern: &str, header: &[u8]) -> MatchResult {
    Pattern::parse(pattern)
        .map(|p| p.match_header(header))
        .unwrap_or(MatchResult::No)
}

/// Boolean form of [`match_pattern`].
pub fn matches(pattern: &str, header: &str) -> bool {
    match_pattern(pattern, header.as_bytes()).is_match()
}
