//! Error codes and diagnostics for the SCPI engine.
//!
//! The standard SCPI-99 / IEEE 488.2 error list lives in
//! `spec/errors.jsonc`; the build script turns it into the [`codes`]
//! constants, [`translate`], and [`all_codes`]. [`ErrorClass`] groups codes
//! by range the way the event status register does. [`Diagnostic`] and
//! [`Span`] are used by tooling that reports problems against source text.

#![warn(missing_docs)]

/// Error code constants auto-generated from the table.
pub mod codes;

use serde::{Deserialize, Serialize};

// ── Code table ───────────────────────────────────────────────────────────

/// One row of the standard error table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorCode {
    /// Signed SCPI code.
    pub code: i16,
    /// Constant name in [`codes`].
    pub name: &'static str,
    /// Standard message text.
    pub message: &'static str,
}

static TABLE: &[ErrorCode] = &include!(concat!(env!("OUT_DIR"), "/generated_table.rs"));

/// Standard message for an error code, if the code is in the table.
pub fn translate(code: i16) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_translate.rs"))
}

/// The full table, ordered as declared (0 first, then descending codes).
pub fn all_codes() -> &'static [ErrorCode] {
    TABLE
}

// ── Classes ──────────────────────────────────────────────────────────────

/// Range-based category of an error or event code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ErrorClass {
    /// Code 0.
    NoError,
    /// -100..=-199, syntax and parse problems.
    Command,
    /// -200..=-299, the command could not be executed.
    Execution,
    /// -300..=-399 and all positive (device-defined) codes.
    DeviceSpecific,
    /// -400..=-499, output queue control problems.
    Query,
    /// -500..=-599.
    PowerOn,
    /// -600..=-699.
    UserRequest,
    /// -700..=-799.
    RequestControl,
    /// -800..=-899.
    OperationComplete,
}

impl ErrorClass {
    /// Classify a code by its numeric range.
    ///
    /// Returns `None` for negative codes outside every standard range
    /// (e.g. -99 or -950).
    pub fn of(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::NoError),
            1.. => Some(Self::DeviceSpecific),
            -199..=-100 => Some(Self::Command),
            -299..=-200 => Some(Self::Execution),
            -399..=-300 => Some(Self::DeviceSpecific),
            -499..=-400 => Some(Self::Query),
            -599..=-500 => Some(Self::PowerOn),
            -699..=-600 => Some(Self::UserRequest),
            -799..=-700 => Some(Self::RequestControl),
            -899..=-800 => Some(Self::OperationComplete),
            _ => None,
        }
    }

    /// Event status register bit latched when a code of this class is queued.
    pub fn esr_bit(self) -> u16 {
        match self {
            Self::NoError => 0,
            Self::OperationComplete => 0x01,
            Self::RequestControl => 0x02,
            Self::Query => 0x04,
            Self::DeviceSpecific => 0x08,
            Self::Execution => 0x10,
            Self::Command => 0x20,
            Self::UserRequest => 0x40,
            Self::PowerOn => 0x80,
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoError => "no error",
            Self::Command => "command error",
            Self::Execution => "execution error",
            Self::DeviceSpecific => "device-specific error",
            Self::Query => "query error",
            Self::PowerOn => "power on",
            Self::UserRequest => "user request",
            Self::RequestControl => "request control",
            Self::OperationComplete => "operation complete",
        };
        f.write_str(s)
    }
}

// ── Source diagnostics ───────────────────────────────────────────────────

/// Byte span in a program-message source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Span covering `[start, end)`. Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }
}

/// A SCPI error located in source text, as reported by static checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// SCPI error code.
    pub code: i16,
    /// Human-readable message (standard text, possibly with detail appended).
    pub message: String,
    /// Where in the source the problem was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Diagnostic carrying the standard message for `code`.
    pub fn new(code: i16, span: Option<Span>) -> Self {
        Self {
            code,
            message: translate(code).unwrap_or("Unknown error").to_string(),
            span,
        }
    }

    /// Append device-dependent detail to the message (`message;detail`).
    pub fn with_detail(mut self, detail: impl AsRef<str>) -> Self {
        self.message.push(';');
        self.message.push_str(detail.as_ref());
        self
    }

    /// Class of this diagnostic's code.
    pub fn class(&self) -> Option<ErrorClass> {
        ErrorClass::of(self.code)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.code, self.message)
    }
}
