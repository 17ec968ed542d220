//! SCPI instrument-control engine.
//!
//! Accepts a byte stream of IEEE 488.2 / SCPI program messages, frames it
//! into message units, matches each header against a command table and
//! runs the matched callback. Callbacks read typed parameters and write
//! typed responses through a [`Call`]; the engine keeps the status
//! registers and the error queue up to date along the way.
//!
//! Start with [`Context::new`], feeding bytes through [`Context::input`].
//! [`standard_commands`] supplies the IEEE 488.2 common commands and the
//! mandatory `SYSTem`/`STATus` subset.

#![warn(missing_docs)]

/// Parameter decoding and response encoding.
pub mod codec;
/// Handlers for the standard command surface.
pub mod commands;
/// Context, session, command table and transport.
pub mod engine;
/// Lexer, message units and header patterns.
pub mod grammar;
/// Status registers and the error queue.
pub mod status;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Engine
pub use engine::{
    Call, Command, CommandError, CommandResult, CommandTable, Context, ControlKind, EngineConfig,
    EngineError, FramerState, Handler, Identification, LineEnding, Session, Transport,
};

// Standard commands
pub use commands::standard_commands;

// Codec
pub use codec::{ArrayFormat, Channel, ChoiceDef, ListEntry, Number, Parameter, SpecialNumber, Unit};

// Grammar
pub use grammar::{MatchResult, Pattern, matches};

// Status
pub use status::{ErrorEntry, Register, esr, stb};

// Diagnostics (re-exported from the diagnostics crate)
pub use scpi_engine_diagnostics::{ErrorClass, codes, translate};
