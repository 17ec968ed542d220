//! Typed errors for the engine.

use scpi_engine_diagnostics::codes;

use crate::grammar::pattern::PatternError;

/// Failures reported to the embedding application.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    // -- Input --
    /// Appending would exceed the input buffer.
    #[error("input buffer overrun: {len} bytes offered, {free} free")]
    InputBufferOverrun {
        /// Bytes offered in the rejected call.
        len: usize,
        /// Free bytes remaining in the buffer.
        free: usize,
    },

    // -- Setup --
    /// A configuration value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A command pattern in the table failed to compile.
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
}

/// Failure of a command callback.
///
/// Parameter readers push their code to the error queue before returning
/// this, so `?` inside a callback already leaves a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("command failed with SCPI error {code}")]
pub struct CommandError {
    /// SCPI error code.
    pub code: i16,
}

impl CommandError {
    /// Failure carrying `code`.
    pub fn new(code: i16) -> Self {
        Self { code }
    }
}

impl Default for CommandError {
    fn default() -> Self {
        Self::new(codes::EXECUTION_ERROR)
    }
}

/// Return type of command callbacks.
pub type CommandResult = Result<(), CommandError>;
