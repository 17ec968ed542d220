//! The engine proper: configuration, session state, the command table and
//! the framer that drives it.

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod session;
pub mod table;
pub mod transport;

pub use command::{Call, Command, Handler};
pub use config::{EngineConfig, Identification, LineEnding};
pub use context::{Context, FramerState};
pub use error::{CommandError, CommandResult, EngineError};
pub use session::Session;
pub use table::CommandTable;
pub use transport::{ControlKind, Transport};
