//! Message framer and dispatcher.
//!
//! Bytes are appended to a fixed-capacity buffer. Each append re-scans the
//! buffer for complete lines, runs every unit of each line against the
//! command table, and removes the line afterwards. A zero-length append
//! forces whatever is buffered through as one line.

use scpi_engine_diagnostics::codes;
use tracing::{debug, trace, warn};

use super::command::{Call, Command};
use super::config::EngineConfig;
use super::error::EngineError;
use super::session::Session;
use super::table::CommandTable;
use super::transport::Transport;
use crate::grammar::unit::{Pending, Termination, compose_header, scan_unit};

/// Observable state of the framer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FramerState {
    /// Buffer empty.
    #[default]
    Idle,
    /// Bytes buffered, no complete line yet.
    Accumulating,
    /// A complete line is buffered.
    Ready,
    /// Splitting a line into units.
    Draining,
    /// A callback is running.
    Dispatching,
}

/// An engine instance: command table, session state and input buffer.
pub struct Context<T> {
    session: Session<T>,
    table: CommandTable<T>,
    buffer: Vec<u8>,
    capacity: usize,
    state: FramerState,
}

fn set_state(state: &mut FramerState, next: FramerState) {
    if *state != next {
        trace!(from = ?*state, to = ?next, "framer state");
        *state = next;
    }
}

/// Offset one past the first complete line in `buf`, if any.
fn find_line_end(buf: &[u8]) -> Option<usize> {
    let mut pos = 0;
    while pos < buf.len() {
        let unit = scan_unit(&buf[pos..]);
        match unit.termination {
            Termination::Newline => return Some(pos + unit.len),
            Termination::Semicolon if unit.len > 0 => pos += unit.len,
            _ => return None,
        }
    }
    None
}

impl<T: Transport> Context<T> {
    /// Validate `config`, compile every pattern and set up the session.
    pub fn new(
        commands: Vec<Command<T>>,
        transport: T,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let table = CommandTable::new(commands)?;
        debug!(commands = table.len(), "engine context created");
        Ok(Self {
            session: Session::new(transport, config),
            table,
            buffer: Vec::with_capacity(config.input_buffer_size),
            capacity: config.input_buffer_size,
            state: FramerState::Idle,
        })
    }

    /// Session state.
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Session state, mutably.
    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        self.session.transport()
    }

    /// Consume the context and return its transport.
    pub fn into_transport(self) -> T {
        self.session.into_transport()
    }

    /// The command table.
    pub fn commands(&self) -> &[Command<T>] {
        self.table.commands()
    }

    /// Current framer state.
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Bytes waiting for a line terminator.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Append input and run every complete line; returns how many ran.
    ///
    /// An empty `data` flushes the buffer as one line. Input that does not
    /// fit is rejected whole: -363 is queued and nothing is appended.
    pub fn input(&mut self, data: &[u8]) -> Result<usize, EngineError> {
        if data.is_empty() {
            if self.buffer.is_empty() {
                return Ok(0);
            }
            set_state(&mut self.state, FramerState::Ready);
            run_line(&mut self.session, &self.table, &mut self.state, &self.buffer, true);
            self.buffer.clear();
            set_state(&mut self.state, FramerState::Idle);
            return Ok(1);
        }

        let free = self.capacity - self.buffer.len();
        if data.len() > free {
            warn!(len = data.len(), free, "input buffer overrun");
            self.session.error_push(codes::INPUT_BUFFER_OVERRUN);
            return Err(EngineError::InputBufferOverrun {
                len: data.len(),
                free,
            });
        }
        self.buffer.extend_from_slice(data);
        set_state(&mut self.state, FramerState::Accumulating);

        let mut lines = 0;
        while let Some(end) = find_line_end(&self.buffer) {
            set_state(&mut self.state, FramerState::Ready);
            run_line(&mut self.session, &self.table, &mut self.state, &self.buffer[..end], false);
            self.buffer.drain(..end);
            lines += 1;
        }
        let next = if self.buffer.is_empty() {
            FramerState::Idle
        } else {
            FramerState::Accumulating
        };
        set_state(&mut self.state, next);
        Ok(lines)
    }

    /// Run complete program text directly, bypassing the input buffer.
    ///
    /// A trailing line without terminator runs as if flushed.
    pub fn parse(&mut self, text: &[u8]) {
        let mut rest = text;
        while !rest.is_empty() {
            let (line, flush) = match find_line_end(rest) {
                Some(end) => (&rest[..end], false),
                None => (rest, true),
            };
            set_state(&mut self.state, FramerState::Ready);
            run_line(&mut self.session, &self.table, &mut self.state, line, flush);
            rest = &rest[line.len()..];
        }
        let next = if self.buffer.is_empty() {
            FramerState::Idle
        } else {
            FramerState::Accumulating
        };
        set_state(&mut self.state, next);
    }
}

fn pending_code(pending: Pending) -> Option<i16> {
    match pending {
        Pending::Header => None,
        Pending::String => Some(codes::INVALID_STRING_DATA),
        Pending::Block => Some(codes::INVALID_BLOCK_DATA),
        Pending::Expression => Some(codes::INVAL_EXPRESSION),
    }
}

fn run_line<T: Transport>(
    session: &mut Session<T>,
    table: &CommandTable<T>,
    state: &mut FramerState,
    line: &[u8],
    flush: bool,
) {
    set_state(state, FramerState::Draining);
    session.line_output = false;
    let mut previous: Vec<u8> = Vec::new();
    let mut pos = 0;

    while pos < line.len() {
        let unit = scan_unit(&line[pos..]);
        if unit.len == 0 {
            break;
        }
        pos += unit.len;
        trace!(
            header = %String::from_utf8_lossy(unit.header.text),
            kind = unit.header.kind.as_str(),
            params = unit.param_count,
            "message unit"
        );

        if let Termination::Incomplete(pending) = unit.termination {
            if !flush {
                break;
            }
            if let Some(code) = pending_code(pending) {
                session.error_push(code);
                break;
            }
        }

        if unit.is_invalid() {
            session.error_push(codes::INVALID_CHARACTER);
            continue;
        }
        if unit.header.is_empty() {
            continue;
        }

        let effective = compose_header(&previous, unit.header.text).into_owned();
        dispatch(session, table, state, &effective, unit.data.text);
        set_state(state, FramerState::Draining);
        previous = effective;
    }

    if session.line_output {
        let ending = session.line_ending().as_bytes();
        session.write_raw(ending);
        session.flush();
    }
}

fn dispatch<T: Transport>(
    session: &mut Session<T>,
    table: &CommandTable<T>,
    state: &mut FramerState,
    header: &[u8],
    data: &[u8],
) {
    let (command, suffixes) = match table.find(header) {
        Ok(found) => found,
        Err(code) => {
            debug!(header = %String::from_utf8_lossy(header), code, "no command matched");
            session.error_push_info(code, header);
            return;
        }
    };

    debug!(
        header = %String::from_utf8_lossy(header),
        pattern = command.pattern,
        "dispatching"
    );
    set_state(state, FramerState::Dispatching);
    session.output_count = 0;
    session.cmd_error = false;

    let mut call = Call::new(session, table.commands(), command, header, &suffixes, data);
    let result = (command.handler)(&mut call);
    let leftover = call.has_unread_params();

    if let Err(e) = result {
        if !session.cmd_error {
            session.error_push(e.code);
        }
    }
    if leftover && !session.cmd_error {
        session.error_push(codes::PARAMETER_NOT_ALLOWED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_end_skips_semicolons_and_blocks() {
        assert_eq!(find_line_end(b"*IDN?;*RST\r\nX"), Some(12));
        assert_eq!(find_line_end(b"DATA #13\n;\n\nREST\n"), Some(12));
        assert_eq!(find_line_end(b"*IDN?"), None);
        assert_eq!(find_line_end(b"TEXT 'a\n"), None);
    }

    #[test]
    fn invalid_unit_still_ends_line() {
        assert_eq!(find_line_end(b"VOLT 5 6\nNEXT\n"), Some(9));
    }
}
