//! Command table entries and the view a callback gets while it runs.

use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};

use scpi_engine_diagnostics::codes;

use super::error::{CommandError, CommandResult};
use super::session::Session;
use super::transport::Transport;
use crate::codec::expr::{self, Channel, ListEntry};
use crate::codec::params::{self, CopiedText, FromParameter, Number, ParamCursor, Parameter};
use crate::codec::units::ChoiceDef;
use crate::grammar::pattern::match_pattern;

/// Callback run for a matched header.
pub type Handler<T> = fn(&mut Call<'_, T>) -> CommandResult;

/// One entry of the command table.
pub struct Command<T> {
    /// Pattern such as `SOURce:VOLTage[:LEVel]`.
    pub pattern: &'static str,
    /// Callback.
    pub handler: Handler<T>,
    /// Application-defined number, available to the callback.
    pub tag: i32,
    /// One-line description listed by `HELP?`.
    pub description: Option<&'static str>,
}

impl<T> Command<T> {
    /// Entry with tag 0 and no description.
    pub const fn new(pattern: &'static str, handler: Handler<T>) -> Self {
        Self {
            pattern,
            handler,
            tag: 0,
            description: None,
        }
    }

    /// Set the tag.
    #[must_use]
    pub const fn with_tag(mut self, tag: i32) -> Self {
        self.tag = tag;
        self
    }

    /// Set the description.
    #[must_use]
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

impl<T> Clone for Command<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Command<T> {}

impl<T> fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("pattern", &self.pattern)
            .field("tag", &self.tag)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A running command: the session plus the matched unit.
///
/// Dereferences to [`Session`], so registers, the error queue and the
/// result writers are available directly. Parameter readers queue their
/// error before returning it.
pub struct Call<'a, T> {
    session: &'a mut Session<T>,
    commands: &'a [Command<T>],
    command: &'a Command<T>,
    header: &'a [u8],
    suffixes: &'a [i32],
    params: ParamCursor<'a>,
}

impl<'a, T: Transport> Call<'a, T> {
    pub(crate) fn new(
        session: &'a mut Session<T>,
        commands: &'a [Command<T>],
        command: &'a Command<T>,
        header: &'a [u8],
        suffixes: &'a [i32],
        data: &'a [u8],
    ) -> Self {
        Self {
            session,
            commands,
            command,
            header,
            suffixes,
            params: ParamCursor::new(data),
        }
    }

    /// The whole command table.
    pub fn commands(&self) -> &'a [Command<T>] {
        self.commands
    }

    /// Pattern of the matched entry.
    pub fn pattern(&self) -> &'static str {
        self.command.pattern
    }

    /// Tag of the matched entry.
    pub fn tag(&self) -> i32 {
        self.command.tag
    }

    /// Effective header text, after compound inheritance.
    pub fn header(&self) -> &'a [u8] {
        self.header
    }

    /// Values of the `#` placeholders, in pattern order.
    pub fn command_numbers(&self) -> &'a [i32] {
        self.suffixes
    }

    /// `true` when the header also matches `pattern`.
    pub fn is_command(&self, pattern: &str) -> bool {
        match_pattern(pattern, self.header).is_match()
    }

    pub(crate) fn has_unread_params(&self) -> bool {
        self.params.has_more()
    }

    /// Queue `code` and return it as a failure.
    pub fn fail<V>(&mut self, code: i16) -> Result<V, CommandError> {
        self.session.error_push(code);
        Err(CommandError::new(code))
    }

    fn read<V>(
        &mut self,
        mandatory: bool,
        convert: impl FnOnce(&Parameter<'a>) -> Result<V, i16>,
    ) -> Result<Option<V>, CommandError> {
        match self.params.next(mandatory) {
            Ok(Some(p)) => match convert(&p) {
                Ok(v) => Ok(Some(v)),
                Err(code) => self.fail(code),
            },
            Ok(None) => Ok(None),
            Err(code) => self.fail(code),
        }
    }

    // ── Parameters ──────────────────────────────────────────────────────

    /// The next parameter, unconverted.
    pub fn parameter(&mut self, mandatory: bool) -> Result<Option<Parameter<'a>>, CommandError> {
        self.read(mandatory, |p| Ok(*p))
    }

    /// The next parameter as `V`.
    pub fn param<V: FromParameter>(&mut self, mandatory: bool) -> Result<Option<V>, CommandError> {
        self.read(mandatory, V::from_parameter)
    }

    /// The next parameter as `V`; missing is an error.
    pub fn required<V: FromParameter>(&mut self) -> Result<V, CommandError> {
        match self.param(true)? {
            Some(v) => Ok(v),
            None => self.fail(codes::MISSING_PARAMETER),
        }
    }

    /// Tag of the `table` mnemonic given as the next parameter.
    pub fn param_choice(
        &mut self,
        table: &[ChoiceDef],
        mandatory: bool,
    ) -> Result<Option<i32>, CommandError> {
        self.read(mandatory, |p| params::choice(p, table))
    }

    /// A named value from `specials` or a number with an optional unit.
    pub fn param_number(
        &mut self,
        specials: &[ChoiceDef],
        mandatory: bool,
    ) -> Result<Option<Number>, CommandError> {
        self.read(mandatory, |p| params::number(p, specials))
    }

    /// Mnemonic, quoted string (unescaped) or block payload.
    pub fn param_text(&mut self, mandatory: bool) -> Result<Option<Cow<'a, [u8]>>, CommandError> {
        self.read(mandatory, params::text)
    }

    /// Mnemonic, quoted string (verbatim) or block payload.
    pub fn param_characters(&mut self, mandatory: bool) -> Result<Option<&'a [u8]>, CommandError> {
        self.read(mandatory, params::characters)
    }

    /// Copy text into `buf`, reporting truncation.
    pub fn param_copy_text(
        &mut self,
        buf: &mut [u8],
        mandatory: bool,
    ) -> Result<Option<CopiedText>, CommandError> {
        self.read(mandatory, |p| params::copy_text(p, buf))
    }

    /// Raw payload of a block parameter.
    pub fn param_block(&mut self, mandatory: bool) -> Result<Option<&'a [u8]>, CommandError> {
        self.read(mandatory, params::arbitrary_block)
    }

    /// Read up to `out.len()` values; returns how many were read.
    pub fn param_array<V: FromParameter>(
        &mut self,
        out: &mut [V],
        mandatory: bool,
    ) -> Result<usize, CommandError> {
        let mut n = 0;
        while n < out.len() {
            match self.param(mandatory && n == 0)? {
                Some(v) => out[n] = v,
                None => break,
            }
            n += 1;
        }
        Ok(n)
    }

    // ── List expressions ────────────────────────────────────────────────

    fn list<V>(&mut self, entry: Result<Option<V>, expr::ExprError>) -> Result<Option<V>, CommandError> {
        entry.or_else(|e| self.fail(e.code()))
    }

    /// Entry `index` of a numeric list parameter; `Ok(None)` past the end.
    pub fn numeric_list_entry(
        &mut self,
        param: &Parameter<'_>,
        index: usize,
    ) -> Result<Option<ListEntry<f64>>, CommandError> {
        self.list(expr::numeric_list_entry(param, index))
    }

    /// Integer form of [`numeric_list_entry`](Self::numeric_list_entry).
    pub fn numeric_list_entry_int(
        &mut self,
        param: &Parameter<'_>,
        index: usize,
    ) -> Result<Option<ListEntry<i32>>, CommandError> {
        self.list(expr::numeric_list_entry_int(param, index))
    }

    /// Entry `index` of a channel list parameter; `Ok(None)` past the end.
    pub fn channel_list_entry(
        &mut self,
        param: &Parameter<'_>,
        index: usize,
    ) -> Result<Option<ListEntry<Channel>>, CommandError> {
        self.list(expr::channel_list_entry(param, index))
    }
}

impl<T> Deref for Call<'_, T> {
    type Target = Session<T>;

    fn deref(&self) -> &Session<T> {
        self.session
    }
}

impl<T> DerefMut for Call<'_, T> {
    fn deref_mut(&mut self) -> &mut Session<T> {
        self.session
    }
}
