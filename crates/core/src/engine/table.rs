//! Compiled command table and header lookup.

use scpi_engine_diagnostics::codes;

use super::command::Command;
use crate::grammar::pattern::{MatchResult, Pattern, PatternError};

/// Command entries with their patterns compiled once.
pub struct CommandTable<T> {
    commands: Vec<Command<T>>,
    patterns: Vec<Pattern<'static>>,
}

impl<T> CommandTable<T> {
    /// Compile every pattern; the first invalid one is returned as the error.
    pub fn new(commands: Vec<Command<T>>) -> Result<Self, PatternError> {
        let patterns = commands
            .iter()
            .map(|c| Pattern::parse(c.pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { commands, patterns })
    }

    /// The entries, in table order.
    pub fn commands(&self) -> &[Command<T>] {
        &self.commands
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// `true` when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// First entry matching `header`, with its suffix values.
    ///
    /// Fails with -114 when some entry matched but a suffix overflowed and
    /// no later entry matched cleanly, otherwise -113.
    pub fn find(&self, header: &[u8]) -> Result<(&Command<T>, Vec<i32>), i16> {
        let mut out_of_range = false;
        for (command, pattern) in self.commands.iter().zip(&self.patterns) {
            match pattern.match_header(header) {
                MatchResult::Yes(suffixes) => return Ok((command, suffixes)),
                MatchResult::SuffixOutOfRange => out_of_range = true,
                MatchResult::No => {}
            }
        }
        Err(if out_of_range {
            codes::HEADER_SUFFIX_OUTOFRANGE
        } else {
            codes::UNDEFINED_HEADER
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CommandResult;

    fn noop(_: &mut crate::engine::Call<'_, Vec<u8>>) -> CommandResult {
        Ok(())
    }

    fn table() -> CommandTable<Vec<u8>> {
        CommandTable::new(vec![
            Command::new("MEASure:VOLTage?", noop).with_tag(1),
            Command::new("MEASure[:VOLTage]:CURRent?", noop).with_tag(2),
            Command::new("OUTPut#", noop).with_tag(3),
        ])
        .unwrap()
    }

    #[test]
    fn first_match_wins() {
        let t = table();
        let (command, suffixes) = t.find(b"meas:volt?").unwrap();
        assert_eq!(command.tag, 1);
        assert!(suffixes.is_empty());
        assert_eq!(t.find(b"MEAS:CURR?").unwrap().0.tag, 2);
        assert_eq!(t.find(b"outp7").unwrap().1, [7]);
    }

    #[test]
    fn failures_carry_their_code() {
        let t = table();
        assert_eq!(t.find(b"SYST:ERR?").err(), Some(codes::UNDEFINED_HEADER));
        assert_eq!(t.find(b"OUTP99999999999").err(), Some(codes::HEADER_SUFFIX_OUTOFRANGE));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(CommandTable::new(vec![Command::<Vec<u8>>::new("MEAS[ure", noop)]).is_err());
        assert_eq!(table().len(), 3);
    }
}
