//! `HELP?` introspection of the command table.

use crate::engine::{Call, Command, CommandResult, Transport};

/// Patterns and descriptions of `commands` whose pattern contains
/// `filter`, ignoring ASCII case. `None` lists everything.
pub fn entries<T>(
    commands: &[Command<T>],
    filter: Option<&[u8]>,
) -> Vec<(&'static str, Option<&'static str>)> {
    let needle = filter.map(<[u8]>::to_ascii_lowercase);
    commands
        .iter()
        .filter(|c| match &needle {
            Some(needle) => contains_ignore_case(c.pattern.as_bytes(), needle),
            None => true,
        })
        .map(|c| (c.pattern, c.description))
        .collect()
}

fn contains_ignore_case(haystack: &[u8], lower_needle: &[u8]) -> bool {
    lower_needle.is_empty()
        || haystack
            .windows(lower_needle.len())
            .any(|w| w.to_ascii_lowercase() == lower_needle)
}

/// `HELP? [<filter>]`: one block per entry, `\t<pattern>[ <description>]`
/// followed by the line ending.
pub fn help_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let filter = call.param_characters(false)?;
    let ending = call.line_ending().as_bytes();
    let listed = entries(call.commands(), filter);
    for (pattern, description) in listed {
        let mut block = Vec::with_capacity(pattern.len() + 8);
        block.push(b'\t');
        block.extend_from_slice(pattern.as_bytes());
        if let Some(text) = description.filter(|d| !d.is_empty()) {
            block.push(b' ');
            block.extend_from_slice(text.as_bytes());
        }
        block.extend_from_slice(ending);
        call.result_block(&block);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CommandResult;

    fn noop(_: &mut Call<'_, Vec<u8>>) -> CommandResult {
        Ok(())
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let table = vec![
            Command::new("SYSTem:ERRor[:NEXT]?", noop),
            Command::new("*IDN?", noop).with_description("identify"),
            Command::new("SYSTem:VERSion?", noop),
        ];
        let all = entries(&table, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1], ("*IDN?", Some("identify")));

        let sys: Vec<_> = entries(&table, Some(b"sys")).into_iter().map(|(p, _)| p).collect();
        assert_eq!(sys, ["SYSTem:ERRor[:NEXT]?", "SYSTem:VERSion?"]);
        assert!(entries(&table, Some(b"zzz")).is_empty());
    }
}
