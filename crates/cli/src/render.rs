//! Pretty diagnostic rendering using ariadne.
//!
//! Converts [`Diagnostic`]s into ariadne [`Report`]s for coloured,
//! source-annotated terminal output. Falls back to structured JSON when the
//! output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use scpi_engine_diagnostics::{Diagnostic, ErrorClass};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or detect from whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Class mapping ───────────────────────────────────────────────────────

/// Colour used for codes of `class`.
pub(crate) fn class_color(class: Option<ErrorClass>) -> Color {
    match class {
        Some(ErrorClass::Command) => Color::Red,
        Some(ErrorClass::Execution) => Color::Magenta,
        Some(ErrorClass::DeviceSpecific | ErrorClass::Query) => Color::Yellow,
        Some(ErrorClass::NoError) => Color::Green,
        _ => Color::Blue,
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics with source context to stderr.
pub(crate) fn render_diagnostics_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let Some(span) = &diag.span else {
            eprintln!("error[{}]: {}", diag.code, diag.message);
            continue;
        };
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(ReportKind::Error, (filename, start..end))
            .with_code(diag.code)
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&diag.message)
                    .with_color(class_color(diag.class())),
            );
        if let Some(class) = diag.class() {
            builder = builder.with_note(class.to_string());
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured error count to stderr, e.g. `2 errors`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    use ariadne::Fmt;

    let n = diagnostics.len();
    if n == 0 {
        return;
    }
    let s = if n == 1 { "" } else { "s" };
    eprintln!("{}", format!("{n} error{s}").fg(Color::Red));
}
