mod instrument;
mod render;

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context as _, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use scpi_engine_core::codec::ParamCursor;
use scpi_engine_core::grammar::{Pattern, Pending, Termination, compose_header, scan_unit};
use scpi_engine_core::{CommandTable, Context, EngineConfig, EngineError, MatchResult, codes};
use scpi_engine_diagnostics::{Diagnostic, ErrorClass, Span, all_codes, translate};
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;

use crate::instrument::Bench;
use crate::render::{Format, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "scpi",
    version,
    about = "SCPI engine tooling: lex program messages, match patterns, check files, run a session"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Split program messages into units and show their tokens.
    Lex {
        /// Message text; `\r`, `\n`, `\t` and `\\` escapes are expanded.
        input: String,
    },

    /// Test a header against a command pattern.
    Match { pattern: String, header: String },

    /// Describe an SCPI error code.
    Explain {
        /// Code such as -113.
        #[arg(allow_hyphen_values = true, required_unless_present = "all")]
        code: Option<i16>,
        /// List every known code.
        #[arg(long, conflicts_with = "code")]
        all: bool,
    },

    /// Check a file of program messages against the sample instrument.
    Check { file: String },

    /// Run the sample instrument over stdin (or a file).
    Session {
        /// Read program messages from this file instead of stdin.
        #[arg(long)]
        input: Option<String>,
        /// Bytes handed to the engine per append.
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u16).range(1..))]
        chunk: u16,
        /// Engine configuration (JSON).
        #[arg(long)]
        config: Option<String>,
    },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Lex { input } => cmd_lex(&input, format)?,
        Cmd::Match { pattern, header } => cmd_match(&pattern, &header, format)?,
        Cmd::Explain { code, all } => cmd_explain(code, all, format)?,
        Cmd::Check { file } => cmd_check(&file, format)?,
        Cmd::Session {
            input,
            chunk,
            config,
        } => cmd_session(input.as_deref(), usize::from(chunk), config.as_deref())?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn termination_name(termination: Termination) -> &'static str {
    match termination {
        Termination::None => "none",
        Termination::Semicolon => "semicolon",
        Termination::Newline => "newline",
        Termination::Incomplete(_) => "incomplete",
    }
}

fn cmd_lex(input: &str, format: Format) -> Result<()> {
    let bytes = unescape(input);
    let mut units = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let unit = scan_unit(&bytes[pos..]);
        if unit.len == 0 {
            break;
        }
        let mut params = Vec::new();
        let mut cursor = ParamCursor::new(unit.data.text);
        while let Ok(Some(p)) = cursor.next(false) {
            params.push(serde_json::json!({
                "kind": p.kind.as_str(),
                "text": String::from_utf8_lossy(p.text),
            }));
        }
        units.push(serde_json::json!({
            "offset": pos,
            "header": String::from_utf8_lossy(unit.header.text),
            "kind": unit.header.kind.as_str(),
            "params": params,
            "termination": termination_name(unit.termination),
        }));
        pos += unit.len;
    }

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&units)?),
        Format::Pretty => {
            for u in &units {
                let params: Vec<String> = u["params"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|p| {
                        let kind = p["kind"].as_str().unwrap_or("");
                        let text = p["text"].as_str().unwrap_or("");
                        format!("{kind}({text})")
                    })
                    .collect();
                println!(
                    "{:>4}  {:<24} {:<24} [{}] {}",
                    u["offset"],
                    u["header"].as_str().unwrap_or(""),
                    u["kind"].as_str().unwrap_or(""),
                    params.join(", "),
                    u["termination"].as_str().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn cmd_match(pattern: &str, header: &str, format: Format) -> Result<()> {
    let compiled = Pattern::parse(pattern)?;
    let result = compiled.match_header(header.as_bytes());
    let (matched, suffixes, code) = match &result {
        MatchResult::Yes(values) => (true, values.clone(), None),
        MatchResult::SuffixOutOfRange => (false, Vec::new(), Some(codes::HEADER_SUFFIX_OUTOFRANGE)),
        MatchResult::No => (false, Vec::new(), Some(codes::UNDEFINED_HEADER)),
    };

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "pattern": pattern,
                "header": header,
                "matched": matched,
                "suffixes": suffixes,
                "error": code,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            use ariadne::Fmt;
            if matched {
                println!("{} {header} ~ {pattern} {suffixes:?}", "match".fg(ariadne::Color::Green));
            } else {
                let code = code.unwrap_or(codes::UNDEFINED_HEADER);
                println!(
                    "{} {header} !~ {pattern} ({code}, {})",
                    "no match".fg(ariadne::Color::Red),
                    translate(code).unwrap_or("")
                );
            }
        }
    }
    if !matched {
        process::exit(1);
    }
    Ok(())
}

fn cmd_explain(code: Option<i16>, all: bool, format: Format) -> Result<()> {
    if all {
        match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(all_codes())?),
            Format::Pretty => {
                for entry in all_codes() {
                    println!("{:>5}  {:<28} {}", entry.code, entry.name, entry.message);
                }
            }
        }
        return Ok(());
    }
    let Some(code) = code else {
        bail!("an error code or --all is required");
    };

    let message = translate(code);
    let class = ErrorClass::of(code);
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "code": code,
                "message": message,
                "class": class,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            use ariadne::Fmt;
            let class_text = class.map_or_else(|| "unclassified".to_string(), |c| c.to_string());
            println!(
                "{}: {} ({class_text})",
                code.fg(render::class_color(class)),
                message.unwrap_or("(no standard message)")
            );
        }
    }
    Ok(())
}

fn cmd_check(file: &str, format: Format) -> Result<()> {
    let input = fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    let table = CommandTable::new(instrument::commands::<io::Sink>())?;
    let diagnostics = check_source(input.as_bytes(), &table);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": diagnostics.is_empty(),
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics_pretty(&input, file, &diagnostics);
            print_summary(&diagnostics);
            if diagnostics.is_empty() {
                eprintln!("check ok");
            }
        }
    }
    if !diagnostics.is_empty() {
        process::exit(1);
    }
    Ok(())
}

fn cmd_session(input: Option<&str>, chunk: usize, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
            serde_json::from_str::<EngineConfig>(&text)
                .with_context(|| format!("invalid engine config in {path}"))?
        }
        None => EngineConfig::default(),
    };

    let data = match input {
        Some(path) => fs::read(path).with_context(|| format!("failed to read {path}"))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
            buf
        }
    };

    let stdout = io::stdout().lock();
    let mut ctx = Context::new(instrument::commands(), Bench::new(stdout), &config)?;
    for piece in data.chunks(chunk) {
        match ctx.input(piece) {
            Ok(lines) => debug!(lines, "appended"),
            Err(e @ EngineError::InputBufferOverrun { .. }) => warn!(error = %e, "input dropped"),
            Err(e) => return Err(e.into()),
        }
    }
    ctx.input(b"")?;

    let remaining = ctx.session().error_count();
    if remaining > 0 {
        warn!(remaining, "errors left in queue");
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Expand `\r`, `\n`, `\t` and `\\`; other backslashes are kept.
fn unescape(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut bytes = text.bytes().peekable();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.peek() {
            Some(b'r') => out.push(b'\r'),
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(b'\\') => out.push(b'\\'),
            _ => {
                out.push(b'\\');
                continue;
            }
        }
        bytes.next();
    }
    out
}

/// Scan `source` unit by unit and report what the engine would queue
/// without running any command.
fn check_source<T>(source: &[u8], table: &CommandTable<T>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut previous: Vec<u8> = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let unit = scan_unit(&source[pos..]);
        if unit.len == 0 {
            break;
        }
        let header = unit.header;
        let span = Span::new(pos + header.start, pos + header.end());

        if let Termination::Incomplete(pending) = unit.termination {
            let code = match pending {
                Pending::String => codes::INVALID_STRING_DATA,
                Pending::Block => codes::INVALID_BLOCK_DATA,
                Pending::Expression => codes::INVAL_EXPRESSION,
                Pending::Header => codes::UNDEFINED_HEADER,
            };
            let at = if unit.data.is_empty() {
                span
            } else {
                Span::new(pos + unit.data.start, source.len())
            };
            diagnostics.push(Diagnostic::new(code, Some(at)));
            break;
        }

        if unit.is_invalid() {
            diagnostics.push(Diagnostic::new(codes::INVALID_CHARACTER, Some(span)));
        } else if !header.is_empty() {
            let effective = compose_header(&previous, header.text).into_owned();
            if let Err(code) = table.find(&effective) {
                diagnostics.push(
                    Diagnostic::new(code, Some(span)).with_detail(String::from_utf8_lossy(&effective)),
                );
            }
            previous = effective;
        }

        if unit.termination == Termination::Newline {
            previous.clear();
        }
        pos += unit.len;
    }
    diagnostics
}
