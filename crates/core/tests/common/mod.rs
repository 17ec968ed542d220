//! Shared test helpers for `scpi_engine_core` integration tests.

#![allow(unreachable_pub)]

use std::io;

use scpi_engine_core::codec::params::text;
use scpi_engine_core::{
    Call, ChoiceDef, Command, CommandError, CommandResult, Context, ControlKind, EngineConfig,
    Identification, ListEntry, Transport, standard_commands,
};

// ─── Transport ───────────────────────────────────────────────────────────────

/// Transport that records everything the engine hands it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    /// Response bytes.
    pub output: Vec<u8>,
    /// Codes passed to the error notification, in order.
    pub errors: Vec<i16>,
    /// Control signals raised.
    pub controls: Vec<(ControlKind, u16)>,
    /// Number of `*RST` resets.
    pub resets: usize,
    /// Number of flushes.
    pub flushes: usize,
    /// Values recorded by test command handlers.
    pub seen: Vec<String>,
}

impl Transport for RecordingTransport {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn control(&mut self, kind: ControlKind, value: u16) -> io::Result<()> {
        self.controls.push((kind, value));
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        self.resets += 1;
        Ok(())
    }

    fn error(&mut self, code: i16) {
        self.errors.push(code);
    }
}

type Ctx = Context<RecordingTransport>;

// ─── Test command table ──────────────────────────────────────────────────────

/// Choices accepted by `TEST:CHOice?`.
pub const TRIGGER_SOURCES: &[ChoiceDef] = &[
    ChoiceDef { name: "BUS", tag: 5 },
    ChoiceDef { name: "IMMediate", tag: 6 },
    ChoiceDef { name: "EXTernal", tag: 7 },
];

fn record(call: &mut Call<'_, RecordingTransport>, value: String) {
    call.transport_mut().seen.push(value);
}

fn numbers_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let numbers = call.command_numbers().to_vec();
    for n in numbers {
        call.result_int(n);
    }
    Ok(())
}

fn voltage(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let value = call.param_number(scpi_engine_core::codec::SPECIAL_NUMBERS, true)?;
    if let Some(v) = value {
        record(call, v.to_string());
    }
    Ok(())
}

fn voltage_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    call.result_f64(1.5);
    Ok(())
}

fn measure_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let range: Option<f64> = call.param(false)?;
    call.result_f64(range.unwrap_or(0.25));
    Ok(())
}

fn test_bool(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let flag: bool = call.required()?;
    record(call, flag.to_string());
    Ok(())
}

fn test_int(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let value: i32 = call.required()?;
    record(call, value.to_string());
    Ok(())
}

fn test_choice_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    if let Some(tag) = call.param_choice(TRIGGER_SOURCES, true)? {
        call.result_int(tag);
    }
    Ok(())
}

fn test_text(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let param = call.parameter(true)?;
    if let Some(p) = param {
        let value = match text(&p) {
            Ok(t) => String::from_utf8_lossy(&t).into_owned(),
            Err(code) => return call.fail(code),
        };
        record(call, value);
    }
    Ok(())
}

fn test_text_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let value = call.param_text(true)?;
    if let Some(t) = value {
        let owned = String::from_utf8_lossy(&t).into_owned();
        call.result_text(&owned);
    }
    Ok(())
}

fn test_block_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    if let Some(data) = call.param_block(true)? {
        call.result_block(data);
    }
    Ok(())
}

fn test_channels(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let Some(param) = call.parameter(true)? else {
        return Ok(());
    };
    let mut index = 0;
    while let Some(entry) = call.channel_list_entry(&param, index)? {
        let text = match entry {
            ListEntry::Single(c) => format!("{:?}", c.as_slice()),
            ListEntry::Range(from, to) => format!("{:?}:{:?}", from.as_slice(), to.as_slice()),
        };
        record(call, text);
        index += 1;
    }
    Ok(())
}

fn test_array(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let mandatory = !call.is_command("TEST:ARRay:OPTional");
    let mut values = [0i32; 3];
    let n = call.param_array(&mut values, mandatory)?;
    let text: Vec<String> = values[..n].iter().map(i32::to_string).collect();
    record(call, format!("{n}:{}", text.join(",")));
    Ok(())
}

fn test_list_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let Some(param) = call.parameter(true)? else {
        return Ok(());
    };
    let mut index = 0;
    if call.is_command("TEST:LIST:INTeger?") {
        while let Some(entry) = call.numeric_list_entry_int(&param, index)? {
            call.result_int(entry.from());
            call.result_int(entry.to());
            index += 1;
        }
    } else {
        while let Some(entry) = call.numeric_list_entry(&param, index)? {
            call.result_f64(entry.from());
            call.result_f64(entry.to());
            index += 1;
        }
    }
    Ok(())
}

fn test_base_q(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    let value: i32 = call.required()?;
    let base: u32 = call.param(false)?.unwrap_or(10);
    call.result_int_base(value, base);
    Ok(())
}

fn fail(_call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    Err(CommandError::default())
}

fn fail_twice(call: &mut Call<'_, RecordingTransport>) -> CommandResult {
    call.fail(-222)
}

/// Standard commands followed by a small instrument table.
pub fn commands() -> Vec<Command<RecordingTransport>> {
    let mut table = standard_commands();
    table.extend([
        Command::new("MEASure:VOLTage:DC?", measure_q),
        Command::new("SOURce:VOLTage[:LEVel][:IMMediate][:AMPLitude]", voltage),
        Command::new("SOURce:VOLTage[:LEVel][:IMMediate][:AMPLitude]?", voltage_q),
        Command::new("OUTPut#:MODulation#:FM#", numbers_q),
        Command::new("TEST#:NUMbers#?", numbers_q),
        Command::new("TEST:BOOL", test_bool),
        Command::new("TEST:INTeger", test_int),
        Command::new("TEST:CHOice?", test_choice_q),
        Command::new("TEST:TEXT", test_text),
        Command::new("TEST:TEXT?", test_text_q),
        Command::new("TEST:ARBitrary?", test_block_q),
        Command::new("TEST:CHANnellist", test_channels),
        Command::new("TEST:ARRay[:OPTional]", test_array),
        Command::new("TEST:LIST[:INTeger]?", test_list_q),
        Command::new("TEST:BASE?", test_base_q),
        Command::new("TEST:FAIL", fail),
        Command::new("TEST:FAIL:PUSHed", fail_twice),
    ]);
    table
}

/// Config reporting `MA,IN,0,VER` for `*IDN?`.
pub fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.idn = Identification::new(Some("MA"), Some("IN"), None, Some("VER"));
    config
}

/// Context over [`commands`] and [`config`].
pub fn context() -> Ctx {
    context_with(config())
}

/// Context over [`commands`] with a custom config.
pub fn context_with(config: EngineConfig) -> Ctx {
    Context::new(commands(), RecordingTransport::default(), &config)
        .unwrap_or_else(|e| panic!("context setup failed: {e}"))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Feed `input` in one call and return the response text.
#[allow(dead_code)]
pub fn run(ctx: &mut Ctx, input: &str) -> String {
    let before = ctx.transport().output.len();
    ctx.input(input.as_bytes())
        .unwrap_or_else(|e| panic!("input {input:?} rejected: {e}"));
    String::from_utf8_lossy(&ctx.transport().output[before..]).into_owned()
}

/// Pop every queued error code.
#[allow(dead_code)]
pub fn drain_errors(ctx: &mut Ctx) -> Vec<i16> {
    std::iter::from_fn(|| ctx.session_mut().error_pop().map(|e| e.code)).collect()
}
