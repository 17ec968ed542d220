//! Sample bench instrument served by `scpi session`.
//!
//! The instrument state lives in the transport, which is what every
//! command callback can reach through [`Call::transport_mut`].

use std::io::{self, Write};

use scpi_engine_core::codec::SPECIAL_NUMBERS;
use scpi_engine_core::codec::units::choice_name;
use scpi_engine_core::{
    Call, Channel, ChoiceDef, Command, CommandResult, ControlKind, ListEntry, Number,
    SpecialNumber, Transport, Unit, codes, standard_commands, translate,
};
use tracing::{debug, info, warn};

/// Highest voltage the source accepts.
pub(crate) const MAX_VOLTAGE: f64 = 30.0;

/// Trigger sources accepted by `TEST:CHOice?`.
pub(crate) const TRIGGER_SOURCES: &[ChoiceDef] = &[
    ChoiceDef { name: "BUS", tag: 5 },
    ChoiceDef { name: "IMMediate", tag: 6 },
    ChoiceDef { name: "EXTernal", tag: 7 },
];

/// Response sink plus the simulated instrument's settings.
#[derive(Debug)]
pub(crate) struct Bench<W> {
    out: W,
    voltage: f64,
    range: Option<f64>,
    flag: bool,
}

impl<W: Write> Bench<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            voltage: 0.0,
            range: None,
            flag: false,
        }
    }
}

impl<W: Write> Transport for Bench<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.out.write_all(data)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn control(&mut self, kind: ControlKind, value: u16) -> io::Result<()> {
        info!(?kind, value, "control");
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        info!("device reset");
        self.voltage = 0.0;
        self.range = None;
        self.flag = false;
        Ok(())
    }

    fn error(&mut self, code: i16) {
        match code {
            0 => debug!("error queue empty"),
            _ => warn!(code, message = translate(code).unwrap_or("Unknown error"), "error queued"),
        }
    }
}

type BenchCall<'c, W> = Call<'c, Bench<W>>;

fn voltage_from(number: Number) -> Result<f64, i16> {
    match number {
        Number::Special(tag) => match SpecialNumber::from_tag(tag) {
            Some(SpecialNumber::Minimum | SpecialNumber::Default) => Ok(0.0),
            Some(SpecialNumber::Maximum) => Ok(MAX_VOLTAGE),
            _ => Err(codes::ILLEGAL_PARAMETER_VALUE),
        },
        Number::Value { value, unit, .. } => {
            if !matches!(unit, Unit::None | Unit::Volt) {
                return Err(codes::SUFFIX_NOT_ALLOWED);
            }
            if !(0.0..=MAX_VOLTAGE).contains(&value) {
                debug!(value, "voltage out of range");
                return Err(codes::ILLEGAL_PARAMETER_VALUE);
            }
            Ok(value)
        }
    }
}

fn measure_voltage_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let range = call.param_number(SPECIAL_NUMBERS, false)?;
    let _resolution = call.param_number(SPECIAL_NUMBERS, false)?;
    if let Some(r) = range {
        debug!(range = %r, "measure range");
    }
    let reading = call.transport().voltage;
    call.result_f64(reading);
    Ok(())
}

fn source_voltage<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let Some(number) = call.param_number(SPECIAL_NUMBERS, true)? else {
        return Ok(());
    };
    match voltage_from(number) {
        Ok(v) => {
            call.transport_mut().voltage = v;
            Ok(())
        }
        Err(code) => call.fail(code),
    }
}

fn source_voltage_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let v = call.transport().voltage;
    call.result_f64(v);
    Ok(())
}

fn configure_voltage<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let range = call.param_number(SPECIAL_NUMBERS, false)?;
    let _resolution = call.param_number(SPECIAL_NUMBERS, false)?;
    let range = match range {
        Some(Number::Value { value, .. }) => Some(value),
        Some(Number::Special(_)) | None => None,
    };
    call.transport_mut().range = range;
    info!(?range, "configured DC voltage");
    Ok(())
}

fn configure_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    call.result_mnemonic("VOLT:DC");
    match call.transport().range {
        Some(range) => call.result_f64(range),
        None => call.result_mnemonic("AUTO"),
    }
    Ok(())
}

fn test_bool<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let flag: bool = call.required()?;
    call.transport_mut().flag = flag;
    info!(flag, "TEST:BOOL");
    Ok(())
}

fn test_bool_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let flag = call.transport().flag;
    call.result_bool(flag);
    Ok(())
}

fn test_choice_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    if let Some(tag) = call.param_choice(TRIGGER_SOURCES, true)? {
        debug!(name = choice_name(TRIGGER_SOURCES, tag), "choice");
        call.result_int(tag);
    }
    Ok(())
}

fn test_numbers_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let numbers = call.command_numbers();
    for &n in numbers {
        call.result_int(n);
    }
    Ok(())
}

fn test_text_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    if let Some(text) = call.param_text(true)? {
        let text = String::from_utf8_lossy(&text).into_owned();
        call.result_text(&text);
    }
    Ok(())
}

fn test_arbitrary_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    if let Some(data) = call.param_block(true)? {
        call.result_block(data);
    }
    Ok(())
}

fn channel_text(channel: &Channel) -> String {
    channel
        .as_slice()
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join("!")
}

fn test_channels_q<W: Write>(call: &mut BenchCall<'_, W>) -> CommandResult {
    let Some(param) = call.parameter(true)? else {
        return Ok(());
    };
    let mut index = 0;
    while let Some(entry) = call.channel_list_entry(&param, index)? {
        let text = match entry {
            ListEntry::Single(c) => channel_text(&c),
            ListEntry::Range(from, to) => format!("{}:{}", channel_text(&from), channel_text(&to)),
        };
        call.result_characters(text.as_bytes());
        index += 1;
    }
    Ok(())
}

/// Standard commands followed by the bench instrument's own commands.
pub(crate) fn commands<W: Write>() -> Vec<Command<Bench<W>>> {
    let mut table = standard_commands();
    table.extend([
        Command::new("MEASure:VOLTage:DC?", measure_voltage_q::<W>)
            .with_description("Measure DC voltage [<range>[,<resolution>]]"),
        Command::new("SOURce:VOLTage[:LEVel][:IMMediate][:AMPLitude]", source_voltage::<W>)
            .with_description("Set output voltage <number>|MIN|MAX|DEF"),
        Command::new("SOURce:VOLTage[:LEVel][:IMMediate][:AMPLitude]?", source_voltage_q::<W>),
        Command::new("CONFigure:VOLTage:DC", configure_voltage::<W>)
            .with_description("Configure DC voltage [<range>[,<resolution>]]"),
        Command::new("CONFigure?", configure_q::<W>),
        Command::new("TEST:BOOL", test_bool::<W>).with_description("Store a boolean"),
        Command::new("TEST:BOOL?", test_bool_q::<W>),
        Command::new("TEST:CHOice?", test_choice_q::<W>)
            .with_description("Tag of BUS|IMMediate|EXTernal"),
        Command::new("TEST#:NUMbers#?", test_numbers_q::<W>).with_tag(1),
        Command::new("TEST:TEXT?", test_text_q::<W>).with_description("Echo text"),
        Command::new("TEST:ARBitrary?", test_arbitrary_q::<W>).with_description("Echo a block"),
        Command::new("TEST:CHANnellist?", test_channels_q::<W>)
            .with_description("Expand a channel list (@...)"),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use scpi_engine_core::{Context, EngineConfig};

    fn run(input: &str) -> (String, Vec<i16>) {
        let mut out = Vec::new();
        let mut ctx = Context::new(commands(), Bench::new(&mut out), &EngineConfig::default())
            .expect("table compiles");
        ctx.input(input.as_bytes()).expect("fits");
        let errors = std::iter::from_fn(|| ctx.session_mut().error_pop().map(|e| e.code)).collect();
        drop(ctx);
        (String::from_utf8(out).expect("utf8"), errors)
    }

    #[test]
    fn source_voltage_round_trips() {
        let (out, errors) = run("SOUR:VOLT 1500 mV;VOLT?;:MEAS:VOLT:DC?\r\n");
        assert_eq!(out, "1.5;1.5\r\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn abbreviated_headers_reach_the_same_command() {
        let (out, errors) = run("so:v 5;v?\r\n");
        assert_eq!(out, "5\r\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn voltage_limits() {
        let (out, errors) = run("SOUR:VOLT MAX;VOLT?\r\nSOUR:VOLT 31\r\nSOUR:VOLT 5 A\r\n");
        assert_eq!(out, "30\r\n");
        assert_eq!(
            errors,
            [codes::ILLEGAL_PARAMETER_VALUE, codes::SUFFIX_NOT_ALLOWED]
        );
    }

    #[test]
    fn configure_and_reset() {
        let (out, _) = run("CONF:VOLT:DC 10;:CONF?;*RST;CONF?\r\nTEST:BOOL ON;BOOL?\r\n");
        assert_eq!(out, "VOLT:DC,10;VOLT:DC,AUTO\r\n1\r\n");
    }

    #[test]
    fn channel_list_expands() {
        let (out, _) = run("TEST:CHAN? (@1!1:1!3,5)\r\n");
        assert_eq!(out, "1!1:1!3,5\r\n");
    }

    #[test]
    fn numbers_and_choices() {
        let (out, _) = run("TEST2:NUM?;:TEST:CHO? EXT\r\n");
        assert_eq!(out, "2,1;7\r\n");
    }
}
