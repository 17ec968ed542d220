//! Ready-made handlers for the standard command surface.

pub mod help;
pub mod ieee488;
pub mod system;

use crate::engine::{Command, Transport};

/// IEEE 488.2 common commands, the mandatory `SYSTem`/`STATus` subset and
/// `HELP?`, ready to be prepended or appended to an instrument table.
pub fn standard_commands<T: Transport>() -> Vec<Command<T>> {
    vec![
        Command::new("*CLS", ieee488::cls::<T>).with_description("Clear status"),
        Command::new("*ESE", ieee488::ese::<T>).with_description("Event status enable"),
        Command::new("*ESE?", ieee488::ese_q::<T>),
        Command::new("*ESR?", ieee488::esr_q::<T>).with_description("Read and clear event status"),
        Command::new("*IDN?", ieee488::idn_q::<T>).with_description("Identify"),
        Command::new("*OPC", ieee488::opc::<T>).with_description("Operation complete"),
        Command::new("*OPC?", ieee488::opc_q::<T>),
        Command::new("*RST", ieee488::rst::<T>).with_description("Reset"),
        Command::new("*SRE", ieee488::sre::<T>).with_description("Service request enable"),
        Command::new("*SRE?", ieee488::sre_q::<T>),
        Command::new("*STB?", ieee488::stb_q::<T>).with_description("Status byte"),
        Command::new("*TST?", ieee488::tst_q::<T>).with_description("Self test"),
        Command::new("*WAI", ieee488::wai::<T>).with_description("Wait to continue"),
        Command::new("SYSTem:ERRor[:NEXT]?", system::error_next_q::<T>)
            .with_description("Next error in the queue"),
        Command::new("SYSTem:ERRor:COUNt?", system::error_count_q::<T>),
        Command::new("SYSTem:VERSion?", system::version_q::<T>),
        Command::new("STATus:QUEStionable[:EVENt]?", system::questionable_event_q::<T>),
        Command::new("STATus:QUEStionable:CONDition?", system::questionable_condition_q::<T>),
        Command::new("STATus:QUEStionable:ENABle", system::questionable_enable::<T>),
        Command::new("STATus:QUEStionable:ENABle?", system::questionable_enable_q::<T>),
        Command::new("STATus:OPERation[:EVENt]?", system::operation_event_q::<T>),
        Command::new("STATus:OPERation:CONDition?", system::operation_condition_q::<T>),
        Command::new("STATus:OPERation:ENABle", system::operation_enable::<T>),
        Command::new("STATus:OPERation:ENABle?", system::operation_enable_q::<T>),
        Command::new("STATus:PRESet", system::preset::<T>),
        Command::new("HELP?", help::help_q::<T>).with_description("List commands"),
    ]
}
