//! `SYSTem` and `STATus` subsystems.

use crate::engine::{Call, CommandResult, Transport};
use crate::status::{ErrorEntry, Register};

/// Version of the SCPI standard reported by `SYSTem:VERSion?`.
pub const SCPI_VERSION: &str = "1999.0";

/// `SYSTem:ERRor[:NEXT]?`: pop the oldest error, or `0,"No error"`.
pub fn error_next_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let entry = call.error_pop().unwrap_or(ErrorEntry { code: 0, info: None });
    call.result_error(&entry);
    Ok(())
}

/// `SYSTem:ERRor:COUNt?`
pub fn error_count_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let count = call.error_count();
    call.result_int(u64::try_from(count).unwrap_or(u64::MAX));
    Ok(())
}

/// `SYSTem:VERSion?`
pub fn version_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    call.result_mnemonic(SCPI_VERSION);
    Ok(())
}

fn read<T: Transport>(call: &mut Call<'_, T>, reg: Register) -> CommandResult {
    let value = call.reg_take(reg);
    call.result_int(value);
    Ok(())
}

fn write<T: Transport>(call: &mut Call<'_, T>, reg: Register) -> CommandResult {
    let value: u16 = call.required()?;
    call.reg_set(reg, value);
    Ok(())
}

/// `STATus:QUEStionable[:EVENt]?` (read and clear)
pub fn questionable_event_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    read(call, Register::Ques)
}

/// `STATus:QUEStionable:CONDition?`
pub fn questionable_condition_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    read(call, Register::QuestionableCondition)
}

/// `STATus:QUEStionable:ENABle <mask>`
pub fn questionable_enable<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    write(call, Register::Quese)
}

/// `STATus:QUEStionable:ENABle?`
pub fn questionable_enable_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    read(call, Register::Quese)
}

/// `STATus:OPERation[:EVENt]?` (read and clear)
pub fn operation_event_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    read(call, Register::Oper)
}

/// `STATus:OPERation:CONDition?`
pub fn operation_condition_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    read(call, Register::OperationCondition)
}

/// `STATus:OPERation:ENABle <mask>`
pub fn operation_enable<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    write(call, Register::Opere)
}

/// `STATus:OPERation:ENABle?`
pub fn operation_enable_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    read(call, Register::Opere)
}

/// `STATus:PRESet`: clear both enable registers.
pub fn preset<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    call.reg_set(Register::Opere, 0);
    call.reg_set(Register::Quese, 0);
    Ok(())
}
