//! IEEE 488.2 common commands.

use crate::engine::{Call, CommandResult, Transport};
use crate::status::{Register, esr};

/// `*CLS`: clear the event registers and the error queue.
pub fn cls<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    call.reg_set(Register::Esr, 0);
    call.reg_set(Register::Oper, 0);
    call.reg_set(Register::Ques, 0);
    call.error_clear();
    Ok(())
}

/// `*ESE <mask>`
pub fn ese<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let mask: u16 = call.required()?;
    call.reg_set(Register::Ese, mask);
    Ok(())
}

/// `*ESE?`
pub fn ese_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let mask = call.reg_get(Register::Ese);
    call.result_int(mask);
    Ok(())
}

/// `*ESR?`: read and clear the standard event register.
pub fn esr_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let events = call.reg_take(Register::Esr);
    call.result_int(events);
    Ok(())
}

/// `*IDN?`
pub fn idn_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let fields = call.identification().fields().map(str::to_owned);
    for field in &fields {
        call.result_mnemonic(field);
    }
    Ok(())
}

/// `*OPC`: flag operation complete.
pub fn opc<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    call.reg_set_bits(Register::Esr, esr::OPC);
    Ok(())
}

/// `*OPC?`: every operation is complete once it returns.
pub fn opc_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    call.result_int(1);
    Ok(())
}

/// `*RST`: hand the reset to the transport.
pub fn rst<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    call.reset_transport();
    Ok(())
}

/// `*SRE <mask>`
pub fn sre<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let mask: u16 = call.required()?;
    call.reg_set(Register::Sre, mask);
    Ok(())
}

/// `*SRE?`
pub fn sre_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let mask = call.reg_get(Register::Sre);
    call.result_int(mask);
    Ok(())
}

/// `*STB?`
pub fn stb_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    let status = call.reg_get(Register::Stb);
    call.result_int(status);
    Ok(())
}

/// `*TST?`: no self test, always passes.
pub fn tst_q<T: Transport>(call: &mut Call<'_, T>) -> CommandResult {
    call.result_int(0);
    Ok(())
}

/// `*WAI`: commands run to completion, so there is nothing to wait for.
pub fn wai<T: Transport>(_call: &mut Call<'_, T>) -> CommandResult {
    Ok(())
}
