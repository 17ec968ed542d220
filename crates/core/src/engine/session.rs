//! Per-connection state shared by the framer and command callbacks.

use scpi_engine_diagnostics::{ErrorClass, codes};
use tracing::{debug, warn};

use super::config::{EngineConfig, Identification, LineEnding};
use super::transport::{ControlKind, Transport};
use crate::status::{ErrorEntry, ErrorQueue, Register, RegisterFile, stb};

/// Registers, error queue and output state of one engine context.
///
/// Command callbacks reach the session through [`Call`](super::Call),
/// which dereferences to it.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    registers: RegisterFile,
    errors: ErrorQueue,
    idn: Identification,
    line_ending: LineEnding,
    /// Results written by the running unit.
    pub(crate) output_count: usize,
    /// Some unit of the current line produced output.
    pub(crate) line_output: bool,
    /// An error was pushed while the running unit executed.
    pub(crate) cmd_error: bool,
}

impl<T: Transport> Session<T> {
    pub(crate) fn new(transport: T, config: &EngineConfig) -> Self {
        Self {
            transport,
            registers: RegisterFile::new(),
            errors: ErrorQueue::new(config.error_queue_size, config.error_info_heap_size),
            idn: config.idn.clone(),
            line_ending: config.line_ending,
            output_count: 0,
            line_output: false,
            cmd_error: false,
        }
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub(crate) fn into_transport(self) -> T {
        self.transport
    }

    /// `*IDN?` fields.
    pub fn identification(&self) -> &Identification {
        &self.idn
    }

    /// Response terminator.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    // ── Transport plumbing ──────────────────────────────────────────────

    pub(crate) fn write_raw(&mut self, data: &[u8]) {
        if let Err(e) = self.transport.write(data) {
            warn!(error = %e, len = data.len(), "transport write failed");
        }
    }

    pub(crate) fn flush(&mut self) {
        if let Err(e) = self.transport.flush() {
            warn!(error = %e, "transport flush failed");
        }
    }

    pub(crate) fn reset_transport(&mut self) {
        if let Err(e) = self.transport.reset() {
            warn!(error = %e, "transport reset failed");
        }
    }

    fn control(&mut self, kind: ControlKind, value: u16) {
        debug!(?kind, value, "control signal");
        if let Err(e) = self.transport.control(kind, value) {
            warn!(error = %e, ?kind, "transport control failed");
        }
    }

    // ── Registers ───────────────────────────────────────────────────────

    /// The register file.
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Current value of `reg`.
    pub fn reg_get(&self, reg: Register) -> u16 {
        self.registers.get(reg)
    }

    /// Write `reg`; a rising request-service bit raises a service request.
    pub fn reg_set(&mut self, reg: Register, value: u16) {
        if let Some(status) = self.registers.set(reg, value) {
            self.control(ControlKind::ServiceRequest, status);
        }
    }

    /// Set `bits` in `reg`.
    pub fn reg_set_bits(&mut self, reg: Register, bits: u16) {
        self.reg_set(reg, self.reg_get(reg) | bits);
    }

    /// Clear `bits` in `reg`.
    pub fn reg_clear_bits(&mut self, reg: Register, bits: u16) {
        self.reg_set(reg, self.reg_get(reg) & !bits);
    }

    /// Read `reg`, clearing event registers as a side effect.
    pub fn reg_take(&mut self, reg: Register) -> u16 {
        let value = self.reg_get(reg);
        if reg.clears_on_read() {
            self.reg_set(reg, 0);
        }
        value
    }

    // ── Error queue ─────────────────────────────────────────────────────

    /// The error queue.
    pub fn errors(&self) -> &ErrorQueue {
        &self.errors
    }

    /// Number of queued errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Queue `code`.
    pub fn error_push(&mut self, code: i16) {
        self.push_entry(code, None);
    }

    /// Queue `code` with device-dependent text.
    pub fn error_push_info(&mut self, code: i16, info: &[u8]) {
        self.push_entry(code, Some(info));
    }

    fn push_entry(&mut self, code: i16, info: Option<&[u8]>) {
        let accepted = self.errors.push(code, info);
        debug!(code, accepted, "error queued");

        if let Some(class) = ErrorClass::of(code) {
            let bit = class.esr_bit();
            if bit != 0 {
                self.reg_set_bits(Register::Esr, bit);
            }
        }

        self.reg_set_bits(Register::Stb, stb::QMA);
        self.transport.error(code);
        if !accepted {
            self.transport.error(codes::QUEUE_OVERFLOW);
        }
        self.cmd_error = true;
    }

    /// Remove the oldest error; `None` when the queue is empty.
    pub fn error_pop(&mut self) -> Option<ErrorEntry> {
        let entry = self.errors.pop();
        self.emit_empty();
        entry
    }

    /// Drop every queued error.
    pub fn error_clear(&mut self) {
        self.errors.clear();
        self.emit_empty();
    }

    fn emit_empty(&mut self) {
        if self.errors.is_empty() && self.reg_get(Register::Stb) & stb::QMA != 0 {
            self.reg_clear_bits(Register::Stb, stb::QMA);
            self.transport.error(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::esr;

    fn session() -> Session<Vec<u8>> {
        Session::new(Vec::new(), &EngineConfig::default())
    }

    #[test]
    fn push_sets_event_and_queue_bits() {
        let mut s = session();
        s.error_push(codes::UNDEFINED_HEADER);
        assert_eq!(s.reg_get(Register::Esr), esr::CER);
        assert_eq!(s.reg_get(Register::Stb) & stb::QMA, stb::QMA);
        assert!(s.cmd_error);
    }

    #[test]
    fn pop_of_last_entry_clears_queue_bit() {
        let mut s = session();
        s.error_push(codes::EXECUTION_ERROR);
        s.error_push(codes::DEVICE_ERROR);
        assert_eq!(s.error_pop().map(|e| e.code), Some(-200));
        assert_ne!(s.reg_get(Register::Stb) & stb::QMA, 0);
        assert_eq!(s.error_pop().map(|e| e.code), Some(-300));
        assert_eq!(s.reg_get(Register::Stb) & stb::QMA, 0);
        assert_eq!(s.error_pop(), None);
    }

    #[test]
    fn user_codes_are_device_specific() {
        let mut s = session();
        s.error_push(42);
        assert_eq!(s.reg_get(Register::Esr), esr::DER);
    }

    #[test]
    fn clear_empties_queue() {
        let mut s = session();
        s.error_push_info(codes::UNDEFINED_HEADER, b"FOO");
        s.error_clear();
        assert_eq!(s.error_count(), 0);
        assert_eq!(s.reg_get(Register::Stb) & stb::QMA, 0);
    }
}
