//! IEEE 488.2 / SCPI status register file.
//!
//! Registers form a small tree: the standard-event, operation, and
//! questionable groups each summarize into one bit of the status byte, and
//! the status byte summarizes into the request-service bit through the
//! service-request enable mask. [`RegisterFile::set`] propagates a write up
//! the tree immediately.

/// Status byte bits.
pub mod stb {
    /// Error/event queue not empty.
    pub const QMA: u16 = 0x04;
    /// Questionable status summary.
    pub const QES: u16 = 0x08;
    /// Message available.
    pub const MAV: u16 = 0x10;
    /// Standard event status summary.
    pub const ESR: u16 = 0x20;
    /// Request service.
    pub const SRQ: u16 = 0x40;
    /// Operation status summary.
    pub const OPS: u16 = 0x80;
}

/// Standard event status register bits.
pub mod esr {
    /// Operation complete.
    pub const OPC: u16 = 0x01;
    /// Request control.
    pub const REQ: u16 = 0x02;
    /// Query error.
    pub const QER: u16 = 0x04;
    /// Device-dependent error.
    pub const DER: u16 = 0x08;
    /// Execution error.
    pub const EER: u16 = 0x10;
    /// Command error.
    pub const CER: u16 = 0x20;
    /// User request.
    pub const URQ: u16 = 0x40;
    /// Power on.
    pub const PON: u16 = 0x80;
}

/// Addressable registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Register {
    /// Status byte.
    Stb,
    /// Service request enable.
    Sre,
    /// Standard event status.
    Esr,
    /// Standard event status enable.
    Ese,
    /// Operation event.
    Oper,
    /// Operation event enable.
    Opere,
    /// Operation condition.
    OperationCondition,
    /// Questionable event.
    Ques,
    /// Questionable event enable.
    Quese,
    /// Questionable condition.
    QuestionableCondition,
}

const COUNT: usize = 10;

enum Class {
    StatusByte,
    Event { enable: Register, parent: Register, bit: u16 },
    Enable { event: Register },
    Condition { event: Register },
}

impl Register {
    /// Every register, in storage order.
    pub const ALL: [Register; COUNT] = [
        Self::Stb,
        Self::Sre,
        Self::Esr,
        Self::Ese,
        Self::Oper,
        Self::Opere,
        Self::OperationCondition,
        Self::Ques,
        Self::Quese,
        Self::QuestionableCondition,
    ];

    fn index(self) -> usize {
        match self {
            Self::Stb => 0,
            Self::Sre => 1,
            Self::Esr => 2,
            Self::Ese => 3,
            Self::Oper => 4,
            Self::Opere => 5,
            Self::OperationCondition => 6,
            Self::Ques => 7,
            Self::Quese => 8,
            Self::QuestionableCondition => 9,
        }
    }

    fn class(self) -> Class {
        match self {
            Self::Stb | Self::Sre => Class::StatusByte,
            Self::Esr => Class::Event {
                enable: Self::Ese,
                parent: Self::Stb,
                bit: stb::ESR,
            },
            Self::Oper => Class::Event {
                enable: Self::Opere,
                parent: Self::Stb,
                bit: stb::OPS,
            },
            Self::Ques => Class::Event {
                enable: Self::Quese,
                parent: Self::Stb,
                bit: stb::QES,
            },
            Self::Ese => Class::Enable { event: Self::Esr },
            Self::Opere => Class::Enable { event: Self::Oper },
            Self::Quese => Class::Enable { event: Self::Ques },
            Self::OperationCondition => Class::Condition { event: Self::Oper },
            Self::QuestionableCondition => Class::Condition { event: Self::Ques },
        }
    }

    /// `true` for registers that are cleared when read.
    pub fn clears_on_read(self) -> bool {
        matches!(self, Self::Esr | Self::Oper | Self::Ques)
    }
}

/// Values of every status register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    values: [u16; COUNT],
}

impl RegisterFile {
    /// All registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `reg`.
    pub fn get(&self, reg: Register) -> u16 {
        self.values[reg.index()]
    }

    /// Write `value` to `reg` and propagate summaries.
    ///
    /// Returns the new status byte when the write raised the request-service
    /// bit (a 0 to 1 transition), so the caller can signal a service request
    /// exactly once.
    pub fn set(&mut self, reg: Register, value: u16) -> Option<u16> {
        let mut reg = reg;
        let mut value = value;
        loop {
            let old = self.values[reg.index()];
            if old == value {
                return None;
            }
            let srq_before = self.get(Register::Stb) & stb::SRQ;
            self.values[reg.index()] = value;

            match reg.class() {
                Class::StatusByte => {
                    let status = self.get(Register::Stb) & !stb::SRQ;
                    let enable = self.get(Register::Sre) & !stb::SRQ;
                    let slot = &mut self.values[Register::Stb.index()];
                    if status & enable != 0 {
                        *slot |= stb::SRQ;
                    } else {
                        *slot &= !stb::SRQ;
                    }
                    let raised = *slot & stb::SRQ != 0 && srq_before == 0;
                    return raised.then_some(*slot);
                }
                Class::Event { enable, parent, bit } => {
                    let summary = value & self.get(enable) != 0;
                    value = self.with_bit(parent, bit, summary);
                    reg = parent;
                }
                Class::Enable { event } => {
                    let Class::Event { parent, bit, .. } = event.class() else {
                        return None;
                    };
                    let summary = self.get(event) & value != 0;
                    value = self.with_bit(parent, bit, summary);
                    reg = parent;
                }
                Class::Condition { event } => {
                    let rising = (old ^ value) & value;
                    value = self.get(event) | rising;
                    reg = event;
                }
            }
        }
    }

    fn with_bit(&self, reg: Register, bit: u16, on: bool) -> u16 {
        let v = self.get(reg);
        if on { v | bit } else { v & !bit }
    }

    /// Set `bits` in `reg`.
    pub fn set_bits(&mut self, reg: Register, bits: u16) -> Option<u16> {
        self.set(reg, self.get(reg) | bits)
    }

    /// Clear `bits` in `reg`.
    pub fn clear_bits(&mut self, reg: Register, bits: u16) -> Option<u16> {
        self.set(reg, self.get(reg) & !bits)
    }

    /// Read `reg`, clearing it afterwards if it is an event register.
    pub fn take(&mut self, reg: Register) -> u16 {
        let v = self.get(reg);
        if reg.clears_on_read() {
            self.set(reg, 0);
        }
        v
    }
}
