//! Configuration types for an engine context.

use super::error::EngineError;

/// Capacities and identity of one engine context.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EngineConfig {
    /// Framer capacity in bytes (default 256).
    pub input_buffer_size: usize,
    /// Error queue capacity in entries (default 17).
    pub error_queue_size: usize,
    /// Bytes reserved for device-dependent error text (default 256).
    /// Zero disables error text.
    pub error_info_heap_size: usize,
    /// Response terminator (default CR LF).
    pub line_ending: LineEnding,
    /// Fields reported by `*IDN?`.
    pub idn: Identification,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_buffer_size: 256,
            error_queue_size: 17,
            error_info_heap_size: 256,
            line_ending: LineEnding::default(),
            idn: Identification::default(),
        }
    }
}

impl EngineConfig {
    /// Reject capacities the engine cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.input_buffer_size == 0 {
            return Err(EngineError::InvalidConfig(
                "input_buffer_size must be at least 1".into(),
            ));
        }
        if self.error_queue_size == 0 {
            return Err(EngineError::InvalidConfig(
                "error_queue_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Terminator written after each response line.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineEnding {
    /// `\r`
    Cr,
    /// `\n`
    Lf,
    /// `\r\n`
    #[default]
    CrLf,
}

impl LineEnding {
    /// Terminator bytes.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Cr => b"\r",
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

/// Manufacturer, model, serial number and firmware version for `*IDN?`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Identification {
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Serial number.
    pub serial: Option<String>,
    /// Firmware version.
    pub version: Option<String>,
}

impl Identification {
    /// All four fields; `None` is reported as `0`.
    pub fn new(
        manufacturer: Option<&str>,
        model: Option<&str>,
        serial: Option<&str>,
        version: Option<&str>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.map(str::to_owned),
            model: model.map(str::to_owned),
            serial: serial.map(str::to_owned),
            version: version.map(str::to_owned),
        }
    }

    /// The fields in `*IDN?` order.
    pub fn fields(&self) -> [&str; 4] {
        [
            self.manufacturer.as_deref().unwrap_or("0"),
            self.model.as_deref().unwrap_or("0"),
            self.serial.as_deref().unwrap_or("0"),
            self.version.as_deref().unwrap_or("0"),
        ]
    }
}
