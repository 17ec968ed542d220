//! The seam between the engine and whatever carries the bytes.

use std::io;

/// Bus-control signals raised by the engine.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Service request; the value is the status byte.
    ServiceRequest,
    /// Go-to-local.
    GoToLocal,
    /// Local lockout.
    LocalLockout,
    /// Remote enable.
    RemoteEnable,
}

/// Output side of an instrument connection.
///
/// The engine performs no I/O of its own. Failures returned here are
/// logged and otherwise ignored; they never abort dispatch.
pub trait Transport {
    /// Write response bytes, returning how many were accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Push buffered output to the peer.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Raise a bus-control signal.
    fn control(&mut self, _kind: ControlKind, _value: u16) -> io::Result<()> {
        Ok(())
    }

    /// Device reset requested by `*RST`.
    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Error queue notification: a pushed code, or 0 when the queue empties.
    fn error(&mut self, _code: i16) {}
}

impl Transport for Vec<u8> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(data);
        Ok(data.len())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn control(&mut self, kind: ControlKind, value: u16) -> io::Result<()> {
        (**self).control(kind, value)
    }

    fn reset(&mut self) -> io::Result<()> {
        (**self).reset()
    }

    fn error(&mut self, code: i16) {
        (**self).error(code);
    }
}
