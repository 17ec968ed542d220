//! Status reporting: the register file and the error queue.

pub mod error_queue;
pub mod registers;

pub use error_queue::{ErrorEntry, ErrorQueue, InfoHeap, MAX_INFO_LEN};
pub use registers::{Register, RegisterFile, esr, stb};
