//! Parameter and result codec.
//!
//! - [`params`]: the per-unit parameter cursor and typed conversions
//! - [`results`]: response writers on [`Session`](crate::engine::Session)
//! - [`expr`]: numeric and channel list expressions
//! - [`number`]: numeric text conversion
//! - [`units`]: unit-suffix and named-value tables

pub mod expr;
pub mod number;
pub mod params;
pub mod results;
pub mod units;

pub use expr::{Channel, ExprError, ListEntry};
pub use params::{CopiedText, FromParameter, Number, ParamCursor, Parameter};
pub use results::{ArrayElement, ArrayFormat, IntResult};
pub use units::{ChoiceDef, SPECIAL_NUMBERS, SpecialNumber, Unit};
