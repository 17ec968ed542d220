//! Response writers.
//!
//! Results of one unit are separated by `,`. When several units on one line
//! answer, their responses are separated by `;`. The line ending is written
//! by the framer once the whole line has run.

use std::fmt;

use scpi_engine_diagnostics::translate;

use super::number::{format_f32, format_f64};
use crate::engine::{Session, Transport};
use crate::status::ErrorEntry;

/// Integer types accepted by [`Session::result_int`].
pub trait IntResult: Copy + fmt::Display {
    /// Two's-complement bit pattern at the type's own width.
    fn to_bits(self) -> u64;
}

macro_rules! int_result {
    ($($t:ty => $u:ty),* $(,)?) => {$(
        impl IntResult for $t {
            #[allow(clippy::cast_sign_loss, clippy::cast_lossless, clippy::unnecessary_cast)]
            fn to_bits(self) -> u64 {
                self as $u as u64
            }
        }
    )*};
}

int_result!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, u8 => u8, u16 => u16, u32 => u32, u64 => u64);

/// Text of `value` in `base` (2, 8, 16 with `#B`/`#Q`/`#H`; anything else
/// is decimal). Non-decimal forms show the unsigned bit pattern.
pub fn format_int<I: IntResult>(value: I, base: u32) -> String {
    let bits = value.to_bits();
    match base {
        2 => format!("#B{bits:b}"),
        8 => format!("#Q{bits:o}"),
        16 => format!("#H{bits:X}"),
        _ => value.to_string(),
    }
}

/// Quote `text` as SCPI string response data, doubling embedded quotes.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// `#<n><len>` header of a definite-length block.
pub fn block_header(len: usize) -> String {
    let digits = len.to_string();
    format!("#{}{digits}", digits.len())
}

/// Encoding of [`Session::result_array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayFormat {
    /// Comma-separated text.
    #[default]
    Ascii,
    /// Binary block, big-endian (IEEE 488.2 normal order).
    Normal,
    /// Binary block, little-endian (swapped).
    Swapped,
}

/// Element types accepted by [`Session::result_array`].
pub trait ArrayElement: Copy {
    /// Text form used by [`ArrayFormat::Ascii`].
    fn ascii(self) -> String;
    /// Append big-endian bytes.
    fn put_be(self, out: &mut Vec<u8>);
    /// Append little-endian bytes.
    fn put_le(self, out: &mut Vec<u8>);
}

macro_rules! array_int {
    ($($t:ty),*) => {$(
        impl ArrayElement for $t {
            fn ascii(self) -> String { self.to_string() }
            fn put_be(self, out: &mut Vec<u8>) { out.extend_from_slice(&self.to_be_bytes()); }
            fn put_le(self, out: &mut Vec<u8>) { out.extend_from_slice(&self.to_le_bytes()); }
        }
    )*};
}

array_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl ArrayElement for f32 {
    fn ascii(self) -> String {
        format_f32(self)
    }
    fn put_be(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_be_bytes());
    }
    fn put_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl ArrayElement for f64 {
    fn ascii(self) -> String {
        format_f64(self)
    }
    fn put_be(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_be_bytes());
    }
    fn put_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl<T: Transport> Session<T> {
    fn begin_result(&mut self) {
        if self.output_count > 0 {
            self.write_raw(b",");
        } else if self.line_output {
            self.write_raw(b";");
        }
        self.output_count += 1;
        self.line_output = true;
    }

    fn result_raw(&mut self, data: &[u8]) {
        self.begin_result();
        self.write_raw(data);
    }

    /// Write a bare mnemonic such as `ON` or `MAX`.
    pub fn result_mnemonic(&mut self, mnemonic: &str) {
        self.result_raw(mnemonic.as_bytes());
    }

    /// Write raw character data with no quoting.
    pub fn result_characters(&mut self, data: &[u8]) {
        self.result_raw(data);
    }

    /// Write a decimal integer.
    pub fn result_int<I: IntResult>(&mut self, value: I) {
        self.result_raw(value.to_string().as_bytes());
    }

    /// Write an integer in base 2, 8, 10 or 16.
    pub fn result_int_base<I: IntResult>(&mut self, value: I, base: u32) {
        self.result_raw(format_int(value, base).as_bytes());
    }

    /// Write a double with 15 significant digits.
    pub fn result_f64(&mut self, value: f64) {
        self.result_raw(format_f64(value).as_bytes());
    }

    /// Write a float with 6 significant digits.
    pub fn result_f32(&mut self, value: f32) {
        self.result_raw(format_f32(value).as_bytes());
    }

    /// Write `1` or `0`.
    pub fn result_bool(&mut self, value: bool) {
        self.result_raw(if value { b"1" } else { b"0" });
    }

    /// Write a double-quoted string.
    pub fn result_text(&mut self, text: &str) {
        self.result_raw(quote(text).as_bytes());
    }

    /// Write `data` as a definite-length block.
    pub fn result_block(&mut self, data: &[u8]) {
        self.result_block_header(data.len());
        self.result_block_data(data);
    }

    /// Start a block of `len` bytes; follow with [`result_block_data`](Self::result_block_data).
    pub fn result_block_header(&mut self, len: usize) {
        self.result_raw(block_header(len).as_bytes());
    }

    /// Append payload bytes to a block started with
    /// [`result_block_header`](Self::result_block_header).
    pub fn result_block_data(&mut self, data: &[u8]) {
        self.write_raw(data);
    }

    /// Write an array as text or as a binary block.
    pub fn result_array<E: ArrayElement>(&mut self, values: &[E], format: ArrayFormat) {
        match format {
            ArrayFormat::Ascii => {
                for v in values {
                    self.result_raw(v.ascii().as_bytes());
                }
            }
            ArrayFormat::Normal | ArrayFormat::Swapped => {
                let mut bytes = Vec::with_capacity(values.len() * size_of::<E>());
                for &v in values {
                    if format == ArrayFormat::Normal {
                        v.put_be(&mut bytes);
                    } else {
                        v.put_le(&mut bytes);
                    }
                }
                self.result_block(&bytes);
            }
        }
    }

    /// Write `<code>,"<message>[;<info>]"`.
    pub fn result_error(&mut self, entry: &ErrorEntry) {
        let message = translate(entry.code).unwrap_or("Unknown error");
        let text = match &entry.info {
            Some(info) => format!("{message};{info}"),
            None => message.to_string(),
        };
        self.result_int(entry.code);
        self.result_text(&text);
    }
}
