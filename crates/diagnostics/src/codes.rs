//! SCPI error code constants.
//!
//! Auto-generated from `spec/errors.jsonc` at build time. Use these instead
//! of numeric literals when pushing errors.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
