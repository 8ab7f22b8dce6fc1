//! SPI types shared by the flash model
//!
//! This module provides the address field codec, the standard JEDEC opcodes
//! used by the built-in chip table and the status register bit layout.

mod address;
pub mod opcodes;
mod status;

#[cfg(test)]
pub(crate) use address::encode_address;
pub use address::{decode_address, MAX_ADDRESS_BYTES};
pub use status::StatusFlags;
