//! sfm-core - Serial NOR flash model
//!
//! This crate emulates a SPI NOR flash chip in memory so that a simulation
//! or test harness can drive it with raw bus transactions. Every call to
//! [`FlashModel::dispatch`](model::FlashModel::dispatch) consumes one packet:
//! the first byte is the instruction opcode, the rest is address and payload.
//! The response is written back into the same buffer.
//!
//! The memory image can be persisted to and restored from a sparse text
//! format (`.dif`) that only records 16-byte lines differing from the
//! erased state.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`), file based
//!   image codec and RON chip database loading
//! - `alloc` - Enable heap allocation (required for the flash model itself)
//!
//! # Example
//!
//! ```ignore
//! use sfm_core::model::FlashModel;
//!
//! let mut flash = FlashModel::new("W25Q16JV")?;
//!
//! let mut packet = [0x90, 0, 0, 0, 0, 0];
//! flash.dispatch(&mut packet)?;
//! assert_eq!(&packet[4..], &[0xEF, 0x14]);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
pub mod chip;
pub mod error;
#[cfg(feature = "alloc")]
pub mod hexdump;
#[cfg(feature = "std")]
pub mod image;
#[cfg(feature = "alloc")]
pub mod model;
pub mod spi;

pub use error::{Error, Result};
