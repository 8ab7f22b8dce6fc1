//! Flash chip descriptions
//!
//! This module provides the [`FlashDescriptor`] type describing a chip's
//! instruction set and topology, the built-in table of supported chips and,
//! with `std`, a database that loads further chips from RON files.

mod builtin;
mod types;

#[cfg(feature = "std")]
mod database;

pub use builtin::{find_builtin, BUILTIN_CHIPS};
pub use types::*;

#[cfg(feature = "std")]
pub use database::*;
