//! Error types for sfm-core
//!
//! This module provides a no_std compatible error type shared by the
//! instruction dispatcher and the image codec. Every error leaves the flash
//! model untouched and usable.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Setup errors
    /// No chip selected, or the requested chip name is not registered
    Selection,
    /// The memory image could not be allocated
    Allocation,

    // Instruction errors
    /// Unknown opcode, or wrong packet length for the decoded instruction
    MalformedInstruction,
    /// The chip's device ID hex string could not be decoded
    Conversion,
    /// Erase or program issued while the write enable latch was clear
    WriteProtected,
    /// Address (plus operation size) lies beyond the end of the flash
    AddressRange,

    // Image file errors
    /// File could not be opened or has an unsupported extension
    FileIo,
    /// Image file content differs from the flash memory
    Mismatch {
        /// Offset of the first differing byte
        offset: u32,
        /// Byte found in the flash model
        actual: u8,
        /// Byte recorded in the file
        expected: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selection => write!(f, "no flash chip selected"),
            Self::Allocation => write!(f, "flash memory allocation failed"),
            Self::MalformedInstruction => write!(f, "malformed or unknown instruction"),
            Self::Conversion => write!(f, "device ID conversion failed"),
            Self::WriteProtected => write!(f, "flash is write protected (write enable latch clear)"),
            Self::AddressRange => write!(f, "address out of flash range"),
            Self::FileIo => write!(f, "image file I/O failed"),
            Self::Mismatch {
                offset,
                actual,
                expected,
            } => write!(
                f,
                "mismatch at 0x{:x}: is=0x{:02x}, exp=0x{:02x}",
                offset, actual, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
