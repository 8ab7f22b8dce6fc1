//! Error types for the command line tool

use thiserror::Error;

/// Errors reported by `sfm` commands
#[derive(Error, Debug)]
pub enum CliError {
    /// Flash model rejected an operation
    #[error("Flash error: {0}")]
    Flash(#[from] sfm_core::Error),

    /// A packet passed to `exec` was rejected
    #[error("Packet {index} ({opcode}) failed: {source}")]
    Packet {
        /// Position of the packet on the command line, starting at 1
        index: usize,
        /// First byte of the packet, as hex
        opcode: String,
        /// Reason reported by the flash model
        source: sfm_core::Error,
    },

    /// Chip database could not be loaded
    #[error("Chip database error: {0}")]
    ChipDb(#[from] sfm_core::chip::ChipDbError),

    /// Chip name not found
    #[error("Unknown chip '{0}' (see `sfm list-chips`)")]
    UnknownChip(String),

    /// I/O error writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for `sfm` commands
pub type Result<T> = std::result::Result<T, CliError>;
