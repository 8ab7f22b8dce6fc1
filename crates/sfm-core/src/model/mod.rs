//! In-memory flash model
//!
//! [`FlashModel`] owns the memory image and status register of one emulated
//! chip. It is driven one SPI transaction at a time through
//! [`FlashModel::dispatch`].
//!
//! Erase and program complete instantly: the write-in-progress bit is never
//! set, so polling the status register always reports the chip as idle.

mod dispatch;
mod instruction;

pub use instruction::{Instruction, OpcodeTable};

use alloc::string::String;
use alloc::vec::Vec;

use crate::chip::{find_builtin, FlashDescriptor};
use crate::error::{Error, Result};
use crate::hexdump;

/// Value of an erased flash byte
pub const ERASED: u8 = 0xFF;

/// Emulated SPI NOR flash chip
#[derive(Clone)]
pub struct FlashModel {
    chip: FlashDescriptor,
    table: OpcodeTable,
    memory: Vec<u8>,
    status: u8,
    verbosity: u8,
}

impl FlashModel {
    /// Create a model of a built-in chip, looked up by name (case-insensitive)
    pub fn new(name: &str) -> Result<Self> {
        let chip = find_builtin(name).ok_or_else(|| {
            log::debug!("Chip '{}' is not in the built-in table", name);
            Error::Selection
        })?;
        Self::with_descriptor(chip.clone())
    }

    /// Create a model of a chip from a loaded database
    #[cfg(feature = "std")]
    pub fn from_database(db: &crate::chip::ChipDatabase, name: &str) -> Result<Self> {
        let chip = db.find_by_name(name).ok_or_else(|| {
            log::debug!("Chip '{}' is not in the chip database", name);
            Error::Selection
        })?;
        Self::with_descriptor(chip.clone())
    }

    /// Create a model from a chip description
    ///
    /// The memory starts fully erased and the status register cleared.
    pub fn with_descriptor(chip: FlashDescriptor) -> Result<Self> {
        if let Err(reason) = chip.validate_topology() {
            log::warn!("Rejecting chip '{}': {}", chip.name, reason);
            return Err(Error::Selection);
        }

        let memory = erased_buffer(chip.total_size)?;
        let table = OpcodeTable::new(&chip.opcodes);

        log::debug!(
            "Selected {} ({} bytes, {} byte sectors, {} byte pages)",
            chip.name,
            chip.total_size,
            chip.sector_size,
            chip.page_size
        );

        Ok(Self {
            chip,
            table,
            memory,
            status: 0,
            verbosity: 0,
        })
    }

    /// Get the chip description
    pub fn chip(&self) -> &FlashDescriptor {
        &self.chip
    }

    /// Get a reference to the flash memory
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Get a mutable reference to the flash memory
    ///
    /// Bypasses the instruction set, for harnesses that preload content.
    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Current status register value
    pub fn status(&self) -> u8 {
        self.status
    }

    /// Check the write enable latch
    pub fn write_enabled(&self) -> bool {
        self.status & self.chip.wel_mask != 0
    }

    /// Diagnostic message level, 0 is quiet
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Set the diagnostic message level
    ///
    /// Above 0, instruction traces go out at info level and rejected
    /// instructions at warn level. It never changes behavior.
    pub fn set_verbosity(&mut self, level: u8) {
        self.verbosity = level;
    }

    /// Format a hex dump of the memory
    ///
    /// `None` selects the first or last byte. Rows are 16 bytes wide;
    /// `start` is rounded down and `stop` up to a row boundary.
    pub fn dump(&self, start: Option<u32>, stop: Option<u32>) -> Result<String> {
        let last = self.chip.total_size - 1;
        let start = start.unwrap_or(0);
        let stop = stop.unwrap_or(last);

        if start > last || stop > last {
            return Err(self.reject(
                Error::AddressRange,
                format_args!(
                    "Dump range 0x{:x}..0x{:x} exceeds flash size 0x{:x}",
                    start, stop, self.chip.total_size
                ),
            ));
        }

        Ok(hexdump::format(&self.memory, start as usize, stop as usize, ""))
    }

    /// Swap in a fully prepared memory image
    #[cfg(feature = "std")]
    pub(crate) fn replace_memory(&mut self, memory: Vec<u8>) {
        debug_assert_eq!(memory.len(), self.memory.len());
        self.memory = memory;
    }

    /// Log a rejected request and hand back its error
    pub(crate) fn reject(&self, err: Error, detail: core::fmt::Arguments<'_>) -> Error {
        if self.verbosity > 0 {
            log::warn!("{}", detail);
        } else {
            log::debug!("{}", detail);
        }
        err
    }

    /// Log a diagnostic message
    pub(crate) fn note(&self, detail: core::fmt::Arguments<'_>) {
        if self.verbosity > 0 {
            log::info!("{}", detail);
        } else {
            log::trace!("{}", detail);
        }
    }
}

impl core::fmt::Debug for FlashModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlashModel")
            .field("chip", &self.chip.name)
            .field("size", &self.memory.len())
            .field("status", &format_args!("0x{:02x}", self.status))
            .field("verbosity", &self.verbosity)
            .finish()
    }
}

/// Allocate a buffer of `size` erased bytes
pub(crate) fn erased_buffer(size: u32) -> Result<Vec<u8>> {
    let size = size as usize;
    let mut buf = Vec::new();
    buf.try_reserve_exact(size).map_err(|_| Error::Allocation)?;
    buf.resize(size, ERASED);
    Ok(buf)
}
