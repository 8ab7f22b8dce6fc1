//! Status register 1 bit layout

use bitflags::bitflags;

bitflags! {
    /// Standard status register 1 bits
    ///
    /// Chips in the built-in table use this layout. Chip descriptions loaded
    /// from RON may place the bits elsewhere; the model always goes through
    /// the per-chip masks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u8 {
        /// Write in progress (BUSY)
        const WIP = 1 << 0;
        /// Write enable latch
        const WEL = 1 << 1;
    }
}
