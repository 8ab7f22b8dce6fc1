//! Flash chip type definitions

use alloc::borrow::Cow;

use crate::error::{Error, Result};
use crate::spi::{opcodes, StatusFlags, MAX_ADDRESS_BYTES};

/// Maximum number of device ID bytes returned by Read ID
pub const MAX_ID_BYTES: usize = 10;

/// Decoded device ID bytes
pub type IdBytes = heapless::Vec<u8, MAX_ID_BYTES>;

/// Instruction opcodes understood by a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcodes {
    /// Read manufacturer / device ID
    pub read_id: u8,
    /// Write enable
    pub write_enable: u8,
    /// Write disable
    pub write_disable: u8,
    /// Chip (bulk) erase
    pub chip_erase: u8,
    /// Sector erase
    pub sector_erase: u8,
    /// Read status register
    pub read_status: u8,
    /// Read data
    pub read_data: u8,
    /// Page program
    pub page_program: u8,
}

impl Opcodes {
    /// The common JEDEC instruction set
    pub const JEDEC: Self = Self {
        read_id: opcodes::REMS,
        write_enable: opcodes::WREN,
        write_disable: opcodes::WRDI,
        chip_erase: opcodes::CE_C7,
        sector_erase: opcodes::SE_20,
        read_status: opcodes::RDSR,
        read_data: opcodes::READ,
        page_program: opcodes::PP,
    };

    /// All opcodes in dispatch priority order
    pub const fn to_array(&self) -> [u8; 8] {
        [
            self.read_id,
            self.write_enable,
            self.write_disable,
            self.chip_erase,
            self.sector_erase,
            self.read_status,
            self.read_data,
            self.page_program,
        ]
    }

    /// Check that no two instructions share an opcode
    pub fn are_distinct(&self) -> bool {
        let ops = self.to_array();
        ops.iter()
            .enumerate()
            .all(|(i, op)| !ops[i + 1..].contains(op))
    }
}

impl Default for Opcodes {
    fn default() -> Self {
        Self::JEDEC
    }
}

/// Flash chip description
///
/// Immutable once constructed. The built-in table uses borrowed strings so
/// it can live in a `static`; descriptions loaded at runtime own theirs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashDescriptor {
    /// Chip name (e.g., "W25Q16JV"), matched case-insensitively
    pub name: Cow<'static, str>,
    /// Device ID returned by Read ID, as ASCII hex (e.g., "ef14")
    pub id_hex: Cow<'static, str>,
    /// Instruction set
    pub opcodes: Opcodes,
    /// Width of the address field in bytes
    pub address_bytes: u8,
    /// Sector (smallest erase unit) size in bytes
    pub sector_size: u32,
    /// Page (program unit) size in bytes
    pub page_size: u32,
    /// Total flash size in bytes
    pub total_size: u32,
    /// Dummy bytes between the Read ID opcode and the ID bytes
    pub read_id_dummy_bytes: u8,
    /// Status register mask of the write-in-progress bit
    pub wip_mask: u8,
    /// Status register mask of the write enable latch
    pub wel_mask: u8,
}

impl FlashDescriptor {
    /// Describe a chip with the JEDEC instruction set and standard status bits
    pub const fn jedec(
        name: &'static str,
        id_hex: &'static str,
        total_size: u32,
        sector_size: u32,
        page_size: u32,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            id_hex: Cow::Borrowed(id_hex),
            opcodes: Opcodes::JEDEC,
            address_bytes: 3,
            sector_size,
            page_size,
            total_size,
            read_id_dummy_bytes: 3,
            wip_mask: StatusFlags::WIP.bits(),
            wel_mask: StatusFlags::WEL.bits(),
        }
    }

    /// Check if this chip carries the given name (case-insensitive)
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Number of ID bytes announced by the hex string
    pub fn id_len(&self) -> usize {
        self.id_hex.len() / 2
    }

    /// Decode the device ID hex string
    pub fn id_bytes(&self) -> Result<IdBytes> {
        let hex = self.id_hex.as_bytes();
        if hex.len() % 2 != 0 {
            return Err(Error::Conversion);
        }

        let mut id = IdBytes::new();
        for pair in hex.chunks_exact(2) {
            let byte = (hex_nibble(pair[0])? << 4) | hex_nibble(pair[1])?;
            id.push(byte).map_err(|_| Error::Conversion)?;
        }
        Ok(id)
    }

    /// Check the whole description, including the device ID string
    ///
    /// Returns a short reason on failure.
    pub fn validate(&self) -> core::result::Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("empty chip name");
        }
        self.validate_topology()?;
        if self.id_bytes().is_err() {
            return Err("device ID is not a valid hex string");
        }
        Ok(())
    }

    /// Check sizes, address width, opcodes and status masks
    ///
    /// The flash model relies on these for its address arithmetic. The
    /// device ID is only decoded when Read ID is executed.
    pub fn validate_topology(&self) -> core::result::Result<(), &'static str> {
        if !self.page_size.is_power_of_two()
            || !self.sector_size.is_power_of_two()
            || !self.total_size.is_power_of_two()
        {
            return Err("page, sector and total size must be powers of two");
        }
        if self.page_size > self.sector_size || self.sector_size > self.total_size {
            return Err("sizes must satisfy page <= sector <= total");
        }
        if self.address_bytes == 0 || self.address_bytes > MAX_ADDRESS_BYTES {
            return Err("address width must be 1 to 4 bytes");
        }
        let address_bits = u32::from(self.address_bytes) * 8;
        if address_bits < 32 && (self.total_size - 1) >> address_bits != 0 {
            return Err("address width too small for total size");
        }
        if !self.opcodes.are_distinct() {
            return Err("instruction opcodes must be distinct");
        }
        if self.wel_mask == 0 {
            return Err("write enable latch mask must not be zero");
        }
        Ok(())
    }
}

fn hex_nibble(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::Conversion),
    }
}
