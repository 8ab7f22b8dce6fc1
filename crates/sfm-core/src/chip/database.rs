//! Chip database for runtime loading and lookup
//!
//! This module provides the `ChipDatabase` type for loading chip definitions
//! from RON files at runtime, on top of the built-in table.

use alloc::borrow::Cow;
use alloc::format;
use alloc::{string::String, vec::Vec};
use std::fs;
use std::io;
use std::path::Path;

use super::builtin::BUILTIN_CHIPS;
use super::types::{FlashDescriptor, Opcodes};
use crate::spi::StatusFlags;

/// Error type for chip database operations
#[derive(Debug)]
pub enum ChipDbError {
    /// I/O error reading files
    Io(io::Error),
    /// RON parsing error
    Parse(ron::error::SpannedError),
    /// Validation error
    Validation(String),
}

impl From<io::Error> for ChipDbError {
    fn from(e: io::Error) -> Self {
        ChipDbError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ChipDbError {
    fn from(e: ron::error::SpannedError) -> Self {
        ChipDbError::Parse(e)
    }
}

impl std::fmt::Display for ChipDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChipDbError::Io(e) => write!(f, "I/O error: {}", e),
            ChipDbError::Parse(e) => write!(f, "Parse error: {}", e),
            ChipDbError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ChipDbError {}

// ============================================================================
// RON deserialization types (intermediate format)
// ============================================================================

/// Size specification with human-readable units (for RON parsing)
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub enum Size {
    /// Size in bytes
    B(u32),
    /// Size in kibibytes (1024 bytes)
    KiB(u32),
    /// Size in mebibytes (1024 * 1024 bytes)
    MiB(u32),
}

impl Size {
    /// Convert to bytes
    pub fn to_bytes(self) -> u32 {
        match self {
            Size::B(n) => n,
            Size::KiB(n) => n.saturating_mul(1024),
            Size::MiB(n) => n.saturating_mul(1024 * 1024),
        }
    }
}

/// Instruction set (RON format), JEDEC defaults for omitted fields
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
struct OpcodesDef {
    read_id: u8,
    write_enable: u8,
    write_disable: u8,
    chip_erase: u8,
    sector_erase: u8,
    read_status: u8,
    read_data: u8,
    page_program: u8,
}

impl Default for OpcodesDef {
    fn default() -> Self {
        let op = Opcodes::JEDEC;
        Self {
            read_id: op.read_id,
            write_enable: op.write_enable,
            write_disable: op.write_disable,
            chip_erase: op.chip_erase,
            sector_erase: op.sector_erase,
            read_status: op.read_status,
            read_data: op.read_data,
            page_program: op.page_program,
        }
    }
}

impl From<OpcodesDef> for Opcodes {
    fn from(def: OpcodesDef) -> Self {
        Opcodes {
            read_id: def.read_id,
            write_enable: def.write_enable,
            write_disable: def.write_disable,
            chip_erase: def.chip_erase,
            sector_erase: def.sector_erase,
            read_status: def.read_status,
            read_data: def.read_data,
            page_program: def.page_program,
        }
    }
}

/// Single chip definition in RON format
#[derive(Debug, Clone, serde::Deserialize)]
struct ChipDef {
    name: String,
    id: String,
    #[serde(default)]
    opcodes: OpcodesDef,
    #[serde(default = "default_address_bytes")]
    address_bytes: u8,
    sector_size: Size,
    #[serde(default = "default_page_size")]
    page_size: Size,
    total_size: Size,
    #[serde(default)]
    read_id_dummy_bytes: u8,
    #[serde(default = "default_wip_mask")]
    wip_mask: u8,
    #[serde(default = "default_wel_mask")]
    wel_mask: u8,
}

fn default_address_bytes() -> u8 {
    3
}

fn default_page_size() -> Size {
    Size::B(256)
}

fn default_wip_mask() -> u8 {
    StatusFlags::WIP.bits()
}

fn default_wel_mask() -> u8 {
    StatusFlags::WEL.bits()
}

/// Vendor definition containing multiple chips
#[derive(Debug, Clone, serde::Deserialize)]
struct VendorDef {
    vendor: String,
    chips: Vec<ChipDef>,
}

// ============================================================================
// Chip database
// ============================================================================

/// Runtime chip database
///
/// Holds a collection of chip descriptions, seeded from the built-in table
/// or loaded from RON files.
#[derive(Debug, Clone, Default)]
pub struct ChipDatabase {
    chips: Vec<FlashDescriptor>,
}

impl ChipDatabase {
    /// Create an empty chip database
    pub fn new() -> Self {
        Self { chips: Vec::new() }
    }

    /// Create a database holding the built-in chips
    pub fn with_builtin() -> Self {
        Self {
            chips: BUILTIN_CHIPS.to_vec(),
        }
    }

    /// Load chip definitions from a single RON file
    pub fn load_file(&mut self, path: &Path) -> Result<usize, ChipDbError> {
        let content = fs::read_to_string(path)?;
        self.load_ron(&content)
    }

    /// Load chip definitions from a RON string
    ///
    /// A chip whose name is already present replaces the existing entry.
    pub fn load_ron(&mut self, content: &str) -> Result<usize, ChipDbError> {
        let vendor_def: VendorDef = ron::from_str(content)?;
        let count = vendor_def.chips.len();

        let mut loaded = Vec::with_capacity(count);
        for chip_def in vendor_def.chips {
            let chip = FlashDescriptor {
                name: Cow::Owned(chip_def.name),
                id_hex: Cow::Owned(chip_def.id),
                opcodes: chip_def.opcodes.into(),
                address_bytes: chip_def.address_bytes,
                sector_size: chip_def.sector_size.to_bytes(),
                page_size: chip_def.page_size.to_bytes(),
                total_size: chip_def.total_size.to_bytes(),
                read_id_dummy_bytes: chip_def.read_id_dummy_bytes,
                wip_mask: chip_def.wip_mask,
                wel_mask: chip_def.wel_mask,
            };
            chip.validate()
                .map_err(|reason| ChipDbError::Validation(format!("{}: {}", chip.name, reason)))?;
            loaded.push(chip);
        }

        for chip in loaded {
            self.chips.retain(|c| !c.matches_name(&chip.name));
            self.chips.push(chip);
        }

        log::debug!("Loaded {} {} chip definitions", count, vendor_def.vendor);
        Ok(count)
    }

    /// Load all RON files from a directory
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, ChipDbError> {
        let mut total = 0;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "ron") {
                total += self.load_file(&path)?;
            }
        }

        Ok(total)
    }

    /// Get all chips in the database
    pub fn chips(&self) -> &[FlashDescriptor] {
        &self.chips
    }

    /// Get the number of chips in the database
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Find a chip by name (case-insensitive exact match)
    pub fn find_by_name(&self, name: &str) -> Option<&FlashDescriptor> {
        self.chips.iter().find(|c| c.matches_name(name))
    }

    /// Iterate over all chips
    pub fn iter(&self) -> impl Iterator<Item = &FlashDescriptor> {
        self.chips.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ron() {
        let ron = r#"
        (
            vendor: "Winbond",
            chips: [
                (
                    name: "W25Q16JV",
                    id: "ef14",
                    opcodes: (
                        read_id: 0x90,
                        chip_erase: 0xC7,
                    ),
                    address_bytes: 3,
                    sector_size: KiB(4),
                    page_size: B(256),
                    total_size: MiB(2),
                    read_id_dummy_bytes: 3,
                ),
            ],
        )
        "#;

        let mut db = ChipDatabase::new();
        let count = db.load_ron(ron).unwrap();

        assert_eq!(count, 1);
        assert_eq!(db.len(), 1);

        let chip = db.find_by_name("w25q16jv").unwrap();
        assert_eq!(chip.id_hex, "ef14");
        assert_eq!(chip.total_size, 2 * 1024 * 1024);
        assert_eq!(chip.sector_size, 4096);
        assert_eq!(chip.opcodes, Opcodes::JEDEC);
        assert_eq!(chip.wip_mask, 0x01);
        assert_eq!(chip.wel_mask, 0x02);
        assert_eq!(chip, &BUILTIN_CHIPS[0]);
    }

    #[test]
    fn test_load_ron_replaces_builtin() {
        let ron = r#"
        (
            vendor: "Custom",
            chips: [
                (
                    name: "w25q16jv",
                    id: "c214",
                    sector_size: KiB(64),
                    total_size: MiB(2),
                ),
            ],
        )
        "#;

        let mut db = ChipDatabase::with_builtin();
        let before = db.len();
        db.load_ron(ron).unwrap();

        assert_eq!(db.len(), before);
        let chip = db.find_by_name("W25Q16JV").unwrap();
        assert_eq!(chip.id_hex, "c214");
        assert_eq!(chip.sector_size, 64 * 1024);
    }

    #[test]
    fn test_load_ron_rejects_bad_topology() {
        let ron = r#"
        (
            vendor: "Broken",
            chips: [
                (
                    name: "BAD",
                    id: "0000",
                    sector_size: KiB(4),
                    page_size: KiB(8),
                    total_size: MiB(1),
                ),
            ],
        )
        "#;

        let mut db = ChipDatabase::new();
        assert!(matches!(
            db.load_ron(ron),
            Err(ChipDbError::Validation(_))
        ));
        assert!(db.is_empty());
    }

    #[test]
    fn test_load_shipped_vendor_files() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../chips/vendors");
        let mut db = ChipDatabase::with_builtin();
        let count = db.load_dir(&dir).unwrap();

        assert!(count > 0);
        assert_eq!(db.find_by_name("W25Q16JV").unwrap(), &BUILTIN_CHIPS[0]);

        let mx = db.find_by_name("MX25L1606E").unwrap();
        assert_eq!(mx.opcodes.chip_erase, 0x60);
        assert_eq!(mx.id_bytes().unwrap().as_slice(), &[0xC2, 0x14]);
    }

    #[test]
    fn test_size_conversion() {
        assert_eq!(Size::B(256).to_bytes(), 256);
        assert_eq!(Size::KiB(4).to_bytes(), 4096);
        assert_eq!(Size::MiB(2).to_bytes(), 2097152);
        // Overflow saturates and is then rejected as not a power of two
        assert_eq!(Size::MiB(8192).to_bytes(), u32::MAX);
    }
}
