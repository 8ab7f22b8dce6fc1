//! Instruction decoding

use core::fmt;

use crate::chip::Opcodes;

/// Instruction understood by the flash model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Read manufacturer / device ID
    ReadId,
    /// Set the write enable latch
    WriteEnable,
    /// Clear the write enable latch
    WriteDisable,
    /// Erase the whole chip
    ChipErase,
    /// Erase the sector containing the address
    SectorErase,
    /// Read status register
    ReadStatus,
    /// Read data starting at the address
    ReadData,
    /// Program up to one page starting at the address
    PageProgram,
}

impl Instruction {
    /// All instructions in decode priority order
    pub const ALL: [Instruction; 8] = [
        Instruction::ReadId,
        Instruction::WriteEnable,
        Instruction::WriteDisable,
        Instruction::ChipErase,
        Instruction::SectorErase,
        Instruction::ReadStatus,
        Instruction::ReadData,
        Instruction::PageProgram,
    ];

    /// Human readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReadId => "Read Manufacturer / Device ID",
            Self::WriteEnable => "Write Enable",
            Self::WriteDisable => "Write Disable",
            Self::ChipErase => "Chip Erase",
            Self::SectorErase => "Sector Erase",
            Self::ReadStatus => "Read Status Register",
            Self::ReadData => "Read Data",
            Self::PageProgram => "Page Program",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opcode to instruction mapping of one chip
///
/// Built once when the model is created. Lookup walks the entries in
/// priority order, so the first instruction bound to an opcode wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeTable {
    entries: [(u8, Instruction); 8],
}

impl OpcodeTable {
    /// Build the table from a chip's opcodes
    pub fn new(opcodes: &Opcodes) -> Self {
        let ops = opcodes.to_array();
        let mut entries = [(0u8, Instruction::ReadId); 8];
        for (entry, (op, instruction)) in entries
            .iter_mut()
            .zip(ops.iter().zip(Instruction::ALL.iter()))
        {
            *entry = (*op, *instruction);
        }
        Self { entries }
    }

    /// Resolve an opcode byte
    pub fn decode(&self, opcode: u8) -> Option<Instruction> {
        self.entries
            .iter()
            .find(|(op, _)| *op == opcode)
            .map(|(_, instruction)| *instruction)
    }

    /// Opcode bound to an instruction
    pub fn opcode(&self, instruction: Instruction) -> u8 {
        self.entries
            .iter()
            .find(|(_, i)| *i == instruction)
            .map(|(op, _)| *op)
            .unwrap_or_default()
    }
}
