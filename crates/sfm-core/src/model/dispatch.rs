//! Instruction dispatcher
//!
//! One packet is one SPI transaction, request and response in the same
//! buffer. Validation always runs in the order length, write enable latch,
//! address range, and nothing is modified before all checks passed.

use super::{FlashModel, Instruction, ERASED};
use crate::error::{Error, Result};
use crate::spi::decode_address;

impl FlashModel {
    /// Execute one SPI transaction
    ///
    /// `packet[0]` is the opcode, followed by the instruction's address and
    /// data bytes. On return the packet holds the bytes the chip drives
    /// during the transaction; positions without defined output are zero.
    /// An empty packet is accepted and does nothing.
    pub fn dispatch(&mut self, packet: &mut [u8]) -> Result<()> {
        let Some(&opcode) = packet.first() else {
            return Ok(());
        };

        let Some(instruction) = self.table.decode(opcode) else {
            return Err(self.reject(
                Error::MalformedInstruction,
                format_args!("Unknown instruction '0x{:02x}'", opcode),
            ));
        };

        self.note(format_args!("IST=0x{:02x}, {}", opcode, instruction));

        match instruction {
            Instruction::ReadId => self.read_id(packet),
            Instruction::WriteEnable => self.write_enable(packet),
            Instruction::WriteDisable => self.write_disable(packet),
            Instruction::ChipErase => self.chip_erase(packet),
            Instruction::SectorErase => self.sector_erase(packet),
            Instruction::ReadStatus => self.read_status(packet),
            Instruction::ReadData => self.read_data(packet),
            Instruction::PageProgram => self.page_program(packet),
        }
    }

    fn read_id(&mut self, packet: &mut [u8]) -> Result<()> {
        let dummy = usize::from(self.chip.read_id_dummy_bytes);
        self.expect_len(Instruction::ReadId, packet, 1 + dummy + self.chip.id_len())?;

        let id = self.chip.id_bytes().map_err(|err| {
            self.reject(err, format_args!("Convert device ID '{}'", self.chip.id_hex))
        })?;

        let (header, response) = packet.split_at_mut(1 + dummy);
        header.fill(0);
        response.copy_from_slice(&id);
        Ok(())
    }

    fn write_enable(&mut self, packet: &mut [u8]) -> Result<()> {
        self.expect_len(Instruction::WriteEnable, packet, 1)?;
        self.status |= self.chip.wel_mask;
        packet.fill(0);
        Ok(())
    }

    fn write_disable(&mut self, packet: &mut [u8]) -> Result<()> {
        self.expect_len(Instruction::WriteDisable, packet, 1)?;
        self.clear_write_enable();
        packet.fill(0);
        Ok(())
    }

    fn chip_erase(&mut self, packet: &mut [u8]) -> Result<()> {
        self.expect_len(Instruction::ChipErase, packet, 1)?;
        self.require_write_enable(Instruction::ChipErase)?;

        self.memory.fill(ERASED);
        self.clear_write_enable();
        packet.fill(0);
        Ok(())
    }

    fn sector_erase(&mut self, packet: &mut [u8]) -> Result<()> {
        let header = self.header_len();
        self.expect_len(Instruction::SectorErase, packet, header)?;
        self.require_write_enable(Instruction::SectorErase)?;

        let sector_size = self.chip.sector_size;
        let addr = decode_address(&packet[1..header]) & !(sector_size - 1);
        self.check_range(addr, sector_size)?;

        let start = addr as usize;
        self.memory[start..start + sector_size as usize].fill(ERASED);
        self.clear_write_enable();
        packet.fill(0);
        Ok(())
    }

    fn read_status(&mut self, packet: &mut [u8]) -> Result<()> {
        self.expect_len(Instruction::ReadStatus, packet, 2)?;
        packet[0] = 0;
        packet[1] = self.status;
        Ok(())
    }

    fn read_data(&mut self, packet: &mut [u8]) -> Result<()> {
        let header = self.header_len();
        self.expect_min_len(Instruction::ReadData, packet, header)?;

        // The address counter rolls over at the end of the flash
        let mask = (self.chip.total_size - 1) as usize;
        let mut addr = decode_address(&packet[1..header]) as usize & mask;

        let (head, data) = packet.split_at_mut(header);
        head.fill(0);
        for byte in data.iter_mut() {
            *byte = self.memory[addr];
            addr = (addr + 1) & mask;
        }
        Ok(())
    }

    fn page_program(&mut self, packet: &mut [u8]) -> Result<()> {
        let header = self.header_len();
        self.expect_min_len(Instruction::PageProgram, packet, header)?;
        self.require_write_enable(Instruction::PageProgram)?;

        let page_size = self.chip.page_size;
        let addr = decode_address(&packet[1..header]);
        let base = addr & !(page_size - 1);
        self.check_range(base, page_size)?;

        // Data past the end of the page wraps to the start of the same page
        let base = base as usize;
        let page_mask = (page_size - 1) as usize;
        let mut offset = addr as usize & page_mask;
        for &byte in &packet[header..] {
            self.memory[base + offset] = byte;
            offset = (offset + 1) & page_mask;
        }

        self.clear_write_enable();
        packet.fill(0);
        Ok(())
    }

    /// Opcode plus address field
    fn header_len(&self) -> usize {
        1 + usize::from(self.chip.address_bytes)
    }

    fn clear_write_enable(&mut self) {
        self.status &= !self.chip.wel_mask;
    }

    fn expect_len(&self, instruction: Instruction, packet: &[u8], expected: usize) -> Result<()> {
        if packet.len() != expected {
            return Err(self.reject(
                Error::MalformedInstruction,
                format_args!(
                    "Malformed '{}' instruction, expLen={}, isLen={}",
                    instruction,
                    expected,
                    packet.len()
                ),
            ));
        }
        Ok(())
    }

    fn expect_min_len(&self, instruction: Instruction, packet: &[u8], min: usize) -> Result<()> {
        if packet.len() < min {
            return Err(self.reject(
                Error::MalformedInstruction,
                format_args!(
                    "Malformed '{}' instruction, expLen>={}, isLen={}",
                    instruction,
                    min,
                    packet.len()
                ),
            ));
        }
        Ok(())
    }

    fn require_write_enable(&self, instruction: Instruction) -> Result<()> {
        if !self.write_enabled() {
            return Err(self.reject(
                Error::WriteProtected,
                format_args!("{} while write protection", instruction),
            ));
        }
        Ok(())
    }

    fn check_range(&self, addr: u32, len: u32) -> Result<()> {
        if u64::from(addr) + u64::from(len) > u64::from(self.chip.total_size) {
            return Err(self.reject(
                Error::AddressRange,
                format_args!(
                    "Address (0x{:x}) exceeds flash size (0x{:x})",
                    addr, self.chip.total_size
                ),
            ));
        }
        Ok(())
    }
}
