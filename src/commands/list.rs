//! List and info commands

use std::io::Write;

use sfm_core::chip::{ChipDatabase, FlashDescriptor};
use sfm_core::model::{Instruction, OpcodeTable};

use crate::error::Result;

/// List all known chips
pub fn list_chips<W: Write>(out: &mut W, db: &ChipDatabase) -> Result<()> {
    writeln!(out, "Supported flash chips:")?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<16} {:>10} {:>10} {:>8} {:>8}",
        "Name", "Size", "ID", "Sector", "Page"
    )?;
    writeln!(out, "{}", "-".repeat(56))?;

    let mut chips: Vec<&FlashDescriptor> = db.iter().collect();
    chips.sort_by(|a, b| a.name.cmp(&b.name));

    for chip in chips {
        writeln!(
            out,
            "{:<16} {:>10} {:>10} {:>8} {:>8}",
            chip.name,
            format_size(chip.total_size),
            chip.id_hex,
            format_size(chip.sector_size),
            format_size(chip.page_size)
        )?;
    }

    Ok(())
}

/// Print the full description of one chip
pub fn print_chip_info<W: Write>(out: &mut W, chip: &FlashDescriptor) -> Result<()> {
    writeln!(out, "Chip: {}", chip.name)?;
    writeln!(out, "  ID:           {}", chip.id_hex)?;
    writeln!(
        out,
        "  Size:         {} ({} bytes)",
        format_size(chip.total_size),
        chip.total_size
    )?;
    writeln!(out, "  Sector size:  {}", format_size(chip.sector_size))?;
    writeln!(out, "  Page size:    {}", format_size(chip.page_size))?;
    writeln!(out, "  Address:      {} bytes", chip.address_bytes)?;
    writeln!(out, "  ID dummies:   {} bytes", chip.read_id_dummy_bytes)?;
    writeln!(
        out,
        "  Status masks: WIP=0x{:02x} WEL=0x{:02x}",
        chip.wip_mask, chip.wel_mask
    )?;
    writeln!(out, "  Opcodes:")?;
    let table = OpcodeTable::new(&chip.opcodes);
    for instruction in Instruction::ALL {
        writeln!(
            out,
            "    {:<30} 0x{:02x}",
            instruction.name(),
            table.opcode(instruction)
        )?;
    }

    Ok(())
}

fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
