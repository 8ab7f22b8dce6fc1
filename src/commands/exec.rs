//! Execute SPI packets against a flash model

use std::io::Write;

use sfm_core::model::FlashModel;

use super::hex_bytes;
use crate::cli::ImageArgs;
use crate::error::{CliError, Result};

/// Run `packets` in order, printing each request and response
///
/// The image in `images.load` is applied first. Execution stops at the first
/// rejected packet; store and compare only run when every packet succeeded.
pub fn run_exec<W: Write>(
    out: &mut W,
    model: &mut FlashModel,
    packets: &[Vec<u8>],
    images: &ImageArgs,
) -> Result<()> {
    if let Some(path) = &images.load {
        model.load(path)?;
        log::info!("Loaded {}", path.display());
    }

    for (i, packet) in packets.iter().enumerate() {
        let mut buf = packet.clone();
        writeln!(out, "> {}", hex_bytes(&buf))?;

        model.dispatch(&mut buf).map_err(|source| CliError::Packet {
            index: i + 1,
            opcode: packet
                .first()
                .map(|op| format!("0x{:02x}", op))
                .unwrap_or_else(|| "empty".to_string()),
            source,
        })?;

        writeln!(out, "< {}", hex_bytes(&buf))?;
    }

    if let Some(path) = &images.store {
        model.store(path)?;
        log::info!("Stored {}", path.display());
    }

    if let Some(path) = &images.compare {
        model.compare(path)?;
        writeln!(out, "Flash matches {}", path.display())?;
    }

    Ok(())
}
