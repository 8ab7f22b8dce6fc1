//! Hex dump command

use std::io::Write;
use std::path::Path;

use sfm_core::model::FlashModel;

use crate::error::Result;

/// Print a hex dump of the flash, optionally after loading an image
pub fn run_dump<W: Write>(
    out: &mut W,
    model: &mut FlashModel,
    load: Option<&Path>,
    start: Option<u32>,
    stop: Option<u32>,
) -> Result<()> {
    if let Some(path) = load {
        model.load(path)?;
    }

    let dump = model.dump(start, stop)?;
    out.write_all(dump.as_bytes())?;
    Ok(())
}
