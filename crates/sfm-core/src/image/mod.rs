//! Memory image files
//!
//! Stores, loads and compares the flash memory against image files. The
//! file format is chosen by extension; unknown extensions are rejected
//! before the file is touched.

pub mod dif;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::vec::Vec;

use crate::error::{Error, Result};
use crate::hexdump::HexDump;
use crate::model::{erased_buffer, FlashModel};

/// Supported image file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Differences to the erased flash, 16 bytes per line
    Dif,
}

impl ImageFormat {
    /// Select the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("dif") {
            Some(Self::Dif)
        } else {
            None
        }
    }

    /// Canonical file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Dif => "dif",
        }
    }
}

impl FlashModel {
    /// Store the flash memory into an image file
    pub fn store(&self, path: &Path) -> Result<()> {
        let format = self.image_format(path)?;
        self.note(format_args!("'.{}' file type used", format.extension()));

        let result = File::create(path).and_then(|file| {
            let mut out = BufWriter::new(file);
            match format {
                ImageFormat::Dif => dif::write_dif(&mut out, self.memory())?,
            }
            out.flush()
        });

        result.map_err(|e| self.io_failure(path, e))
    }

    /// Replace the flash memory with the content of an image file
    ///
    /// Lines that would reach past the end of the flash are dropped. If the
    /// file cannot be read, the memory is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let image = self.read_image(path)?;
        self.replace_memory(image);
        Ok(())
    }

    /// Compare the flash memory against an image file
    ///
    /// Fails with [`Error::Mismatch`] describing the first differing byte.
    pub fn compare(&self, path: &Path) -> Result<()> {
        let expected = self.read_image(path)?;

        let Some(offset) = self
            .memory()
            .iter()
            .zip(expected.iter())
            .position(|(is, exp)| is != exp)
        else {
            return Ok(());
        };

        let actual = self.memory()[offset];
        let err = Error::Mismatch {
            offset: offset as u32,
            actual,
            expected: expected[offset],
        };

        if self.verbosity() > 0 {
            let start = offset.saturating_sub(16);
            let stop = (offset + 16).min(expected.len() - 1);
            log::error!("{}", err);
            let dump = |data| HexDump {
                data,
                start,
                stop,
                lead: "    ",
            };
            log::error!("IS dump\n{}", dump(self.memory()));
            log::error!("EXP dump\n{}", dump(expected.as_slice()));
        } else {
            log::debug!("{}", err);
        }

        Err(err)
    }

    fn read_image(&self, path: &Path) -> Result<Vec<u8>> {
        let format = self.image_format(path)?;
        self.note(format_args!("'.{}' file type used", format.extension()));

        let mut buf = erased_buffer(self.chip().total_size)?;
        let file = File::open(path).map_err(|e| self.io_failure(path, e))?;

        let skipped = match format {
            ImageFormat::Dif => dif::read_dif(BufReader::new(file), &mut buf),
        }
        .map_err(|e| self.io_failure(path, e))?;

        if skipped > 0 {
            log::debug!("{}: {} lines skipped", path.display(), skipped);
        }
        Ok(buf)
    }

    fn image_format(&self, path: &Path) -> Result<ImageFormat> {
        ImageFormat::from_path(path).ok_or_else(|| {
            self.reject(
                Error::FileIo,
                format_args!("Unsupported file type '{}'", path.display()),
            )
        })
    }

    fn io_failure(&self, path: &Path, err: io::Error) -> Error {
        log::error!("Failed to access file '{}': {}", path.display(), err);
        Error::FileIo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ERASED;
    use crate::spi::opcodes;
    use std::fs;
    use std::path::PathBuf;

    fn w25q16jv() -> FlashModel {
        FlashModel::new("W25Q16JV").unwrap()
    }

    fn program(flash: &mut FlashModel, addr: u32, data: &[u8]) {
        flash.dispatch(&mut [opcodes::WREN]).unwrap();
        let mut packet = std::vec![
            opcodes::PP,
            (addr >> 16) as u8,
            (addr >> 8) as u8,
            addr as u8
        ];
        packet.extend_from_slice(data);
        flash.dispatch(&mut packet).unwrap();
    }

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a.dif")), Some(ImageFormat::Dif));
        assert_eq!(ImageFormat::from_path(Path::new("a.DIF")), Some(ImageFormat::Dif));
        assert_eq!(ImageFormat::from_path(Path::new("a.bin")), None);
        assert_eq!(ImageFormat::from_path(Path::new("dif")), None);
        assert_eq!(ImageFormat::from_path(Path::new("dir.dif/file")), None);
    }

    #[test]
    fn test_store_erased_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "erased.dif");

        let mut flash = w25q16jv();
        flash.store(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        flash.load(&path).unwrap();
        assert!(flash.memory().iter().all(|&b| b == ERASED));
    }

    #[test]
    fn test_store_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "image.dif");

        let mut flash = w25q16jv();
        program(&mut flash, 0x1020, &[0x01, 0x23, 0x45, 0x67]);
        program(&mut flash, 0x1F_FF00, &[0x00; 256]);
        program(&mut flash, 0x8000, &[0xFF, 0xFE]);
        flash.store(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("001020: 01 23 45 67 ff"));
        assert_eq!(text.lines().count(), 1 + 1 + 16);

        let mut restored = w25q16jv();
        restored.load(&path).unwrap();
        assert_eq!(restored.memory(), flash.memory());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut flash = w25q16jv();

        for name in ["image.bin", "image"] {
            let path = temp_path(&dir, name);
            assert_eq!(flash.store(&path), Err(Error::FileIo));
            assert!(!path.exists());
            assert_eq!(flash.load(&path), Err(Error::FileIo));
            assert_eq!(flash.compare(&path), Err(Error::FileIo));
        }
    }

    #[test]
    fn test_load_missing_file_keeps_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut flash = w25q16jv();
        program(&mut flash, 0x10, &[0x42]);

        assert_eq!(flash.load(&temp_path(&dir, "missing.dif")), Err(Error::FileIo));
        assert_eq!(flash.memory()[0x10], 0x42);
    }

    #[test]
    fn test_store_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let flash = w25q16jv();
        let path = temp_path(&dir, "no/such/dir/image.dif");
        assert_eq!(flash.store(&path), Err(Error::FileIo));
    }

    #[test]
    fn test_load_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "partial.dif");
        fs::write(&path, "0100: 12 34\n1ffff8: 01 02 03 04 05 06 07 08 09\n").unwrap();

        let mut flash = w25q16jv();
        program(&mut flash, 0x2000, &[0x00]);
        flash.load(&path).unwrap();

        assert_eq!(flash.memory()[0x2000], ERASED);
        assert_eq!(&flash.memory()[0x100..0x102], &[0x12, 0x34]);
        assert_eq!(flash.memory()[0x102], ERASED);
        // The overflowing last line is dropped
        assert!(flash.memory()[0x1F_FFF8..].iter().all(|&b| b == ERASED));
    }

    #[test]
    fn test_load_ignores_non_text_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "latin1.dif");
        fs::write(&path, b"001020: 01 23 45 67\n# comment \xe9t\xe9\n002000: aa bb\n").unwrap();

        let mut flash = w25q16jv();
        assert_eq!(flash.load(&path), Ok(()));
        assert_eq!(&flash.memory()[0x1020..0x1024], &[0x01, 0x23, 0x45, 0x67]);
        assert_eq!(&flash.memory()[0x2000..0x2002], &[0xAA, 0xBB]);

        flash.compare(&path).unwrap();
    }

    #[test]
    fn test_compare() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "snapshot.dif");

        let mut flash = w25q16jv();
        flash.set_verbosity(1);
        program(&mut flash, 0x3000, &[0xA5; 32]);
        flash.store(&path).unwrap();
        flash.compare(&path).unwrap();

        flash.memory_mut()[0x3011] = 0x5A;
        flash.memory_mut()[0x3015] = 0x00;
        assert_eq!(
            flash.compare(&path),
            Err(Error::Mismatch {
                offset: 0x3011,
                actual: 0x5A,
                expected: 0xA5,
            })
        );
    }

    #[test]
    fn test_compare_at_image_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "edges.dif");

        let mut flash = w25q16jv();
        flash.store(&path).unwrap();
        flash.set_verbosity(1);

        flash.memory_mut()[0] = 0x00;
        assert!(matches!(
            flash.compare(&path),
            Err(Error::Mismatch { offset: 0, .. })
        ));

        flash.memory_mut()[0] = ERASED;
        flash.memory_mut()[0x1F_FFFF] = 0x00;
        assert!(matches!(
            flash.compare(&path),
            Err(Error::Mismatch { offset: 0x1F_FFFF, .. })
        ));
    }
}
