//! Compare two images through a flash model

use std::io::Write;
use std::path::Path;

use sfm_core::model::FlashModel;

use crate::error::Result;

/// Load `image` and compare the flash against `against`
pub fn run_compare<W: Write>(
    out: &mut W,
    model: &mut FlashModel,
    image: &Path,
    against: &Path,
) -> Result<()> {
    model.load(image)?;
    model.compare(against)?;
    writeln!(out, "{} matches {}", image.display(), against.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use sfm_core::Error;

    #[test]
    fn test_compare_images() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.dif");
        let b = dir.path().join("b.dif");
        let c = dir.path().join("c.dif");
        // Same content, different address padding and line splitting
        std::fs::write(&a, "001000: 00 11 22 33\n").unwrap();
        std::fs::write(&b, "1000: 00 11\n1002: 22 33\n").unwrap();
        std::fs::write(&c, "1000: 00 11 22 34\n").unwrap();

        let mut model = FlashModel::new("W25Q16JV").unwrap();
        let mut out = Vec::new();
        run_compare(&mut out, &mut model, &a, &b).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("matches"));

        let mut out = Vec::new();
        let err = run_compare(&mut out, &mut model, &a, &c).unwrap_err();
        assert!(matches!(
            err,
            CliError::Flash(Error::Mismatch {
                offset: 0x1003,
                actual: 0x33,
                expected: 0x34,
            })
        ));
    }
}
