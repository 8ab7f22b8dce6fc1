//! CLI command implementations
//!
//! Each command opens a [`FlashModel`](sfm_core::model::FlashModel) for the
//! selected chip, applies the requested images and writes its report to the
//! given output so it can be captured in tests.

mod compare;
mod dump;
mod exec;
mod list;

pub use compare::run_compare;
pub use dump::run_dump;
pub use exec::run_exec;
pub use list::{list_chips, print_chip_info};

use crate::error::{CliError, Result};
use sfm_core::chip::ChipDatabase;
use sfm_core::model::FlashModel;

/// Open a flash model for `name`, with diagnostics at `verbosity`
pub fn open_model(db: &ChipDatabase, name: &str, verbosity: u8) -> Result<FlashModel> {
    let mut model = FlashModel::from_database(db, name).map_err(|e| match e {
        sfm_core::Error::Selection if db.find_by_name(name).is_none() => {
            CliError::UnknownChip(name.to_string())
        }
        other => CliError::Flash(other),
    })?;
    model.set_verbosity(verbosity);
    Ok(model)
}

/// Format bytes as space separated hex
pub fn hex_bytes(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 3);
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(&format!("{:02x}", b));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_bytes() {
        assert_eq!(hex_bytes(&[]), "");
        assert_eq!(hex_bytes(&[0x00, 0xEF, 0x14]), "00 ef 14");
    }

    #[test]
    fn test_open_model() {
        let db = ChipDatabase::with_builtin();
        let model = open_model(&db, "w25q16jv", 2).unwrap();
        assert_eq!(model.verbosity(), 2);

        assert!(matches!(
            open_model(&db, "nonexistent", 0),
            Err(CliError::UnknownChip(name)) if name == "nonexistent"
        ));
    }
}
