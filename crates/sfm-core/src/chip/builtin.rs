//! Built-in chip table

use super::FlashDescriptor;

/// Chips known without loading a database
///
/// All Winbond W25QxxJV parts share the instruction set and the 4 KiB
/// sector / 256 byte page topology; they differ in size and device ID.
pub static BUILTIN_CHIPS: &[FlashDescriptor] = &[
    FlashDescriptor::jedec("W25Q16JV", "ef14", 2 * 1024 * 1024, 4096, 256),
    FlashDescriptor::jedec("W25Q32JV", "ef15", 4 * 1024 * 1024, 4096, 256),
    FlashDescriptor::jedec("W25Q64JV", "ef16", 8 * 1024 * 1024, 4096, 256),
    FlashDescriptor::jedec("W25Q128JV", "ef17", 16 * 1024 * 1024, 4096, 256),
];

/// Find a built-in chip by name (case-insensitive exact match)
pub fn find_builtin(name: &str) -> Option<&'static FlashDescriptor> {
    BUILTIN_CHIPS.iter().find(|c| c.matches_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_chips_valid() {
        for chip in BUILTIN_CHIPS {
            assert_eq!(chip.validate(), Ok(()), "{}", chip.name);
        }
    }

    #[test]
    fn test_find_builtin() {
        let chip = find_builtin("w25q16jv").unwrap();
        assert_eq!(chip.name, "W25Q16JV");
        assert_eq!(chip.total_size, 0x20_0000);
        assert!(find_builtin("W25Q16").is_none());
        assert!(find_builtin("").is_none());
    }
}
