//! Hex dump formatting
//!
//! Rows hold 16 bytes with an extra gap between the two halves:
//!
//! ```text
//! 001020: 01 23 45 67 ff ff ff ff  ff ff ff ff ff ff ff ff
//! ```

use alloc::string::{String, ToString};
use core::fmt;

/// Bytes per dump row
pub const ROW_LEN: usize = 16;

/// Number of hex digits needed to print `value`
pub fn hex_digits(value: u32) -> usize {
    let bits = u32::BITS - value.leading_zeros();
    (bits as usize).div_ceil(4).max(1)
}

/// Format `data[start..=stop]` as a hex dump
///
/// `start` is rounded down and `stop` rounded up to a row boundary. Every
/// row begins with `lead`; the address is padded to the width of the last
/// address of `data`.
pub fn format(data: &[u8], start: usize, stop: usize, lead: &str) -> String {
    HexDump {
        data,
        start,
        stop,
        lead,
    }
    .to_string()
}

/// Lazily formatted hex dump of a byte range
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a> {
    /// Whole memory image, row addresses are offsets into it
    pub data: &'a [u8],
    /// First byte to show
    pub start: usize,
    /// Last byte to show (inclusive)
    pub stop: usize,
    /// Prefix of every row
    pub lead: &'a str,
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data;
        if data.is_empty() || self.start > self.stop {
            return Ok(());
        }

        let width = hex_digits((data.len() - 1) as u32);
        let first = self.start & !(ROW_LEN - 1);
        let end = (self.stop | (ROW_LEN - 1)).min(data.len() - 1);

        for row in (first..=end).step_by(ROW_LEN) {
            write!(f, "{}{:0width$x}:", self.lead, row, width = width)?;
            let row_end = (row + ROW_LEN).min(data.len());
            for (i, byte) in data[row..row_end].iter().enumerate() {
                if i == ROW_LEN / 2 {
                    f.write_str(" ")?;
                }
                write!(f, " {:02x}", byte)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_digits() {
        assert_eq!(hex_digits(0), 1);
        assert_eq!(hex_digits(0xF), 1);
        assert_eq!(hex_digits(0x10), 2);
        assert_eq!(hex_digits(0x1F_FFFF), 6);
        assert_eq!(hex_digits(0xFF_FFFF), 6);
        assert_eq!(hex_digits(u32::MAX), 8);
    }

    #[test]
    fn test_format_rows() {
        let data: [u8; 48] = core::array::from_fn(|i| i as u8);
        let dump = format(&data, 0x13, 0x14, "  ");
        assert_eq!(
            dump,
            "  10: 10 11 12 13 14 15 16 17  18 19 1a 1b 1c 1d 1e 1f\n"
        );

        let dump = format(&data, 0, 47, "");
        assert_eq!(dump.lines().count(), 3);
        assert!(dump.starts_with("00: 00 01"));
    }

    #[test]
    fn test_format_tail_row() {
        let data = [0xAAu8; 20];
        assert_eq!(
            format(&data, 16, 19, ""),
            "10: aa aa aa aa\n"
        );
    }

    #[test]
    fn test_format_empty() {
        assert!(format(&[], 0, 0, "").is_empty());
        assert!(format(&[0xFF; 16], 8, 4, "").is_empty());
    }
}
