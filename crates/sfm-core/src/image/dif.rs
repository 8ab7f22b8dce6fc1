//! Differential (`.dif`) image format
//!
//! Only 16-byte lines that differ from the erased state are written:
//!
//! ```text
//! 001020: 01 23 45 67 ff ff ff ff ff ff ff ff ff ff ff ff
//! 1ff000: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
//! ```
//!
//! The address is padded to the width of the last flash address. When
//! reading, any address width is accepted and a line may carry fewer than
//! 16 values.

use std::io::{self, BufRead, Write};

use crate::hexdump::hex_digits;
use crate::model::ERASED;

/// Bytes per line
pub const LINE_LEN: usize = 16;

/// Values of one parsed line
pub type LineValues = heapless::Vec<u8, LINE_LEN>;

/// Write `data` in differential format
pub fn write_dif<W: Write>(mut out: W, data: &[u8]) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let width = hex_digits((data.len() - 1) as u32);
    let mut lines = 0usize;

    for (i, chunk) in data.chunks(LINE_LEN).enumerate() {
        if chunk.iter().all(|&b| b == ERASED) {
            continue;
        }

        write!(out, "{:0width$x}:", i * LINE_LEN, width = width)?;
        for byte in chunk {
            write!(out, " {:02x}", byte)?;
        }
        writeln!(out)?;
        lines += 1;
    }

    log::trace!("Wrote {} difference lines", lines);
    Ok(())
}

/// Read a differential image into `buf`
///
/// `buf` is erased first. Lines that do not parse, or that would reach past
/// the end of `buf`, are skipped. Returns the number of skipped lines.
pub fn read_dif<R: BufRead>(input: R, buf: &mut [u8]) -> io::Result<usize> {
    buf.fill(ERASED);
    let mut skipped = 0usize;

    for (lineno, line) in input.split(b'\n').enumerate() {
        let line = line?;
        // Undecodable bytes are content, not an I/O failure
        let Some(text) = core::str::from_utf8(&line).ok() else {
            log::trace!("line {}: not valid text, skipped", lineno + 1);
            skipped += 1;
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }

        let Some((addr, values)) = parse_line(text) else {
            log::trace!("line {}: unparsable, skipped", lineno + 1);
            skipped += 1;
            continue;
        };

        let start = addr as usize;
        if start as u64 + values.len() as u64 > buf.len() as u64 {
            log::trace!(
                "line {}: 0x{:x}+{} exceeds image size 0x{:x}, skipped",
                lineno + 1,
                addr,
                values.len(),
                buf.len()
            );
            skipped += 1;
            continue;
        }

        buf[start..start + values.len()].copy_from_slice(&values);
    }

    Ok(skipped)
}

/// Parse `<hexaddr>: hh hh ...` into the address and up to 16 values
pub fn parse_line(line: &str) -> Option<(u32, LineValues)> {
    let (addr, rest) = line.split_once(':')?;
    let addr = u32::from_str_radix(addr.trim(), 16).ok()?;

    let values = rest
        .split_whitespace()
        .take(LINE_LEN)
        .map(|token| u8::from_str_radix(token, 16))
        .collect::<Result<LineValues, _>>()
        .ok()?;
    Some((addr, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;
    use std::io::Cursor;
    use std::string::String;
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn test_write_erased_is_empty() {
        let mut out = Vec::new();
        write_dif(&mut out, &[ERASED; 256]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_lines() {
        let mut data = vec![ERASED; 0x20_0000];
        data[0x1020..0x1024].copy_from_slice(&[0x01, 0x23, 0x45, 0x67]);
        data[0x1F_FFFF] = 0x00;

        let mut out = Vec::new();
        write_dif(&mut out, &data).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "001020: 01 23 45 67 ff ff ff ff ff ff ff ff ff ff ff ff\n\
             1ffff0: ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff 00\n"
        );
    }

    #[test]
    fn test_parse_line() {
        let (addr, values) = parse_line("1020: 01 23 45 67").unwrap();
        assert_eq!(addr, 0x1020);
        assert_eq!(values.as_slice(), &[0x01, 0x23, 0x45, 0x67]);

        let (addr, values) = parse_line("  00ff10:\t00 ff\r").unwrap();
        assert_eq!(addr, 0xFF10);
        assert_eq!(values.as_slice(), &[0x00, 0xFF]);

        assert!(parse_line("no colon here").is_none());
        assert!(parse_line("xyz: 00").is_none());
        assert!(parse_line("10: 100").is_none());
    }

    #[test]
    fn test_parse_line_caps_values() {
        let line = format!("0:{}", " aa".repeat(20));
        let (_, values) = parse_line(&line).unwrap();
        assert_eq!(values.len(), LINE_LEN);
    }

    #[test]
    fn test_read_dif() {
        let text = "0010: 00 11 22\n\n0030: 33 44 55 66 77 88 99 aa bb cc dd ee ff 00 11 22\n";
        let mut buf = vec![0u8; 0x40];
        let skipped = read_dif(Cursor::new(text), &mut buf).unwrap();

        assert_eq!(skipped, 0);
        assert_eq!(buf[0x0F], ERASED);
        assert_eq!(&buf[0x10..0x13], &[0x00, 0x11, 0x22]);
        assert_eq!(buf[0x13], ERASED);
        assert_eq!(buf[0x30], 0x33);
        assert_eq!(buf[0x3F], 0x22);
    }

    #[test]
    fn test_read_dif_drops_overflowing_lines() {
        let text = "0038: 01 02 03 04 05 06 07 08\n0039: 01 02 03 04 05 06 07 08\nbroken\n";
        let mut buf = vec![0u8; 0x40];
        let skipped = read_dif(Cursor::new(text), &mut buf).unwrap();

        assert_eq!(skipped, 2);
        assert_eq!(&buf[0x38..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_read_dif_skips_undecodable_lines() {
        let mut text = Vec::new();
        text.extend_from_slice(b"0010: 01 23 45 67\n");
        text.extend_from_slice(b"# comment \xe9t\xe9\n");
        text.extend_from_slice(b"0020: aa \xff bb\n");
        text.extend_from_slice(b"0030: aa bb\r\n");

        let mut buf = vec![0u8; 0x40];
        let skipped = read_dif(Cursor::new(text), &mut buf).unwrap();

        assert_eq!(skipped, 2);
        assert_eq!(&buf[0x10..0x14], &[0x01, 0x23, 0x45, 0x67]);
        assert_eq!(buf[0x20], ERASED);
        assert_eq!(&buf[0x30..0x32], &[0xAA, 0xBB]);
    }

    #[test]
    fn test_write_then_read() {
        let mut data = vec![ERASED; 0x1000];
        for (i, b) in data[0x123..0x345].iter_mut().enumerate() {
            *b = (i * 7) as u8;
        }

        let mut out = Vec::new();
        write_dif(&mut out, &data).unwrap();

        let mut buf = vec![0u8; 0x1000];
        read_dif(Cursor::new(out), &mut buf).unwrap();
        assert_eq!(buf, data);
    }
}
