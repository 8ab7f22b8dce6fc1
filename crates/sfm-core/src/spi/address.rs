//! Address field codec
//!
//! SPI flash addresses travel most significant byte first. The field width
//! is a property of the chip, not of the instruction.

/// Widest address field the model accepts (32-bit addressing)
pub const MAX_ADDRESS_BYTES: u8 = 4;

/// Decode a big-endian address field
///
/// Every byte of `field` is consumed; callers slice the packet to the
/// chip's address width before calling.
pub fn decode_address(field: &[u8]) -> u32 {
    field
        .iter()
        .fold(0u32, |addr, &byte| (addr << 8) | u32::from(byte))
}

/// Encode an address into `buf` using all of its bytes, big-endian
#[cfg(test)]
pub(crate) fn encode_address(address: u32, buf: &mut [u8]) {
    let width = buf.len();
    for (i, byte) in buf.iter_mut().enumerate() {
        let shift = (width - i - 1) * 8;
        *byte = if shift < 32 { (address >> shift) as u8 } else { 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_three_byte() {
        assert_eq!(decode_address(&[0x1F, 0xF0, 0x10]), 0x1FF010);
        assert_eq!(decode_address(&[0x00, 0x10, 0x20]), 0x1020);
    }

    #[test]
    fn test_decode_widths() {
        assert_eq!(decode_address(&[]), 0);
        assert_eq!(decode_address(&[0xAB]), 0xAB);
        assert_eq!(decode_address(&[0xDE, 0xAD, 0xBE, 0xEF]), 0xDEADBEEF);
    }

    #[test]
    fn test_encode() {
        let mut buf = [0u8; 3];
        encode_address(0x1FF010, &mut buf);
        assert_eq!(buf, [0x1F, 0xF0, 0x10]);

        let mut buf = [0u8; 4];
        encode_address(0x01020304, &mut buf);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(decode_address(&buf), 0x01020304);
    }
}
