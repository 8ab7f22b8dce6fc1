//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a SPI packet given as hex bytes ("90 00 00 00 00 00" or "900000000000")
pub fn parse_packet(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != ':')
        .collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);

    if digits.len() % 2 != 0 {
        return Err(format!("Odd number of hex digits in packet '{}'", s));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("Invalid hex byte in packet '{}'", s))
        })
        .collect()
}

#[derive(Parser)]
#[command(name = "sfm")]
#[command(author, version, about = "SPI NOR flash model", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to chip database directory or file (.ron)
    /// Defaults to looking in ./chips/vendors/ and /usr/share/sfm/chips/
    #[arg(long, global = true)]
    pub chip_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Image files applied around a command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ImageArgs {
    /// Load the flash memory from this image (.dif) before running
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Store the flash memory to this image (.dif) afterwards
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Compare the flash memory against this image (.dif) afterwards
    #[arg(long)]
    pub compare: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute SPI transactions against a flash model
    Exec {
        /// Chip to emulate
        #[arg(short, long)]
        chip: String,

        /// Packets as hex bytes, executed in order (e.g., "06" "02 00 10 20 01 23")
        #[arg(value_parser = parse_packet)]
        packets: Vec<Vec<u8>>,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Hex dump the flash memory
    Dump {
        /// Chip to emulate
        #[arg(short, long)]
        chip: String,

        /// Image (.dif) to load before dumping
        #[arg(short, long)]
        load: Option<PathBuf>,

        /// First address to dump (hex, e.g., 0x1000)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Last address to dump (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        stop: Option<u32>,
    },

    /// Compare two images as seen by a chip
    Compare {
        /// Chip to emulate
        #[arg(short, long)]
        chip: String,

        /// Image loaded into the flash model
        #[arg(short, long)]
        load: PathBuf,

        /// Image the flash model is compared against
        #[arg(short, long)]
        against: PathBuf,
    },

    /// Show chip information
    Info {
        /// Chip name
        #[arg(short, long)]
        chip: String,
    },

    /// List supported chips
    ListChips,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_packet() {
        assert_eq!(parse_packet("90 00 00 00 00 00").unwrap(), vec![0x90, 0, 0, 0, 0, 0]);
        assert_eq!(parse_packet("0x0200102001").unwrap(), vec![0x02, 0x00, 0x10, 0x20, 0x01]);
        assert_eq!(parse_packet("ef:14").unwrap(), vec![0xEF, 0x14]);
        assert_eq!(parse_packet("").unwrap(), Vec::<u8>::new());
        assert!(parse_packet("123").is_err());
        assert!(parse_packet("zz").is_err());
    }

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_u32("4096").unwrap(), 4096);
        assert!(parse_hex_u32("0xZZ").is_err());
    }
}
