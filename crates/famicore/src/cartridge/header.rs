//! iNES header parsing.
//!
//! The first 16 bytes of every `.nes` image describe how much PRG/CHR data
//! follows, which mapper board the cartridge uses, and how the nametables are
//! mirrored:
//!
//! ```text
//! 0-3  "NES" 0x1A
//! 4    PRG ROM size in 16 KiB units
//! 5    CHR ROM size in 8 KiB units (0 = 8 KiB of CHR RAM)
//! 6    NNNN FTBM   mapper low nibble, four-screen, trainer, battery, mirroring
//! 7    NNNN xxxx   mapper high nibble
//! 8    PRG RAM size in 8 KiB units (0 = one unit)
//! ```

use bitflags::bitflags;

use crate::error::{Error, Result};

const NES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed iNES header in bytes.
pub const NES_HEADER_LEN: usize = 16;
/// Optional block between the header and PRG data when [`Flags6::TRAINER`] is set.
pub const TRAINER_LEN: usize = 512;

pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;
pub const PRG_RAM_UNIT: usize = 8 * 1024;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        const MIRRORING        = 0b0000_0001;
        const BATTERY          = 0b0000_0010;
        const TRAINER          = 0b0000_0100;
        const FOUR_SCREEN      = 0b0000_1000;
        const MAPPER_LOW_MASK  = 0b1111_0000;
    }
}

/// How the four logical nametables fold onto the 2 KiB of CIRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// `$2000 = $2400`, `$2800 = $2C00` (vertical arrangement, horizontal scrolling games).
    Horizontal,
    /// `$2000 = $2800`, `$2400 = $2C00`.
    Vertical,
    /// All four map to the first kilobyte.
    SingleScreenLower,
    /// All four map to the second kilobyte.
    SingleScreenUpper,
}

impl Mirroring {
    /// Folds a nametable address (`$2000-$3EFF`) into a CIRAM offset (`0..0x800`).
    pub const fn ciram_offset(self, addr: u16) -> usize {
        let offset = match self {
            Mirroring::Vertical => addr & 0x07FF,
            Mirroring::Horizontal => ((addr >> 1) & 0x0400) | (addr & 0x03FF),
            Mirroring::SingleScreenLower => addr & 0x03FF,
            Mirroring::SingleScreenUpper => 0x0400 | (addr & 0x03FF),
        };
        offset as usize
    }
}

/// Parsed cartridge description. Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub mapper: u8,
    /// PRG ROM size in 16 KiB banks.
    pub prg_banks: u8,
    /// CHR ROM size in 8 KiB banks; `0` means the board carries CHR RAM.
    pub chr_banks: u8,
    pub mirroring: Mirroring,
    pub prg_ram_size: usize,
    pub has_trainer: bool,
    pub battery: bool,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some(raw) = bytes.get(..NES_HEADER_LEN) else {
            return Err(Error::TooShort {
                actual: bytes.len(),
            });
        };
        if &raw[..4] != NES_MAGIC {
            return Err(Error::InvalidMagic);
        }

        let flags6 = Flags6::from_bits_retain(raw[6]);
        let mapper = (raw[7] & 0xF0) | (raw[6] >> 4);
        let mirroring = if flags6.contains(Flags6::MIRRORING) {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let prg_ram_units = if raw[8] == 0 { 1 } else { raw[8] as usize };

        Ok(Self {
            mapper,
            prg_banks: raw[4],
            chr_banks: raw[5],
            mirroring,
            prg_ram_size: prg_ram_units * PRG_RAM_UNIT,
            has_trainer: flags6.contains(Flags6::TRAINER),
            battery: flags6.contains(Flags6::BATTERY),
        })
    }

    pub fn prg_rom_size(&self) -> usize {
        self.prg_banks as usize * PRG_BANK_SIZE
    }

    pub fn chr_rom_size(&self) -> usize {
        self.chr_banks as usize * CHR_BANK_SIZE
    }

    pub fn chr_ram(&self) -> bool {
        self.chr_banks == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(bytes4_8: [u8; 5]) -> [u8; NES_HEADER_LEN] {
        let mut raw = [0u8; NES_HEADER_LEN];
        raw[..4].copy_from_slice(NES_MAGIC);
        raw[4..9].copy_from_slice(&bytes4_8);
        raw
    }

    #[test]
    fn parses_sizes_mapper_and_mirroring() {
        let parsed = Header::parse(&header([2, 1, 0x11, 0x00, 0])).expect("valid header");
        assert_eq!(parsed.prg_banks, 2);
        assert_eq!(parsed.chr_banks, 1);
        assert_eq!(parsed.mapper, 1);
        assert_eq!(parsed.mirroring, Mirroring::Vertical);
        assert_eq!(parsed.prg_ram_size, 8 * 1024, "zero means one unit");
        assert!(!parsed.chr_ram());
    }

    #[test]
    fn mapper_number_combines_both_nibbles() {
        let parsed = Header::parse(&header([1, 0, 0x20, 0x40, 2])).expect("valid header");
        assert_eq!(parsed.mapper, 0x42);
        assert_eq!(parsed.mirroring, Mirroring::Horizontal);
        assert_eq!(parsed.prg_ram_size, 16 * 1024);
        assert!(parsed.chr_ram());
    }

    #[test]
    fn rejects_short_and_unmarked_images() {
        assert!(matches!(
            Header::parse(&[0x4E, 0x45]),
            Err(Error::TooShort { actual: 2 })
        ));
        let mut raw = header([1, 1, 0, 0, 0]);
        raw[3] = 0;
        assert!(matches!(Header::parse(&raw), Err(Error::InvalidMagic)));
    }

    #[test]
    fn horizontal_mirroring_pairs_top_and_bottom() {
        let m = Mirroring::Horizontal;
        assert_eq!(m.ciram_offset(0x2000), m.ciram_offset(0x2400));
        assert_eq!(m.ciram_offset(0x2800), m.ciram_offset(0x2C00));
        assert_ne!(m.ciram_offset(0x2000), m.ciram_offset(0x2800));
        assert_eq!(m.ciram_offset(0x2C05), 0x405);

        let v = Mirroring::Vertical;
        assert_eq!(v.ciram_offset(0x2000), v.ciram_offset(0x2800));
        assert_eq!(v.ciram_offset(0x2400), 0x400);
    }
}
