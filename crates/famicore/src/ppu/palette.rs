//! Palette RAM and the master color table.

use crate::memory::ppu as ppu_mem;

/// NES master palette as packed `0x00RRGGBB`.
#[rustfmt::skip]
pub const PALETTE: [u32; 64] = [
    0x7C7C7C, 0x0000FC, 0x0000BC, 0x4428BC, 0x940084, 0xA80020, 0xA81000, 0x881400,
    0x503000, 0x007800, 0x006800, 0x005800, 0x004058, 0x000000, 0x000000, 0x000000,
    0xBCBCBC, 0x0078F8, 0x0058F8, 0x6844FC, 0xD800CC, 0xE40058, 0xF83800, 0xE45C10,
    0xAC7C00, 0x00B800, 0x00A800, 0x00A844, 0x008888, 0x000000, 0x000000, 0x000000,
    0xF8F8F8, 0x3CBCFC, 0x6888FC, 0x9878F8, 0xF878F8, 0xF85898, 0xF87858, 0xFCA044,
    0xF8B800, 0xB8F818, 0x58D854, 0x58F898, 0x00E8D8, 0x787878, 0x000000, 0x000000,
    0xFCFCFC, 0xA4E4FC, 0xB8B8F8, 0xD8B8F8, 0xF8B8F8, 0xF8A4C0, 0xF0D0B0, 0xFCE0A8,
    0xF8D878, 0xD8F878, 0xB8F8B8, 0xB8F8D8, 0x00FCFC, 0xF8D8F8, 0x000000, 0x000000,];

/// Grayscale keeps only the column-0 entries of each brightness row.
const GRAYSCALE_MASK: u8 = 0x30;

/// 32 bytes of palette RAM at `$3F00-$3F1F`, mirrored up to `$3FFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteRam {
    bytes: [u8; ppu_mem::PALETTE_RAM_SIZE],
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self {
            bytes: [0; ppu_mem::PALETTE_RAM_SIZE],
        }
    }
}

impl PaletteRam {
    /// Entry 0 of every sprite palette aliases the matching background entry
    /// (`$3F10/$3F14/$3F18/$3F1C` -> `$3F00/$3F04/$3F08/$3F0C`).
    pub const fn index(addr: u16) -> usize {
        let addr = if addr & 0x03 == 0 { addr & !0x10 } else { addr };
        (addr & 0x1F) as usize
    }

    pub fn read(&self, addr: u16, grayscale: bool) -> u8 {
        let value = self.bytes[Self::index(addr)];
        if grayscale {
            value & GRAYSCALE_MASK
        } else {
            value
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[Self::index(addr)] = value;
    }

    pub fn clear(&mut self) {
        self.bytes = [0; ppu_mem::PALETTE_RAM_SIZE];
    }
}

/// Resolves a 6-bit palette value to RGB.
pub fn rgb(value: u8) -> u32 {
    PALETTE[(value & 0x3F) as usize]
}
