//! Background fetch latches and pixel shift registers.
//!
//! Each 8-dot tile group fetches a nametable byte, an attribute byte and two
//! pattern planes into latches. At the start of the next group the latches
//! are moved into the low half of the 16-bit pattern shifters while the high
//! half is still shifting out the current tile.

/// 16-bit left-shifting register; the high byte is on screen, the low byte
/// holds the next tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Shift16(u16);

impl Shift16 {
    #[inline]
    fn reload(&mut self, byte: u8) {
        self.0 = (self.0 & 0xFF00) | byte as u16;
    }

    /// Bit `15 - fine_x`.
    #[inline]
    fn bit(self, fine_x: u8) -> u8 {
        ((self.0 >> (15 - (fine_x & 7))) & 1) as u8
    }

    #[inline]
    fn shift(&mut self) {
        self.0 <<= 1;
    }
}

/// 8-bit palette shifter fed by a one-bit latch, so the palette of the next
/// tile streams in behind the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Shift8 {
    bits: u8,
    latch: bool,
}

impl Shift8 {
    #[inline]
    fn bit(self, fine_x: u8) -> u8 {
        (self.bits >> (7 - (fine_x & 7))) & 1
    }

    #[inline]
    fn shift(&mut self) {
        self.bits = (self.bits << 1) | self.latch as u8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Background {
    /// PPU bus address for the fetch in progress.
    pub(crate) addr: u16,
    pub(crate) nametable: u8,
    /// Attribute bits for the fetched tile (already shifted to bits 0-1).
    pub(crate) attribute: u8,
    pub(crate) tile_lo: u8,
    pub(crate) tile_hi: u8,

    pattern: [Shift16; 2],
    palette: [Shift8; 2],
}

impl Background {
    /// Selects the 2-bit quadrant of an attribute byte for the tile at
    /// (`coarse_x`, `coarse_y`).
    pub fn store_attribute(&mut self, value: u8, coarse_x: u8, coarse_y: u8) {
        let mut value = value;
        if coarse_y & 2 != 0 {
            value >>= 4;
        }
        if coarse_x & 2 != 0 {
            value >>= 2;
        }
        self.attribute = value & 0b11;
    }

    /// Moves the fetched tile into the shifters.
    pub fn reload(&mut self) {
        self.pattern[0].reload(self.tile_lo);
        self.pattern[1].reload(self.tile_hi);
        self.palette[0].latch = self.attribute & 1 != 0;
        self.palette[1].latch = self.attribute & 2 != 0;
    }

    /// 4-bit palette index (`PPTT`) under fine X, `0` when transparent.
    pub fn pixel(&self, fine_x: u8) -> u8 {
        let color = (self.pattern[1].bit(fine_x) << 1) | self.pattern[0].bit(fine_x);
        if color == 0 {
            return 0;
        }
        let palette = (self.palette[1].bit(fine_x) << 1) | self.palette[0].bit(fine_x);
        (palette << 2) | color
    }

    pub fn shift(&mut self) {
        for reg in &mut self.pattern {
            reg.shift();
        }
        for reg in &mut self.palette {
            reg.shift();
        }
    }
}
