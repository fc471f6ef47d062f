use bitflags::bitflags;

// Layout (bits 0-14):
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y][nt][coarse_y   ][coarse_x   ]
//  yyy     NN   YYYYY         XXXXX
bitflags! {
    /// Bit masks for the 15-bit VRAM address (`v`/`t` registers).
    pub(crate) struct VramAddrMask: u16 {
        const COARSE_X = 0x001F;
        const COARSE_Y = 0x03E0;
        const NAMETABLE = 0x0C00;
        const FINE_Y = 0x7000;
        const ALL = Self::COARSE_X.bits()
            | Self::COARSE_Y.bits()
            | Self::NAMETABLE.bits()
            | Self::FINE_Y.bits();
        /// Bits copied from `t` at dot 257.
        const HORIZONTAL = Self::COARSE_X.bits() | 0x0400;
        /// Bits copied from `t` during the pre-render line.
        const VERTICAL = Self::COARSE_Y.bits() | Self::FINE_Y.bits() | 0x0800;
    }
}

const COARSE_Y_SHIFT: u16 = 5;
const NAMETABLE_SHIFT: u16 = 10;
const FINE_Y_SHIFT: u16 = 12;

/// 15-bit VRAM address used by the PPU internal `v`/`t` registers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct VramAddr(u16);

impl VramAddr {
    pub const fn new(raw: u16) -> Self {
        Self(raw & VramAddrMask::ALL.bits())
    }

    #[inline]
    pub fn coarse_x(self) -> u8 {
        (self.0 & VramAddrMask::COARSE_X.bits()) as u8
    }

    #[inline]
    pub fn set_coarse_x(&mut self, cx: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_X.bits()) | u16::from(cx & 0b1_1111);
    }

    #[inline]
    pub fn coarse_y(self) -> u8 {
        ((self.0 & VramAddrMask::COARSE_Y.bits()) >> COARSE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_coarse_y(&mut self, cy: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_Y.bits())
            | (u16::from(cy & 0b1_1111) << COARSE_Y_SHIFT);
    }

    #[inline]
    pub fn nametable(self) -> u8 {
        ((self.0 & VramAddrMask::NAMETABLE.bits()) >> NAMETABLE_SHIFT) as u8
    }

    #[inline]
    pub fn set_nametable(&mut self, nt: u8) {
        self.0 =
            (self.0 & !VramAddrMask::NAMETABLE.bits()) | (u16::from(nt & 0b11) << NAMETABLE_SHIFT);
    }

    #[inline]
    pub fn fine_y(self) -> u8 {
        ((self.0 & VramAddrMask::FINE_Y.bits()) >> FINE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_fine_y(&mut self, fy: u8) {
        self.0 = (self.0 & !VramAddrMask::FINE_Y.bits()) | (u16::from(fy & 0b111) << FINE_Y_SHIFT);
    }

    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn set_raw(&mut self, v: u16) {
        self.0 = v & VramAddrMask::ALL.bits();
    }

    /// PPUDATA step. The internal register keeps all 15 bits.
    #[inline]
    pub fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & VramAddrMask::ALL.bits();
    }

    /// Address of the nametable byte for the current tile.
    pub fn tile_addr(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Address of the attribute byte covering the current tile.
    pub fn attribute_addr(self) -> u16 {
        0x23C0 | (self.0 & 0x0C00) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Coarse X increment; wrapping past 31 switches horizontal nametable.
    pub fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 ^= 0x041F;
        } else {
            self.0 += 1;
        }
    }

    /// Fine Y increment carrying into coarse Y.
    ///
    /// Row 29 is the last tile row, so it wraps to 0 and switches vertical
    /// nametable. Rows 30 and 31 hold attribute data; reaching 31 wraps to 0
    /// without switching.
    pub fn increment_y(&mut self) {
        let fine_y = self.fine_y();
        if fine_y < 7 {
            self.set_fine_y(fine_y + 1);
            return;
        }
        self.set_fine_y(0);
        match self.coarse_y() {
            29 => {
                self.set_coarse_y(0);
                self.0 ^= 0x0800;
            }
            31 => self.set_coarse_y(0),
            cy => self.set_coarse_y(cy + 1),
        }
    }

    pub fn copy_horizontal(&mut self, t: VramAddr) {
        let mask = VramAddrMask::HORIZONTAL.bits();
        self.0 = (self.0 & !mask) | (t.0 & mask);
    }

    pub fn copy_vertical(&mut self, t: VramAddr) {
        let mask = VramAddrMask::VERTICAL.bits();
        self.0 = (self.0 & !mask) | (t.0 & mask);
    }
}

impl core::fmt::Debug for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VramAddr")
            .field("raw", &format_args!("{:#06X}", self.0))
            .field("fine_y", &self.fine_y())
            .field("nametable", &self.nametable())
            .field("coarse_y", &self.coarse_y())
            .field("coarse_x", &self.coarse_x())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_x_wraps_and_flips_horizontal_nametable() {
        let mut v = VramAddr::new(0);
        v.set_coarse_x(31);
        v.set_nametable(0);
        v.increment_x();
        assert_eq!(v.coarse_x(), 0);
        assert_eq!(v.nametable(), 1);
        v.set_coarse_x(31);
        v.increment_x();
        assert_eq!(v.nametable(), 0);

        v.set_coarse_x(5);
        v.increment_x();
        assert_eq!(v.coarse_x(), 6);
    }

    #[test]
    fn coarse_y_29_wraps_with_flip_and_31_without() {
        let mut v = VramAddr::new(0);
        v.set_fine_y(7);
        v.set_coarse_y(29);
        v.increment_y();
        assert_eq!((v.fine_y(), v.coarse_y(), v.nametable()), (0, 0, 2));

        let mut v = VramAddr::new(0);
        v.set_fine_y(7);
        v.set_coarse_y(31);
        v.increment_y();
        assert_eq!((v.fine_y(), v.coarse_y(), v.nametable()), (0, 0, 0));

        let mut v = VramAddr::new(0);
        v.set_fine_y(3);
        v.set_coarse_y(10);
        v.increment_y();
        assert_eq!((v.fine_y(), v.coarse_y()), (4, 10));
    }

    #[test]
    fn copies_only_the_selected_axis() {
        let t = VramAddr::new(0x7FFF);
        let mut v = VramAddr::new(0);
        v.copy_horizontal(t);
        assert_eq!(v.raw(), 0x041F);
        let mut v = VramAddr::new(0);
        v.copy_vertical(t);
        assert_eq!(v.raw(), 0x7BE0);
    }

    #[test]
    fn attribute_address_covers_4x4_tile_blocks() {
        let mut v = VramAddr::new(0);
        v.set_nametable(3);
        v.set_coarse_x(31);
        v.set_coarse_y(29);
        assert_eq!(v.tile_addr(), 0x2FBF);
        assert_eq!(v.attribute_addr(), 0x2FFF);
        v.set_coarse_x(4);
        v.set_coarse_y(4);
        assert_eq!(v.attribute_addr(), 0x2FC9);
    }
}
