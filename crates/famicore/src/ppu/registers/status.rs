use bitflags::bitflags;

bitflags! {
    /// PPUSTATUS (`$2002`), read-only.
    ///
    /// Only the top three bits are driven; the rest read back as whatever was
    /// last written to any PPU port.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// More than eight sprites on a scanline.
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Cleared by reading `$2002` and at the pre-render line.
        const VERTICAL_BLANK = 0b1000_0000;
    }
}
