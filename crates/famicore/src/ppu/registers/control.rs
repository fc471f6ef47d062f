use bitflags::bitflags;

bitflags! {
    /// PPUCTRL (`$2000`), write-only.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V P H B S I N N
    /// ```
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Control: u8 {
        /// Base nametable (`$2000`, `$2400`, `$2800`, `$2C00`).
        const NAMETABLE = 0b0000_0011;
        /// VRAM address step after a PPUDATA access: 1 (across) or 32 (down).
        const INCREMENT_32 = 0b0000_0100;
        /// 8x8 sprite pattern table at `$1000`.
        const SPRITE_TABLE = 0b0000_1000;
        /// Background pattern table at `$1000`.
        const BACKGROUND_TABLE = 0b0001_0000;
        /// 8x16 sprites.
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        /// Raise NMI at the start of vertical blank.
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    pub fn nametable_index(self) -> u8 {
        self.bits() & 0b11
    }

    pub fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) { 32 } else { 1 }
    }

    pub fn sprite_pattern_table(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) { 0x1000 } else { 0x0000 }
    }

    pub fn background_pattern_table(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) { 0x1000 } else { 0x0000 }
    }

    pub fn sprite_height(self) -> i32 {
        if self.contains(Control::SPRITE_SIZE_16) { 16 } else { 8 }
    }

    pub fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}
