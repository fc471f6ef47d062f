//! Shared definitions for the NES memory map.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location and prevents magic numbers from sneaking into other modules. The
//! CPU-side decode table lives here too, so every device agrees on which
//! addresses it owns.

/// CPU memory map details.
pub mod cpu {
    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;

    /// Reset vector low byte address (`$FFFC`).
    pub const RESET_VECTOR: u16 = 0xFFFC;
    /// NMI vector low byte address (`$FFFA`).
    pub const NMI_VECTOR: u16 = 0xFFFA;
    /// IRQ/BRK vector low byte address (`$FFFE`).
    pub const IRQ_VECTOR: u16 = 0xFFFE;

    /// Last mirrored internal RAM address visible to the CPU (`$1FFF`).
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;
    /// Size of the CPU internal RAM block (2 KiB mirrored through `$1FFF`).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Mask applied to mirror CPU RAM accesses within `$0000-$1FFF`.
    pub const INTERNAL_RAM_MASK: u16 = (INTERNAL_RAM_SIZE as u16) - 1;

    /// First CPU address mapped to the PPU register mirror.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    /// Last CPU address mirrored to the PPU register set.
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    /// First CPU-visible APU register.
    pub const APU_REGISTER_BASE: u16 = 0x4000;
    /// Final APU channel register before the DMA port.
    pub const APU_REGISTER_END: u16 = 0x4013;
    /// Sprite DMA trigger (`$4014`), write only.
    pub const OAM_DMA: u16 = 0x4014;
    /// APU status register (`$4015`).
    pub const APU_STATUS: u16 = 0x4015;
    /// Controller port 1 strobe/read address (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 read address and APU frame counter write (`$4017`).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// PRG RAM window start address (`$6000`).
    pub const PRG_RAM_START: u16 = 0x6000;
    /// PRG RAM window end address (inclusive).
    pub const PRG_RAM_END: u16 = 0x7FFF;
    /// PRG ROM window start address (`$8000`).
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Final CPU-visible address (`$FFFF`).
    pub const CPU_ADDR_END: u16 = 0xFFFF;
}

/// PPU register layout and VRAM mirror rules.
pub mod ppu {
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Size of the console's nametable RAM (CIRAM).
    pub const CIRAM_SIZE: usize = 0x0800;

    /// Mask that keeps PPU addresses inside the 14-bit bus.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Last pattern table address (`$1FFF`).
    pub const PATTERN_TABLE_END: u16 = 0x1FFF;
    /// Base address of nametable 0.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Attribute table of nametable 0.
    pub const ATTRIBUTE_BASE: u16 = 0x23C0;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count.
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// Primary Object Attribute Memory (OAM) byte count.
    pub const OAM_RAM_SIZE: usize = 0x100;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Raw address backing the register.
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}

/// Device category a CPU address decodes to.
///
/// Read and write decoding differ: the DMA port exists only for writes, and
/// `$4017` is the second controller on reads but the APU frame counter on
/// writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuMap {
    Ram,
    Ppu,
    Apu,
    OamDma,
    /// Shared strobe port, write side of `$4016`.
    Controller,
    Controller1,
    Controller2,
    Cartridge,
    Unknown,
}

/// Classifies a CPU read address.
pub const fn cpu_read_map(addr: u16) -> CpuMap {
    use cpu::*;

    match addr {
        0x0000..=INTERNAL_RAM_MIRROR_END => CpuMap::Ram,
        PPU_REGISTER_BASE..=PPU_REGISTER_END => CpuMap::Ppu,
        APU_REGISTER_BASE..=APU_REGISTER_END | APU_STATUS => CpuMap::Apu,
        CONTROLLER_PORT_1 => CpuMap::Controller1,
        CONTROLLER_PORT_2 => CpuMap::Controller2,
        PRG_RAM_START..=CPU_ADDR_END => CpuMap::Cartridge,
        _ => CpuMap::Unknown,
    }
}

/// Classifies a CPU write address.
pub const fn cpu_write_map(addr: u16) -> CpuMap {
    use cpu::*;

    match addr {
        0x0000..=INTERNAL_RAM_MIRROR_END => CpuMap::Ram,
        PPU_REGISTER_BASE..=PPU_REGISTER_END => CpuMap::Ppu,
        APU_REGISTER_BASE..=APU_REGISTER_END | APU_STATUS | CONTROLLER_PORT_2 => CpuMap::Apu,
        OAM_DMA => CpuMap::OamDma,
        CONTROLLER_PORT_1 => CpuMap::Controller,
        PRG_RAM_START..=CPU_ADDR_END => CpuMap::Cartridge,
        _ => CpuMap::Unknown,
    }
}
