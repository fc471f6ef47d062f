//! Mapper 0 (NROM).
//!
//! No bank switching: the CPU sees the PRG ROM directly and the PPU sees the
//! single 8 KiB CHR bank.
//!
//! # Memory Layout
//!
//! - **PRG ROM**: 16 KiB or 32 KiB at `$8000-$FFFF`.
//!   - **NROM-128 (16 KiB)**: mirrored at `$8000-$BFFF` and `$C000-$FFFF`.
//!   - **NROM-256 (32 KiB)**: occupies the full range.
//! - **PRG RAM**: `$6000-$7FFF`, sized by the header (8 KiB by default).
//! - **CHR**: 8 KiB of ROM (read-only) or RAM at `$0000-$1FFF`.
//!
//! # Reference
//! - [NROM on NESdev Wiki](https://www.nesdev.org/wiki/NROM)

use crate::cartridge::{
    header::Mirroring,
    mapper::{BankMap, Mapper},
};

#[derive(Debug, Clone)]
pub struct Mapper0 {
    banks: BankMap,
    /// Hardwired by the board.
    mirroring: Mirroring,
}

impl Mapper0 {
    pub fn new(banks: BankMap, mirroring: Mirroring) -> Self {
        Self { banks, mirroring }
    }
}

impl Mapper for Mapper0 {
    fn id(&self) -> u8 {
        0
    }

    fn banks(&self) -> &BankMap {
        &self.banks
    }

    fn banks_mut(&mut self) -> &mut BankMap {
        &mut self.banks
    }

    fn reset(&mut self) {
        self.banks.set_prg_map(16, 0, 0);
        self.banks.set_prg_map(16, 1, 1);
        self.banks.set_chr_map(8, 0, 0);
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
