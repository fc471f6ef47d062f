//! Mapper 1 (MMC1 / SxROM).
//!
//! The board is programmed one bit at a time: five writes to `$8000-$FFFF`
//! shift bit 0 of each value into a 5-bit register, and the fifth write
//! commits it to the internal register picked by address bits 13-14. A write
//! with bit 7 set aborts the sequence and forces PRG mode 3.
//!
//! | Address       | Register                                     |
//! |---------------|----------------------------------------------|
//! | `$8000-$9FFF` | Control: `CPPMM` (CHR mode, PRG mode, mirroring) |
//! | `$A000-$BFFF` | CHR bank 0 (4 KiB, or 8 KiB with low bit ignored) |
//! | `$C000-$DFFF` | CHR bank 1 (4 KiB mode only)                 |
//! | `$E000-$FFFF` | PRG bank (16 KiB, or 32 KiB with low bit ignored) |
//!
//! # Reference
//! - [MMC1 on NESdev Wiki](https://www.nesdev.org/wiki/MMC1)

use tracing::debug;

use crate::{
    cartridge::{
        header::Mirroring,
        mapper::{BankMap, Mapper},
    },
    error::Result,
    memory::cpu as cpu_mem,
};

/// Shift register reset value; the marker bit reaches bit 0 after the fifth write.
const SHIFT_RESET: u8 = 0x10;

#[derive(Debug, Clone)]
pub struct Mapper1 {
    banks: BankMap,

    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,

    shift_reg: u8,
    shift_count: u8,
}

impl Mapper1 {
    pub fn new(banks: BankMap) -> Self {
        Self {
            banks,
            control: 0x0C,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
            shift_reg: SHIFT_RESET,
            shift_count: 0,
        }
    }

    /// Re-derives every slot from the register file.
    fn apply(&mut self) {
        let bank = (self.prg_bank & 0x0F) as i32;
        match (self.control >> 2) & 0b11 {
            // 32 KiB mode, low bit of the bank ignored.
            0 | 1 => self.banks.set_prg_map(32, 0, bank >> 1),
            // First bank fixed at $8000, switchable at $C000.
            2 => {
                self.banks.set_prg_map(16, 0, 0);
                self.banks.set_prg_map(16, 1, bank);
            }
            // Switchable at $8000, last bank fixed at $C000.
            _ => {
                self.banks.set_prg_map(16, 0, bank);
                self.banks.set_prg_map(16, 1, -1);
            }
        }

        if self.control & 0x10 == 0 {
            self.banks.set_chr_map(8, 0, (self.chr_bank0 >> 1) as i32);
        } else {
            self.banks.set_chr_map(4, 0, self.chr_bank0 as i32);
            self.banks.set_chr_map(4, 1, self.chr_bank1 as i32);
        }
    }

    fn write_register(&mut self, addr: u16, value: u8) -> Option<Mirroring> {
        if value & 0x80 != 0 {
            self.shift_reg = SHIFT_RESET;
            self.shift_count = 0;
            self.control |= 0x0C;
            self.apply();
            return None;
        }

        self.shift_reg = (self.shift_reg >> 1) | ((value & 1) << 4);
        self.shift_count += 1;
        if self.shift_count < 5 {
            return None;
        }

        let data = self.shift_reg & 0x1F;
        self.shift_reg = SHIFT_RESET;
        self.shift_count = 0;

        let before = self.mirroring();
        match (addr >> 13) & 0b11 {
            0 => self.control = data,
            1 => self.chr_bank0 = data,
            2 => self.chr_bank1 = data,
            _ => self.prg_bank = data,
        }
        self.apply();

        let after = self.mirroring();
        (after != before).then(|| {
            debug!(?after, "mmc1 mirroring changed");
            after
        })
    }
}

impl Mapper for Mapper1 {
    fn id(&self) -> u8 {
        1
    }

    fn banks(&self) -> &BankMap {
        &self.banks
    }

    fn banks_mut(&mut self) -> &mut BankMap {
        &mut self.banks
    }

    fn reset(&mut self) {
        self.control = 0x0C;
        self.chr_bank0 = 0;
        self.chr_bank1 = 0;
        self.prg_bank = 0;
        self.shift_reg = SHIFT_RESET;
        self.shift_count = 0;
        self.apply();
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0b11 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn prg_write(&mut self, addr: u16, value: u8) -> Result<Option<Mirroring>> {
        if addr < cpu_mem::PRG_ROM_START {
            self.banks.prg_ram_write(addr, value);
            return Ok(None);
        }
        Ok(self.write_register(addr, value))
    }
}
