//! Mapper 2 (UxROM).
//!
//! `$8000-$BFFF` is a switchable 16 KiB window selected by any write to ROM
//! space; `$C000-$FFFF` is fixed to the last bank. CHR is 8 KiB of RAM,
//! writable even when the image ships CHR data.
//!
//! # Reference
//! - [UxROM on NESdev Wiki](https://www.nesdev.org/wiki/UxROM)

use crate::{
    cartridge::{
        header::Mirroring,
        mapper::{BankMap, Mapper},
    },
    error::Result,
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper2 {
    banks: BankMap,
    mirroring: Mirroring,
}

impl Mapper2 {
    pub fn new(banks: BankMap, mirroring: Mirroring) -> Self {
        Self { banks, mirroring }
    }
}

impl Mapper for Mapper2 {
    fn id(&self) -> u8 {
        2
    }

    fn banks(&self) -> &BankMap {
        &self.banks
    }

    fn banks_mut(&mut self) -> &mut BankMap {
        &mut self.banks
    }

    fn reset(&mut self) {
        self.banks.set_prg_map(16, 0, 0);
        self.banks.set_prg_map(16, 1, -1);
        self.banks.set_chr_map(8, 0, 0);
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn prg_write(&mut self, addr: u16, value: u8) -> Result<Option<Mirroring>> {
        if addr >= cpu_mem::PRG_ROM_START {
            self.banks.set_prg_map(16, 0, value as i32);
        } else {
            self.banks.prg_ram_write(addr, value);
        }
        Ok(None)
    }

    fn chr_write(&mut self, addr: u16, value: u8) -> Result<()> {
        self.banks.chr_store(addr, value);
        Ok(())
    }
}
