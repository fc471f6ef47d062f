#![allow(dead_code)]

use anyhow::{Context, Result};
use famicore::{Nes, NesConfig, load_cartridge};

pub const PRG_BANK: usize = 0x4000;
/// CPU address of the program; the last PRG bank is fixed at `$C000` on
/// every supported board.
pub const PROGRAM_ORIGIN: u16 = 0xC000;
/// CPU address of the NMI handler.
pub const NMI_ORIGIN: u16 = 0xD000;

/// Builds an iNES image around a PRG image.
///
/// `chr_banks == 0` gives the board 8 KiB of CHR RAM.
pub fn ines(mapper: u8, prg: &[u8], chr_banks: u8, vertical: bool) -> Vec<u8> {
    let prg_banks = (prg.len() / PRG_BANK) as u8;
    let flags6 = (mapper << 4) | vertical as u8;
    let mut rom = vec![b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, mapper & 0xF0];
    rom.resize(16, 0);
    rom.extend_from_slice(prg);
    rom.resize(rom.len() + chr_banks as usize * 0x2000, 0);
    rom
}

/// `banks` 16 KiB banks, each starting with its own index byte, except the
/// last one which holds `program` at its start (`$C000`) and `nmi` at
/// `$D000`. All three vectors point into the last bank.
pub fn prg(banks: usize, program: &[u8], nmi: &[u8]) -> Vec<u8> {
    let mut prg = vec![0u8; banks * PRG_BANK];
    for (bank, chunk) in prg.chunks_exact_mut(PRG_BANK).enumerate() {
        chunk[0] = bank as u8;
    }
    let last = (banks - 1) * PRG_BANK;
    prg[last..last + program.len()].copy_from_slice(program);
    let nmi_at = last + (NMI_ORIGIN - PROGRAM_ORIGIN) as usize;
    prg[nmi_at..nmi_at + nmi.len()].copy_from_slice(nmi);

    let vectors = prg.len() - 6;
    for (i, addr) in [NMI_ORIGIN, PROGRAM_ORIGIN, PROGRAM_ORIGIN]
        .into_iter()
        .enumerate()
    {
        prg[vectors + 2 * i] = addr as u8;
        prg[vectors + 2 * i + 1] = (addr >> 8) as u8;
    }
    prg
}

/// A powered-on NROM-128 console running `program`.
pub fn nrom(program: &[u8]) -> Result<Nes> {
    boot(ines(0, &prg(1, program, &[0x40]), 0, false))
}

pub fn boot(rom: Vec<u8>) -> Result<Nes> {
    boot_with(rom, NesConfig::default())
}

pub fn boot_with(rom: Vec<u8>, config: NesConfig) -> Result<Nes> {
    let cartridge = load_cartridge(&rom).context("parsing test image")?;
    let mut nes = Nes::with_config(config);
    nes.insert_cartridge(cartridge).context("powering on")?;
    Ok(nes)
}
