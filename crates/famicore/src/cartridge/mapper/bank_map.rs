//! Slot tables translating CPU/PPU addresses into PRG/CHR byte offsets.
//!
//! PRG space `$8000-$FFFF` is split into four 8 KiB slots and CHR space
//! `$0000-$1FFF` into eight 1 KiB slots. Each slot stores the offset of its
//! first byte in the backing storage, so a read is one table lookup plus the
//! offset inside the slot. Mappers reprogram the tables in whatever bank
//! granularity their board uses.

use tracing::debug;

use crate::{
    cartridge::header::Header,
    error::{Error, Result},
    memory::cpu as cpu_mem,
};

const PRG_SLOT_SIZE: usize = 0x2000;
const CHR_SLOT_SIZE: usize = 0x0400;
const CHR_RAM_SIZE: usize = 0x2000;

#[derive(Debug, Clone)]
pub struct BankMap {
    prg: Box<[u8]>,
    chr: Box<[u8]>,
    prg_ram: Box<[u8]>,
    chr_is_ram: bool,
    prg_map: [usize; 4],
    chr_map: [usize; 8],
}

/// Offset of page `page` (negative counts from the end) of `size` bytes,
/// plus `extra`, wrapped into `len`.
fn page_offset(len: usize, size: usize, page: i32, extra: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let page = if page < 0 {
        (len / size) as i64 + page as i64
    } else {
        page as i64
    };
    (page * size as i64 + extra as i64).rem_euclid(len as i64) as usize
}

impl BankMap {
    /// Takes ownership of the ROM sections. CHR RAM is allocated when the
    /// header reports no CHR ROM.
    pub fn new(header: &Header, prg: Box<[u8]>, chr: Box<[u8]>) -> Self {
        let chr_is_ram = header.chr_ram();
        let chr = if chr_is_ram {
            vec![0; CHR_RAM_SIZE].into_boxed_slice()
        } else {
            chr
        };
        Self {
            prg,
            chr,
            prg_ram: vec![0; header.prg_ram_size].into_boxed_slice(),
            chr_is_ram,
            prg_map: [0; 4],
            chr_map: [0; 8],
        }
    }

    /// Maps a `size_kb` PRG bank (8, 16 or 32) into the slot group `slot`.
    pub fn set_prg_map(&mut self, size_kb: usize, slot: usize, page: i32) {
        let pages = size_kb / 8;
        let size = size_kb * 1024;
        for i in 0..pages {
            let offset = page_offset(self.prg.len(), size, page, PRG_SLOT_SIZE * i);
            if let Some(entry) = self.prg_map.get_mut(pages * slot + i) {
                *entry = offset;
            }
        }
        debug!(size_kb, slot, page, "prg bank mapped");
    }

    /// Maps a `size_kb` CHR bank (1, 2, 4 or 8) into the slot group `slot`.
    pub fn set_chr_map(&mut self, size_kb: usize, slot: usize, page: i32) {
        let size = size_kb * 1024;
        for i in 0..size_kb {
            let offset = page_offset(self.chr.len(), size, page, CHR_SLOT_SIZE * i);
            if let Some(entry) = self.chr_map.get_mut(size_kb * slot + i) {
                *entry = offset;
            }
        }
        debug!(size_kb, slot, page, "chr bank mapped");
    }

    /// `$8000-$FFFF`.
    pub fn prg_read(&self, addr: u16) -> u8 {
        let rel = (addr - cpu_mem::PRG_ROM_START) as usize;
        let offset = self.prg_map[rel / PRG_SLOT_SIZE] + rel % PRG_SLOT_SIZE;
        self.prg.get(offset).copied().unwrap_or(0)
    }

    /// `$6000-$7FFF`, mirrored when the RAM is smaller than the window.
    pub fn prg_ram_read(&self, addr: u16) -> u8 {
        if self.prg_ram.is_empty() {
            return 0;
        }
        let idx = (addr - cpu_mem::PRG_RAM_START) as usize % self.prg_ram.len();
        self.prg_ram[idx]
    }

    pub fn prg_ram_write(&mut self, addr: u16, value: u8) {
        if self.prg_ram.is_empty() {
            return;
        }
        let idx = (addr - cpu_mem::PRG_RAM_START) as usize % self.prg_ram.len();
        self.prg_ram[idx] = value;
    }

    /// `$0000-$1FFF` on the PPU bus.
    pub fn chr_read(&self, addr: u16) -> u8 {
        let addr = (addr & 0x1FFF) as usize;
        let offset = self.chr_map[addr / CHR_SLOT_SIZE] + addr % CHR_SLOT_SIZE;
        self.chr.get(offset).copied().unwrap_or(0)
    }

    /// Stores into CHR RAM. Boards with CHR ROM reject the write.
    pub fn chr_write(&mut self, addr: u16, value: u8) -> Result<()> {
        if !self.chr_is_ram {
            return Err(Error::ReadOnlyWrite { addr, value });
        }
        self.chr_store(addr, value);
        Ok(())
    }

    /// Writes through the CHR map regardless of what backs it.
    pub fn chr_store(&mut self, addr: u16, value: u8) {
        let slot_addr = (addr & 0x1FFF) as usize;
        let offset = self.chr_map[slot_addr / CHR_SLOT_SIZE] + slot_addr % CHR_SLOT_SIZE;
        if let Some(byte) = self.chr.get_mut(offset) {
            *byte = value;
        }
    }

    /// Copies a 512-byte trainer to `$7000`.
    pub fn load_trainer(&mut self, trainer: &[u8]) {
        let start = 0x1000;
        if let Some(dst) = self.prg_ram.get_mut(start..start + trainer.len()) {
            dst.copy_from_slice(trainer);
        }
    }

    pub fn prg_len(&self) -> usize {
        self.prg.len()
    }

    pub fn chr_len(&self) -> usize {
        self.chr.len()
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    pub(crate) fn prg_slots(&self) -> [usize; 4] {
        self.prg_map
    }

    pub(crate) fn chr_slots(&self) -> [usize; 8] {
        self.chr_map
    }
}
