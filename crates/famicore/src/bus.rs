use std::fmt::Debug;

use crate::{error::Result, memory};

pub mod cpu;
#[cfg(test)]
pub(crate) mod mock;

pub use cpu::CpuBus;

/// Expose the CPU stack page start address for stack helpers.
pub(crate) const STACK_ADDR: u16 = memory::cpu::STACK_PAGE_START;

/// The CPU's view of the rest of the console.
///
/// `read` and `write` perform the access only; the CPU calls [`Bus::tick`]
/// before each one so that every bus cycle advances the PPU by exactly three
/// dots before the device sees the access.
pub trait Bus: Debug {
    /// One CPU cycle: three PPU dots and one unit of the frame budget.
    fn tick(&mut self);

    fn read(&mut self, addr: u16) -> Result<u8>;

    fn write(&mut self, addr: u16, value: u8) -> Result<()>;

    /// Side-effect-free read for tracing. Registers with read side effects
    /// report `0`.
    fn peek(&self, addr: u16) -> u8 {
        let _ = addr;
        0
    }

    /// Returns a pending OAM DMA page value (written via `$4014`), if any.
    fn take_oam_dma_request(&mut self) -> Option<u8> {
        None
    }

    /// Samples and clears the NMI flip-flop.
    fn take_nmi(&mut self) -> bool {
        false
    }

    /// Level of the shared IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Cycles left in the current frame budget. May be negative.
    fn remaining_cycles(&self) -> i32;

    /// Grants another frame's worth of cycles.
    fn add_cycles(&mut self, cycles: i32);

    /// Total CPU cycles since power-on.
    fn cycles(&self) -> u64;
}

/// Running cycle budget shared by the CPU loop and the APU's elapsed counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CycleBudget {
    remaining: i32,
    frame_total: i32,
    cycles: u64,
}

impl CycleBudget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a frame budget on top of whatever the last frame left over.
    pub fn grant(&mut self, cycles: i32) {
        self.remaining += cycles;
        self.frame_total = cycles;
    }

    pub fn consume(&mut self) {
        self.remaining -= 1;
        self.cycles += 1;
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles spent since the current frame's budget was granted.
    pub fn elapsed(&self) -> i32 {
        self.frame_total - self.remaining
    }

    /// Power-on state: no budget and a zero cycle counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
