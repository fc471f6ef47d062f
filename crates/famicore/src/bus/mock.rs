use crate::{
    bus::{Bus, CycleBudget},
    error::Result,
};

/// Flat 64 KiB memory with cycle counting, for exercising the CPU alone.
#[derive(Debug)]
pub(crate) struct MockBus {
    pub(crate) mem: Box<[u8; 0x10000]>,
    pub(crate) budget: CycleBudget,
    pub(crate) nmi: bool,
    pub(crate) irq: bool,
    pub(crate) dma_request: Option<u8>,
    pub(crate) writes: Vec<(u16, u8)>,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            mem: Box::new([0; 0x10000]),
            budget: CycleBudget::new(),
            nmi: false,
            irq: false,
            dma_request: None,
            writes: Vec::new(),
        }
    }
}

impl MockBus {
    /// Places `program` at `origin` and points the reset vector at it.
    pub(crate) fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut bus = Self::default();
        bus.load(origin, program);
        bus.mem[0xFFFC] = origin as u8;
        bus.mem[0xFFFD] = (origin >> 8) as u8;
        bus
    }

    pub(crate) fn load(&mut self, origin: u16, bytes: &[u8]) {
        let start = origin as usize;
        self.mem[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl Bus for MockBus {
    fn tick(&mut self) {
        self.budget.consume();
    }

    fn read(&mut self, addr: u16) -> Result<u8> {
        Ok(self.mem[addr as usize])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<()> {
        self.writes.push((addr, value));
        if addr == 0x4014 {
            self.dma_request = Some(value);
        }
        self.mem[addr as usize] = value;
        Ok(())
    }

    fn peek(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn take_oam_dma_request(&mut self) -> Option<u8> {
        self.dma_request.take()
    }

    fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    fn irq_pending(&self) -> bool {
        self.irq
    }

    fn remaining_cycles(&self) -> i32 {
        self.budget.remaining()
    }

    fn add_cycles(&mut self, cycles: i32) {
        self.budget.grant(cycles);
    }

    fn cycles(&self) -> u64 {
        self.budget.cycles()
    }
}
