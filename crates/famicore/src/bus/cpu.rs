use core::fmt;

use tracing::error;

use crate::{
    apu::Apu,
    bus::{Bus, CycleBudget},
    cartridge::Cartridge,
    controller::Controller,
    error::{Error, Result},
    host::{FrameSink, Input},
    interrupt::NmiLine,
    memory::{CpuMap, cpu as cpu_mem, cpu_read_map, cpu_write_map},
    ppu::{Ppu, PpuBus},
};

/// PPU dots per CPU cycle on NTSC.
const PPU_DOTS_PER_CPU_CYCLE: usize = 3;

/// CPU-visible bus that bridges the core to RAM, the PPU, the APU, the
/// controller ports and the cartridge. It borrows the hardware from the
/// owning [`Nes`](crate::Nes) for the duration of one frame or instruction.
pub struct CpuBus<'a> {
    ram: &'a mut [u8; cpu_mem::INTERNAL_RAM_SIZE],
    ppu: &'a mut Ppu,
    apu: &'a mut Apu,
    controller: &'a mut Controller,
    cartridge: Option<&'a mut Cartridge>,
    budget: &'a mut CycleBudget,
    nmi: &'a mut NmiLine,
    oam_dma_request: &'a mut Option<u8>,
    sink: &'a mut dyn FrameSink,
    input: &'a dyn Input,
}

impl fmt::Debug for CpuBus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuBus")
            .field("ppu", &self.ppu)
            .field("cartridge", &self.cartridge.is_some())
            .field("budget", &self.budget)
            .field("nmi", &self.nmi)
            .field("oam_dma_request", &self.oam_dma_request)
            .finish_non_exhaustive()
    }
}

impl<'a> CpuBus<'a> {
    /// Creates a new bus by borrowing the attached hardware.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ram: &'a mut [u8; cpu_mem::INTERNAL_RAM_SIZE],
        ppu: &'a mut Ppu,
        apu: &'a mut Apu,
        controller: &'a mut Controller,
        cartridge: Option<&'a mut Cartridge>,
        budget: &'a mut CycleBudget,
        nmi: &'a mut NmiLine,
        oam_dma_request: &'a mut Option<u8>,
        sink: &'a mut dyn FrameSink,
        input: &'a dyn Input,
    ) -> Self {
        Self {
            ram,
            ppu,
            apu,
            controller,
            cartridge,
            budget,
            nmi,
            oam_dma_request,
            sink,
            input,
        }
    }

    /// Immutable access to the PPU.
    pub fn ppu(&self) -> &Ppu {
        self.ppu
    }

    fn ppu_bus(&mut self) -> (&mut Ppu, PpuBus<'_>) {
        let bus = PpuBus::new(self.cartridge.as_deref_mut(), self.nmi, self.sink);
        (self.ppu, bus)
    }

    fn read_cartridge(&self, addr: u16) -> Result<u8> {
        match self.cartridge.as_deref() {
            Some(cart) => Ok(cart.prg_read(addr)),
            None => {
                error!(addr = format_args!("{addr:04X}"), "read with no cartridge");
                Err(Error::UnmappedRead { addr })
            }
        }
    }

    fn write_cartridge(&mut self, addr: u16, value: u8) -> Result<()> {
        let Some(cart) = self.cartridge.as_deref_mut() else {
            error!(addr = format_args!("{addr:04X}"), "write with no cartridge");
            return Err(Error::UnmappedWrite { addr });
        };
        if let Some(mirroring) = cart.prg_write(addr, value).inspect_err(|err| {
            error!(%err, "cartridge write failed");
        })? {
            self.ppu.set_mirroring(mirroring);
        }
        Ok(())
    }
}

/// Side-effect-free CPU read. PPU and APU ports report `0`.
pub(crate) fn peek(
    ram: &[u8; cpu_mem::INTERNAL_RAM_SIZE],
    controller: &Controller,
    cartridge: Option<&Cartridge>,
    addr: u16,
) -> u8 {
    match cpu_read_map(addr) {
        CpuMap::Ram => ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize],
        CpuMap::Controller1 => controller.peek(0),
        CpuMap::Controller2 => controller.peek(1),
        CpuMap::Cartridge => cartridge.map_or(0, |cart| cart.prg_read(addr)),
        _ => 0,
    }
}

impl Bus for CpuBus<'_> {
    fn tick(&mut self) {
        let (ppu, mut bus) = self.ppu_bus();
        for _ in 0..PPU_DOTS_PER_CPU_CYCLE {
            ppu.step(&mut bus);
        }
        self.budget.consume();
    }

    fn read(&mut self, addr: u16) -> Result<u8> {
        match cpu_read_map(addr) {
            CpuMap::Ram => Ok(self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]),
            CpuMap::Ppu => {
                let (ppu, mut bus) = self.ppu_bus();
                Ok(ppu.cpu_read(addr, &mut bus))
            }
            CpuMap::Apu => Ok(self.apu.read(self.budget.elapsed())),
            CpuMap::Controller1 => Ok(self.controller.read(0, &self.input)),
            CpuMap::Controller2 => Ok(self.controller.read(1, &self.input)),
            CpuMap::Cartridge => self.read_cartridge(addr),
            CpuMap::OamDma | CpuMap::Controller | CpuMap::Unknown => {
                error!(addr = format_args!("{addr:04X}"), "unmapped cpu read");
                Err(Error::UnmappedRead { addr })
            }
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<()> {
        match cpu_write_map(addr) {
            CpuMap::Ram => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize] = value;
                Ok(())
            }
            CpuMap::Ppu => {
                let (ppu, mut bus) = self.ppu_bus();
                ppu.cpu_write(addr, value, &mut bus).inspect_err(|err| {
                    error!(%err, "ppu write failed");
                })
            }
            CpuMap::Apu => {
                self.apu.write(self.budget.elapsed(), addr, value);
                Ok(())
            }
            CpuMap::OamDma => {
                *self.oam_dma_request = Some(value);
                Ok(())
            }
            CpuMap::Controller => {
                self.controller.write(value, &self.input);
                Ok(())
            }
            CpuMap::Cartridge => self.write_cartridge(addr, value),
            CpuMap::Controller1 | CpuMap::Controller2 | CpuMap::Unknown => {
                error!(
                    addr = format_args!("{addr:04X}"),
                    value = format_args!("{value:02X}"),
                    "unmapped cpu write"
                );
                Err(Error::UnmappedWrite { addr })
            }
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        peek(&*self.ram, &*self.controller, self.cartridge.as_deref(), addr)
    }

    fn take_oam_dma_request(&mut self) -> Option<u8> {
        self.oam_dma_request.take()
    }

    fn take_nmi(&mut self) -> bool {
        self.nmi.take()
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
