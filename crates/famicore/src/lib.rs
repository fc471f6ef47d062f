use std::path::Path;

use tracing::debug;

use crate::{
    apu::Apu,
    bus::{CycleBudget, cpu::CpuBus},
    cartridge::Cartridge,
    controller::Controller,
    cpu::Cpu,
    interrupt::NmiLine,
    memory::cpu as cpu_mem,
    ppu::{FrameBuffer, Ppu},
};

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod host;
pub mod interrupt;
pub mod memory;
pub mod ppu;

pub use cartridge::{load_cartridge, load_cartridge_from_file};
pub use config::{FrameTiming, NesConfig, Region};
pub use cpu::CpuSnapshot;
pub use error::{Error, Result};
pub use host::{Button, FrameCapture, FrameSink, IdleInput, Input, NullSink, Pads};
pub use ppu::{FRAME_HEIGHT, FRAME_WIDTH};

/// The assembled console: CPU, PPU, APU stub, controller ports, 2 KiB of
/// work RAM and an optional cartridge.
///
/// Cloning a `Nes` copies every piece of state, so a clone stepped with the
/// same input produces the same frames as the original.
#[derive(Debug, Clone)]
pub struct Nes {
    cpu: Cpu,
    ppu: Ppu,
    apu: Apu,
    controller: Controller,
    ram: [u8; cpu_mem::INTERNAL_RAM_SIZE],
    cartridge: Option<Cartridge>,
    budget: CycleBudget,
    nmi: NmiLine,
    /// Pending OAM DMA page written via `$4014` (latched until CPU picks it up).
    oam_dma_request: Option<u8>,
    config: NesConfig,
    frame_count: u64,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    /// A console with no cartridge inserted.
    pub fn new() -> Self {
        Self::with_config(NesConfig::default())
    }

    pub fn with_config(config: NesConfig) -> Self {
        let mut cpu = Cpu::new();
        cpu.set_trace(config.trace_cpu);
        Self {
            cpu,
            ppu: Ppu::new(),
            apu: Apu::new(),
            controller: Controller::new(),
            ram: [0; cpu_mem::INTERNAL_RAM_SIZE],
            cartridge: None,
            budget: CycleBudget::new(),
            nmi: NmiLine::new(),
            oam_dma_request: None,
            config,
            frame_count: 0,
        }
    }

    /// Inserts a cartridge and powers the console on.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) -> Result<()> {
        self.cartridge = Some(cartridge);
        self.power_on()
    }

    /// Loads an iNES file, inserts it and powers the console on.
    pub fn load_cartridge_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let cartridge = cartridge::load_cartridge_from_file(path)?;
        self.insert_cartridge(cartridge)
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Cold start: work RAM and every device cleared, then the CPU RESET
    /// sequence.
    pub fn power_on(&mut self) -> Result<()> {
        debug!("power on");
        self.ram = [0; cpu_mem::INTERNAL_RAM_SIZE];
        self.controller = Controller::new();
        self.apu = Apu::new();
        self.budget.reset();
        self.frame_count = 0;
        self.cpu = Cpu::new();
        self.cpu.set_trace(self.config.trace_cpu);
        self.reset_devices()?;
        let mut sink = NullSink;
        let (cpu, mut bus) = self.split(&mut sink, &IdleInput);
        cpu.power_on(&mut bus)
    }

    /// Warm reset: work RAM and the cycle counters survive.
    pub fn reset(&mut self) -> Result<()> {
        debug!("reset");
        self.reset_devices()?;
        let mut sink = NullSink;
        let (cpu, mut bus) = self.split(&mut sink, &IdleInput);
        cpu.reset(&mut bus)
    }

    fn reset_devices(&mut self) -> Result<()> {
        let cartridge = self.cartridge.as_mut().ok_or(Error::NoCartridge)?;
        cartridge.reset();
        self.ppu.reset();
        self.ppu.set_mirroring(cartridge.mirroring());
        self.nmi.clear();
        self.oam_dma_request = None;
        Ok(())
    }

    /// Splits the console into the CPU and a bus borrowing everything else.
    fn split<'a>(
        &'a mut self,
        sink: &'a mut dyn FrameSink,
        input: &'a dyn Input,
    ) -> (&'a mut Cpu, CpuBus<'a>) {
        let bus = CpuBus::new(
            &mut self.ram,
            &mut self.ppu,
            &mut self.apu,
            &mut self.controller,
            self.cartridge.as_mut(),
            &mut self.budget,
            &mut self.nmi,
            &mut self.oam_dma_request,
            sink,
            input,
        );
        (&mut self.cpu, bus)
    }

    /// Runs one frame's worth of CPU cycles. Every frame the PPU finishes
    /// along the way is handed to `sink`; `input` is polled whenever the
    /// game strobes the controllers.
    pub fn run_frame(&mut self, sink: &mut impl FrameSink, input: &impl Input) -> Result<()> {
        if self.cartridge.is_none() {
            return Err(Error::NoCartridge);
        }
        let budget = self.config.timing.budget(self.frame_count);
        let (cpu, mut bus) = self.split(sink, input);
        cpu.run_frame(&mut bus, budget)?;
        self.frame_count += 1;
        Ok(())
    }

    /// Executes a single instruction (plus any interrupt entry or OAM DMA
    /// around it). The cycles come out of the next frame's budget.
    pub fn step_instruction(
        &mut self,
        sink: &mut impl FrameSink,
        input: &impl Input,
    ) -> Result<()> {
        if self.cartridge.is_none() {
            return Err(Error::NoCartridge);
        }
        let (cpu, mut bus) = self.split(sink, input);
        cpu.step(&mut bus)
    }

    /// Reads a CPU address without side effects or cycles.
    pub fn peek_cpu_byte(&self, addr: u16) -> u8 {
        bus::cpu::peek(&self.ram, &self.controller, self.cartridge.as_ref(), addr)
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot(self.budget.cycles())
    }

    /// nestest-style trace line for the next instruction.
    pub fn trace_line(&self) -> String {
        self.cpu
            .format_trace(self.budget.cycles(), |addr| self.peek_cpu_byte(addr))
    }

    /// Forces the program counter, e.g. to start nestest in automation mode.
    pub fn set_pc(&mut self, pc: u16) {
        self.cpu.set_pc(pc);
    }

    /// The frame being drawn. Complete frames are delivered to the sink.
    pub fn framebuffer(&self) -> &FrameBuffer {
        self.ppu.framebuffer()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn config(&self) -> &NesConfig {
        &self.config
    }

    /// `run_frame` calls completed since power-on.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// CPU cycles since power-on, including the reset sequence.
    pub fn cycles(&self) -> u64 {
        self.budget.cycles()
    }
}
