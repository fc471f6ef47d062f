//! Ricoh 2A03 CPU core (6502 without decimal arithmetic).
//!
//! Execution is instruction-granular: [`Cpu::execute`] runs one whole
//! instruction, but every memory access inside it goes through
//! [`Cpu::read`]/[`Cpu::write`], which tick the bus first. Since each tick
//! advances the PPU by three dots, the PPU is always positioned on the exact
//! dot at which the CPU touches a register.

use tracing::{debug, error, trace};

use crate::{
    bus::{Bus, STACK_ADDR},
    error::{Error, Result},
    memory::{cpu as cpu_mem, ppu::Register as PpuRegister},
};

mod addressing;
mod instructions;
mod lookup;
mod status;
mod trace;

pub use addressing::Addressing;
pub use lookup::{Instruction, Mnemonic, decode};
pub use status::Status;
pub use trace::CpuSnapshot;

/// Which interrupt sequence to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Interrupt {
    Nmi,
    Irq,
    Brk,
}

impl Interrupt {
    const fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => cpu_mem::NMI_VECTOR,
            Interrupt::Irq | Interrupt::Brk => cpu_mem::IRQ_VECTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cpu {
    // Registers
    a: u8,     //Accumulator
    x: u8,     //X Index Register
    y: u8,     //Y Index Register
    s: u8,     //Stack Pointer
    p: Status, //Processor Status
    pc: u16,   //Program Counter

    /// Emit a trace line before every instruction.
    trace: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Power-on register file. Call [`Cpu::reset`] to run the RESET sequence.
    pub fn new() -> Self {
        Self {
            a: 0x00,
            x: 0x00,
            y: 0x00,
            s: 0x00,
            p: Status::from_stack(0x34),
            pc: 0x0000,
            trace: false,
        }
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    /// Power-on reset: loads P = $34, then performs the RESET interrupt.
    pub fn power_on(&mut self, bus: &mut impl Bus) -> Result<()> {
        self.p = Status::from_stack(0x34);
        self.reset(bus)
    }

    /// RESET sequence: two idle cycles, three suppressed stack pushes
    /// (S drops by 3 without writing), then the vector fetch.
    pub fn reset(&mut self, bus: &mut impl Bus) -> Result<()> {
        self.tick(bus);
        self.tick(bus);

        self.s = self.s.wrapping_sub(3);
        self.tick(bus);
        self.tick(bus);
        self.tick(bus);

        self.p.insert(Status::INTERRUPT);
        self.pc = self.read_vector(bus, cpu_mem::RESET_VECTOR)?;
        debug!(pc = format_args!("{:04X}", self.pc), "cpu reset");
        Ok(())
    }

    /// Adds one frame of cycles and runs whole instructions until the budget
    /// is spent. The last instruction may overrun; the debt is carried into
    /// the next call.
    pub fn run_frame(&mut self, bus: &mut impl Bus, budget: i32) -> Result<()> {
        bus.add_cycles(budget);
        while bus.remaining_cycles() > 0 {
            self.step(bus)?;
        }
        Ok(())
    }

    /// Services a pending interrupt (NMI first, then IRQ when not masked) and
    /// executes the next instruction.
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<()> {
        if bus.take_nmi() {
            self.interrupt(bus, Interrupt::Nmi)?;
        } else if bus.irq_pending() && !self.p.i() {
            self.interrupt(bus, Interrupt::Irq)?;
        }
        if self.trace {
            trace!(target: "famicore::cpu", "{}", self.trace_line(&*bus));
        }
        self.execute(bus)?;
        if let Some(page) = bus.take_oam_dma_request() {
            self.oam_dma(bus, page)?;
        }
        Ok(())
    }

    /// Fetches, decodes and executes exactly one instruction.
    pub fn execute(&mut self, bus: &mut impl Bus) -> Result<()> {
        let pc = self.pc;
        let opcode_addr = self.fetch_operand_addr();
        let opcode = self.read(bus, opcode_addr)?;
        let Some(instruction) = lookup::decode(opcode) else {
            error!(opcode = format_args!("{opcode:02X}"), pc = format_args!("{pc:04X}"), "invalid opcode");
            return Err(Error::InvalidOpcode { opcode, pc });
        };
        self.dispatch(bus, instruction)
    }

    /// Sprite DMA: 256 reads from `page << 8` each stored to OAMDATA.
    pub(crate) fn oam_dma(&mut self, bus: &mut impl Bus, page: u8) -> Result<()> {
        debug!(page = format_args!("{page:02X}"), "oam dma");
        let base = (page as u16) << 8;
        for offset in 0..=0xFFu16 {
            let value = self.read(bus, base | offset)?;
            self.write(bus, PpuRegister::OamData.addr(), value)?;
        }
        Ok(())
    }

    /// Shared entry sequence for NMI, IRQ and BRK.
    ///
    /// BRK has already spent one cycle on its padding byte; hardware
    /// interrupts spend two idle cycles instead.
    pub(crate) fn interrupt(&mut self, bus: &mut impl Bus, kind: Interrupt) -> Result<()> {
        let pushed = match kind {
            Interrupt::Brk => {
                self.tick(bus);
                self.p.pushed_with_break()
            }
            Interrupt::Nmi | Interrupt::Irq => {
                self.tick(bus);
                self.tick(bus);
                self.p.observed()
            }
        };

        self.push(bus, (self.pc >> 8) as u8)?;
        self.push(bus, self.pc as u8)?;
        self.push(bus, pushed)?;

        self.p.insert(Status::INTERRUPT);
        self.pc = self.read_vector(bus, kind.vector())?;
        Ok(())
    }

    /// One bus cycle with no access of its own.
    #[inline]
    pub(crate) fn tick(&mut self, bus: &mut impl Bus) {
        bus.tick();
    }

    #[inline]
    pub(crate) fn read(&mut self, bus: &mut impl Bus, addr: u16) -> Result<u8> {
        bus.tick();
        bus.read(addr)
    }

    #[inline]
    pub(crate) fn write(&mut self, bus: &mut impl Bus, addr: u16, value: u8) -> Result<()> {
        bus.tick();
        bus.write(addr, value)
    }

    fn read_vector(&mut self, bus: &mut impl Bus, addr: u16) -> Result<u16> {
        let lo = self.read(bus, addr)? as u16;
        let hi = self.read(bus, addr + 1)? as u16;
        Ok((hi << 8) | lo)
    }

    pub(crate) fn push(&mut self, bus: &mut impl Bus, value: u8) -> Result<()> {
        self.write(bus, STACK_ADDR | self.s as u16, value)?;
        self.s = self.s.wrapping_sub(1);
        Ok(())
    }

    pub(crate) fn pop(&mut self, bus: &mut impl Bus) -> Result<u8> {
        self.s = self.s.wrapping_add(1);
        self.read(bus, STACK_ADDR | self.s as u16)
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn s(&self) -> u8 {
        self.s
    }

    pub fn p(&self) -> Status {
        self.p
    }

    /// Forces the program counter, e.g. to start nestest in automation mode.
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::MockBus;

    fn boot(program: &[u8]) -> (Cpu, MockBus) {
        let mut bus = MockBus::with_program(0x8000, program);
        let mut cpu = Cpu::new();
        cpu.power_on(&mut bus).expect("reset");
        (cpu, bus)
    }

    #[test]
    fn reset_takes_seven_cycles_and_loads_vector() {
        let (cpu, bus) = boot(&[0xEA]);
        assert_eq!(cpu.pc(), 0x8000);
        assert_eq!(cpu.s(), 0xFD);
        assert_eq!(cpu.p().observed(), 0x24);
        assert_eq!(bus.cycles(), 7);
        assert!(bus.writes.is_empty(), "reset must not write the stack");
    }

    #[test]
    fn invalid_opcode_is_fatal() {
        let (mut cpu, mut bus) = boot(&[0x02]);
        let err = cpu.execute(&mut bus).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOpcode {
                opcode: 0x02,
                pc: 0x8000
            }
        ));
    }

    #[test]
    fn run_frame_overruns_and_carries_debt() {
        // JMP $8000 forever: 3 cycles per iteration.
        let (mut cpu, mut bus) = boot(&[0x4C, 0x00, 0x80]);
        // The reset sequence already spent 7 cycles against an empty budget.
        assert_eq!(bus.remaining_cycles(), -7);
        cpu.run_frame(&mut bus, 10).expect("frame");
        assert_eq!(bus.remaining_cycles(), 0);
        // 10 cycles need 4 JMPs (12 cycles), leaving -2.
        cpu.run_frame(&mut bus, 10).expect("frame");
        assert_eq!(bus.remaining_cycles(), -2);
        cpu.run_frame(&mut bus, 10).expect("frame");
        assert_eq!(bus.remaining_cycles(), -1);
    }

    #[test]
    fn nmi_pushes_state_and_jumps_to_vector() {
        let (mut cpu, mut bus) = boot(&[0xEA, 0xEA]);
        bus.mem[0xFFFA] = 0x00;
        bus.mem[0xFFFB] = 0x90;
        bus.mem[0x9000] = 0xEA;
        bus.nmi = true;
        let before = bus.cycles();
        cpu.step(&mut bus).expect("step");
        // 7 cycles of NMI entry plus the NOP at the handler.
        assert_eq!(bus.cycles() - before, 9);
        assert_eq!(cpu.pc(), 0x9001);
        assert_eq!(bus.mem[0x01FD], 0x80);
        assert_eq!(bus.mem[0x01FC], 0x00);
        assert_eq!(bus.mem[0x01FB] & 0x30, 0x20, "B clear, U set on NMI push");
        assert!(cpu.p().i());
    }

    #[test]
    fn irq_respects_interrupt_disable() {
        let (mut cpu, mut bus) = boot(&[0xEA, 0x58, 0xEA]);
        bus.mem[0xFFFE] = 0x00;
        bus.mem[0xFFFF] = 0xA0;
        bus.mem[0xA000] = 0xEA;
        bus.irq = true;
        cpu.step(&mut bus).expect("nop with I set");
        assert_eq!(cpu.pc(), 0x8001);
        cpu.step(&mut bus).expect("cli");
        assert!(!cpu.p().i());
        cpu.step(&mut bus).expect("irq then handler nop");
        assert_eq!(cpu.pc(), 0xA001);
    }

    #[test]
    fn brk_pushes_break_flag_and_skips_padding() {
        let (mut cpu, mut bus) = boot(&[0x00, 0xFF]);
        bus.mem[0xFFFE] = 0x34;
        bus.mem[0xFFFF] = 0x12;
        let before = bus.cycles();
        cpu.execute(&mut bus).expect("brk");
        assert_eq!(bus.cycles() - before, 7);
        assert_eq!(cpu.pc(), 0x1234);
        assert_eq!(bus.mem[0x01FD], 0x80);
        assert_eq!(bus.mem[0x01FC], 0x02);
        assert_eq!(bus.mem[0x01FB] & 0x30, 0x30);
        assert_eq!(cpu.p().bits() & 0x30, 0, "live P never holds B or U");
    }

    #[test]
    fn oam_dma_copies_a_page_in_512_cycles() {
        // LDA #$02; STA $4014
        let (mut cpu, mut bus) = boot(&[0xA9, 0x02, 0x8D, 0x14, 0x40]);
        for i in 0..=0xFFu16 {
            bus.mem[0x0200 + i as usize] = i as u8;
        }
        cpu.step(&mut bus).expect("lda");
        let before = bus.cycles();
        cpu.step(&mut bus).expect("sta + dma");
        assert_eq!(bus.cycles() - before, 4 + 512);
        let oam_writes: Vec<u8> = bus
            .writes
            .iter()
            .filter(|(addr, _)| *addr == 0x2004)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(oam_writes.len(), 256);
        assert_eq!(oam_writes[0x7F], 0x7F);
    }
}
