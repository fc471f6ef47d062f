use std::fmt::{self, Write as _};

use crate::{
    bus::Bus,
    cpu::{Cpu, lookup},
};

/// Register file and cycle counter captured between instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuSnapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Status as software observes it (bit 5 always set).
    pub p: u8,
    pub sp: u8,
    pub cycles: u64,
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.a, self.x, self.y, self.p, self.sp, self.cycles
        )
    }
}

impl Cpu {
    pub fn snapshot(&self, cycles: u64) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            p: self.p.observed(),
            sp: self.s,
            cycles,
        }
    }

    /// One nestest-style line for the instruction at PC, e.g.
    /// `C000  4C F5 C5  JMP  A:00 X:00 Y:00 P:24 SP:FD CYC:7`.
    ///
    /// Operand bytes come from [`Bus::peek`] so formatting never disturbs
    /// device state.
    pub fn trace_line(&self, bus: &impl Bus) -> String {
        self.format_trace(bus.cycles(), |addr| bus.peek(addr))
    }

    /// [`Cpu::trace_line`] over any side-effect-free byte source.
    pub fn format_trace(&self, cycles: u64, peek: impl Fn(u16) -> u8) -> String {
        let opcode = peek(self.pc);
        let (len, name) = match lookup::decode(opcode) {
            Some(instruction) => (instruction.len(), instruction.mnemonic.to_string()),
            None => (1, "???".to_string()),
        };

        let mut bytes = String::with_capacity(8);
        for i in 0..len {
            if i > 0 {
                bytes.push(' ');
            }
            let _ = write!(bytes, "{:02X}", peek(self.pc.wrapping_add(i)));
        }

        format!("{:04X}  {bytes:<8}  {name:<3}  {}", self.pc, self.snapshot(cycles))
    }
}
