//! Operand resolution and instruction semantics.
//!
//! Cycle counts fall out of the accesses each routine makes: every
//! [`Cpu::read`]/[`Cpu::write`] is one cycle and every bare [`Cpu::tick`] is an
//! internal cycle the hardware spends without a useful access.

use crate::{
    bus::Bus,
    cpu::{
        Cpu, Interrupt,
        addressing::{Addressing, crosses_page},
        lookup::{Instruction, Mnemonic},
        status::Status,
    },
    error::Result,
};

impl Cpu {
    /// Immediate/relative operand: the operand is the byte at PC.
    #[inline]
    pub(super) fn fetch_operand_addr(&mut self) -> u16 {
        let addr = self.pc;
        self.pc = self.pc.wrapping_add(1);
        addr
    }

    fn fetch_absolute(&mut self, bus: &mut impl Bus) -> Result<u16> {
        let addr = self.fetch_operand_addr();
        self.pc = self.pc.wrapping_add(1);
        let lo = self.read(bus, addr)? as u16;
        let hi = self.read(bus, addr.wrapping_add(1))? as u16;
        Ok((hi << 8) | lo)
    }

    /// Reads a 16-bit pointer from the zero page, wrapping at `$FF`.
    fn read_zero_page_pointer(&mut self, bus: &mut impl Bus, zp: u8) -> Result<u16> {
        let lo = self.read(bus, zp as u16)? as u16;
        let hi = self.read(bus, zp.wrapping_add(1) as u16)? as u16;
        Ok((hi << 8) | lo)
    }

    fn indexed(&mut self, bus: &mut impl Bus, base: u16, index: u8, always_fix: bool) -> u16 {
        if always_fix || crosses_page(base, index as u16) {
            self.tick(bus);
        }
        base.wrapping_add(index as u16)
    }

    /// Resolves the effective address for `mode`.
    pub(super) fn operand(&mut self, bus: &mut impl Bus, mode: Addressing) -> Result<u16> {
        let addr = match mode {
            Addressing::Implicit | Addressing::Accumulator => self.pc,
            Addressing::Immediate | Addressing::Relative => self.fetch_operand_addr(),
            Addressing::ZeroPage => {
                let addr = self.fetch_operand_addr();
                self.read(bus, addr)? as u16
            }
            Addressing::ZeroPageX | Addressing::ZeroPageY => {
                let index = if mode == Addressing::ZeroPageX {
                    self.x
                } else {
                    self.y
                };
                self.tick(bus);
                let addr = self.fetch_operand_addr();
                self.read(bus, addr)?.wrapping_add(index) as u16
            }
            Addressing::Absolute => self.fetch_absolute(bus)?,
            Addressing::AbsoluteX | Addressing::AbsoluteXException => {
                let base = self.fetch_absolute(bus)?;
                let x = self.x;
                self.indexed(bus, base, x, mode == Addressing::AbsoluteXException)
            }
            Addressing::AbsoluteY | Addressing::AbsoluteYException => {
                let base = self.fetch_absolute(bus)?;
                let y = self.y;
                self.indexed(bus, base, y, mode == Addressing::AbsoluteYException)
            }
            Addressing::Indirect => {
                let ptr = self.fetch_absolute(bus)?;
                let lo = self.read(bus, ptr)? as u16;
                // The high byte never carries into the next page.
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = self.read(bus, hi_addr)? as u16;
                (hi << 8) | lo
            }
            Addressing::IndirectX => {
                let zp = self.operand(bus, Addressing::ZeroPageX)? as u8;
                self.read_zero_page_pointer(bus, zp)?
            }
            Addressing::IndirectY | Addressing::IndirectYException => {
                let zp = self.operand(bus, Addressing::ZeroPage)? as u8;
                let base = self.read_zero_page_pointer(bus, zp)?;
                let y = self.y;
                self.indexed(bus, base, y, mode == Addressing::IndirectYException)
            }
        };
        Ok(addr)
    }

    fn load(&mut self, bus: &mut impl Bus, mode: Addressing) -> Result<u8> {
        let addr = self.operand(bus, mode)?;
        self.read(bus, addr)
    }

    fn store(&mut self, bus: &mut impl Bus, mode: Addressing, value: u8) -> Result<()> {
        let addr = self.operand(bus, mode)?;
        self.write(bus, addr, value)
    }

    /// Read-modify-write: read, one internal cycle, write back.
    fn modify(
        &mut self,
        bus: &mut impl Bus,
        mode: Addressing,
        op: impl FnOnce(&mut Self, u8) -> u8,
    ) -> Result<()> {
        if mode == Addressing::Accumulator {
            self.tick(bus);
            let a = self.a;
            self.a = op(self, a);
            return Ok(());
        }
        let addr = self.operand(bus, mode)?;
        let value = self.read(bus, addr)?;
        self.tick(bus);
        let result = op(self, value);
        self.write(bus, addr, result)
    }

    /// Two-cycle implied instructions spend their second cycle idle.
    fn implied(&mut self, bus: &mut impl Bus, op: impl FnOnce(&mut Self)) {
        self.tick(bus);
        op(self);
    }

    pub(super) fn set_a(&mut self, value: u8) {
        self.a = value;
        self.p.set_zn(value);
    }

    pub(super) fn set_x(&mut self, value: u8) {
        self.x = value;
        self.p.set_zn(value);
    }

    pub(super) fn set_y(&mut self, value: u8) {
        self.y = value;
        self.p.set_zn(value);
    }

    /// Binary add with carry. SBC feeds the complement of its operand.
    pub(super) fn add(&mut self, value: u8) {
        let a = self.a;
        let sum = a as u16 + value as u16 + self.p.c() as u16;
        let result = sum as u8;
        self.p.set(Status::CARRY, sum > 0xFF);
        self.p
            .set(Status::OVERFLOW, (!(a ^ value) & (a ^ result) & 0x80) != 0);
        self.set_a(result);
    }

    fn shift_left(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.p.set(Status::CARRY, value & 0x80 != 0);
        self.p.set_zn(result);
        result
    }

    fn shift_right(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.p.set(Status::CARRY, value & 0x01 != 0);
        self.p.set_zn(result);
        result
    }

    fn rotate_left(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.p.c() as u8;
        self.p.set(Status::CARRY, value & 0x80 != 0);
        self.p.set_zn(result);
        result
    }

    fn rotate_right(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | ((self.p.c() as u8) << 7);
        self.p.set(Status::CARRY, value & 0x01 != 0);
        self.p.set_zn(result);
        result
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.p.set(Status::CARRY, register >= value);
        self.p.set_zn(register.wrapping_sub(value));
    }

    fn branch(&mut self, bus: &mut impl Bus, taken: bool) -> Result<()> {
        let addr = self.operand(bus, Addressing::Relative)?;
        let offset = self.read(bus, addr)? as i8 as i16 as u16;
        if taken {
            if crosses_page(self.pc, offset) {
                self.tick(bus);
            }
            self.tick(bus);
            self.pc = self.pc.wrapping_add(offset);
        }
        Ok(())
    }

    pub(super) fn dispatch(&mut self, bus: &mut impl Bus, instruction: Instruction) -> Result<()> {
        use Mnemonic::*;

        let mode = instruction.mode;
        match instruction.mnemonic {
            // Storage
            Lda => {
                let v = self.load(bus, mode)?;
                self.set_a(v);
            }
            Ldx => {
                let v = self.load(bus, mode)?;
                self.set_x(v);
            }
            Ldy => {
                let v = self.load(bus, mode)?;
                self.set_y(v);
            }
            Sta => self.store(bus, mode, self.a)?,
            Stx => self.store(bus, mode, self.x)?,
            Sty => self.store(bus, mode, self.y)?,
            Tax => self.implied(bus, |cpu| cpu.set_x(cpu.a)),
            Tay => self.implied(bus, |cpu| cpu.set_y(cpu.a)),
            Tsx => self.implied(bus, |cpu| cpu.set_x(cpu.s)),
            Txa => self.implied(bus, |cpu| cpu.set_a(cpu.x)),
            Txs => self.implied(bus, |cpu| cpu.s = cpu.x),
            Tya => self.implied(bus, |cpu| cpu.set_a(cpu.y)),

            // Math
            Adc => {
                let v = self.load(bus, mode)?;
                self.add(v);
            }
            Sbc => {
                let v = self.load(bus, mode)?;
                self.add(v ^ 0xFF);
            }
            Inc => self.modify(bus, mode, |cpu, v| {
                let r = v.wrapping_add(1);
                cpu.p.set_zn(r);
                r
            })?,
            Dec => self.modify(bus, mode, |cpu, v| {
                let r = v.wrapping_sub(1);
                cpu.p.set_zn(r);
                r
            })?,
            Inx => self.implied(bus, |cpu| cpu.set_x(cpu.x.wrapping_add(1))),
            Iny => self.implied(bus, |cpu| cpu.set_y(cpu.y.wrapping_add(1))),
            Dex => self.implied(bus, |cpu| cpu.set_x(cpu.x.wrapping_sub(1))),
            Dey => self.implied(bus, |cpu| cpu.set_y(cpu.y.wrapping_sub(1))),

            // Bitwise
            And => {
                let v = self.load(bus, mode)?;
                self.set_a(self.a & v);
            }
            Ora => {
                let v = self.load(bus, mode)?;
                self.set_a(self.a | v);
            }
            Eor => {
                let v = self.load(bus, mode)?;
                self.set_a(self.a ^ v);
            }
            Lsr => self.modify(bus, mode, Self::shift_right)?,
            Asl => self.modify(bus, mode, Self::shift_left)?,
            Rol => self.modify(bus, mode, Self::rotate_left)?,
            Ror => self.modify(bus, mode, Self::rotate_right)?,

            // Flags
            Clc => self.implied(bus, |cpu| cpu.p.remove(Status::CARRY)),
            Cld => self.implied(bus, |cpu| cpu.p.remove(Status::DECIMAL)),
            Cli => self.implied(bus, |cpu| cpu.p.remove(Status::INTERRUPT)),
            Clv => self.implied(bus, |cpu| cpu.p.remove(Status::OVERFLOW)),
            Sec => self.implied(bus, |cpu| cpu.p.insert(Status::CARRY)),
            Sed => self.implied(bus, |cpu| cpu.p.insert(Status::DECIMAL)),
            Sei => self.implied(bus, |cpu| cpu.p.insert(Status::INTERRUPT)),
            Cmp => {
                let v = self.load(bus, mode)?;
                self.compare(self.a, v);
            }
            Cpx => {
                let v = self.load(bus, mode)?;
                self.compare(self.x, v);
            }
            Cpy => {
                let v = self.load(bus, mode)?;
                self.compare(self.y, v);
            }
            Bit => {
                let v = self.load(bus, mode)?;
                self.p.set(Status::ZERO, self.a & v == 0);
                self.p.set(Status::OVERFLOW, v & 0x40 != 0);
                self.p.set(Status::NEGATIVE, v & 0x80 != 0);
            }

            // Jumps and branches
            Jmp => self.pc = self.operand(bus, mode)?,
            Jsr => {
                // Return address is the last byte of the JSR itself.
                self.tick(bus);
                let ret = self.pc.wrapping_add(1);
                self.push(bus, (ret >> 8) as u8)?;
                self.push(bus, ret as u8)?;
                self.pc = self.operand(bus, Addressing::Absolute)?;
            }
            Rts => {
                self.tick(bus);
                self.tick(bus);
                self.tick(bus);
                let lo = self.pop(bus)? as u16;
                let hi = self.pop(bus)? as u16;
                self.pc = ((hi << 8) | lo).wrapping_add(1);
            }
            Rti => {
                self.tick(bus);
                self.tick(bus);
                self.p = Status::from_stack(self.pop(bus)?);
                let lo = self.pop(bus)? as u16;
                let hi = self.pop(bus)? as u16;
                self.pc = (hi << 8) | lo;
            }
            Bcc => self.branch(bus, !self.p.c())?,
            Bcs => self.branch(bus, self.p.c())?,
            Beq => self.branch(bus, self.p.z())?,
            Bmi => self.branch(bus, self.p.n())?,
            Bne => self.branch(bus, !self.p.z())?,
            Bpl => self.branch(bus, !self.p.n())?,
            Bvc => self.branch(bus, !self.p.v())?,
            Bvs => self.branch(bus, self.p.v())?,

            // Stack
            Pha => {
                self.tick(bus);
                self.push(bus, self.a)?;
            }
            Php => {
                self.tick(bus);
                self.push(bus, self.p.pushed_with_break())?;
            }
            Pla => {
                self.tick(bus);
                self.tick(bus);
                let v = self.pop(bus)?;
                self.set_a(v);
            }
            Plp => {
                self.tick(bus);
                self.tick(bus);
                self.p = Status::from_stack(self.pop(bus)?);
            }

            // System
            Brk => {
                // Padding byte after the opcode is skipped.
                self.pc = self.pc.wrapping_add(1);
                self.interrupt(bus, Interrupt::Brk)?;
            }
            Nop => {
                if mode != Addressing::Implicit {
                    self.operand(bus, mode)?;
                }
                self.tick(bus);
            }

            // Unofficial
            Lax => {
                let v = self.load(bus, mode)?;
                self.set_x(v);
                self.set_a(v);
            }
            Sax => self.store(bus, mode, self.a & self.x)?,
            Dcp => self.modify(bus, mode, |cpu, v| {
                let r = v.wrapping_sub(1);
                cpu.compare(cpu.a, r);
                r
            })?,
            Isb => self.modify(bus, mode, |cpu, v| {
                let r = v.wrapping_add(1);
                cpu.add(r ^ 0xFF);
                r
            })?,
            Slo => self.modify(bus, mode, |cpu, v| {
                let r = cpu.shift_left(v);
                cpu.set_a(cpu.a | r);
                r
            })?,
            Rla => self.modify(bus, mode, |cpu, v| {
                let r = cpu.rotate_left(v);
                cpu.set_a(cpu.a & r);
                r
            })?,
            Sre => self.modify(bus, mode, |cpu, v| {
                let r = cpu.shift_right(v);
                cpu.set_a(cpu.a ^ r);
                r
            })?,
            Rra => self.modify(bus, mode, |cpu, v| {
                let r = cpu.rotate_right(v);
                cpu.add(r);
                r
            })?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{
        bus::{Bus, mock::MockBus},
        cpu::{Cpu, Status},
    };

    const ORIGIN: u16 = 0x8000;

    fn boot(program: &[u8]) -> (Cpu, MockBus) {
        let mut bus = MockBus::with_program(ORIGIN, program);
        let mut cpu = Cpu::new();
        cpu.power_on(&mut bus).expect("reset");
        (cpu, bus)
    }

    /// Executes one instruction and returns how many cycles it took.
    fn cycles_of(cpu: &mut Cpu, bus: &mut MockBus) -> u64 {
        let before = bus.cycles();
        cpu.execute(bus).expect("execute");
        bus.cycles() - before
    }

    fn run(program: &[u8], setup: impl FnOnce(&mut Cpu, &mut MockBus)) -> (Cpu, MockBus, u64) {
        let (mut cpu, mut bus) = boot(program);
        setup(&mut cpu, &mut bus);
        let cycles = cycles_of(&mut cpu, &mut bus);
        (cpu, bus, cycles)
    }

    fn with_x(x: u8) -> impl FnOnce(&mut Cpu, &mut MockBus) {
        move |cpu, _| cpu.x = x
    }

    fn with_y(y: u8) -> impl FnOnce(&mut Cpu, &mut MockBus) {
        move |cpu, _| cpu.y = y
    }

    fn nothing(_: &mut Cpu, _: &mut MockBus) {}

    #[test]
    fn read_instruction_cycles_per_addressing_mode() {
        // (program, setup, expected cycles)
        let cases: Vec<(&[u8], Box<dyn FnOnce(&mut Cpu, &mut MockBus)>, u64)> = vec![
            (&[0xA9, 0x01], Box::new(nothing), 2),            // LDA #imm
            (&[0xA5, 0x10], Box::new(nothing), 3),            // LDA zp
            (&[0xB5, 0x10], Box::new(with_x(1)), 4),          // LDA zp,X
            (&[0xB6, 0x10], Box::new(with_y(1)), 4),          // LDX zp,Y
            (&[0xAD, 0x00, 0x02], Box::new(nothing), 4),      // LDA abs
            (&[0xBD, 0x00, 0x02], Box::new(with_x(1)), 4),    // LDA abs,X same page
            (&[0xBD, 0xFF, 0x02], Box::new(with_x(1)), 5),    // LDA abs,X page cross
            (&[0xB9, 0x00, 0x02], Box::new(with_y(1)), 4),    // LDA abs,Y same page
            (&[0xB9, 0xFF, 0x02], Box::new(with_y(1)), 5),    // LDA abs,Y page cross
            (&[0xA1, 0x10], Box::new(with_x(1)), 6),          // LDA (zp,X)
            (&[0xEA], Box::new(nothing), 2),                  // NOP
            (&[0x0A], Box::new(nothing), 2),                  // ASL A
        ];
        for (i, (program, setup, expected)) in cases.into_iter().enumerate() {
            let (_, _, cycles) = run(program, setup);
            assert_eq!(cycles, expected, "case {i}: {program:02X?}");
        }
    }

    #[test]
    fn indirect_y_charges_page_cross_only_for_reads() {
        let pointer = |base: u16| {
            move |_: &mut Cpu, bus: &mut MockBus| {
                bus.mem[0x10] = base as u8;
                bus.mem[0x11] = (base >> 8) as u8;
            }
        };
        let (_, _, same) = run(&[0xB1, 0x10], |cpu, bus| {
            cpu.y = 1;
            pointer(0x0200)(cpu, bus)
        });
        let (_, _, crossed) = run(&[0xB1, 0x10], |cpu, bus| {
            cpu.y = 1;
            pointer(0x02FF)(cpu, bus)
        });
        let (_, _, store) = run(&[0x91, 0x10], |cpu, bus| {
            cpu.y = 1;
            pointer(0x0200)(cpu, bus)
        });
        assert_eq!((same, crossed, store), (5, 6, 6));
    }

    #[test]
    fn stores_always_pay_the_index_cycle() {
        assert_eq!(run(&[0x9D, 0x00, 0x02], with_x(1)).2, 5); // STA abs,X
        assert_eq!(run(&[0x99, 0x00, 0x02], with_y(1)).2, 5); // STA abs,Y
        assert_eq!(run(&[0x8D, 0x00, 0x02], nothing).2, 4); // STA abs
        assert_eq!(run(&[0x95, 0x10], with_x(1)).2, 4); // STA zp,X
    }

    #[test]
    fn read_modify_write_cycles() {
        assert_eq!(run(&[0xE6, 0x10], nothing).2, 5); // INC zp
        assert_eq!(run(&[0xF6, 0x10], with_x(1)).2, 6); // INC zp,X
        assert_eq!(run(&[0xEE, 0x00, 0x02], nothing).2, 6); // INC abs
        assert_eq!(run(&[0xFE, 0x00, 0x02], with_x(1)).2, 7); // INC abs,X
        assert_eq!(run(&[0x1F, 0x00, 0x02], with_x(1)).2, 7); // SLO abs,X
        assert_eq!(run(&[0x1B, 0x00, 0x02], with_y(1)).2, 7); // SLO abs,Y
        assert_eq!(run(&[0x03, 0x10], with_x(1)).2, 8); // SLO (zp,X)
        assert_eq!(run(&[0x13, 0x10], with_y(1)).2, 8); // SLO (zp),Y
    }

    #[test]
    fn control_flow_cycles() {
        assert_eq!(run(&[0x4C, 0x00, 0x90], nothing).2, 3); // JMP abs
        assert_eq!(run(&[0x6C, 0x00, 0x02], nothing).2, 5); // JMP (ind)
        assert_eq!(run(&[0x20, 0x00, 0x90], nothing).2, 6); // JSR
        assert_eq!(run(&[0x48], nothing).2, 3); // PHA
        assert_eq!(run(&[0x08], nothing).2, 3); // PHP
        assert_eq!(run(&[0x68], nothing).2, 4); // PLA
        assert_eq!(run(&[0x28], nothing).2, 4); // PLP
        assert_eq!(run(&[0x04, 0x10], nothing).2, 3); // NOP zp
        assert_eq!(run(&[0x14, 0x10], nothing).2, 4); // NOP zp,X
        assert_eq!(run(&[0x0C, 0x00, 0x02], nothing).2, 4); // NOP abs
        assert_eq!(run(&[0x80, 0x00], nothing).2, 2); // NOP #imm
        assert_eq!(run(&[0x1C, 0xFF, 0x02], with_x(1)).2, 5); // NOP abs,X crossing
    }

    #[test]
    fn branch_cycles_depend_on_outcome_and_page() {
        // BNE +2
        let (_, _, not_taken) = run(&[0xD0, 0x02], |cpu, _| cpu.p.insert(Status::ZERO));
        let (cpu, _, taken) = run(&[0xD0, 0x02], |cpu, _| cpu.p.remove(Status::ZERO));
        assert_eq!((not_taken, taken), (2, 3));
        assert_eq!(cpu.pc(), ORIGIN + 4);

        // Branch backwards across the page boundary from $8000.
        let (cpu, _, crossed) = run(&[0xD0, 0xF0], |cpu, _| cpu.p.remove(Status::ZERO));
        assert_eq!(crossed, 4);
        assert_eq!(cpu.pc(), 0x7FF2);
    }

    #[test]
    fn jsr_and_rts_round_trip() {
        let (mut cpu, mut bus) = boot(&[0x20, 0x00, 0x90]);
        bus.mem[0x9000] = 0x60; // RTS
        cpu.execute(&mut bus).expect("jsr");
        assert_eq!(cpu.pc(), 0x9000);
        assert_eq!(bus.mem[0x01FD], 0x80);
        assert_eq!(bus.mem[0x01FC], 0x02);
        let rts = cycles_of(&mut cpu, &mut bus);
        assert_eq!(rts, 6);
        assert_eq!(cpu.pc(), 0x8003);
        assert_eq!(cpu.s(), 0xFD);
    }

    #[test]
    fn indirect_jump_wraps_within_page() {
        let (cpu, _, _) = run(&[0x6C, 0xFF, 0x02], |_, bus| {
            bus.mem[0x02FF] = 0x34;
            bus.mem[0x0200] = 0x12;
            bus.mem[0x0300] = 0x56;
        });
        assert_eq!(cpu.pc(), 0x1234);
    }

    #[test]
    fn zero_page_index_wraps() {
        let (cpu, _, _) = run(&[0xB5, 0xFF], |cpu, bus| {
            cpu.x = 2;
            bus.mem[0x0001] = 0x77;
            bus.mem[0x0101] = 0x11;
        });
        assert_eq!(cpu.a(), 0x77);
    }

    #[test]
    fn php_plp_hide_break_and_unused() {
        let (mut cpu, mut bus) = boot(&[0x08, 0x28]);
        cpu.execute(&mut bus).expect("php");
        assert_eq!(bus.mem[0x01FD] & 0x30, 0x30);
        cpu.execute(&mut bus).expect("plp");
        assert_eq!(cpu.p().bits() & 0x30, 0);
    }

    #[test]
    fn unofficial_combinations() {
        // LAX zp loads both A and X.
        let (cpu, _, _) = run(&[0xA7, 0x10], |_, bus| bus.mem[0x10] = 0x80);
        assert_eq!((cpu.a(), cpu.x()), (0x80, 0x80));
        assert!(cpu.p().n());

        // SAX stores A & X.
        let (_, bus, _) = run(&[0x87, 0x10], |cpu, _| {
            cpu.a = 0xF0;
            cpu.x = 0x3C;
        });
        assert_eq!(bus.mem[0x10], 0x30);

        // DCP decrements memory then compares with A.
        let (cpu, bus, _) = run(&[0xC7, 0x10], |cpu, bus| {
            cpu.a = 0x41;
            bus.mem[0x10] = 0x42;
        });
        assert_eq!(bus.mem[0x10], 0x41);
        assert!(cpu.p().z() && cpu.p().c());

        // ISB increments memory then subtracts it from A.
        let (cpu, bus, _) = run(&[0xE7, 0x10], |cpu, bus| {
            cpu.a = 0x10;
            cpu.p.insert(Status::CARRY);
            bus.mem[0x10] = 0x04;
        });
        assert_eq!(bus.mem[0x10], 0x05);
        assert_eq!(cpu.a(), 0x0B);

        // SLO shifts memory left then ORs into A.
        let (cpu, bus, _) = run(&[0x07, 0x10], |cpu, bus| {
            cpu.a = 0x01;
            bus.mem[0x10] = 0x81;
        });
        assert_eq!(bus.mem[0x10], 0x02);
        assert_eq!(cpu.a(), 0x03);
        assert!(cpu.p().c());

        // RLA rotates memory left then ANDs into A.
        let (cpu, bus, _) = run(&[0x27, 0x10], |cpu, bus| {
            cpu.a = 0xFF;
            cpu.p.insert(Status::CARRY);
            bus.mem[0x10] = 0x40;
        });
        assert_eq!(bus.mem[0x10], 0x81);
        assert_eq!(cpu.a(), 0x81);

        // SRE shifts memory right then EORs into A.
        let (cpu, bus, _) = run(&[0x47, 0x10], |cpu, bus| {
            cpu.a = 0xFF;
            bus.mem[0x10] = 0x03;
        });
        assert_eq!(bus.mem[0x10], 0x01);
        assert_eq!(cpu.a(), 0xFE);
        assert!(cpu.p().c());

        // RRA rotates memory right then adds it to A.
        let (cpu, bus, _) = run(&[0x67, 0x10], |cpu, bus| {
            cpu.a = 0x01;
            bus.mem[0x10] = 0x03;
        });
        assert_eq!(bus.mem[0x10], 0x01);
        // Rotation carried out 1, so A = 1 + 1 + 1.
        assert_eq!(cpu.a(), 0x03);
    }

    #[test]
    fn decimal_flag_has_no_arithmetic_effect() {
        let (cpu, _, _) = run(&[0x69, 0x09], |cpu, _| {
            cpu.a = 0x09;
            cpu.p.insert(Status::DECIMAL);
        });
        assert_eq!(cpu.a(), 0x12);
    }

    #[test]
    fn stack_pointer_wraps_without_error() {
        let (mut cpu, mut bus) = boot(&[0x48]);
        cpu.s = 0x00;
        cpu.execute(&mut bus).expect("pha");
        assert_eq!(cpu.s(), 0xFF);
        assert_eq!(bus.mem[0x0100], 0x00);
    }

    proptest! {
        #[test]
        fn adc_carry_and_overflow(a in any::<u8>(), m in any::<u8>(), carry in any::<bool>()) {
            let (cpu, _, _) = run(&[0x69, m], |cpu, _| {
                cpu.a = a;
                cpu.p.set(Status::CARRY, carry);
            });
            let sum = a as u16 + m as u16 + carry as u16;
            let result = sum as u8;
            prop_assert_eq!(cpu.a(), result);
            prop_assert_eq!(cpu.p().c(), sum > 0xFF);
            let overflow = (a ^ m) & 0x80 == 0 && (a ^ result) & 0x80 != 0;
            prop_assert_eq!(cpu.p().v(), overflow);
            prop_assert_eq!(cpu.p().z(), result == 0);
            prop_assert_eq!(cpu.p().n(), result & 0x80 != 0);
        }

        #[test]
        fn sbc_is_adc_of_complement(a in any::<u8>(), m in any::<u8>(), carry in any::<bool>()) {
            let (cpu, _, _) = run(&[0xE9, m], |cpu, _| {
                cpu.a = a;
                cpu.p.set(Status::CARRY, carry);
            });
            let diff = a as i16 - m as i16 - (!carry) as i16;
            prop_assert_eq!(cpu.a(), diff as u8);
            prop_assert_eq!(cpu.p().c(), diff >= 0);
            let signed = a as i8 as i16 - m as i8 as i16 - (!carry) as i16;
            prop_assert_eq!(cpu.p().v(), !(-128..=127).contains(&signed));
        }

        #[test]
        fn loads_and_transfers_set_zero_and_negative(value in any::<u8>()) {
            for program in [[0xA9, value, 0xAA], [0xA2, value, 0x8A], [0xA0, value, 0x98]] {
                let (mut cpu, mut bus) = boot(&program);
                cpu.execute(&mut bus).expect("load");
                prop_assert_eq!(cpu.p().z(), value == 0);
                prop_assert_eq!(cpu.p().n(), value & 0x80 != 0);
                cpu.execute(&mut bus).expect("transfer");
                prop_assert_eq!(cpu.p().z(), value == 0);
                prop_assert_eq!(cpu.p().n(), value & 0x80 != 0);
            }
        }

        #[test]
        fn compare_sets_carry_when_register_not_less(a in any::<u8>(), m in any::<u8>()) {
            let (cpu, _, _) = run(&[0xC9, m], |cpu, _| cpu.a = a);
            prop_assert_eq!(cpu.p().c(), a >= m);
            prop_assert_eq!(cpu.p().z(), a == m);
            prop_assert_eq!(cpu.p().n(), a.wrapping_sub(m) & 0x80 != 0);
        }
    }
}
