use std::fmt::{self, Display};

use crate::cpu::addressing::Addressing as A;

/// Operation half of a decoded opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    // Storage
    Lda, Ldx, Ldy, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Math
    Adc, Sbc, Inc, Dec, Inx, Iny, Dex, Dey,
    // Bitwise
    And, Ora, Eor, Lsr, Asl, Rol, Ror,
    // Flags and comparisons
    Clc, Cld, Cli, Clv, Sec, Sed, Sei, Cmp, Cpx, Cpy, Bit,
    // Jumps and branches
    Jmp, Jsr, Rts, Rti, Bcc, Bcs, Beq, Bmi, Bne, Bpl, Bvc, Bvs,
    // Stack
    Pha, Pla, Php, Plp,
    // System
    Brk, Nop,
    // Unofficial
    Lax, Sax, Dcp, Isb, Slo, Rla, Sre, Rra,
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{self:?}").to_ascii_uppercase();
        f.pad(&name)
    }
}

/// A decoded opcode: what to do and where its operand lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub mode: A,
}

impl Instruction {
    /// Total encoded length including the opcode byte.
    pub const fn len(self) -> u16 {
        1 + self.mode.operand_len()
    }

    /// Whether this is one of the undocumented opcodes.
    pub const fn is_unofficial(self, opcode: u8) -> bool {
        matches!(
            self.mnemonic,
            Mnemonic::Lax
                | Mnemonic::Sax
                | Mnemonic::Dcp
                | Mnemonic::Isb
                | Mnemonic::Slo
                | Mnemonic::Rla
                | Mnemonic::Sre
                | Mnemonic::Rra
        ) || (matches!(self.mnemonic, Mnemonic::Nop) && opcode != 0xEA)
            || opcode == 0xEB
    }
}

// Short aliases for addressing modes (to keep the 16x16 table readable)
const IMP: A = A::Implicit;
const ACC: A = A::Accumulator;
const IMM: A = A::Immediate;
const REL: A = A::Relative;
const ZP: A = A::ZeroPage;
const ZPX: A = A::ZeroPageX;
const ZPY: A = A::ZeroPageY;
const ABS: A = A::Absolute;
const ABX: A = A::AbsoluteX;
const ABX_: A = A::AbsoluteXException;
const ABY: A = A::AbsoluteY;
const ABY_: A = A::AbsoluteYException;
const IND: A = A::Indirect;
const INX: A = A::IndirectX;
const INY: A = A::IndirectY;
const INY_: A = A::IndirectYException;

macro_rules! op {
    ($ins:ident, $addr:ident) => {
        Some(Instruction {
            mnemonic: Mnemonic::$ins,
            mode: $addr,
        })
    };
}

const ___: Option<Instruction> = None;

/// Opcode decode table. Empty slots are the `JAM` and unstable opcodes,
/// which stop the emulator.
#[rustfmt::skip]
pub(crate) static LOOKUP_TABLE: [Option<Instruction>; 256] = [
    // 0                1                2                3                4                5                6                7
    // 8                9                A                B                C                D                E                F

    // 0x00
    op!(Brk, IMP),  op!(Ora, INX),  ___,            op!(Slo, INX),  op!(Nop, ZP),   op!(Ora, ZP),   op!(Asl, ZP),   op!(Slo, ZP),
    op!(Php, IMP),  op!(Ora, IMM),  op!(Asl, ACC),  ___,            op!(Nop, ABS),  op!(Ora, ABS),  op!(Asl, ABS),  op!(Slo, ABS),

    // 0x10
    op!(Bpl, REL),  op!(Ora, INY),  ___,            op!(Slo, INY_), op!(Nop, ZPX),  op!(Ora, ZPX),  op!(Asl, ZPX),  op!(Slo, ZPX),
    op!(Clc, IMP),  op!(Ora, ABY),  op!(Nop, IMP),  op!(Slo, ABY_), op!(Nop, ABX),  op!(Ora, ABX),  op!(Asl, ABX_), op!(Slo, ABX_),

    // 0x20
    op!(Jsr, ABS),  op!(And, INX),  ___,            op!(Rla, INX),  op!(Bit, ZP),   op!(And, ZP),   op!(Rol, ZP),   op!(Rla, ZP),
    op!(Plp, IMP),  op!(And, IMM),  op!(Rol, ACC),  ___,            op!(Bit, ABS),  op!(And, ABS),  op!(Rol, ABS),  op!(Rla, ABS),

    // 0x30
    op!(Bmi, REL),  op!(And, INY),  ___,            op!(Rla, INY_), op!(Nop, ZPX),  op!(And, ZPX),  op!(Rol, ZPX),  op!(Rla, ZPX),
    op!(Sec, IMP),  op!(And, ABY),  op!(Nop, IMP),  op!(Rla, ABY_), op!(Nop, ABX),  op!(And, ABX),  op!(Rol, ABX_), op!(Rla, ABX_),

    // 0x40
    op!(Rti, IMP),  op!(Eor, INX),  ___,            op!(Sre, INX),  op!(Nop, ZP),   op!(Eor, ZP),   op!(Lsr, ZP),   op!(Sre, ZP),
    op!(Pha, IMP),  op!(Eor, IMM),  op!(Lsr, ACC),  ___,            op!(Jmp, ABS),  op!(Eor, ABS),  op!(Lsr, ABS),  op!(Sre, ABS),

    // 0x50
    op!(Bvc, REL),  op!(Eor, INY),  ___,            op!(Sre, INY_), op!(Nop, ZPX),  op!(Eor, ZPX),  op!(Lsr, ZPX),  op!(Sre, ZPX),
    op!(Cli, IMP),  op!(Eor, ABY),  op!(Nop, IMP),  op!(Sre, ABY_), op!(Nop, ABX),  op!(Eor, ABX),  op!(Lsr, ABX_), op!(Sre, ABX_),

    // 0x60
    op!(Rts, IMP),  op!(Adc, INX),  ___,            op!(Rra, INX),  op!(Nop, ZP),   op!(Adc, ZP),   op!(Ror, ZP),   op!(Rra, ZP),
    op!(Pla, IMP),  op!(Adc, IMM),  op!(Ror, ACC),  ___,            op!(Jmp, IND),  op!(Adc, ABS),  op!(Ror, ABS),  op!(Rra, ABS),

    // 0x70
    op!(Bvs, REL),  op!(Adc, INY),  ___,            op!(Rra, INY_), op!(Nop, ZPX),  op!(Adc, ZPX),  op!(Ror, ZPX),  op!(Rra, ZPX),
    op!(Sei, IMP),  op!(Adc, ABY),  op!(Nop, IMP),  op!(Rra, ABY_), op!(Nop, ABX),  op!(Adc, ABX),  op!(Ror, ABX_), op!(Rra, ABX_),

    // 0x80
    op!(Nop, IMM),  op!(Sta, INX),  op!(Nop, IMM),  op!(Sax, INX),  op!(Sty, ZP),   op!(Sta, ZP),   op!(Stx, ZP),   op!(Sax, ZP),
    op!(Dey, IMP),  op!(Nop, IMM),  op!(Txa, IMP),  ___,            op!(Sty, ABS),  op!(Sta, ABS),  op!(Stx, ABS),  op!(Sax, ABS),

    // 0x90
    op!(Bcc, REL),  op!(Sta, INY_), ___,            ___,            op!(Sty, ZPX),  op!(Sta, ZPX),  op!(Stx, ZPY),  op!(Sax, ZPY),
    op!(Tya, IMP),  op!(Sta, ABY_), op!(Txs, IMP),  ___,            ___,            op!(Sta, ABX_), ___,            ___,

    // 0xA0
    op!(Ldy, IMM),  op!(Lda, INX),  op!(Ldx, IMM),  op!(Lax, INX),  op!(Ldy, ZP),   op!(Lda, ZP),   op!(Ldx, ZP),   op!(Lax, ZP),
    op!(Tay, IMP),  op!(Lda, IMM),  op!(Tax, IMP),  ___,            op!(Ldy, ABS),  op!(Lda, ABS),  op!(Ldx, ABS),  op!(Lax, ABS),

    // 0xB0
    op!(Bcs, REL),  op!(Lda, INY),  ___,            op!(Lax, INY),  op!(Ldy, ZPX),  op!(Lda, ZPX),  op!(Ldx, ZPY),  op!(Lax, ZPY),
    op!(Clv, IMP),  op!(Lda, ABY),  op!(Tsx, IMP),  ___,            op!(Ldy, ABX),  op!(Lda, ABX),  op!(Ldx, ABY),  op!(Lax, ABY),

    // 0xC0
    op!(Cpy, IMM),  op!(Cmp, INX),  op!(Nop, IMM),  op!(Dcp, INX),  op!(Cpy, ZP),   op!(Cmp, ZP),   op!(Dec, ZP),   op!(Dcp, ZP),
    op!(Iny, IMP),  op!(Cmp, IMM),  op!(Dex, IMP),  ___,            op!(Cpy, ABS),  op!(Cmp, ABS),  op!(Dec, ABS),  op!(Dcp, ABS),

    // 0xD0
    op!(Bne, REL),  op!(Cmp, INY),  ___,            op!(Dcp, INY_), op!(Nop, ZPX),  op!(Cmp, ZPX),  op!(Dec, ZPX),  op!(Dcp, ZPX),
    op!(Cld, IMP),  op!(Cmp, ABY),  op!(Nop, IMP),  op!(Dcp, ABY_), op!(Nop, ABX),  op!(Cmp, ABX),  op!(Dec, ABX_), op!(Dcp, ABX_),

    // 0xE0
    op!(Cpx, IMM),  op!(Sbc, INX),  op!(Nop, IMM),  op!(Isb, INX),  op!(Cpx, ZP),   op!(Sbc, ZP),   op!(Inc, ZP),   op!(Isb, ZP),
    op!(Inx, IMP),  op!(Sbc, IMM),  op!(Nop, IMP),  op!(Sbc, IMM),  op!(Cpx, ABS),  op!(Sbc, ABS),  op!(Inc, ABS),  op!(Isb, ABS),

    // 0xF0
    op!(Beq, REL),  op!(Sbc, INY),  ___,            op!(Isb, INY_), op!(Nop, ZPX),  op!(Sbc, ZPX),  op!(Inc, ZPX),  op!(Isb, ZPX),
    op!(Sed, IMP),  op!(Sbc, ABY),  op!(Nop, IMP),  op!(Isb, ABY_), op!(Nop, ABX),  op!(Sbc, ABX),  op!(Inc, ABX_), op!(Isb, ABX_),
];

/// Decodes an opcode byte.
pub fn decode(opcode: u8) -> Option<Instruction> {
    LOOKUP_TABLE[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_opcodes_decode() {
        assert_eq!(
            decode(0xA9),
            Some(Instruction {
                mnemonic: Mnemonic::Lda,
                mode: A::Immediate
            })
        );
        assert_eq!(decode(0x6C).map(|i| i.mode), Some(A::Indirect));
        assert_eq!(decode(0x9D).map(|i| i.mode), Some(A::AbsoluteXException));
    }

    #[test]
    fn jam_slots_are_empty() {
        for opcode in [0x02u8, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2] {
            assert!(decode(opcode).is_none(), "opcode {opcode:02X}");
        }
    }

    #[test]
    fn table_covers_all_documented_opcodes() {
        let official = LOOKUP_TABLE
            .iter()
            .enumerate()
            .filter_map(|(op, ins)| ins.map(|ins| (op as u8, ins)))
            .filter(|(op, ins)| !ins.is_unofficial(*op))
            .count();
        assert_eq!(official, 151);
    }

    #[test]
    fn mnemonic_display_is_uppercase() {
        assert_eq!(Mnemonic::Lax.to_string(), "LAX");
        assert_eq!(format!("{:<4}", Mnemonic::Jmp), "JMP ");
    }
}
