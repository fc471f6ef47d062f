use std::fmt::{self, Display};

/// Represents the addressing modes supported by the 6502 CPU.
///
/// Addressing modes define how the CPU interprets the operand bytes of an
/// instruction to determine the effective address. Resolvers only compute the
/// address; the instruction performs its own access afterwards.
///
/// The `*Exception` variants are the forms used by stores and read-modify-write
/// instructions. Hardware always spends the page-fix cycle for them, whereas
/// plain reads only pay it when the index carries into the high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
    /// No additional data required. The instruction operates implicitly.
    ///
    /// # Examples
    /// - `CLC` (Clear Carry Flag)
    /// - `NOP` (No Operation)
    Implicit,

    /// The operation is performed on the accumulator register.
    ///
    /// # Examples
    /// - `ASL A` (Arithmetic Shift Left Accumulator)
    Accumulator,

    /// The byte following the opcode is the operand value itself.
    ///
    /// # Examples
    /// - `LDA #$42` (Load Accumulator with immediate value $42)
    Immediate,

    /// Uses a single byte address that refers to the zero page ($0000-$00FF).
    ZeroPage,

    /// Zero page address indexed by X, wrapping within the zero page.
    ZeroPageX,

    /// Zero page address indexed by Y, wrapping within the zero page.
    ZeroPageY,

    /// Signed 8-bit offset relative to the address of the next instruction.
    ///
    /// # Examples
    /// - `BNE $F0`
    Relative,

    /// Uses the full 16-bit address specified by the two bytes following the opcode.
    Absolute,

    /// Absolute address indexed by X. One extra cycle on a page crossing.
    AbsoluteX,

    /// Absolute address indexed by X that always spends the extra cycle.
    AbsoluteXException,

    /// Absolute address indexed by Y. One extra cycle on a page crossing.
    AbsoluteY,

    /// Absolute address indexed by Y that always spends the extra cycle.
    AbsoluteYException,

    /// Indirect addressing used exclusively by `JMP`.
    ///
    /// The pointer's high byte is fetched without carrying into the next page,
    /// so `JMP ($10FF)` reads its target from `$10FF` and `$1000`.
    Indirect,

    /// Pre-indexed indirect, `(zp,X)`.
    IndirectX,

    /// Post-indexed indirect, `(zp),Y`. One extra cycle on a page crossing.
    IndirectY,

    /// Post-indexed indirect that always spends the extra cycle.
    IndirectYException,
}

impl Addressing {
    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            Addressing::Implicit | Addressing::Accumulator => 0,
            Addressing::Immediate
            | Addressing::ZeroPage
            | Addressing::ZeroPageX
            | Addressing::ZeroPageY
            | Addressing::Relative
            | Addressing::IndirectX
            | Addressing::IndirectY
            | Addressing::IndirectYException => 1,
            Addressing::Absolute
            | Addressing::AbsoluteX
            | Addressing::AbsoluteXException
            | Addressing::AbsoluteY
            | Addressing::AbsoluteYException
            | Addressing::Indirect => 2,
        }
    }
}

impl Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Addressing::Implicit => "imp",
            Addressing::Accumulator => "acc",
            Addressing::Immediate => "imm",
            Addressing::ZeroPage => "zp",
            Addressing::ZeroPageX => "zp,x",
            Addressing::ZeroPageY => "zp,y",
            Addressing::Relative => "rel",
            Addressing::Absolute => "abs",
            Addressing::AbsoluteX | Addressing::AbsoluteXException => "abs,x",
            Addressing::AbsoluteY | Addressing::AbsoluteYException => "abs,y",
            Addressing::Indirect => "ind",
            Addressing::IndirectX => "(zp,x)",
            Addressing::IndirectY | Addressing::IndirectYException => "(zp),y",
        };
        f.write_str(name)
    }
}

/// True when adding `offset` to `addr` lands on a different 256-byte page.
pub(crate) const fn crosses_page(addr: u16, offset: u16) -> bool {
    (addr.wrapping_add(offset) & 0xFF00) != (addr & 0xFF00)
}
