use bitflags::bitflags;

bitflags! {
    /// Represents the 8-bit processor status register (P) of the NES CPU.
    ///
    /// Bit layout:
    /// 7 6 5 4 3 2 1 0
    /// N V _ B D I Z C
    ///
    /// `BREAK` and `UNUSED` have no storage in the live register. They only
    /// appear in copies of P pushed to the stack or shown to an observer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Carry flag (C)
        const CARRY     = 0b0000_0001;

        /// Zero flag (Z)
        const ZERO      = 0b0000_0010;

        /// Interrupt Disable flag (I)
        /// When set, maskable interrupts (IRQ) are ignored.
        const INTERRUPT = 0b0000_0100;

        /// Decimal Mode flag (D)
        /// Settable and clearable, but the NES CPU never performs BCD arithmetic.
        const DECIMAL   = 0b0000_1000;

        /// Break Command flag (B), stack copies only.
        const BREAK     = 0b0001_0000;

        /// Unused bit, reads as 1 whenever P is observed.
        const UNUSED    = 0b0010_0000;

        /// Overflow flag (V)
        const OVERFLOW  = 0b0100_0000;

        /// Negative flag (N)
        const NEGATIVE  = 0b1000_0000;
    }
}

/// Bits of P that are backed by real storage.
const STORED_BITS: u8 = 0xCF;

impl Status {
    /// Loads P from a byte (`PLP`, `RTI`, power-on), dropping `B` and `U`.
    pub fn from_stack(byte: u8) -> Self {
        Status::from_bits_truncate(byte & STORED_BITS)
    }

    /// P as software sees it: the unused bit always reads back as 1.
    pub fn observed(self) -> u8 {
        (self | Status::UNUSED).bits()
    }

    /// Value pushed by `PHP` and `BRK`.
    pub fn pushed_with_break(self) -> u8 {
        (self | Status::BREAK | Status::UNUSED).bits()
    }

    /// Set or clear Zero and Negative from a result byte.
    pub fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    pub fn c(self) -> bool {
        self.contains(Status::CARRY)
    }

    pub fn z(self) -> bool {
        self.contains(Status::ZERO)
    }

    pub fn i(self) -> bool {
        self.contains(Status::INTERRUPT)
    }

    pub fn v(self) -> bool {
        self.contains(Status::OVERFLOW)
    }

    pub fn n(self) -> bool {
        self.contains(Status::NEGATIVE)
    }
}
