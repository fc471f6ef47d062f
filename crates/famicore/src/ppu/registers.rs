//! CPU-visible PPU register state and the internal `v/t/x/w` scroll latches.
//!
//! The concrete bit layouts live in submodules.

mod control;
mod mask;
mod status;
mod vram_addr;

pub use control::Control;
pub use mask::Mask;
pub use status::Status;
pub use vram_addr::VramAddr;

/// Internal VRAM register block matching the NESDev `v/t/x/w` terminology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramRegisters {
    /// Current VRAM address (`v`).
    pub(crate) v: VramAddr,
    /// Temporary VRAM address (`t`).
    pub(crate) t: VramAddr,
    /// Fine X scroll (`x`, 0..7).
    pub(crate) x: u8,
    /// Write toggle (`w`): false => first write, true => second write.
    pub(crate) w: bool,
}

impl VramRegisters {
    /// `$2005`: fine/coarse X on the first write, fine/coarse Y on the second.
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if !self.w {
            self.t.set_coarse_x(value >> 3);
            self.x = value & 0b111;
        } else {
            self.t.set_coarse_y(value >> 3);
            self.t.set_fine_y(value & 0b111);
        }
        self.w = !self.w;
    }

    /// `$2006`: high six bits then low byte of `t`; the second write also
    /// loads `v`.
    pub(crate) fn write_addr(&mut self, value: u8) {
        if !self.w {
            let hi = u16::from(value & 0b0011_1111) << 8;
            let lo = self.t.raw() & 0x00FF;
            self.t.set_raw(hi | lo);
        } else {
            let hi = self.t.raw() & 0x7F00;
            self.t.set_raw(hi | u16::from(value));
            self.v = self.t;
        }
        self.w = !self.w;
    }
}

/// Aggregates the state of all CPU visible PPU registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct Registers {
    pub(crate) control: Control,
    pub(crate) mask: Mask,
    pub(crate) status: Status,
    pub(crate) oam_addr: u8,
    pub(crate) vram: VramRegisters,
    /// Delayed `$2007` read buffer.
    pub(crate) read_buffer: u8,
    /// Last value driven onto the PPU data bus by any register access.
    pub(crate) latch: u8,
}

impl Registers {
    /// `$2000`. Also copies the nametable bits into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram.t.set_nametable(self.control.nametable_index());
    }

    /// `$2002`: status bits over the latch's low five, with the read side
    /// effects applied.
    pub(crate) fn read_status(&mut self) -> u8 {
        self.latch = (self.latch & 0x1F) | self.status.bits();
        self.status.remove(Status::VERTICAL_BLANK);
        self.vram.w = false;
        self.latch
    }
}
