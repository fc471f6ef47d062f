//! Standard controller pair behind `$4016/$4017`.
//!
//! Writing bit 0 of `$4016` drives the shared strobe. On the falling edge
//! both pads are sampled from the [`Input`] collaborator into 8-bit shift
//! registers, which each read of `$4016`/`$4017` then drains one bit at a
//! time (A, B, Select, Start, Up, Down, Left, Right).

use crate::host::Input;

/// Upper data-bus bits float high on the controller ports.
const OPEN_BUS: u8 = 0x40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Controller {
    strobe: bool,
    shift: [u8; 2],
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$4016` write. Latches both pads when the strobe goes high to low.
    pub fn write(&mut self, value: u8, input: &impl Input) {
        let strobe = value & 0x01 != 0;
        if self.strobe && !strobe {
            self.shift = [input.controller(0), input.controller(1)];
        }
        self.strobe = strobe;
    }

    /// `$4016` (port 0) or `$4017` (port 1) read.
    ///
    /// While strobe is held high the A button is reported live. Otherwise the
    /// next bit is shifted out; zeros fill in behind it.
    pub fn read(&mut self, port: usize, input: &impl Input) -> u8 {
        if self.strobe {
            return OPEN_BUS | (input.controller(port) & 0x01);
        }
        let Some(shift) = self.shift.get_mut(port) else {
            return OPEN_BUS;
        };
        let bit = *shift & 0x01;
        *shift >>= 1;
        OPEN_BUS | bit
    }

    /// Side-effect-free view of the next bit `read` would return.
    pub fn peek(&self, port: usize) -> u8 {
        OPEN_BUS | (self.shift.get(port).copied().unwrap_or(0) & 0x01)
    }
}
