//! Audio unit placeholder.
//!
//! Every CPU access to `$4000-$4013`, `$4015` and `$4017` (write) lands here
//! and is charged its bus cycle like any other access, but no sound is
//! generated. The elapsed-cycle argument is the position inside the current
//! frame budget, which a real channel implementation would use to schedule
//! register changes.

use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Apu;

impl Apu {
    pub fn new() -> Self {
        Self
    }

    /// `$4015` status read. Always `0` (no channel is ever active).
    pub fn read(&mut self, elapsed: i32) -> u8 {
        trace!(elapsed, "apu read");
        0
    }

    pub fn write(&mut self, elapsed: i32, addr: u16, value: u8) {
        trace!(
            elapsed,
            addr = format_args!("{addr:04X}"),
            value = format_args!("{value:02X}"),
            "apu write"
        );
    }
}
