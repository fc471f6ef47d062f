//! Interrupt lines shared between the PPU, the cartridge and the CPU.

/// Edge-latched NMI request.
///
/// The PPU raises it at the start of vertical blank (or when NMI is enabled
/// while vblank is already set); the CPU samples and clears it before each
/// instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NmiLine {
    pending: bool,
}

impl NmiLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self) {
        self.pending = true;
    }

    pub fn clear(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns whether an NMI was pending and clears the latch.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_a_single_edge() {
        let mut line = NmiLine::new();
        assert!(!line.take());
        line.raise();
        line.raise();
        assert!(line.is_pending());
        assert!(line.take());
        assert!(!line.take(), "a raised line is serviced once");
    }
}
