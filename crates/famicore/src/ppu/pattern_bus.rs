use crate::{
    cartridge::Cartridge,
    error::Result,
    host::FrameSink,
    interrupt::NmiLine,
    ppu::FrameBuffer,
};

/// Temporary view that lets the PPU reach the cartridge CHR space, the NMI
/// line and the frame sink without storing pointers to any of them.
///
/// The bus creates one of these per PPU call, so lifetimes remain explicit
/// and borrow-checked.
pub struct PpuBus<'a> {
    cartridge: Option<&'a mut Cartridge>,
    nmi: &'a mut NmiLine,
    sink: &'a mut dyn FrameSink,
}

impl<'a> PpuBus<'a> {
    pub fn new(
        cartridge: Option<&'a mut Cartridge>,
        nmi: &'a mut NmiLine,
        sink: &'a mut dyn FrameSink,
    ) -> Self {
        Self {
            cartridge,
            nmi,
            sink,
        }
    }

    /// Pattern read; open bus reads as `0` without a cartridge.
    pub fn chr_read(&self, addr: u16) -> u8 {
        self.cartridge
            .as_deref()
            .map_or(0, |cart| cart.chr_read(addr))
    }

    pub fn chr_write(&mut self, addr: u16, value: u8) -> Result<()> {
        match self.cartridge.as_deref_mut() {
            Some(cart) => cart.chr_write(addr, value),
            None => Ok(()),
        }
    }

    pub fn raise_nmi(&mut self) {
        self.nmi.raise();
    }

    pub fn present(&mut self, frame: &FrameBuffer) {
        self.sink.present(frame);
    }
}
