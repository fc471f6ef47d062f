//! Picture Processing Unit (2C02).
//!
//! The PPU is stepped one dot at a time by the CPU bus (three dots per CPU
//! cycle). A frame is 262 scanlines of 341 dots:
//!
//! | Scanline | Role                                               |
//! |----------|----------------------------------------------------|
//! | 0-239    | Visible: fetch background and sprites, emit pixels |
//! | 240      | Post-render: the finished frame is presented       |
//! | 241      | Vertical blank starts at dot 1 (NMI)               |
//! | 261      | Pre-render: flags cleared, `v` re-latched from `t` |
//!
//! Pixels are produced two dots behind the fetch position (dot 2 emits
//! column 0), which is why the pipeline below runs from dot 2 to 257 and
//! the two-tile prefetch runs at 321-337.
//!
//! The PPU owns its registers, nametable RAM, palette RAM, OAM and the
//! framebuffer. Pattern data, the NMI line and the frame sink are reached
//! through the per-call [`PpuBus`] view.

pub mod background;
pub mod palette;
pub mod pattern_bus;
pub mod registers;
pub mod sprite;

use core::fmt;

use tracing::debug;

use crate::{
    cartridge::Mirroring,
    config::Region,
    error::Result,
    memory::ppu::{self as ppu_mem, Register as PpuRegister},
};
use background::Background;
use palette::PaletteRam;
pub use pattern_bus::PpuBus;
use registers::{Mask, Registers, Status};
use sprite::SpriteUnit;

pub const FRAME_WIDTH: usize = 256;
pub const FRAME_HEIGHT: usize = 240;

/// One frame of packed `0x00RRGGBB` pixels, row-major.
pub type FrameBuffer = [u32; FRAME_WIDTH * FRAME_HEIGHT];

const DOTS_PER_SCANLINE: u16 = Region::Ntsc.dots_per_scanline();
const SCANLINES_PER_FRAME: u16 = Region::Ntsc.scanlines();
const POST_RENDER_LINE: u16 = 240;
const VBLANK_LINE: u16 = 241;
const PRE_RENDER_LINE: u16 = SCANLINES_PER_FRAME - 1;

#[derive(Clone)]
pub struct Ppu {
    registers: Registers,
    /// 2 KiB of console nametable RAM.
    ciram: [u8; ppu_mem::CIRAM_SIZE],
    palette: PaletteRam,
    oam: [u8; ppu_mem::OAM_RAM_SIZE],
    sprites: SpriteUnit,
    background: Background,
    mirroring: Mirroring,
    framebuffer: Box<FrameBuffer>,

    scanline: u16,
    dot: u16,
    odd_frame: bool,
    frame: u64,
}

impl fmt::Debug for Ppu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ppu")
            .field("registers", &self.registers)
            .field("mirroring", &self.mirroring)
            .field("scanline", &self.scanline)
            .field("dot", &self.dot)
            .field("odd_frame", &self.odd_frame)
            .field("frame", &self.frame)
            .finish()
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            registers: Registers::default(),
            ciram: [0xFF; ppu_mem::CIRAM_SIZE],
            palette: PaletteRam::default(),
            oam: [0; ppu_mem::OAM_RAM_SIZE],
            sprites: SpriteUnit::default(),
            background: Background::default(),
            mirroring: Mirroring::Horizontal,
            framebuffer: Box::new([0; FRAME_WIDTH * FRAME_HEIGHT]),
            scanline: 0,
            dot: 0,
            odd_frame: false,
            frame: 0,
        }
    }

    /// Power-on state. Mirroring is kept; the cartridge pushes its own after reset.
    pub fn reset(&mut self) {
        let mirroring = self.mirroring;
        *self = Self::new();
        self.mirroring = mirroring;
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        if self.mirroring != mirroring {
            debug!(?mirroring, "nametable mirroring changed");
        }
        self.mirroring = mirroring;
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Frames completed since power-on.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn oam(&self) -> &[u8; ppu_mem::OAM_RAM_SIZE] {
        &self.oam
    }

    /// CPU read of `$2000-$3FFF` (already reduced to the register index).
    pub fn cpu_read(&mut self, addr: u16, bus: &mut PpuBus<'_>) -> u8 {
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Status => return self.registers.read_status(),
            PpuRegister::OamData => {
                self.registers.latch = self.oam[self.registers.oam_addr as usize];
            }
            PpuRegister::Data => {
                let v = self.registers.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
                let value = self.read(bus, v);
                self.registers.latch = if v < ppu_mem::PALETTE_BASE {
                    std::mem::replace(&mut self.registers.read_buffer, value)
                } else {
                    // Palette reads are immediate; the buffer picks up the
                    // nametable byte underneath.
                    self.registers.read_buffer = self.read(bus, v & 0x2FFF);
                    value
                };
                self.increment_vram_addr();
            }
            // Write-only ports return whatever is left on the data bus.
            _ => {}
        }
        self.registers.latch
    }

    /// CPU write of `$2000-$3FFF`.
    pub fn cpu_write(&mut self, addr: u16, value: u8, bus: &mut PpuBus<'_>) -> Result<()> {
        self.registers.latch = value;
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Control => {
                let was_enabled = self.registers.control.nmi_enabled();
                self.registers.write_control(value);
                if !was_enabled
                    && self.registers.control.nmi_enabled()
                    && self.registers.status.contains(Status::VERTICAL_BLANK)
                {
                    bus.raise_nmi();
                }
            }
            PpuRegister::Mask => self.registers.mask = Mask::from_bits_retain(value),
            PpuRegister::Status => {}
            PpuRegister::OamAddr => self.registers.oam_addr = value,
            PpuRegister::OamData => {
                self.oam[self.registers.oam_addr as usize] = value;
                self.registers.oam_addr = self.registers.oam_addr.wrapping_add(1);
            }
            PpuRegister::Scroll => self.registers.vram.write_scroll(value),
            PpuRegister::Addr => self.registers.vram.write_addr(value),
            PpuRegister::Data => {
                let v = self.registers.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
                self.write(bus, v, value)?;
                self.increment_vram_addr();
            }
        }
        Ok(())
    }

    fn increment_vram_addr(&mut self) {
        let step = self.registers.control.vram_increment();
        self.registers.vram.v.increment(step);
    }

    fn read(&self, bus: &PpuBus<'_>, addr: u16) -> u8 {
        match addr & ppu_mem::VRAM_MIRROR_MASK {
            a @ 0x0000..=ppu_mem::PATTERN_TABLE_END => bus.chr_read(a),
            a @ ppu_mem::NAMETABLE_BASE..=0x3EFF => self.ciram[self.mirroring.ciram_offset(a)],
            a => {
                let grayscale = self.registers.mask.contains(Mask::GRAYSCALE);
                self.palette.read(a, grayscale)
            }
        }
    }

    fn write(&mut self, bus: &mut PpuBus<'_>, addr: u16, value: u8) -> Result<()> {
        match addr & ppu_mem::VRAM_MIRROR_MASK {
            a @ 0x0000..=ppu_mem::PATTERN_TABLE_END => bus.chr_write(a, value)?,
            a @ ppu_mem::NAMETABLE_BASE..=0x3EFF => {
                self.ciram[self.mirroring.ciram_offset(a)] = value;
            }
            a => self.palette.write(a, value),
        }
        Ok(())
    }

    fn rendering(&self) -> bool {
        self.registers.mask.rendering_enabled()
    }

    /// Advances one dot.
    pub fn step(&mut self, bus: &mut PpuBus<'_>) {
        if self.scanline == 0 && self.dot == 0 && self.odd_frame && self.rendering() {
            // Odd frames drop the idle dot 0 of the first line.
            self.dot = 1;
        }

        match self.scanline {
            0..POST_RENDER_LINE => self.render_dot(bus, false),
            POST_RENDER_LINE if self.dot == 0 => bus.present(&self.framebuffer),
            VBLANK_LINE if self.dot == 1 => {
                self.registers.status.insert(Status::VERTICAL_BLANK);
                if self.registers.control.nmi_enabled() {
                    bus.raise_nmi();
                }
            }
            PRE_RENDER_LINE => self.render_dot(bus, true),
            _ => {}
        }

        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.odd_frame = !self.odd_frame;
                self.frame += 1;
            }
        }
    }

    /// Work shared by the visible lines and the pre-render line.
    fn render_dot(&mut self, bus: &PpuBus<'_>, pre_render: bool) {
        let line = self.scanline as i32;
        let height = self.registers.control.sprite_height();
        match self.dot {
            1 => {
                self.sprites.clear_secondary();
                if pre_render {
                    self.registers.status.remove(
                        Status::SPRITE_OVERFLOW | Status::SPRITE_ZERO_HIT | Status::VERTICAL_BLANK,
                    );
                }
            }
            257 => {
                let next = if pre_render { -1 } else { line };
                if self.sprites.evaluate(&self.oam, next, height) {
                    self.registers.status.insert(Status::SPRITE_OVERFLOW);
                }
            }
            321 => {
                let table = self.registers.control.sprite_pattern_table();
                self.sprites.load(line, height, table, |addr| {
                    bus.chr_read(addr & ppu_mem::PATTERN_TABLE_END)
                });
            }
            _ => {}
        }

        match self.dot {
            2..=255 | 322..=337 => {
                self.pixel();
                self.fetch_tile_step(bus);
            }
            256 => {
                self.pixel();
                self.background.tile_hi = self.read(bus, self.background.addr);
                self.increment_y();
            }
            257 => {
                self.pixel();
                self.background.reload();
                self.copy_horizontal();
            }
            280..=304 if pre_render => self.copy_vertical(),
            1 | 321 | 339 => self.background.addr = self.registers.vram.v.tile_addr(),
            338 | 340 => self.background.nametable = self.read(bus, self.background.addr),
            _ => {}
        }
    }

    /// One step of the eight-dot background fetch cycle.
    fn fetch_tile_step(&mut self, bus: &PpuBus<'_>) {
        let v = self.registers.vram.v;
        match self.dot % 8 {
            1 => {
                self.background.addr = v.tile_addr();
                self.background.reload();
            }
            2 => self.background.nametable = self.read(bus, self.background.addr),
            3 => self.background.addr = v.attribute_addr(),
            4 => {
                let value = self.read(bus, self.background.addr);
                self.background
                    .store_attribute(value, v.coarse_x(), v.coarse_y());
            }
            5 => {
                self.background.addr = self.registers.control.background_pattern_table()
                    | ((self.background.nametable as u16) << 4)
                    | v.fine_y() as u16;
            }
            6 => self.background.tile_lo = self.read(bus, self.background.addr),
            7 => self.background.addr += 8,
            _ => {
                self.background.tile_hi = self.read(bus, self.background.addr);
                self.increment_x();
            }
        }
    }

    fn increment_x(&mut self) {
        if self.rendering() {
            self.registers.vram.v.increment_x();
        }
    }

    fn increment_y(&mut self) {
        if self.rendering() {
            self.registers.vram.v.increment_y();
        }
    }

    fn copy_horizontal(&mut self) {
        if self.rendering() {
            let t = self.registers.vram.t;
            self.registers.vram.v.copy_horizontal(t);
        }
    }

    fn copy_vertical(&mut self) {
        if self.rendering() {
            let t = self.registers.vram.t;
            self.registers.vram.v.copy_vertical(t);
        }
    }

    /// Composes the pixel for column `dot - 2` and shifts the background.
    fn pixel(&mut self) {
        let x = self.dot as usize - 2;
        if (self.scanline as usize) < FRAME_HEIGHT && x < FRAME_WIDTH {
            let mask = self.registers.mask;
            let mut color = 0;
            if mask.background_visible_at(x) {
                color = self.background.pixel(self.registers.vram.x);
            }

            let mut sprite_color = 0;
            let mut behind = false;
            if mask.sprites_visible_at(x) {
                // Lower OAM index wins, so walk from the back.
                for sprite in self.sprites.active().rev() {
                    let Some(pattern) = sprite.color_at(x).filter(|&c| c != 0) else {
                        continue;
                    };
                    if sprite.id == 0 && color != 0 && x != 255 {
                        self.registers.status.insert(Status::SPRITE_ZERO_HIT);
                    }
                    let palette = sprite.attr.bits() & 0b11;
                    sprite_color = 0x10 | (palette << 2) | pattern;
                    behind = sprite
                        .attr
                        .contains(sprite::SpriteAttributes::BEHIND_BACKGROUND);
                }
            }
            if sprite_color != 0 && (color == 0 || !behind) {
                color = sprite_color;
            }

            let index = if self.rendering() { color as u16 } else { 0 };
            let grayscale = mask.contains(Mask::GRAYSCALE);
            let value = self.palette.read(ppu_mem::PALETTE_BASE + index, grayscale);
            self.framebuffer[self.scanline as usize * FRAME_WIDTH + x] = palette::rgb(value);
        }
        self.background.shift();
    }
}
