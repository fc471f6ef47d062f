use std::{fs, path::Path};

use tracing::info;

use crate::{
    cartridge::header::{Header, NES_HEADER_LEN, TRAINER_LEN},
    error::{Error, Result},
};

pub mod header;
pub mod mapper;

pub use header::Mirroring;
pub use mapper::Mapper;

/// A loaded cartridge: the parsed header plus the board that owns the ROM.
#[derive(Debug)]
pub struct Cartridge {
    header: Header,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    pub fn new(header: Header, mapper: Box<dyn Mapper>) -> Self {
        Self { header, mapper }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    /// Power-on bank layout.
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    /// CPU `$6000-$FFFF`.
    pub fn prg_read(&self, addr: u16) -> u8 {
        self.mapper.prg_read(addr)
    }

    /// CPU `$6000-$FFFF`. Returns the new nametable arrangement when the
    /// write reprogrammed it.
    pub fn prg_write(&mut self, addr: u16, value: u8) -> Result<Option<Mirroring>> {
        self.mapper.prg_write(addr, value)
    }

    /// PPU `$0000-$1FFF`.
    pub fn chr_read(&self, addr: u16) -> u8 {
        self.mapper.chr_read(addr)
    }

    pub fn chr_write(&mut self, addr: u16, value: u8) -> Result<()> {
        self.mapper.chr_write(addr, value)
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }
}

impl Clone for Cartridge {
    fn clone(&self) -> Self {
        Self {
            header: self.header,
            mapper: dyn_clone::clone_box(&*self.mapper),
        }
    }
}

/// Load a cartridge from an in-memory iNES image.
pub fn load_cartridge(bytes: &[u8]) -> Result<Cartridge> {
    let header = Header::parse(bytes)?;
    let mut cursor = NES_HEADER_LEN;
    let trainer = if header.has_trainer {
        Some(section(bytes, &mut cursor, TRAINER_LEN, "trainer")?)
    } else {
        None
    };
    let prg = section(bytes, &mut cursor, header.prg_rom_size(), "PRG ROM")?;
    let chr = section(bytes, &mut cursor, header.chr_rom_size(), "CHR ROM")?;
    if prg.is_empty() {
        return Err(Error::SectionTooShort {
            section: "PRG ROM",
            expected: header::PRG_BANK_SIZE,
            actual: 0,
        });
    }

    info!(
        prg_banks = header.prg_banks,
        chr_banks = header.chr_banks,
        mapper = header.mapper,
        mirroring = ?header.mirroring,
        prg_ram_size = header.prg_ram_size,
        chr_ram = header.chr_ram(),
        "cartridge loaded"
    );

    let mut mapper = mapper::get_mapper(&header, prg.into(), chr.into())?;
    if let Some(trainer) = trainer {
        mapper.banks_mut().load_trainer(trainer);
    }
    Ok(Cartridge::new(header, mapper))
}

/// Load a cartridge directly from disk.
pub fn load_cartridge_from_file<P>(path: P) -> Result<Cartridge>
where
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    load_cartridge(&bytes)
}

fn section<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8]> {
    let start = *cursor;
    let end = start.saturating_add(len);
    let Some(slice) = bytes.get(start..end) else {
        return Err(Error::SectionTooShort {
            section: name,
            expected: len,
            actual: bytes.len().saturating_sub(start),
        });
    };
    *cursor = end;
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(mapper: u8, prg_banks: u8, chr_banks: u8, trainer: bool) -> Vec<u8> {
        let mut rom = vec![b'N', b'E', b'S', 0x1A, prg_banks, chr_banks];
        rom.push((mapper << 4) | if trainer { 0x04 } else { 0 });
        rom.push(mapper & 0xF0);
        rom.resize(NES_HEADER_LEN, 0);
        if trainer {
            rom.extend(std::iter::repeat_n(0xEE, TRAINER_LEN));
        }
        rom.extend(std::iter::repeat_n(0x11, prg_banks as usize * 0x4000));
        rom.extend(std::iter::repeat_n(0x22, chr_banks as usize * 0x2000));
        rom
    }

    #[test]
    fn loads_supported_boards() {
        for mapper in [0u8, 1, 2] {
            let cart = load_cartridge(&image(mapper, 2, 1, false)).expect("load");
            assert_eq!(cart.mapper().id(), mapper);
            assert_eq!(cart.prg_read(0x8000), 0x11);
            assert_eq!(cart.chr_read(0x0000), 0x22);
        }
    }

    #[test]
    fn unsupported_mapper_is_a_load_error() {
        assert!(matches!(
            load_cartridge(&image(4, 1, 1, false)),
            Err(Error::UnsupportedMapper(4))
        ));
    }

    #[test]
    fn truncated_sections_are_reported() {
        let mut rom = image(0, 2, 1, false);
        rom.truncate(NES_HEADER_LEN + 0x4000);
        assert!(matches!(
            load_cartridge(&rom),
            Err(Error::SectionTooShort { section: "PRG ROM", .. })
        ));
    }

    #[test]
    fn trainer_lands_in_prg_ram() {
        let cart = load_cartridge(&image(0, 1, 1, true)).expect("load");
        assert_eq!(cart.prg_read(0x7000), 0xEE);
        assert_eq!(cart.prg_read(0x71FF), 0xEE);
        assert_eq!(cart.prg_read(0x7200), 0x00);
        assert_eq!(cart.prg_read(0x8000), 0x11);
    }

    #[test]
    fn clone_owns_its_own_mapper_state() {
        let mut cart = load_cartridge(&image(2, 2, 0, false)).expect("load");
        cart.chr_write(0x0010, 0x5A).expect("chr ram");
        let mut twin = cart.clone();
        twin.chr_write(0x0010, 0xA5).expect("chr ram");
        assert_eq!(cart.chr_read(0x0010), 0x5A);
        assert_eq!(twin.chr_read(0x0010), 0xA5);
        assert_eq!(twin.mapper().id(), 2);
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        assert!(matches!(
            load_cartridge_from_file("/nonexistent/rom.nes"),
            Err(Error::Io(_))
        ));
    }
}
