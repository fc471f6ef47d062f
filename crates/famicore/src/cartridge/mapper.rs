use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::{
    cartridge::header::{Header, Mirroring},
    error::{Error, Result},
    memory::cpu as cpu_mem,
};

pub mod bank_map;
pub mod mapper0;
pub mod mapper1;
pub mod mapper2;

pub use bank_map::BankMap;
pub use mapper0::Mapper0;
pub use mapper1::Mapper1;
pub use mapper2::Mapper2;

/// Cartridge board logic.
///
/// CPU addresses passed in are `$6000-$FFFF`; PPU addresses are
/// `$0000-$1FFF`. A write that changes nametable mirroring reports the new
/// arrangement so the caller can forward it to the PPU.
pub trait Mapper: DynClone + Debug {
    fn id(&self) -> u8;

    fn banks(&self) -> &BankMap;

    fn banks_mut(&mut self) -> &mut BankMap;

    /// Recomputes the bank tables from the power-on register state.
    fn reset(&mut self);

    fn mirroring(&self) -> Mirroring;

    fn prg_read(&self, addr: u16) -> u8 {
        if addr >= cpu_mem::PRG_ROM_START {
            self.banks().prg_read(addr)
        } else {
            self.banks().prg_ram_read(addr)
        }
    }

    /// PRG-RAM accepts writes on every board; ROM space only on boards with
    /// registers there.
    fn prg_write(&mut self, addr: u16, value: u8) -> Result<Option<Mirroring>> {
        if addr >= cpu_mem::PRG_ROM_START {
            return Err(Error::ReadOnlyWrite { addr, value });
        }
        self.banks_mut().prg_ram_write(addr, value);
        Ok(None)
    }

    fn chr_read(&self, addr: u16) -> u8 {
        self.banks().chr_read(addr)
    }

    fn chr_write(&mut self, addr: u16, value: u8) -> Result<()> {
        self.banks_mut().chr_write(addr, value)
    }
}

dyn_clone::clone_trait_object!(Mapper);

/// Builds the board named by the header, with its bank tables reset.
pub fn get_mapper(header: &Header, prg: Box<[u8]>, chr: Box<[u8]>) -> Result<Box<dyn Mapper>> {
    let banks = BankMap::new(header, prg, chr);
    let mut mapper: Box<dyn Mapper> = match header.mapper {
        0 => Box::new(Mapper0::new(banks, header.mirroring)),
        1 => Box::new(Mapper1::new(banks)),
        2 => Box::new(Mapper2::new(banks, header.mirroring)),
        other => return Err(Error::UnsupportedMapper(other)),
    };
    mapper.reset();
    Ok(mapper)
}
