use thiserror::Error;

use crate::cartridge::header::NES_HEADER_LEN;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Every condition that stops the emulator.
///
/// Load-time variants come from parsing a ROM image; the rest are raised while
/// a frame is running and mean either a corrupt program or an emulation bug.
/// None of them are recoverable: the caller gets the error and the system is
/// left exactly where it stopped.
#[derive(Error, Debug)]
pub enum Error {
    /// Provided buffer is shorter than the 16-byte header.
    #[error("header expected {NES_HEADER_LEN} bytes, got {actual}")]
    TooShort { actual: usize },
    /// Magic number ("NES<EOF>") is missing.
    #[error("missing NES magic bytes")]
    InvalidMagic,
    /// A ROM section (PRG/CHR) is shorter than the header advertises.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The header names a mapper board that is not emulated.
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),
    /// Wrapper for I/O errors raised while reading ROMs from disk.
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
    /// The system was asked to run before a cartridge was inserted.
    #[error("no cartridge inserted")]
    NoCartridge,

    /// CPU read decoded to an unmapped region.
    #[error("illegal read at ${addr:04X}")]
    UnmappedRead { addr: u16 },
    /// CPU write decoded to an unmapped region.
    #[error("illegal write at ${addr:04X}")]
    UnmappedWrite { addr: u16 },
    /// Fetched opcode has no entry in the instruction table.
    #[error("invalid opcode ${opcode:02X} at ${pc:04X}")]
    InvalidOpcode { opcode: u8, pc: u16 },
    /// Write to ROM-backed cartridge storage on a board that cannot accept it.
    #[error("write of ${value:02X} to read-only cartridge space at ${addr:04X}")]
    ReadOnlyWrite { addr: u16, value: u8 },
}
