//! Flat 4 KiB address space of the interpreter.

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::config::RomOverflow;
use crate::error::{Error, Result};

pub const MEMORY_SIZE: usize = 4096;
/// Load address of programs (_start address)
pub const PROGRAM_START: u16 = 0x200;
/// Largest program that fits above `PROGRAM_START`
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
/// Bytes taken by one glyph of the built-in font
pub const GLYPH_SIZE: u16 = 5;

/// Hexadecimal digits 0-F, glyph `d` lives at `d * GLYPH_SIZE`
#[rustfmt::skip]
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[derive(Clone)]
pub struct Memory([u8; MEMORY_SIZE]);

impl Memory {
    /// Zeroed memory with the font in place
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..FONT.len()].copy_from_slice(&FONT);
        Self(memory)
    }

    /// Copy program to memory from 0x200, returns the number of bytes copied
    pub fn load(&mut self, prog: &[u8], policy: RomOverflow) -> Result<usize> {
        if prog.len() > MAX_PROGRAM_SIZE {
            match policy {
                RomOverflow::Reject => {
                    return Err(Error::RomTooLarge {
                        len: prog.len(),
                        max: MAX_PROGRAM_SIZE,
                    })
                }
                RomOverflow::Truncate => warn!(
                    "program of {} bytes truncated to {} bytes",
                    prog.len(),
                    MAX_PROGRAM_SIZE
                ),
            }
        }
        let copied = self.0[PROGRAM_START as usize..]
            .iter_mut()
            .zip(prog)
            .map(|(mem, &byte)| *mem = byte)
            .count();
        Ok(copied)
    }

    /// Big-endian instruction word at `addr` and `addr + 1`
    pub fn read_opcode(&self, addr: u16) -> Result<u16> {
        let bytes = self.slice(addr, 2)?;
        Ok(u16::from(bytes[0]) << 8 | u16::from(bytes[1]))
    }

    /// `len` bytes starting at `addr`, all of which must be addressable
    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let range = Self::range(addr, len)?;
        Ok(&self.0[range])
    }

    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let range = Self::range(addr, len)?;
        Ok(&mut self.0[range])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.0
    }

    fn range(addr: u16, len: usize) -> Result<core::ops::Range<usize>> {
        let start = addr as usize;
        let end = start + len;
        if end > MEMORY_SIZE {
            Err(Error::MemoryOutOfRange {
                addr: start.max(MEMORY_SIZE),
            })
        } else {
            Ok(start..end)
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Memory {
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}
