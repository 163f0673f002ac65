//! Policies for the conditions where legacy interpreters silently carry on.
//!
//! Stack and memory faults are always reported; the two policies below pick
//! between the tolerant legacy behaviour and an explicit error.

/// What `load` does with a program longer than the space above 0x200
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RomOverflow {
    /// Copy the prefix that fits and drop the rest
    Truncate,
    /// Fail with `Error::RomTooLarge`, leaving memory untouched
    Reject,
}

/// What `step` does with a bit pattern that is not an instruction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnknownOpcodes {
    /// Treat it as a no-op
    Ignore,
    /// Fail the step with `Error::UnknownOpcode`
    Reject,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    pub rom_overflow: RomOverflow,
    pub unknown_opcodes: UnknownOpcodes,
}

impl Config {
    /// Report every tolerated condition as an error
    pub const fn strict() -> Self {
        Self {
            rom_overflow: RomOverflow::Reject,
            unknown_opcodes: UnknownOpcodes::Reject,
        }
    }

    pub fn with_rom_overflow(mut self, rom_overflow: RomOverflow) -> Self {
        self.rom_overflow = rom_overflow;
        self
    }

    pub fn with_unknown_opcodes(mut self, unknown_opcodes: UnknownOpcodes) -> Self {
        self.unknown_opcodes = unknown_opcodes;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rom_overflow: RomOverflow::Truncate,
            unknown_opcodes: UnknownOpcodes::Ignore,
        }
    }
}
