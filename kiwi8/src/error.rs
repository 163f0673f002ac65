use core::fmt;

/// Faults reported by `Kiwi8`
///
/// A failed `step` leaves the interpreter exactly as it was before the
/// faulting instruction was fetched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Fetch or opcode-driven memory access outside of 0x000..=0xFFF
    MemoryOutOfRange { addr: usize },
    /// Subroutine call with all 16 stack slots taken
    StackOverflow,
    /// Return from a subroutine with an empty stack
    StackUnderflow,
    /// Program does not fit between 0x200 and the end of memory
    RomTooLarge { len: usize, max: usize },
    /// Bit pattern that is not a CHIP-8 instruction
    UnknownOpcode(u16),
    /// `Builder` was asked to build without a context
    ContextNotProvided,
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::MemoryOutOfRange { addr } => {
                write!(f, "Attempted to access memory out of address space at {:#06X}", addr)
            }
            Error::StackOverflow => write!(f, "Cannot enter subroutine, stack is full"),
            Error::StackUnderflow => write!(f, "Can't return. Not in subroutine"),
            Error::RomTooLarge { len, max } => {
                write!(f, "Program of {} bytes does not fit in {} bytes of memory", len, max)
            }
            Error::UnknownOpcode(raw) => write!(f, "Unknown operation code {:#06X}", raw),
            Error::ContextNotProvided => write!(f, "Context not provided"),
        }
    }
}
