use core::convert::TryFrom;
use core::fmt;

use crate::error::Error;

/// An enum representing the 35 instructions of chip-8 architecture
///
/// Based on [chip8 mastering](http://mattmik.com/files/chip8/mastering/chip8.html)
///
/// Examples:
/// ```
/// use core::convert::TryFrom;
/// use kiwi8::opcode::OpCode;
///
/// let instruction = 0xDAB5;
/// let opcode = OpCode::try_from(instruction).unwrap();
///
/// assert_eq!(
///     opcode,
///     OpCode::_DXYN { x: 0xA, y: 0xB, n: 0x5 },
/// );
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCode {
    /// Machine language subroutine at address NNN, 0x0000 is an idle cycle
    _0NNN { nnn: u16 },
    /// Clear the screen
    _00E0,
    /// Return from a subroutine
    _00EE,
    /// Jump to address NNN
    _1NNN { nnn: u16 },
    /// Execute subroutine starting at address NNN
    _2NNN { nnn: u16 },
    /// Skip the following instruction if the value of register VX equals NN
    _3XNN { x: u8, nn: u8 },
    /// Skip the following instruction if the value of register VX is not equal to NN
    _4XNN { x: u8, nn: u8 },
    /// Skip the following instruction if the value of register VX is equal to the value of register VY
    _5XY0 { x: u8, y: u8 },
    /// Store number NN in register VX
    _6XNN { x: u8, nn: u8 },
    /// Add the value NN to register VX
    _7XNN { x: u8, nn: u8 },
    /// Store the value of register VY in register VX
    _8XY0 { x: u8, y: u8 },
    /// Set VX to VX OR VY
    _8XY1 { x: u8, y: u8 },
    /// Set VX to VX AND VY
    _8XY2 { x: u8, y: u8 },
    /// Set VX to VX XOR VY
    _8XY3 { x: u8, y: u8 },
    /// Add the value of register VY to register VX, Set VF to 01 if a carry occurs, Set VF to 00 if a carry does not occur
    _8XY4 { x: u8, y: u8 },
    /// Subtract the value of register VY from register VX, Set VF to 00 if a borrow occurs, Set VF to 01 if a borrow does not occur
    _8XY5 { x: u8, y: u8 },
    /// Shift VX right by one bit, Set register VF to the least significant bit prior to the shift
    _8XY6 { x: u8, y: u8 },
    /// Set register VX to the value of VY minus VX, Set VF to 00 if a borrow occurs, Set VF to 01 if a borrow does not occur
    _8XY7 { x: u8, y: u8 },
    /// Shift VX left by one bit, Set register VF to the most significant bit prior to the shift
    _8XYE { x: u8, y: u8 },
    /// Skip the following instruction if the value of register VX is not equal to the value of register VY
    _9XY0 { x: u8, y: u8 },
    /// Store memory address NNN in register I
    _ANNN { nnn: u16 },
    /// Jump to address NNN + V0
    _BNNN { nnn: u16 },
    /// Set VX to a random number with a mask of NN
    _CXNN { x: u8, nn: u8 },
    /// Draw a sprite at position VX, VY with N bytes of sprite data starting at the address stored in I, Set VF to 01 if any set pixels are changed to unset, and 00 otherwise
    _DXYN { x: u8, y: u8, n: u8 },
    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is pressed
    _EX9E { x: u8 },
    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is not pressed
    _EXA1 { x: u8 },
    /// Store the current value of the delay timer in register VX
    _FX07 { x: u8 },
    /// Wait for a keypress and store the result in register VX
    _FX0A { x: u8 },
    /// Set the delay timer to the value of register VX
    _FX15 { x: u8 },
    /// Set the sound timer to the value of register VX
    _FX18 { x: u8 },
    /// Add the value stored in register VX to register I
    _FX1E { x: u8 },
    /// Set I to the memory address of the sprite data corresponding to the hexadecimal digit stored in register VX
    _FX29 { x: u8 },
    /// Store the binary-coded decimal equivalent of the value stored in register VX at addresses I, I+1, and I+2
    _FX33 { x: u8 },
    /// Store the values of registers V0 to VX inclusive in memory starting at address I
    _FX55 { x: u8 },
    /// Fill registers V0 to VX inclusive with the values stored in memory starting at address I
    _FX65 { x: u8 },
}

impl OpCode {
    fn read_first(raw: u16) -> u8 {
        (raw >> 12 & 0x000Fu16) as u8
    }

    fn read_last(raw: u16) -> u8 {
        (raw & 0x000Fu16) as u8
    }

    fn read_x(raw: u16) -> u8 {
        (raw >> 8 & 0x000Fu16) as u8
    }

    fn read_y(raw: u16) -> u8 {
        (raw >> 4 & 0x000Fu16) as u8
    }

    fn read_nn(raw: u16) -> u8 {
        (raw & 0x00FFu16) as u8
    }

    fn read_nnn(raw: u16) -> u16 {
        raw & 0x0FFFu16
    }
}

impl TryFrom<u16> for OpCode {
    type Error = Error;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        let x = Self::read_x(raw);
        let y = Self::read_y(raw);
        let nn = Self::read_nn(raw);
        let nnn = Self::read_nnn(raw);
        let opcode = match Self::read_first(raw) {
            0x0u8 => match nnn {
                0x0E0u16 => OpCode::_00E0,
                0x0EEu16 => OpCode::_00EE,
                nnn => OpCode::_0NNN { nnn },
            },
            0x1u8 => OpCode::_1NNN { nnn },
            0x2u8 => OpCode::_2NNN { nnn },
            0x3u8 => OpCode::_3XNN { x, nn },
            0x4u8 => OpCode::_4XNN { x, nn },
            0x5u8 if Self::read_last(raw) == 0 => OpCode::_5XY0 { x, y },
            0x6u8 => OpCode::_6XNN { x, nn },
            0x7u8 => OpCode::_7XNN { x, nn },
            0x8u8 => match Self::read_last(raw) {
                0x0u8 => OpCode::_8XY0 { x, y },
                0x1u8 => OpCode::_8XY1 { x, y },
                0x2u8 => OpCode::_8XY2 { x, y },
                0x3u8 => OpCode::_8XY3 { x, y },
                0x4u8 => OpCode::_8XY4 { x, y },
                0x5u8 => OpCode::_8XY5 { x, y },
                0x6u8 => OpCode::_8XY6 { x, y },
                0x7u8 => OpCode::_8XY7 { x, y },
                0xEu8 => OpCode::_8XYE { x, y },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            0x9u8 if Self::read_last(raw) == 0 => OpCode::_9XY0 { x, y },
            0xAu8 => OpCode::_ANNN { nnn },
            0xBu8 => OpCode::_BNNN { nnn },
            0xCu8 => OpCode::_CXNN { x, nn },
            0xDu8 => OpCode::_DXYN {
                x,
                y,
                n: Self::read_last(raw),
            },
            0xEu8 => match nn {
                0x9Eu8 => OpCode::_EX9E { x },
                0xA1u8 => OpCode::_EXA1 { x },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            0xFu8 => match nn {
                0x07u8 => OpCode::_FX07 { x },
                0x0Au8 => OpCode::_FX0A { x },
                0x15u8 => OpCode::_FX15 { x },
                0x18u8 => OpCode::_FX18 { x },
                0x1Eu8 => OpCode::_FX1E { x },
                0x29u8 => OpCode::_FX29 { x },
                0x33u8 => OpCode::_FX33 { x },
                0x55u8 => OpCode::_FX55 { x },
                0x65u8 => OpCode::_FX65 { x },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            _ => return Err(Error::UnknownOpcode(raw)),
        };
        Ok(opcode)
    }
}

/// Assembly-like mnemonics, used when tracing execution
impl fmt::Display for OpCode {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            OpCode::_0NNN { nnn: 0 }  => write!(f, "NOP"),
            OpCode::_0NNN { nnn }     => write!(f, "SYS {:#05X}", nnn),
            OpCode::_00E0             => write!(f, "CLS"),
            OpCode::_00EE             => write!(f, "RET"),
            OpCode::_1NNN { nnn }     => write!(f, "JP {:#05X}", nnn),
            OpCode::_2NNN { nnn }     => write!(f, "CALL {:#05X}", nnn),
            OpCode::_3XNN { x, nn }   => write!(f, "SE V{:X}, {:#04X}", x, nn),
            OpCode::_4XNN { x, nn }   => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            OpCode::_5XY0 { x, y }    => write!(f, "SE V{:X}, V{:X}", x, y),
            OpCode::_6XNN { x, nn }   => write!(f, "LD V{:X}, {:#04X}", x, nn),
            OpCode::_7XNN { x, nn }   => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            OpCode::_8XY0 { x, y }    => write!(f, "LD V{:X}, V{:X}", x, y),
            OpCode::_8XY1 { x, y }    => write!(f, "OR V{:X}, V{:X}", x, y),
            OpCode::_8XY2 { x, y }    => write!(f, "AND V{:X}, V{:X}", x, y),
            OpCode::_8XY3 { x, y }    => write!(f, "XOR V{:X}, V{:X}", x, y),
            OpCode::_8XY4 { x, y }    => write!(f, "ADD V{:X}, V{:X}", x, y),
            OpCode::_8XY5 { x, y }    => write!(f, "SUB V{:X}, V{:X}", x, y),
            OpCode::_8XY6 { x, .. }   => write!(f, "SHR V{:X}", x),
            OpCode::_8XY7 { x, y }    => write!(f, "SUBN V{:X}, V{:X}", x, y),
            OpCode::_8XYE { x, .. }   => write!(f, "SHL V{:X}", x),
            OpCode::_9XY0 { x, y }    => write!(f, "SNE V{:X}, V{:X}", x, y),
            OpCode::_ANNN { nnn }     => write!(f, "LD I, {:#05X}", nnn),
            OpCode::_BNNN { nnn }     => write!(f, "JP V0, {:#05X}", nnn),
            OpCode::_CXNN { x, nn }   => write!(f, "RND V{:X}, {:#04X}", x, nn),
            OpCode::_DXYN { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            OpCode::_EX9E { x }       => write!(f, "SKP V{:X}", x),
            OpCode::_EXA1 { x }       => write!(f, "SKNP V{:X}", x),
            OpCode::_FX07 { x }       => write!(f, "LD V{:X}, DT", x),
            OpCode::_FX0A { x }       => write!(f, "LD V{:X}, K", x),
            OpCode::_FX15 { x }       => write!(f, "LD DT, V{:X}", x),
            OpCode::_FX18 { x }       => write!(f, "LD ST, V{:X}", x),
            OpCode::_FX1E { x }       => write!(f, "ADD I, V{:X}", x),
            OpCode::_FX29 { x }       => write!(f, "LD F, V{:X}", x),
            OpCode::_FX33 { x }       => write!(f, "LD B, V{:X}", x),
            OpCode::_FX55 { x }       => write!(f, "LD [I], V{:X}", x),
            OpCode::_FX65 { x }       => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
