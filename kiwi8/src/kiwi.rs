use core::convert::TryFrom;

use heapless::{consts::U16, Vec};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::config::{Config, UnknownOpcodes};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::frame::{Frame, FrameView};
use crate::keypad::{Keypad, KEYS};
use crate::memory::{Memory, GLYPH_SIZE, PROGRAM_START};
use crate::opcode::OpCode;
use crate::timer::{Timer, TimerState};

/// Maximal depth of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

const VF: usize = 0xF;

/// Execution state of the interpreter
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Fetching and executing instructions
    Running,
    /// Halted on FX0A until a key is pressed, the key goes to VX
    AwaitingKey { x: u8 },
}

/// CHIP-8 interpreter
///
/// Owns the whole machine state. The host drives it with two independent
/// clocks: `step` for instruction cycles (usually ~500Hz) and `tick_timers`
/// for the 60Hz delay and sound timers.
pub struct Kiwi8<C: Context + Sized> {
    ctx: C,
    config: Config,
    v: [u8; 16],
    i: u16,
    pc: u16,
    frame: Frame,
    memory: Memory,
    stack: Vec<u16, U16>,
    keypad: Keypad,
    delay_timer: Timer,
    sound_timer: Timer,
    status: Status,
}

impl<C: Context + Sized> Kiwi8<C> {
    pub fn new(ctx: C) -> Self {
        Self::with_config(ctx, Config::default())
    }

    pub fn with_config(ctx: C, config: Config) -> Self {
        Self {
            ctx,
            config,
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            frame: Frame::new(),
            memory: Memory::new(),
            stack: Vec::new(),
            keypad: Keypad::new(),
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
            status: Status::Running,
        }
    }

    /// Bring every register, memory cell, pixel, key and timer back to its
    /// startup value. Context and config are kept.
    pub fn reset(&mut self) {
        debug!("resetting interpreter");
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.frame.clear();
        self.memory = Memory::new();
        self.stack = Vec::new();
        self.keypad = Keypad::new();
        self.delay_timer = Timer::new();
        self.sound_timer = Timer::new();
        self.status = Status::Running;
    }

    /// Load program from slice of bytes to memory from 0x200 (_start address)
    ///
    /// Returns the number of bytes copied, oversized programs are handled
    /// according to `Config::rom_overflow`.
    pub fn load(&mut self, prog: &[u8]) -> Result<usize> {
        let copied = self.memory.load(prog, self.config.rom_overflow)?;
        // a pending FX0A refers to code that may be gone now
        self.status = Status::Running;
        debug!("loaded {} bytes at {:#05X}", copied, PROGRAM_START);
        Ok(copied)
    }

    /// Run a single instruction cycle
    ///
    /// While waiting for a key (FX0A) every call polls the keypad and
    /// returns `WouldBlock` until some key is pressed. On error the state is
    /// left as it was before the faulting instruction.
    pub fn step(&mut self) -> nb::Result<(), Error> {
        if let Status::AwaitingKey { x } = self.status {
            return self.poll_key(x);
        }

        let pc = self.pc;
        match self.cycle() {
            Ok(()) => match self.status {
                Status::Running => Ok(()),
                Status::AwaitingKey { .. } => {
                    // FX0A does not retire until a key shows up
                    self.pc = pc;
                    Err(nb::Error::WouldBlock)
                }
            },
            Err(err) => {
                self.pc = pc;
                error!("fault at {:#05X}: {}", pc, err);
                Err(nb::Error::Other(err))
            }
        }
    }

    /// Decrement delay and sound timers
    ///
    /// Returns `true` when the sound timer runs out on this tick, which is
    /// when the host should beep.
    pub fn tick_timers(&mut self) -> bool {
        self.delay_timer.decrement();
        self.sound_timer.decrement() == TimerState::Finished
    }

    /// Update state of one of the 16 keys, other indexes are ignored
    pub fn set_key(&mut self, key: usize, pressed: bool) {
        if !self.keypad.set(key, pressed) {
            debug!("ignoring state of nonexistent key {:#X}", key);
        }
    }

    /// Current content of the display
    pub fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    /// General purpose registers V0..=VF
    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    /// Return addresses, innermost call last
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.load()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.load()
    }

    pub fn keys(&self) -> &[bool; KEYS] {
        self.keypad.as_array()
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_raw()
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    /// Tear the interpreter down, handing the context back
    pub fn into_context(self) -> C {
        self.ctx
    }

    fn cycle(&mut self) -> Result<()> {
        let raw = self.fetch()?;
        match OpCode::try_from(raw) {
            Ok(opcode) => {
                trace!("{:#05X}: {:04X} {}", self.pc - 2, raw, opcode);
                self.execute(opcode)
            }
            Err(_) => self.unknown_opcode(raw),
        }
    }

    /// Read the instruction at pc and move pc past it
    fn fetch(&mut self) -> Result<u16> {
        let raw = self.memory.read_opcode(self.pc)?;
        self.pc_increment();
        Ok(raw)
    }

    fn pc_increment(&mut self) {
        self.pc += 2;
    }

    fn unknown_opcode(&self, raw: u16) -> Result<()> {
        match self.config.unknown_opcodes {
            UnknownOpcodes::Ignore => {
                warn!("ignoring unknown opcode {:04X}", raw);
                Ok(())
            }
            UnknownOpcodes::Reject => Err(Error::UnknownOpcode(raw)),
        }
    }

    fn poll_key(&mut self, x: u8) -> nb::Result<(), Error> {
        match self.keypad.first_pressed() {
            Some(key) => {
                debug!("key {:#X} pressed, resuming", key);
                self.v[x as usize] = key;
                self.pc_increment();
                self.status = Status::Running;
                Ok(())
            }
            None => Err(nb::Error::WouldBlock),
        }
    }
}


// OpCodes impls
impl<C: Context + Sized> Kiwi8<C> {
    #[rustfmt::skip]
    fn execute(&mut self, opcode: OpCode) -> Result<()> {
        match opcode {
            OpCode::_0NNN { nnn }     => self.exec_ml_subroutine_at(nnn),
            OpCode::_00E0             => self.clear_screen(),
            OpCode::_00EE             => self.subroutine_return(),
            OpCode::_1NNN { nnn }     => self.jump_to(nnn),
            OpCode::_2NNN { nnn }     => self.exec_subroutine_at(nnn),
            OpCode::_3XNN { x, nn }   => self.skip_if_vx_eq_nn(x, nn),
            OpCode::_4XNN { x, nn }   => self.skip_if_vx_ne_nn(x, nn),
            OpCode::_5XY0 { x, y }    => self.skip_if_vx_eq_vy(x, y),
            OpCode::_6XNN { x, nn }   => self.assign_vx_nn(x, nn),
            OpCode::_7XNN { x, nn }   => self.assign_add_vx_nn(x, nn),
            OpCode::_8XY0 { x, y }    => self.assign_vx_vy(x, y),
            OpCode::_8XY1 { x, y }    => self.assign_or_vx_vy(x, y),
            OpCode::_8XY2 { x, y }    => self.assign_and_vx_vy(x, y),
            OpCode::_8XY3 { x, y }    => self.assign_xor_vx_vy(x, y),
            OpCode::_8XY4 { x, y }    => self.assign_add_vx_vy(x, y),
            OpCode::_8XY5 { x, y }    => self.assign_sub_vx_vy(x, y),
            OpCode::_8XY6 { x, .. }   => self.assign_vx_shifted_r(x),
            OpCode::_8XY7 { x, y }    => self.assign_vx_vy_sub_vx(x, y),
            OpCode::_8XYE { x, .. }   => self.assign_vx_shifted_l(x),
            OpCode::_9XY0 { x, y }    => self.skip_if_vx_ne_vy(x, y),
            OpCode::_ANNN { nnn }     => self.assign_i_nnn(nnn),
            OpCode::_BNNN { nnn }     => self.jump_to_nnn_add_v0(nnn),
            OpCode::_CXNN { x, nn }   => self.assign_vx_random_and_nn(x, nn),
            OpCode::_DXYN { x, y, n } => self.draw_n_at_vx_vy(x, y, n),
            OpCode::_EX9E { x }       => self.skip_if_vx_in_keys(x),
            OpCode::_EXA1 { x }       => self.skip_if_vx_not_in_keys(x),
            OpCode::_FX07 { x }       => self.assign_vx_delay_t(x),
            OpCode::_FX0A { x }       => self.assign_vx_wait_for_key(x),
            OpCode::_FX15 { x }       => self.assign_delay_t_vx(x),
            OpCode::_FX18 { x }       => self.assign_sound_t_vx(x),
            OpCode::_FX1E { x }       => self.assign_add_i_vx(x),
            OpCode::_FX29 { x }       => self.assign_i_addr_of_sprite_vx(x),
            OpCode::_FX33 { x }       => self.assign_mem_at_i_bcd_of_vx(x),
            OpCode::_FX55 { x }       => self.assign_mem_at_i_v0_to_vx(x),
            OpCode::_FX65 { x }       => self.assign_v0_to_vx_mem_at_i(x),
        }
    }

    /// Execute machine language subroutine at address NNN
    /// 0NNN { nnn: u16 },
    fn exec_ml_subroutine_at(&mut self, nnn: u16) -> Result<()> {
        if nnn == 0 {
            Ok(())
        } else {
            self.unknown_opcode(nnn)
        }
    }

    /// Clear the screen
    /// 00E0,
    fn clear_screen(&mut self) -> Result<()> {
        self.frame.clear();
        Ok(())
    }

    /// Return from a subroutine
    /// 00EE,
    fn subroutine_return(&mut self) -> Result<()> {
        self.stack
            .pop()
            .ok_or(Error::StackUnderflow)
            .map(|addr| self.pc = addr)
    }

    /// Jump to address NNN
    /// 1NNN { nnn: u16 },
    fn jump_to(&mut self, nnn: u16) -> Result<()> {
        self.pc = nnn;
        Ok(())
    }

    /// Execute subroutine starting at address NNN
    /// 2NNN { nnn: u16 },
    fn exec_subroutine_at(&mut self, nnn: u16) -> Result<()> {
        self.stack
            .push(self.pc)
            .map_err(|_| Error::StackOverflow)
            .map(|_| self.pc = nnn)
    }

    /// Skip the following instruction if the value of register VX equals NN
    /// 3XNN { x: u8, nn: u8 },
    fn skip_if_vx_eq_nn(&mut self, x: u8, nn: u8) -> Result<()> {
        if self.v[x as usize] == nn {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is not equal to NN
    /// 4XNN { x: u8, nn: u8 },
    fn skip_if_vx_ne_nn(&mut self, x: u8, nn: u8) -> Result<()> {
        if self.v[x as usize] != nn {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is equal to the value of register VY
    /// 5XY0 { x: u8, y: u8 },
    fn skip_if_vx_eq_vy(&mut self, x: u8, y: u8) -> Result<()> {
        if self.v[x as usize] == self.v[y as usize] {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store number NN in register VX
    /// 6XNN { x: u8, nn: u8 },
    fn assign_vx_nn(&mut self, x: u8, nn: u8) -> Result<()> {
        self.v[x as usize] = nn;
        Ok(())
    }

    /// Add the value NN to register VX
    /// 7XNN { x: u8, nn: u8 },
    fn assign_add_vx_nn(&mut self, x: u8, nn: u8) -> Result<()> {
        self.v[x as usize] = self.v[x as usize].wrapping_add(nn);
        Ok(())
    }

    /// Store the value of register VY in register VX
    /// 8XY0 { x: u8, y: u8 },
    fn assign_vx_vy(&mut self, x: u8, y: u8) -> Result<()> {
        self.v[x as usize] = self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX OR VY
    /// 8XY1 { x: u8, y: u8 },
    fn assign_or_vx_vy(&mut self, x: u8, y: u8) -> Result<()> {
        self.v[x as usize] |= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX AND VY
    /// 8XY2 { x: u8, y: u8 },
    fn assign_and_vx_vy(&mut self, x: u8, y: u8) -> Result<()> {
        self.v[x as usize] &= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX XOR VY
    /// 8XY3 { x: u8, y: u8 },
    fn assign_xor_vx_vy(&mut self, x: u8, y: u8) -> Result<()> {
        self.v[x as usize] ^= self.v[y as usize];
        Ok(())
    }

    /// Add the value of register VY to register VX, Set VF to 01 if a carry occurs, Set VF to 00 if a carry does not occur
    /// 8XY4 { x: u8, y: u8 },
    fn assign_add_vx_vy(&mut self, x: u8, y: u8) -> Result<()> {
        let (value, overflow) = self.v[x as usize].overflowing_add(self.v[y as usize]);
        self.v[x as usize] = value;
        self.v[VF] = if overflow { 0x01u8 } else { 0x00u8 };
        Ok(())
    }

    /// Subtract the value of register VY from register VX, Set VF to 00 if a borrow occurs, Set VF to 01 if a borrow does not occur
    /// 8XY5 { x: u8, y: u8 },
    fn assign_sub_vx_vy(&mut self, x: u8, y: u8) -> Result<()> {
        let (value, borrow) = self.v[x as usize].overflowing_sub(self.v[y as usize]);
        self.v[x as usize] = value;
        self.v[VF] = if borrow { 0x00u8 } else { 0x01u8 };
        Ok(())
    }

    /// Shift VX right by one bit, Set register VF to the least significant bit prior to the shift
    /// 8XY6 { x: u8, y: u8 },
    fn assign_vx_shifted_r(&mut self, x: u8) -> Result<()> {
        // VF first, with X = F the shift sees the flag
        self.v[VF] = self.v[x as usize] & 0x01u8;
        self.v[x as usize] >>= 1;
        Ok(())
    }

    /// Set register VX to the value of VY minus VX, Set VF to 00 if a borrow occurs, Set VF to 01 if a borrow does not occur
    /// 8XY7 { x: u8, y: u8 },
    fn assign_vx_vy_sub_vx(&mut self, x: u8, y: u8) -> Result<()> {
        let (value, borrow) = self.v[y as usize].overflowing_sub(self.v[x as usize]);
        self.v[x as usize] = value;
        self.v[VF] = if borrow { 0x00u8 } else { 0x01u8 };
        Ok(())
    }

    /// Shift VX left by one bit, Set register VF to the most significant bit prior to the shift
    /// 8XYE { x: u8, y: u8 },
    fn assign_vx_shifted_l(&mut self, x: u8) -> Result<()> {
        self.v[VF] = self.v[x as usize] >> 7;
        self.v[x as usize] <<= 1;
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is not equal to the value of register VY
    /// 9XY0 { x: u8, y: u8 },
    fn skip_if_vx_ne_vy(&mut self, x: u8, y: u8) -> Result<()> {
        if self.v[x as usize] != self.v[y as usize] {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store memory address NNN in register I
    /// ANNN { nnn: u16 },
    fn assign_i_nnn(&mut self, nnn: u16) -> Result<()> {
        self.i = nnn;
        Ok(())
    }

    /// Jump to address NNN + V0
    /// BNNN { nnn: u16 },
    fn jump_to_nnn_add_v0(&mut self, nnn: u16) -> Result<()> {
        self.pc = nnn + self.v[0] as u16;
        Ok(())
    }

    /// Set VX to a random number with a mask of NN
    /// CXNN { x: u8, nn: u8 },
    fn assign_vx_random_and_nn(&mut self, x: u8, nn: u8) -> Result<()> {
        self.v[x as usize] = self.ctx.gen_random() & nn;
        Ok(())
    }

    /// Draw a sprite at position VX, VY with N bytes of sprite data starting at the address stored in I, Set VF to 01 if any set pixels are changed to unset, and 00 otherwise
    /// DXYN { x: u8, y: u8, n: u8 },
    fn draw_n_at_vx_vy(&mut self, x: u8, y: u8, n: u8) -> Result<()> {
        let sprite = self.memory.slice(self.i, n as usize)?;
        let collision = self
            .frame
            .draw_sprite(self.v[x as usize], self.v[y as usize], sprite);
        self.v[VF] = if collision { 0x01u8 } else { 0x00u8 };
        Ok(())
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is pressed
    /// EX9E { x: u8 },
    fn skip_if_vx_in_keys(&mut self, x: u8) -> Result<()> {
        if self.keypad.is_pressed(self.v[x as usize]) {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is not pressed
    /// EXA1 { x: u8 },
    fn skip_if_vx_not_in_keys(&mut self, x: u8) -> Result<()> {
        let key = self.v[x as usize];
        if (key as usize) < KEYS && !self.keypad.is_pressed(key) {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store the current value of the delay timer in register VX
    /// FX07 { x: u8 },
    fn assign_vx_delay_t(&mut self, x: u8) -> Result<()> {
        self.v[x as usize] = self.delay_timer.load();
        Ok(())
    }

    /// Wait for a keypress and store the result in register VX
    /// FX0A { x: u8 },
    fn assign_vx_wait_for_key(&mut self, x: u8) -> Result<()> {
        match self.keypad.first_pressed() {
            Some(key) => self.v[x as usize] = key,
            None => {
                debug!("waiting for key to store in V{:X}", x);
                self.status = Status::AwaitingKey { x };
            }
        }
        Ok(())
    }

    /// Set the delay timer to the value of register VX
    /// FX15 { x: u8 },
    fn assign_delay_t_vx(&mut self, x: u8) -> Result<()> {
        self.delay_timer.store(self.v[x as usize]);
        Ok(())
    }

    /// Set the sound timer to the value of register VX
    /// FX18 { x: u8 },
    fn assign_sound_t_vx(&mut self, x: u8) -> Result<()> {
        self.sound_timer.store(self.v[x as usize]);
        Ok(())
    }

    /// Add the value stored in register VX to register I
    /// FX1E { x: u8 },
    fn assign_add_i_vx(&mut self, x: u8) -> Result<()> {
        // no range check, an I past 0xFFF faults once it is dereferenced
        self.i = self.i.wrapping_add(self.v[x as usize] as u16);
        Ok(())
    }

    /// Set I to the memory address of the sprite data corresponding to the hexadecimal digit stored in register VX
    /// FX29 { x: u8 },
    fn assign_i_addr_of_sprite_vx(&mut self, x: u8) -> Result<()> {
        self.i = self.v[x as usize] as u16 * GLYPH_SIZE;
        Ok(())
    }

    /// Store the binary-coded decimal equivalent of the value stored in register VX at addresses I, I+1, and I+2
    /// FX33 { x: u8 },
    fn assign_mem_at_i_bcd_of_vx(&mut self, x: u8) -> Result<()> {
        let value = self.v[x as usize];
        self.memory
            .slice_mut(self.i, 3)?
            .copy_from_slice(&[value / 100u8, (value / 10u8) % 10u8, value % 10u8]);
        Ok(())
    }

    /// Store the values of registers V0 to VX inclusive in memory starting at address I
    /// FX55 { x: u8 },
    fn assign_mem_at_i_v0_to_vx(&mut self, x: u8) -> Result<()> {
        let len = x as usize + 1;
        self.memory
            .slice_mut(self.i, len)?
            .copy_from_slice(&self.v[..len]);
        Ok(())
    }

    /// Fill registers V0 to VX inclusive with the values stored in memory starting at address I
    /// FX65 { x: u8 },
    fn assign_v0_to_vx_mem_at_i(&mut self, x: u8) -> Result<()> {
        let len = x as usize + 1;
        self.v[..len].copy_from_slice(self.memory.slice(self.i, len)?);
        Ok(())
    }
}
