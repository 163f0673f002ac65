//! CHIP-8 interpreter core
//!
//! `Kiwi8` holds the whole virtual machine and is driven by the host: one
//! clock calls [`Kiwi8::step`] for each instruction cycle, another calls
//! [`Kiwi8::tick_timers`] at 60Hz. Key presses are pushed in with
//! [`Kiwi8::set_key`] and the display is pulled out with [`Kiwi8::frame`].
//!
//! ```
//! use kiwi8::{Builder, SeededContext};
//!
//! // LD F, V0; DRW V0, V0, 5; JP 0x204
//! let rom = [0xF0, 0x29, 0xD0, 0x05, 0x12, 0x04];
//! let mut kiwi = Builder::new()
//!     .with_context(SeededContext::new(0))
//!     .with_program(&rom)
//!     .build()
//!     .unwrap();
//! for _ in 0..3 {
//!     kiwi.step().unwrap();
//! }
//! assert_eq!(kiwi.pc(), 0x204);
//! assert_eq!(kiwi.frame().count_lit(), 14);
//! ```
#![no_std]

mod utils;

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod keypad;
pub mod kiwi;
pub mod memory;
pub mod opcode;
pub mod timer;

pub use builder::Builder;
pub use config::{Config, RomOverflow, UnknownOpcodes};
pub use context::{Context, SeededContext};
pub use error::{Error, Result};
pub use frame::{Frame, FrameView, HEIGHT, WIDTH};
pub use kiwi::{Kiwi8, Status};
pub use nb;
pub use opcode::OpCode;

#[cfg(feature = "embedded-graphics")]
pub use embedded_graphics;
