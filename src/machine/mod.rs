//! The nybble machine: state and decode/execute engine.
//!
//! - sparse register file with a hard-wired zero register
//! - sparse word-addressed memory
//! - a 13-operation instruction set dispatched from a static opcode table

pub mod decode;
pub mod execute;
pub mod memory;
pub mod registers;

pub use decode::{decode, operand_address, Decoded, DecodeError, Op};
pub use execute::{Machine, MachineError, MachineState};
pub use memory::Memory;
pub use registers::RegisterFile;
