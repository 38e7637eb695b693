//! # Nybble Emulator
//!
//! A 16-bit nibble-machine virtual CPU emulator.
//!
//! The machine works on 16-bit words built from 4-bit units (hex
//! nibbles). Programs are pre-encoded 4-hex-digit instruction words:
//! the first digit is the opcode, the rest are operand nibbles. A
//! driver loop fetches from the listing, asks the engine to decode and
//! execute, and threads the program counter through.

pub mod binary;
pub mod listing;
pub mod machine;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use binary::{alu, BinaryError, Rotation, Unit, Word, UNIT_SIZE, WORD_SIZE};
pub use listing::{disassemble, load_listing, parse_listing, ListingError, ListingFile};
pub use machine::{decode, Decoded, DecodeError, Machine, MachineError, MachineState, Op};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
