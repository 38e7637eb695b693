//! Binary word representation for the nybble machine.
//!
//! The architecture is built from two value types:
//! - `Unit`: a 4-bit unsigned digit (one hex nibble)
//! - `Word`: the 16-bit machine word, four units wide
//!
//! plus the pure arithmetic/logic helpers in [`alu`].

pub mod alu;
pub mod unit;
pub mod word;

pub use alu::Rotation;
pub use unit::{BinaryError, Unit};
pub use word::Word;

/// Width of a single unit (digit) in bits.
pub const UNIT_SIZE: usize = 4;

/// Width of a machine word in bits.
pub const WORD_SIZE: usize = 16;

// A word must split evenly into units. Checked once, at compile time.
const _: () = assert!(
    WORD_SIZE % UNIT_SIZE == 0,
    "word size must be a multiple of unit size"
);
