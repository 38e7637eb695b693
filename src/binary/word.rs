//! Fixed-width machine words.
//!
//! A [`Word`] is the machine's native 16-bit value: four 4-bit units,
//! stored most-significant unit first. Instruction words put the opcode
//! in the first unit and up to three operand nibbles in the rest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binary::unit::{BinaryError, Unit};
use crate::binary::{UNIT_SIZE, WORD_SIZE};

/// Number of units in a word.
pub const WORD_UNITS: usize = WORD_SIZE / UNIT_SIZE;

/// A 16-bit machine word.
///
/// Value range: 0 to 65,535. Negative quantities are represented in
/// two's complement by the arithmetic helpers; the word itself is just
/// an ordered bag of bits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Word {
    /// Units stored most-significant first.
    units: [Unit; WORD_UNITS],
}

impl Word {
    /// Number of bits in a word.
    pub const BITS: usize = WORD_SIZE;

    /// Number of units in a word.
    pub const UNITS: usize = WORD_UNITS;

    /// Largest representable value: 0xFFFF.
    pub const MAX: u16 = u16::MAX;

    /// Create a new word with all units zero.
    #[inline]
    pub const fn zero() -> Self {
        Self {
            units: [Unit::zero(); WORD_UNITS],
        }
    }

    /// Create a word from an array of units (most-significant first).
    #[inline]
    pub const fn from_units(units: [Unit; WORD_UNITS]) -> Self {
        Self { units }
    }

    /// The underlying unit array, most-significant first.
    #[inline]
    pub const fn units(&self) -> &[Unit; WORD_UNITS] {
        &self.units
    }

    /// Get a single unit by index (0 = most significant).
    #[inline]
    pub const fn unit(&self, index: usize) -> Unit {
        self.units[index]
    }

    /// Check if every bit of this word is zero.
    pub fn is_zero(&self) -> bool {
        self.units.iter().all(|u| u.is_zero())
    }

    /// The word's bits, most-significant bit first.
    ///
    /// Concatenation of each unit's bits, in unit order.
    pub fn to_bits(&self) -> [bool; WORD_SIZE] {
        let mut bits = [false; WORD_SIZE];
        for (i, unit) in self.units.iter().enumerate() {
            bits[i * UNIT_SIZE..(i + 1) * UNIT_SIZE].copy_from_slice(&unit.to_bits());
        }
        bits
    }

    /// Rebuild a word from a bit sequence, most-significant bit first.
    ///
    /// Fails with [`BinaryError::TooManyBits`] if more than [`WORD_SIZE`]
    /// bits are given. Shorter sequences are left-padded with zero bits.
    pub fn from_bits(bits: &[bool]) -> Result<Self, BinaryError> {
        if bits.len() > WORD_SIZE {
            return Err(BinaryError::TooManyBits { got: bits.len() });
        }

        let mut padded = [false; WORD_SIZE];
        padded[WORD_SIZE - bits.len()..].copy_from_slice(bits);
        Ok(Self::from_bit_array(padded))
    }

    /// Rebuild a word from exactly [`WORD_SIZE`] bits.
    pub fn from_bit_array(bits: [bool; WORD_SIZE]) -> Self {
        let mut units = [Unit::zero(); WORD_UNITS];
        for (i, unit) in units.iter_mut().enumerate() {
            let mut value = 0u8;
            for &bit in &bits[i * UNIT_SIZE..(i + 1) * UNIT_SIZE] {
                value = (value << 1) | bit as u8;
            }
            *unit = Unit::from_low_bits(value);
        }
        Self { units }
    }

    /// The word as a zero-padded uppercase hex string, one character per
    /// unit, most-significant first.
    pub fn to_hex(&self) -> String {
        self.units.iter().map(|u| u.to_hex()).collect()
    }

    /// Parse a word from a hex string of exactly [`WORD_UNITS`] digits.
    ///
    /// This is how pre-encoded instructions enter the machine: one hex
    /// digit per unit, opcode first.
    pub fn from_hex(s: &str) -> Result<Self, BinaryError> {
        let digits: Vec<char> = s.chars().collect();
        if digits.len() != WORD_UNITS {
            return Err(BinaryError::WrongLength {
                expected: WORD_UNITS,
                got: digits.len(),
            });
        }

        let mut units = [Unit::zero(); WORD_UNITS];
        for (unit, &c) in units.iter_mut().zip(&digits) {
            *unit = Unit::from_hex_digit(c)?;
        }
        Ok(Self { units })
    }

    /// Create a word from an unsigned integer.
    pub fn from_u16(value: u16) -> Self {
        let mut units = [Unit::zero(); WORD_UNITS];
        for (i, unit) in units.iter_mut().enumerate() {
            let shift = (WORD_UNITS - 1 - i) * UNIT_SIZE;
            *unit = Unit::from_low_bits((value >> shift) as u8);
        }
        Self { units }
    }

    /// The word's value as an unsigned integer.
    pub fn to_u16(&self) -> u16 {
        self.units
            .iter()
            .fold(0u16, |acc, u| (acc << UNIT_SIZE) | u.value() as u16)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word(0x{} = {})", self.to_hex(), self.to_u16())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl From<u16> for Word {
    fn from(value: u16) -> Self {
        Word::from_u16(value)
    }
}

impl From<Word> for u16 {
    fn from(word: Word) -> Self {
        word.to_u16()
    }
}
