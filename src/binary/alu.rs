//! Arithmetic and logic helpers.
//!
//! Pure functions over [`Word`] operands: ripple-carry addition, the
//! bitwise operators, and circular shifts. Operands are never mutated;
//! every helper builds a fresh word.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binary::{Word, WORD_SIZE};

/// Direction of a circular shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    /// Bits leaving the most-significant end reappear at the
    /// least-significant end.
    Left,
    /// Bits leaving the least-significant end reappear at the
    /// most-significant end.
    Right,
}

impl Rotation {
    /// Decode a direction flag: 1 is left, 0 is right.
    ///
    /// Returns `None` for any other value; the ROT handler turns that
    /// into its invalid-operand error.
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            1 => Some(Rotation::Left),
            0 => Some(Rotation::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Left => write!(f, "left"),
            Rotation::Right => write!(f, "right"),
        }
    }
}

/// Add two words with ripple-carry binary addition.
///
/// The sum wraps at [`WORD_SIZE`] bits (two's complement overflow is
/// silently truncated; there is no carry flag in this architecture).
pub fn add(a: &Word, b: &Word) -> Word {
    let a_bits = a.to_bits();
    let b_bits = b.to_bits();

    let mut result = [false; WORD_SIZE];
    let mut carry = false;

    // Least-significant bit first; the arrays are MSB first.
    for i in (0..WORD_SIZE).rev() {
        let sum = a_bits[i] as u8 + b_bits[i] as u8 + carry as u8;
        result[i] = sum % 2 == 1;
        carry = sum > 1;
    }

    Word::from_bit_array(result)
}

/// Bitwise complement of every bit.
pub fn not(w: &Word) -> Word {
    let mut bits = w.to_bits();
    for bit in &mut bits {
        *bit = !*bit;
    }
    Word::from_bit_array(bits)
}

/// Bitwise AND, position for position.
pub fn and(a: &Word, b: &Word) -> Word {
    zip_bits(a, b, |x, y| x && y)
}

/// Bitwise OR, position for position.
pub fn or(a: &Word, b: &Word) -> Word {
    zip_bits(a, b, |x, y| x || y)
}

/// Bitwise XOR, position for position.
pub fn xor(a: &Word, b: &Word) -> Word {
    zip_bits(a, b, |x, y| x != y)
}

fn zip_bits(a: &Word, b: &Word, op: impl Fn(bool, bool) -> bool) -> Word {
    let a_bits = a.to_bits();
    let b_bits = b.to_bits();

    let mut result = [false; WORD_SIZE];
    for i in 0..WORD_SIZE {
        result[i] = op(a_bits[i], b_bits[i]);
    }
    Word::from_bit_array(result)
}

/// Rotate a word's bits by `n` positions in the given direction.
///
/// `n` is reduced modulo [`WORD_SIZE`], so counts at or beyond the word
/// width wrap around cleanly.
pub fn rotate(w: &Word, n: usize, direction: Rotation) -> Word {
    let n = n % WORD_SIZE;
    let bits = w.to_bits();

    let mut result = [false; WORD_SIZE];
    for (i, bit) in result.iter_mut().enumerate() {
        let src = match direction {
            Rotation::Left => (i + n) % WORD_SIZE,
            Rotation::Right => (i + WORD_SIZE - n) % WORD_SIZE,
        };
        *bit = bits[src];
    }
    Word::from_bit_array(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_zero_identity() {
        assert_eq!(add(&Word::zero(), &Word::zero()), Word::zero());

        let a = Word::from_u16(1234);
        assert_eq!(add(&a, &Word::zero()), a);
    }

    #[test]
    fn test_add_basic() {
        let a = Word::from_u16(4);
        let b = Word::from_u16(4);
        assert_eq!(add(&a, &b).to_u16(), 8);
    }

    #[test]
    fn test_add_wraps_on_overflow() {
        let max = Word::from_u16(Word::MAX);
        let one = Word::from_u16(1);
        assert_eq!(add(&max, &one), Word::zero());
    }

    #[test]
    fn test_add_all_ones_is_decrement() {
        // Adding 0xFFFF is a two's complement subtract-one.
        let a = Word::from_u16(10);
        let minus_one = not(&Word::zero());
        assert_eq!(add(&a, &minus_one).to_u16(), 9);
    }

    #[test]
    fn test_not_complement() {
        assert_eq!(not(&Word::zero()).to_u16(), 0xFFFF);
        assert_eq!(not(&Word::from_u16(0x00FF)).to_u16(), 0xFF00);
    }

    #[test]
    fn test_rotate_left_wraps_high_bits() {
        let w = Word::from_u16(0x8001);
        assert_eq!(rotate(&w, 1, Rotation::Left).to_u16(), 0x0003);
    }

    #[test]
    fn test_rotate_right_wraps_low_bits() {
        let w = Word::from_u16(0x0001);
        assert_eq!(rotate(&w, 1, Rotation::Right).to_u16(), 0x8000);
    }

    #[test]
    fn test_rotate_full_width_is_identity() {
        let w = Word::from_u16(0xBEEF);
        assert_eq!(rotate(&w, WORD_SIZE, Rotation::Left), w);
        assert_eq!(rotate(&w, WORD_SIZE, Rotation::Right), w);
    }

    #[test]
    fn test_rotation_flag() {
        assert_eq!(Rotation::from_flag(1), Some(Rotation::Left));
        assert_eq!(Rotation::from_flag(0), Some(Rotation::Right));
        assert_eq!(Rotation::from_flag(2), None);
    }

    proptest! {
        #[test]
        fn prop_add_matches_wrapping_u16(a: u16, b: u16) {
            let sum = add(&Word::from_u16(a), &Word::from_u16(b));
            prop_assert_eq!(sum.to_u16(), a.wrapping_add(b));
        }

        #[test]
        fn prop_add_commutes(a: u16, b: u16) {
            let x = Word::from_u16(a);
            let y = Word::from_u16(b);
            prop_assert_eq!(add(&x, &y), add(&y, &x));
        }

        #[test]
        fn prop_not_involution(a: u16) {
            let w = Word::from_u16(a);
            prop_assert_eq!(not(&not(&w)), w);
        }

        #[test]
        fn prop_bitwise_match_u16_ops(a: u16, b: u16) {
            let x = Word::from_u16(a);
            let y = Word::from_u16(b);
            prop_assert_eq!(and(&x, &y).to_u16(), a & b);
            prop_assert_eq!(or(&x, &y).to_u16(), a | b);
            prop_assert_eq!(xor(&x, &y).to_u16(), a ^ b);
        }

        #[test]
        fn prop_rotate_left_then_right_is_identity(a: u16, n in 0usize..64) {
            let w = Word::from_u16(a);
            let there = rotate(&w, n, Rotation::Left);
            prop_assert_eq!(rotate(&there, n, Rotation::Right), w);
        }

        #[test]
        fn prop_rotate_left_matches_u16(a: u16, n in 0usize..16) {
            let w = Word::from_u16(a);
            prop_assert_eq!(
                rotate(&w, n, Rotation::Left).to_u16(),
                a.rotate_left(n as u32)
            );
        }
    }
}
