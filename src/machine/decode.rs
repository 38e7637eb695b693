//! Instruction decoder.
//!
//! An instruction word carries its opcode in the first unit and three
//! operand nibbles in the rest. The opcode table is a static mapping
//! from opcode to a tagged operation; dispatch happens in the engine's
//! execute match.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binary::{Unit, Word};

/// Number of operand units in every instruction.
pub const OPERANDS: usize = 3;

/// The machine's operations.
///
/// Opcode 4 is unassigned; decoding it fails like any other unknown
/// opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    /// Stop execution.
    Halt,
    /// dest_reg ← memory[addr_hi, addr_lo]
    Load,
    /// memory[addr_hi, addr_lo] ← src_reg
    Store,
    /// dest ← src_a + src_b, wrapping
    Addi,
    /// dest ← src
    Move,
    /// dest ← bitwise complement of src
    Not,
    /// dest ← src_a AND src_b
    And,
    /// dest ← src_a OR src_b
    Or,
    /// dest ← src_a XOR src_b
    Xor,
    /// reg ← reg + 1
    Inc,
    /// reg ← reg − 1 (adds the all-ones word)
    Dec,
    /// reg ← reg rotated by n, direction flag 1 = left, 0 = right
    Rot,
    /// if reg ≠ register 0: jump to the target address
    Jump,
}

impl Op {
    /// Every operation, in opcode order.
    pub const ALL: [Op; 13] = [
        Op::Halt,
        Op::Load,
        Op::Store,
        Op::Addi,
        Op::Move,
        Op::Not,
        Op::And,
        Op::Or,
        Op::Xor,
        Op::Inc,
        Op::Dec,
        Op::Rot,
        Op::Jump,
    ];

    /// Look up an operation by opcode.
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0 => Some(Op::Halt),
            1 => Some(Op::Load),
            2 => Some(Op::Store),
            3 => Some(Op::Addi),
            5 => Some(Op::Move),
            6 => Some(Op::Not),
            7 => Some(Op::And),
            8 => Some(Op::Or),
            9 => Some(Op::Xor),
            10 => Some(Op::Inc),
            11 => Some(Op::Dec),
            12 => Some(Op::Rot),
            13 => Some(Op::Jump),
            _ => None,
        }
    }

    /// The operation's opcode.
    pub const fn opcode(self) -> u8 {
        match self {
            Op::Halt => 0,
            Op::Load => 1,
            Op::Store => 2,
            Op::Addi => 3,
            Op::Move => 5,
            Op::Not => 6,
            Op::And => 7,
            Op::Or => 8,
            Op::Xor => 9,
            Op::Inc => 10,
            Op::Dec => 11,
            Op::Rot => 12,
            Op::Jump => 13,
        }
    }

    /// The operation's display name.
    pub const fn name(self) -> &'static str {
        match self {
            Op::Halt => "HALT",
            Op::Load => "LOAD",
            Op::Store => "STORE",
            Op::Addi => "ADDI",
            Op::Move => "MOVE",
            Op::Not => "NOT",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Xor => "XOR",
            Op::Inc => "INC",
            Op::Dec => "DEC",
            Op::Rot => "ROT",
            Op::Jump => "JUMP",
        }
    }
}

/// A decoded instruction: the operation and its three operand nibbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    /// The decoded operation.
    pub op: Op,
    /// The instruction's operand units, in encoding order.
    pub operands: [Unit; OPERANDS],
}

impl Decoded {
    /// The instruction's opcode.
    pub fn opcode(&self) -> u8 {
        self.op.opcode()
    }
}

/// Combine a (hi, lo) operand pair into one address.
pub fn operand_address(hi: Unit, lo: Unit) -> u16 {
    ((hi.value() as u16) << Unit::BITS) | lo.value() as u16
}

/// Decode an instruction word.
///
/// The opcode is the integer value of the first unit; the remaining
/// units become the operands. Fails with
/// [`DecodeError::UnsupportedOpcode`] when the opcode is not in the
/// instruction table.
pub fn decode(instruction: Word) -> Result<Decoded, DecodeError> {
    let units = instruction.units();
    let opcode = units[0].value();

    let op = Op::from_opcode(opcode).ok_or(DecodeError::UnsupportedOpcode(opcode))?;

    // Fixed-width instructions always leave exactly three operand units;
    // validated anyway, per the engine's defensive contract.
    let operands: [Unit; OPERANDS] =
        units[1..]
            .try_into()
            .map_err(|_| DecodeError::WrongOperandCount {
                expected: OPERANDS,
                got: units.len() - 1,
            })?;

    Ok(Decoded { op, operands })
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Opcode not present in the instruction table.
    #[error("unsupported opcode: {0}")]
    UnsupportedOpcode(u8),

    /// Instruction carried the wrong number of operand units.
    #[error("expected {expected} operands, got {got}")]
    WrongOperandCount { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for op in Op::ALL {
            assert_eq!(Op::from_opcode(op.opcode()), Some(op));
        }
    }

    #[test]
    fn test_decode_load() {
        let decoded = decode(Word::from_hex("1120").unwrap()).unwrap();
        assert_eq!(decoded.op, Op::Load);
        assert_eq!(decoded.opcode(), 1);
        assert_eq!(decoded.operands[0].value(), 1);
        assert_eq!(decoded.operands[1].value(), 2);
        assert_eq!(decoded.operands[2].value(), 0);
    }

    #[test]
    fn test_decode_halt() {
        let decoded = decode(Word::zero()).unwrap();
        assert_eq!(decoded.op, Op::Halt);
    }

    #[test]
    fn test_decode_high_opcodes() {
        assert_eq!(decode(Word::from_hex("A200").unwrap()).unwrap().op, Op::Inc);
        assert_eq!(decode(Word::from_hex("C221").unwrap()).unwrap().op, Op::Rot);
        assert_eq!(decode(Word::from_hex("D206").unwrap()).unwrap().op, Op::Jump);
    }

    #[test]
    fn test_decode_rejects_unknown_opcodes() {
        // 4 is a gap in the table; 14 and 15 are past its end.
        for (word, opcode) in [("4000", 4u8), ("E000", 14), ("F123", 15)] {
            assert_eq!(
                decode(Word::from_hex(word).unwrap()),
                Err(DecodeError::UnsupportedOpcode(opcode))
            );
        }
    }

    #[test]
    fn test_operand_address_combines_nibbles() {
        let hi = Unit::new(2).unwrap();
        let lo = Unit::new(0).unwrap();
        assert_eq!(operand_address(hi, lo), 0x20);

        let hi = Unit::new(0xF).unwrap();
        let lo = Unit::new(0xF).unwrap();
        assert_eq!(operand_address(hi, lo), 0xFF);
    }
}
