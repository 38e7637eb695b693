//! Display-only instruction formatting.
//!
//! Renders decoded instructions as readable text for trace output, the
//! debugger's program pane, and the `disasm` command. Formatting only;
//! nothing here is ever parsed back.

use crate::binary::{Rotation, Word};
use crate::machine::decode::{decode, operand_address, Decoded, Op};

/// Format a single instruction word.
///
/// Words that fail to decode render as `???` followed by their hex.
pub fn disassemble_word(word: Word) -> String {
    match decode(word) {
        Ok(decoded) => format_decoded(&decoded),
        Err(_) => format!("??? ; {}", word),
    }
}

/// Format a whole program listing, one line per instruction.
pub fn disassemble(program: &[Word]) -> String {
    let mut output = String::new();
    for (pc, word) in program.iter().enumerate() {
        output.push_str(&format!("{:3X}: {}  ; {}\n", pc, disassemble_word(*word), word));
    }
    output
}

/// Format a decoded instruction.
pub fn format_decoded(instr: &Decoded) -> String {
    let ops = &instr.operands;
    match instr.op {
        Op::Halt => "HALT".to_string(),

        Op::Load => format!(
            "LOAD r{}, {:#06X}",
            ops[0].value(),
            operand_address(ops[1], ops[2])
        ),
        Op::Store => format!(
            "STORE {:#06X}, r{}",
            operand_address(ops[0], ops[1]),
            ops[2].value()
        ),

        Op::Addi => format!(
            "ADDI r{}, r{}, r{}",
            ops[0].value(),
            ops[1].value(),
            ops[2].value()
        ),
        Op::Move => format!("MOVE r{}, r{}", ops[0].value(), ops[1].value()),
        Op::Not => format!("NOT r{}, r{}", ops[0].value(), ops[1].value()),
        Op::And => format!(
            "AND r{}, r{}, r{}",
            ops[0].value(),
            ops[1].value(),
            ops[2].value()
        ),
        Op::Or => format!(
            "OR r{}, r{}, r{}",
            ops[0].value(),
            ops[1].value(),
            ops[2].value()
        ),
        Op::Xor => format!(
            "XOR r{}, r{}, r{}",
            ops[0].value(),
            ops[1].value(),
            ops[2].value()
        ),

        Op::Inc => format!("INC r{}", ops[0].value()),
        Op::Dec => format!("DEC r{}", ops[0].value()),

        Op::Rot => {
            let direction = match Rotation::from_flag(ops[2].value()) {
                Some(d) => d.to_string(),
                None => format!("?{}", ops[2].value()),
            };
            format!("ROT r{}, {}, {}", ops[0].value(), ops[1].value(), direction)
        }

        Op::Jump => format!(
            "JUMP r{}, {:#06X}",
            ops[0].value(),
            operand_address(ops[1], ops[2])
        ),
    }
}
