//! Execution engine.
//!
//! Implements the decode-execute cycle over a program listing. The
//! machine owns the register file and memory; the program counter is
//! owned by the driver loop and threaded through: `execute` only
//! computes and returns the next pc.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binary::{alu, Rotation, Word};
use crate::machine::decode::{self, operand_address, Decoded, DecodeError, Op};
use crate::machine::{Memory, RegisterFile};

/// Machine execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Ready to execute instructions.
    Running,
    /// A HALT instruction was recognized.
    Halted,
}

/// The nybble machine.
///
/// One instance exclusively owns a register file and a memory, both
/// freshly initialized per machine. Fully single-threaded: one
/// instruction executes to completion before the next is fetched.
#[derive(Clone, Serialize, Deserialize)]
pub struct Machine {
    /// Register file.
    pub regs: RegisterFile,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: MachineState,
    /// Instructions executed so far.
    pub cycles: u64,
    /// JUMP instructions decoded so far.
    pub jumps: u64,
    /// Last executed operation (for the drivers).
    last_op: Option<Op>,
}

impl Machine {
    /// Create a machine with zeroed registers and empty memory.
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            mem: Memory::new(),
            state: MachineState::Running,
            cycles: 0,
            jumps: 0,
            last_op: None,
        }
    }

    /// Create a machine with pre-seeded memory contents.
    pub fn with_memory(seed: HashMap<u16, Word>) -> Self {
        Self {
            mem: Memory::from_seed(seed),
            ..Self::new()
        }
    }

    /// Reset registers, memory, counters, and state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = MachineState::Running;
        self.cycles = 0;
        self.jumps = 0;
        self.last_op = None;
    }

    /// Check if the machine can execute instructions.
    pub fn is_running(&self) -> bool {
        self.state == MachineState::Running
    }

    /// Check if the machine has halted.
    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// The last executed operation.
    pub fn last_op(&self) -> Option<Op> {
        self.last_op
    }

    /// Fetch, decode, and execute one instruction from `program`.
    ///
    /// Returns the pc for the next iteration. A HALT is recognized
    /// before its handler runs: the state flips to `Halted` and the pc
    /// comes back unchanged.
    pub fn step(&mut self, program: &[Word], pc: usize) -> Result<usize, MachineError> {
        if !self.is_running() {
            return Err(MachineError::NotRunning(self.state));
        }

        let instruction = *program
            .get(pc)
            .ok_or(MachineError::PcOutOfRange { pc, len: program.len() })?;

        let decoded = decode::decode(instruction)?;
        if decoded.op == Op::Jump {
            self.jumps += 1;
        }
        if decoded.op == Op::Halt {
            self.state = MachineState::Halted;
            self.last_op = Some(Op::Halt);
            return Ok(pc);
        }

        let next_pc = self.execute(&decoded, pc)?;
        self.cycles += 1;
        self.last_op = Some(decoded.op);

        Ok(next_pc)
    }

    /// Run from pc 0 until HALT.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, program: &[Word]) -> Result<u64, MachineError> {
        let start = self.cycles;
        let mut pc = 0;

        while self.is_running() {
            pc = self.step(program, pc)?;
        }

        Ok(self.cycles - start)
    }

    /// Run from pc 0 for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, program: &[Word], max_cycles: u64) -> Result<u64, MachineError> {
        let start = self.cycles;
        let limit = self.cycles + max_cycles;
        let mut pc = 0;

        while self.is_running() && self.cycles < limit {
            pc = self.step(program, pc)?;
        }

        Ok(self.cycles - start)
    }

    /// Execute a decoded instruction against registers and memory.
    ///
    /// Emits the trace line (pc in hex, operation name, operand hex
    /// digits) before executing, then returns the pc the driver should
    /// use on the next iteration.
    pub fn execute(&mut self, instr: &Decoded, pc: usize) -> Result<usize, MachineError> {
        let ops = &instr.operands;
        debug!(
            "{:X}: executing {} with operands [{}, {}, {}]",
            pc,
            instr.op.name(),
            ops[0].to_hex(),
            ops[1].to_hex(),
            ops[2].to_hex(),
        );

        match instr.op {
            Op::Halt => {
                self.state = MachineState::Halted;
                Ok(pc)
            }

            Op::Load => {
                let dest = ops[0].value();
                let address = operand_address(ops[1], ops[2]);
                self.regs.set(dest, self.mem.read(address));
                Ok(pc + 1)
            }

            Op::Store => {
                let address = operand_address(ops[0], ops[1]);
                let src = ops[2].value();
                self.mem.write(address, self.regs.get(src));
                Ok(pc + 1)
            }

            Op::Addi => {
                let dest = ops[0].value();
                let a = self.regs.get(ops[1].value());
                let b = self.regs.get(ops[2].value());
                self.regs.set(dest, alu::add(&a, &b));
                Ok(pc + 1)
            }

            Op::Move => {
                let dest = ops[0].value();
                let src = self.regs.get(ops[1].value());
                self.regs.set(dest, src);
                Ok(pc + 1)
            }

            Op::Not => {
                let dest = ops[0].value();
                let src = self.regs.get(ops[1].value());
                self.regs.set(dest, alu::not(&src));
                Ok(pc + 1)
            }

            Op::And => {
                let dest = ops[0].value();
                let a = self.regs.get(ops[1].value());
                let b = self.regs.get(ops[2].value());
                self.regs.set(dest, alu::and(&a, &b));
                Ok(pc + 1)
            }

            Op::Or => {
                let dest = ops[0].value();
                let a = self.regs.get(ops[1].value());
                let b = self.regs.get(ops[2].value());
                self.regs.set(dest, alu::or(&a, &b));
                Ok(pc + 1)
            }

            Op::Xor => {
                let dest = ops[0].value();
                let a = self.regs.get(ops[1].value());
                let b = self.regs.get(ops[2].value());
                self.regs.set(dest, alu::xor(&a, &b));
                Ok(pc + 1)
            }

            Op::Inc => {
                let reg = ops[0].value();
                let value = self.regs.get(reg);
                self.regs.set(reg, alu::add(&value, &Word::from_u16(1)));
                Ok(pc + 1)
            }

            Op::Dec => {
                let reg = ops[0].value();
                let value = self.regs.get(reg);
                // Two's complement -1 is the all-ones word.
                let minus_one = alu::not(&Word::zero());
                self.regs.set(reg, alu::add(&value, &minus_one));
                Ok(pc + 1)
            }

            Op::Rot => {
                let reg = ops[0].value();
                let count = ops[1].value() as usize;
                let flag = ops[2].value();

                let direction = Rotation::from_flag(flag)
                    .ok_or(MachineError::InvalidRotation(flag))?;

                let value = self.regs.get(reg);
                self.regs.set(reg, alu::rotate(&value, count, direction));
                Ok(pc + 1)
            }

            Op::Jump => {
                let reg = ops[0].value();
                let target = operand_address(ops[1], ops[2]) as usize;

                // Taken when the register differs from the zero register;
                // JUMP through register 0 can never be taken.
                if self.regs.get(reg) != self.regs.get(0) {
                    Ok(target)
                } else {
                    Ok(pc + 1)
                }
            }
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("jumps", &self.jumps)
            .field("regs", &self.regs)
            .field("mem", &self.mem)
            .finish()
    }
}

/// Errors that can occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// An instruction was fed to a machine that is not running.
    #[error("machine not running: {0:?}")]
    NotRunning(MachineState),

    /// The program counter left the program listing.
    #[error("pc {pc} outside program of {len} instructions")]
    PcOutOfRange { pc: usize, len: usize },

    /// Instruction failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// ROT direction flag was neither 0 nor 1.
    #[error("ROT direction must be 0 or 1, got {0}")]
    InvalidRotation(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(lines: &[&str]) -> Vec<Word> {
        lines
            .iter()
            .map(|s| Word::from_hex(s).unwrap())
            .collect()
    }

    fn seeded(cells: &[(u16, u16)]) -> Machine {
        let seed = cells
            .iter()
            .map(|(a, v)| (*a, Word::from_u16(*v)))
            .collect();
        Machine::with_memory(seed)
    }

    #[test]
    fn test_halt_stops_without_executing() {
        let mut machine = Machine::new();
        let executed = machine.run(&program(&["0000"])).unwrap();

        assert_eq!(executed, 0);
        assert!(machine.is_halted());
        assert_eq!(machine.last_op(), Some(Op::Halt));
    }

    #[test]
    fn test_step_after_halt_is_an_error() {
        let mut machine = Machine::new();
        let listing = program(&["0000"]);
        machine.run(&listing).unwrap();

        assert_eq!(
            machine.step(&listing, 0),
            Err(MachineError::NotRunning(MachineState::Halted))
        );
    }

    #[test]
    fn test_load_addi_end_to_end() {
        // LOAD r1<-mem[0x20]; LOAD r2<-mem[0x21]; ADDI r2<-r1+r2; HALT
        let mut machine = seeded(&[(0x20, 4), (0x21, 4)]);
        machine
            .run(&program(&["1120", "1221", "3221", "0000"]))
            .unwrap();

        assert!(machine.is_halted());
        assert_eq!(machine.regs.get(2).to_u16(), 8);
        assert_eq!(machine.regs.get(2), Word::from_u16(8));
    }

    #[test]
    fn test_store_writes_memory() {
        // LOAD r1<-mem[0x20]; STORE mem[0x30]<-r1; HALT
        let mut machine = seeded(&[(0x20, 0xBEEF)]);
        machine
            .run(&program(&["1120", "2301", "0000"]))
            .unwrap();

        assert_eq!(machine.mem.read(0x30).to_u16(), 0xBEEF);
    }

    #[test]
    fn test_move_copies_register() {
        let mut machine = seeded(&[(0x20, 7)]);
        // LOAD r1<-mem[0x20]; MOVE r2<-r1; HALT
        machine
            .run(&program(&["1120", "5210", "0000"]))
            .unwrap();

        assert_eq!(machine.regs.get(2).to_u16(), 7);
        assert_eq!(machine.regs.get(1).to_u16(), 7);
    }

    #[test]
    fn test_not_and_or_xor() {
        let mut machine = seeded(&[(0x20, 0x00FF), (0x21, 0x0F0F)]);
        // LOAD r1, LOAD r2, NOT r3<-r1, AND r4<-r1,r2,
        // OR r5<-r1,r2, XOR r6<-r1,r2, HALT
        machine
            .run(&program(&[
                "1120", "1221", "6310", "7412", "8512", "9612", "0000",
            ]))
            .unwrap();

        assert_eq!(machine.regs.get(3).to_u16(), 0xFF00);
        assert_eq!(machine.regs.get(4).to_u16(), 0x000F);
        assert_eq!(machine.regs.get(5).to_u16(), 0x0FFF);
        // True XOR; the reference implementation's opcode 9 computed OR.
        assert_eq!(machine.regs.get(6).to_u16(), 0x0FF0);
    }

    #[test]
    fn test_inc_dec() {
        let mut machine = Machine::new();
        // INC r1; INC r1; DEC r1; HALT
        machine
            .run(&program(&["A100", "A100", "B100", "0000"]))
            .unwrap();

        assert_eq!(machine.regs.get(1).to_u16(), 1);
    }

    #[test]
    fn test_dec_wraps_below_zero() {
        let mut machine = Machine::new();
        // DEC r1 from zero wraps to all-ones.
        machine.run(&program(&["B100", "0000"])).unwrap();

        assert_eq!(machine.regs.get(1).to_u16(), 0xFFFF);
    }

    #[test]
    fn test_rot_left_and_right() {
        let mut machine = seeded(&[(0x20, 1)]);
        // LOAD r1; ROT r1 by 2 left; HALT
        machine
            .run(&program(&["1120", "C121", "0000"]))
            .unwrap();
        assert_eq!(machine.regs.get(1).to_u16(), 4);

        let mut machine = seeded(&[(0x20, 4)]);
        // LOAD r1; ROT r1 by 2 right; HALT
        machine
            .run(&program(&["1120", "C120", "0000"]))
            .unwrap();
        assert_eq!(machine.regs.get(1).to_u16(), 1);
    }

    #[test]
    fn test_rot_invalid_direction() {
        let mut machine = seeded(&[(0x20, 1)]);
        // LOAD r1; ROT r1 with direction flag 2
        let err = machine
            .run(&program(&["1120", "C122", "0000"]))
            .unwrap_err();

        assert_eq!(err, MachineError::InvalidRotation(2));
    }

    #[test]
    fn test_jump_taken_when_register_non_zero() {
        let mut machine = seeded(&[(0x20, 1)]);
        // 0: LOAD r1 (non-zero)
        // 1: JUMP r1 -> 3
        // 2: INC r2   (skipped)
        // 3: HALT
        machine
            .run(&program(&["1120", "D103", "A200", "0000"]))
            .unwrap();

        assert!(machine.is_halted());
        assert!(machine.regs.get(2).is_zero());
        assert_eq!(machine.jumps, 1);
    }

    #[test]
    fn test_jump_falls_through_when_register_zero() {
        let mut machine = Machine::new();
        // 0: JUMP r1 -> 2 (r1 is zero, falls through)
        // 1: INC r2
        // 2: HALT
        machine
            .run(&program(&["D102", "A200", "0000"]))
            .unwrap();

        assert_eq!(machine.regs.get(2).to_u16(), 1);
    }

    #[test]
    fn test_jump_through_zero_register_never_taken() {
        let mut machine = Machine::new();
        // INC r0 (write lost); JUMP r0 -> 0 would loop forever if taken
        machine
            .run(&program(&["A000", "D000", "0000"]))
            .unwrap();

        assert!(machine.is_halted());
    }

    #[test]
    fn test_jump_target_computed_from_operand_pair() {
        let decoded = decode::decode(Word::from_hex("D2A5").unwrap()).unwrap();
        let mut machine = Machine::new();
        machine.regs.set(2, Word::from_u16(1));

        let next = machine.execute(&decoded, 0).unwrap();
        assert_eq!(next, 0xA5);
    }

    #[test]
    fn test_pc_out_of_range() {
        let mut machine = Machine::new();
        // INC r1 at pc 0, then the listing ends.
        let err = machine.run(&program(&["A100"])).unwrap_err();

        assert_eq!(err, MachineError::PcOutOfRange { pc: 1, len: 1 });
    }

    #[test]
    fn test_unsupported_opcode_propagates() {
        let mut machine = Machine::new();
        let err = machine.run(&program(&["4000"])).unwrap_err();

        assert_eq!(
            err,
            MachineError::Decode(DecodeError::UnsupportedOpcode(4))
        );
    }

    #[test]
    fn test_run_limited_stops_at_cap() {
        let mut machine = Machine::new();
        // INC r1; JUMP r1 -> 0: loops forever.
        let executed = machine
            .run_limited(&program(&["A100", "D100"]), 10)
            .unwrap();

        assert_eq!(executed, 10);
        assert!(machine.is_running());
    }

    #[test]
    fn test_counters_track_cycles_and_jumps() {
        let mut machine = seeded(&[(0x20, 1)]);
        machine
            .run(&program(&["1120", "D103", "A200", "0000"]))
            .unwrap();

        // LOAD + JUMP executed; HALT recognized, not counted.
        assert_eq!(machine.cycles, 2);
        assert_eq!(machine.jumps, 1);
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let mut machine = seeded(&[(0x20, 4)]);
        machine.run(&program(&["1120", "0000"])).unwrap();
        assert!(machine.is_halted());

        machine.reset();
        assert!(machine.is_running());
        assert_eq!(machine.cycles, 0);
        assert!(machine.regs.get(1).is_zero());
        assert!(machine.mem.read(0x20).is_zero());
    }
}
