//! Register file.
//!
//! Registers are a sparse mapping from register number to word. A
//! register that was never written reads as zero. Register 0 is the
//! hard-wired zero register: writes to it are accepted but every read
//! returns the all-zero word.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::binary::Word;

/// Sparse register file with a hard-wired zero register.
///
/// Each machine owns exactly one of these; state lives for the process
/// lifetime and is mutated in place by the execute handlers.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegisterFile {
    regs: HashMap<u8, Word>,
}

impl RegisterFile {
    /// Create an empty register file. All registers read as zero.
    pub fn new() -> Self {
        Self {
            regs: HashMap::new(),
        }
    }

    /// Read a register.
    ///
    /// Returns the zero word if the register was never written, and
    /// always for register 0.
    pub fn get(&self, number: u8) -> Word {
        if number == 0 {
            return Word::zero();
        }
        self.regs.get(&number).copied().unwrap_or_default()
    }

    /// Write a register.
    ///
    /// Writes to register 0 are permitted but never observable.
    pub fn set(&mut self, number: u8, value: Word) {
        self.regs.insert(number, value);
    }

    /// Reset every register to zero.
    pub fn reset(&mut self) {
        self.regs.clear();
    }

    /// Registers with a non-zero observable value, sorted by number.
    ///
    /// Used by the drivers for state display.
    pub fn non_zero(&self) -> Vec<(u8, Word)> {
        let mut entries: Vec<(u8, Word)> = self
            .regs
            .iter()
            .filter(|(n, w)| **n != 0 && !w.is_zero())
            .map(|(n, w)| (*n, *w))
            .collect();
        entries.sort_by_key(|(n, _)| *n);
        entries
    }
}

impl std::fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterFile")
            .field("non_zero", &self.non_zero())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_register_reads_zero() {
        let regs = RegisterFile::new();
        assert!(regs.get(7).is_zero());
    }

    #[test]
    fn test_set_then_get() {
        let mut regs = RegisterFile::new();
        regs.set(3, Word::from_u16(0xBEEF));
        assert_eq!(regs.get(3).to_u16(), 0xBEEF);
    }

    #[test]
    fn test_zero_register_is_hard_wired() {
        let mut regs = RegisterFile::new();
        regs.set(0, Word::from_u16(0xFFFF));
        assert!(regs.get(0).is_zero());
        assert_eq!(regs.get(0).to_hex(), "0000");
    }

    #[test]
    fn test_independent_instances() {
        let mut a = RegisterFile::new();
        let b = RegisterFile::new();
        a.set(1, Word::from_u16(1));
        assert!(b.get(1).is_zero());
    }

    #[test]
    fn test_non_zero_skips_zero_register() {
        let mut regs = RegisterFile::new();
        regs.set(0, Word::from_u16(5));
        regs.set(2, Word::from_u16(8));
        regs.set(1, Word::from_u16(4));
        let snapshot = regs.non_zero();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].0, 1);
        assert_eq!(snapshot[1].0, 2);
    }
}
