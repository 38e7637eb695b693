//! Word-addressed memory.
//!
//! Memory is a sparse mapping from address to word: locations that were
//! never written read as the zero word, and a write creates the entry.
//! The caller seeds initial contents before execution starts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::binary::Word;

/// Sparse word-addressed memory.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Memory {
    cells: HashMap<u16, Word>,
}

impl Memory {
    /// Create an empty memory. Every address reads as zero.
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Create a memory pre-loaded with the given contents.
    pub fn from_seed(seed: HashMap<u16, Word>) -> Self {
        Self { cells: seed }
    }

    /// Read a word. Unwritten addresses read as zero.
    pub fn read(&self, address: u16) -> Word {
        self.cells.get(&address).copied().unwrap_or_default()
    }

    /// Write a word, creating the entry if needed.
    pub fn write(&mut self, address: u16, value: Word) {
        self.cells.insert(address, value);
    }

    /// Clear every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Cells holding a non-zero word, sorted by address.
    ///
    /// Used by the drivers for state display.
    pub fn non_zero(&self) -> Vec<(u16, Word)> {
        let mut entries: Vec<(u16, Word)> = self
            .cells
            .iter()
            .filter(|(_, w)| !w.is_zero())
            .map(|(a, w)| (*a, *w))
            .collect();
        entries.sort_by_key(|(a, _)| *a);
        entries
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("non_zero_cells", &self.non_zero().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_address_reads_zero() {
        let mem = Memory::new();
        assert!(mem.read(0x20).is_zero());
        assert_eq!(mem.read(0xFFFF).to_hex(), "0000");
    }

    #[test]
    fn test_write_then_read() {
        let mut mem = Memory::new();
        mem.write(0x20, Word::from_u16(4));
        assert_eq!(mem.read(0x20).to_u16(), 4);
    }

    #[test]
    fn test_from_seed() {
        let mut seed = HashMap::new();
        seed.insert(32u16, Word::from_u16(4));
        seed.insert(33u16, Word::from_u16(4));

        let mem = Memory::from_seed(seed);
        assert_eq!(mem.read(32).to_u16(), 4);
        assert_eq!(mem.read(33).to_u16(), 4);
        assert!(mem.read(34).is_zero());
    }

    #[test]
    fn test_non_zero_sorted() {
        let mut mem = Memory::new();
        mem.write(40, Word::from_u16(1));
        mem.write(20, Word::from_u16(2));
        mem.write(30, Word::zero());

        let cells = mem.non_zero();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].0, 20);
        assert_eq!(cells[1].0, 40);
    }
}
