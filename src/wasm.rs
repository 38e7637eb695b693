//! WebAssembly bindings for the nybble machine.
//!
//! This module provides JavaScript-friendly wrappers around the core
//! emulator. The wrapper plays the driver's role: it owns the program
//! listing and the program counter.

use wasm_bindgen::prelude::*;

use crate::binary::Word;
use crate::listing::{disassemble_word, parse_listing};
use crate::machine::Machine;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly machine wrapper.
#[wasm_bindgen]
pub struct WasmMachine {
    machine: Machine,
    program: Vec<Word>,
    seeds: Vec<(u16, Word)>,
    pc: usize,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create a new machine instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            machine: Machine::new(),
            program: Vec::new(),
            seeds: Vec::new(),
            pc: 0,
        }
    }

    /// Load a program from hex listing text.
    #[wasm_bindgen]
    pub fn load_listing(&mut self, source: &str) -> Result<usize, JsError> {
        let listing = parse_listing(source).map_err(|e| JsError::new(&format!("{}", e)))?;

        let len = listing.len();
        self.machine = Machine::with_memory(listing.memory_seed());
        self.seeds = listing.memory;
        self.program = listing.instructions;
        self.pc = 0;

        Ok(len)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.machine.is_running() {
            return Err(JsError::new("machine is halted"));
        }

        let instruction = self.program.get(self.pc).copied();
        self.pc = self
            .machine
            .step(&self.program, self.pc)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(instruction
            .map(disassemble_word)
            .unwrap_or_else(|| "???".into()))
    }

    /// Run until halt or max cycles. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> Result<u64, JsError> {
        let limit = self.machine.cycles + max_cycles as u64;
        while self.machine.is_running() && self.machine.cycles < limit {
            self.pc = self
                .machine
                .step(&self.program, self.pc)
                .map_err(|e| JsError::new(&format!("{}", e)))?;
        }
        Ok(self.machine.cycles)
    }

    /// Reset to initial state with the loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.machine = Machine::with_memory(self.seeds.iter().copied().collect());
        self.pc = 0;
    }

    /// Check if the machine is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    /// Check if the machine has halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.machine.is_halted()
    }

    /// Get the cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.machine.cycles
    }

    /// Get the jump count.
    #[wasm_bindgen]
    pub fn jumps(&self) -> u64 {
        self.machine.jumps
    }

    /// Get the program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Get a register value.
    #[wasm_bindgen]
    pub fn register(&self, number: u8) -> u16 {
        self.machine.regs.get(number).to_u16()
    }

    /// Get a register as a hex string.
    #[wasm_bindgen]
    pub fn register_hex(&self, number: u8) -> String {
        self.machine.regs.get(number).to_hex()
    }

    /// Get a memory word.
    #[wasm_bindgen]
    pub fn memory_at(&self, address: u16) -> u16 {
        self.machine.mem.read(address).to_u16()
    }

    /// Get a memory word as a hex string.
    #[wasm_bindgen]
    pub fn memory_hex_at(&self, address: u16) -> String {
        self.machine.mem.read(address).to_hex()
    }

    /// Get the execution state as a string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.machine.state)
    }

    /// Get the whole machine state as JSON.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.machine).map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Disassemble a single instruction word given as a 4-digit hex string.
#[wasm_bindgen]
pub fn wasm_disassemble(word: &str) -> Result<String, JsError> {
    let word = Word::from_hex(word).map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(disassemble_word(word))
}
