//! Debugger application state and logic.
//!
//! The app is the driver: it owns the program listing and the program
//! counter, and feeds the machine one instruction at a time.

use std::collections::HashSet;

use crate::binary::Word;
use crate::listing::{disassemble_word, ListingFile};
use crate::machine::Machine;

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub machine: Machine,
    /// The program listing.
    pub program: Vec<Word>,
    /// Initial memory seeds, kept for reset.
    pub seeds: Vec<(u16, Word)>,
    /// Driver-owned program counter.
    pub pc: usize,
    /// Breakpoints, by pc.
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger for a loaded listing.
    pub fn new(listing: ListingFile) -> Self {
        Self {
            machine: Machine::with_memory(listing.memory_seed()),
            program: listing.instructions,
            seeds: listing.memory,
            pc: 0,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.machine.is_running() {
            self.status = format!("Machine halted after {} cycles", self.machine.cycles);
            self.running = false;
            return;
        }

        let pc = self.pc;
        let instruction = self.program.get(pc).copied();
        match self.machine.step(&self.program, pc) {
            Ok(next_pc) => {
                self.pc = next_pc;
                let text = instruction
                    .map(disassemble_word)
                    .unwrap_or_else(|| "???".into());
                self.status = format!("{pc:X}: {text}");
            }
            Err(e) => {
                self.status = format!("Error at pc {pc:X}: {e}");
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.machine.is_running() {
            self.running = false;
            self.status = format!("Halted after {} cycles", self.machine.cycles);
            return;
        }

        if self.breakpoints.contains(&self.pc) {
            self.running = false;
            self.status = format!("Breakpoint at pc {:X}", self.pc);
            return;
        }

        self.step();
    }

    /// Toggle a breakpoint at the current pc.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.pc;
        if self.breakpoints.contains(&pc) {
            self.breakpoints.remove(&pc);
            self.status = format!("Removed breakpoint at pc {pc:X}");
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at pc {pc:X}");
        }
    }

    /// Reset the machine to its initial state.
    pub fn reset(&mut self) {
        self.machine = Machine::with_memory(self.seeds.iter().copied().collect());
        self.pc = 0;
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Disassembly window around the current pc.
    ///
    /// Returns (pc, text, is_current) tuples for the program pane.
    pub fn disassembly_window(&self, lines: usize) -> Vec<(usize, String, bool)> {
        let half = lines / 2;
        let start = self.pc.saturating_sub(half);

        (start..start + lines)
            .filter(|pc| *pc < self.program.len())
            .map(|pc| {
                let text = disassemble_word(self.program[pc]);
                (pc, text, pc == self.pc)
            })
            .collect()
    }
}

/// Run the debugger on a loaded listing.
pub fn run_debugger(listing: ListingFile) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create app
    let mut app = DebuggerApp::new(listing);

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => {
                            if app.mem_scroll > 0 {
                                app.mem_scroll -= 1;
                            }
                        }
                        KeyCode::Down => {
                            app.mem_scroll += 1;
                        }
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::parse_listing;

    fn demo_app() -> DebuggerApp {
        let listing = parse_listing("@0020 0004\n@0021 0004\n1120\n1221\n3221\n0000\n").unwrap();
        DebuggerApp::new(listing)
    }

    #[test]
    fn test_step_advances_pc() {
        let mut app = demo_app();
        app.step();
        assert_eq!(app.pc, 1);
        assert_eq!(app.machine.regs.get(1).to_u16(), 4);
    }

    #[test]
    fn test_runs_to_halt_via_tick() {
        let mut app = demo_app();
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert!(app.machine.is_halted());
        assert!(!app.running);
        assert_eq!(app.machine.regs.get(2).to_u16(), 8);
    }

    #[test]
    fn test_breakpoint_pauses_run() {
        let mut app = demo_app();
        app.breakpoints.insert(2);
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert_eq!(app.pc, 2);
        assert!(!app.running);
        assert!(app.machine.is_running());
    }

    #[test]
    fn test_reset_restores_seeds() {
        let mut app = demo_app();
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        app.reset();
        assert_eq!(app.pc, 0);
        assert!(app.machine.is_running());
        assert_eq!(app.machine.mem.read(0x20).to_u16(), 4);
        assert!(app.machine.regs.get(2).is_zero());
    }
}
