//! TUI debugger for the nybble machine.
//!
//! Provides an interactive terminal-based debugger with:
//! - Program view with current-pc cursor and breakpoints
//! - Register and sparse-memory views in hex
//! - Step/run/breakpoint controls

mod app;
mod ui;

pub use app::{run_debugger, DebuggerApp};
