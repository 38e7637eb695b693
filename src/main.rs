//! Nybble Emulator - CLI Entry Point
//!
//! Commands:
//! - `nybble-emu run <listing>` - Run a hex program listing
//! - `nybble-emu debug <listing>` - Interactive debugger
//! - `nybble-emu disasm <listing>` - Print a listing's disassembly
//! - `nybble-emu demo` - Run the built-in demo program
//! - `nybble-emu test` - Built-in self-test

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};

use nybble::listing::disassemble_word;
use nybble::{load_listing, parse_listing, ListingFile, Machine, MachineState, Word};

/// The built-in demo program: a LOAD/NOT/ADDI/ROT/JUMP loop over two
/// seeded memory words.
const DEMO_LISTING: &str = "\
; built-in demo program
@0020 0004
@0021 0004
1120    ; LOAD r1, 0x0020
1221    ; LOAD r2, 0x0021
6220    ; NOT r2, r2
3221    ; ADDI r2, r2, r1
A200    ; INC r2
2222    ; STORE 0x0022, r2
C221    ; ROT r2, 2, left
A200    ; INC r2
5100    ; MOVE r1, r0
A100    ; INC r1
D206    ; JUMP r2, 0x0006
2231    ; STORE 0x0023, r3
0000    ; HALT
";

#[derive(Parser)]
#[command(name = "nybble-emu")]
#[command(version = "0.1.0")]
#[command(about = "A 16-bit nibble-machine virtual CPU emulator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program listing until it halts
    Run {
        /// Path to the hex listing file to execute
        listing: String,
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Pause and print registers every N instructions (0 = never)
        #[arg(short, long, default_value = "0")]
        pause_every: u64,
        /// Write the final machine state as JSON to this file
        #[arg(long)]
        dump_state: Option<String>,
    },
    /// Interactive debugger
    Debug {
        /// Path to the listing file to debug
        listing: String,
    },
    /// Print a listing's disassembly
    Disasm {
        /// Path to the listing file
        listing: String,
    },
    /// Run the built-in demo program
    Demo {
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Pause and print registers every N instructions
        #[arg(short, long, default_value = "500")]
        pause_every: u64,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            listing,
            max_cycles,
            trace,
            pause_every,
            dump_state,
        }) => {
            let loaded = load_or_exit(&listing);
            run_program(loaded, max_cycles, trace, pause_every, dump_state);
        }
        Some(Commands::Debug { listing }) => {
            debug_program(&listing);
        }
        Some(Commands::Disasm { listing }) => {
            let loaded = load_or_exit(&listing);
            print!("{}", nybble::disassemble(&loaded.instructions));
        }
        Some(Commands::Demo {
            max_cycles,
            trace,
            pause_every,
        }) => match parse_listing(DEMO_LISTING) {
            Ok(loaded) => run_program(loaded, max_cycles, trace, pause_every, None),
            Err(e) => {
                eprintln!("demo listing failed to parse: {}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("Nybble Emulator v0.1.0");
            println!("A 16-bit nibble-machine virtual CPU emulator");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_binary_primitives();
        }
    }
}

fn load_or_exit(path: &str) -> ListingFile {
    match load_listing(path) {
        Ok(listing) if listing.is_empty() => {
            eprintln!("no instructions in {}", path);
            std::process::exit(1);
        }
        Ok(listing) => {
            println!("loaded {} instructions from {}", listing.len(), path);
            listing
        }
        Err(e) => {
            eprintln!("failed to load {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn run_program(
    listing: ListingFile,
    max_cycles: u64,
    trace: bool,
    pause_every: u64,
    dump_state: Option<String>,
) {
    let program = listing.instructions.clone();
    let mut machine = Machine::with_memory(listing.memory_seed());

    println!();
    println!("━━━ Execution ━━━");

    // The driver owns the program counter; the engine hands back the
    // next value after every instruction.
    let mut pc = 0usize;
    while machine.is_running() && machine.cycles < max_cycles {
        if trace {
            if let Some(word) = program.get(pc) {
                println!("{:3X}: {}", pc, disassemble_word(*word));
            }
        }

        match machine.step(&program, pc) {
            Ok(next_pc) => pc = next_pc,
            Err(e) => {
                eprintln!("machine error at pc {:X}: {}", pc, e);
                std::process::exit(1);
            }
        }

        if pause_every > 0
            && machine.is_running()
            && machine.cycles > 0
            && machine.cycles % pause_every == 0
        {
            print_registers(&machine);
            wait_for_enter();
        }
    }

    println!();
    println!("━━━ Result ━━━");
    println!("cycles: {}", machine.cycles);
    println!("jumps:  {}", machine.jumps);
    println!("state:  {:?}", machine.state);
    print_registers(&machine);
    print_memory(&machine);

    if machine.state == MachineState::Running && machine.cycles >= max_cycles {
        println!();
        println!(
            "reached max cycles limit ({}). Use --max-cycles to increase.",
            max_cycles
        );
    }

    if let Some(path) = dump_state {
        match serde_json::to_string_pretty(&machine) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    eprintln!("failed to write {}: {}", path, e);
                    std::process::exit(1);
                }
                println!("state written to {}", path);
            }
            Err(e) => {
                eprintln!("failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn print_registers(machine: &Machine) {
    let non_zero = machine.regs.non_zero();
    if non_zero.is_empty() {
        println!("registers: all zero");
        return;
    }
    for (number, word) in non_zero {
        println!("r{:<2} = {} ({})", number, word.to_hex(), word.to_u16());
    }
}

fn print_memory(machine: &Machine) {
    for (address, word) in machine.mem.non_zero() {
        println!("[{:04X}] = {} ({})", address, word.to_hex(), word.to_u16());
    }
}

fn wait_for_enter() {
    print!("paused, press Enter to continue...");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

fn debug_program(path: &str) {
    #[cfg(feature = "tui")]
    {
        let loaded = load_or_exit(path);
        println!("launching debugger...");
        if let Err(e) = nybble::run_debugger(loaded) {
            eprintln!("debugger error: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "tui"))]
    {
        let _ = path;
        eprintln!("built without the 'tui' feature");
        std::process::exit(1);
    }
}

fn demo_binary_primitives() {
    use nybble::{alu, Rotation, Unit};

    println!("━━━ Binary Primitives Demo ━━━");
    println!();

    println!("Units (4-bit hex digits):");
    for value in [0u8, 10, 15] {
        if let Ok(unit) = Unit::new(value) {
            println!("  {:2} = {} = {:?}", value, unit.to_hex(), unit.to_bits());
        }
    }
    println!();

    println!("Words (16 bits, four units):");
    let a = Word::from_u16(0x00FF);
    let b = Word::from_u16(0x0F0F);
    println!("  a = {}", a);
    println!("  b = {}", b);
    println!();

    println!("ALU:");
    println!("  a + b       = {}", alu::add(&a, &b));
    println!("  NOT a       = {}", alu::not(&a));
    println!("  a AND b     = {}", alu::and(&a, &b));
    println!("  a OR b      = {}", alu::or(&a, &b));
    println!("  a XOR b     = {}", alu::xor(&a, &b));
    println!("  a ROT 4 left = {}", alu::rotate(&a, 4, Rotation::Left));
    println!();

    println!("core binary primitives working");
}

fn run_self_test() {
    use nybble::{alu, decode, Rotation, Unit};

    println!("━━━ Nybble Emulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool| {
        if ok {
            println!("{name}... ok");
            passed += 1;
        } else {
            println!("{name}... FAILED");
            failed += 1;
        }
    };

    // Unit bit roundtrip over the whole nibble range
    let ok = (0..=Unit::MAX).all(|v| {
        Unit::new(v)
            .ok()
            .and_then(|u| Unit::from_bits(&u.to_bits()).ok())
            .map(|u| u.value() == v)
            .unwrap_or(false)
    });
    check("unit bit roundtrip", ok);

    // Word hex roundtrip
    let ok = ["0000", "1120", "FFFF"]
        .iter()
        .all(|s| Word::from_hex(s).map(|w| w.to_hex() == *s).unwrap_or(false));
    check("word hex roundtrip", ok);

    // Wrapping add
    let max = Word::from_u16(0xFFFF);
    let one = Word::from_u16(1);
    check("add wraps at word width", alu::add(&max, &one).is_zero());

    // NOT involution
    let w = Word::from_u16(0xBEEF);
    check("double complement is identity", alu::not(&alu::not(&w)) == w);

    // Rotate there and back
    let there = alu::rotate(&w, 5, Rotation::Left);
    check(
        "rotate left then right is identity",
        alu::rotate(&there, 5, Rotation::Right) == w,
    );

    // Decode rejects the opcode gap
    check(
        "opcode 4 is unsupported",
        Word::from_hex("4000")
            .map(|w| decode(w).is_err())
            .unwrap_or(false),
    );

    // End-to-end load/add program
    let ok = parse_listing("@0020 0004\n@0021 0004\n1120\n1221\n3221\n0000\n")
        .ok()
        .map(|listing| {
            let mut machine = Machine::with_memory(listing.memory_seed());
            machine.run(&listing.instructions).is_ok()
                && machine.is_halted()
                && machine.regs.get(2).to_u16() == 8
        })
        .unwrap_or(false);
    check("load/add program leaves r2 = 8", ok);

    println!();
    println!("results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}
