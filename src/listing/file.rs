//! Program listing files.
//!
//! A listing is a text file of pre-encoded instruction words:
//! - one instruction per line, as 4 hex digits (`1120`)
//! - memory seed lines `@AAAA HHHH` pre-load a word before execution
//! - lines starting with `;` are comments; trailing comments and blank
//!   lines are ignored
//!
//! No mnemonics are parsed anywhere: programs arrive pre-encoded.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::binary::{BinaryError, Word};

/// A loaded program listing.
#[derive(Debug, Clone, Default)]
pub struct ListingFile {
    /// The program instructions, in fetch order.
    pub instructions: Vec<Word>,
    /// Initial memory contents, in file order.
    pub memory: Vec<(u16, Word)>,
}

impl ListingFile {
    /// Create an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the listing holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The memory seeds as a map, ready for the machine.
    pub fn memory_seed(&self) -> HashMap<u16, Word> {
        self.memory.iter().copied().collect()
    }
}

/// Parse a listing from text.
pub fn parse_listing(source: &str) -> Result<ListingFile, ListingError> {
    let mut listing = ListingFile::new();

    for (line_num, raw) in source.lines().enumerate() {
        let line = line_num + 1;
        let text = strip_comment(raw);
        if text.is_empty() {
            continue;
        }

        if let Some(seed) = text.strip_prefix('@') {
            let (address, value) = parse_seed(seed, line)?;
            listing.memory.push((address, value));
        } else {
            let word = Word::from_hex(text)
                .map_err(|source| ListingError::BadInstruction { line, source })?;
            listing.instructions.push(word);
        }
    }

    Ok(listing)
}

/// Load a listing file from disk.
pub fn load_listing<P: AsRef<Path>>(path: P) -> Result<ListingFile, ListingError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ListingError::Io(e.to_string()))?;
    parse_listing(&source)
}

/// Save a listing file to disk.
pub fn save_listing<P: AsRef<Path>>(path: P, listing: &ListingFile) -> Result<(), ListingError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| ListingError::Io(e.to_string()))?;

    let mut out = String::new();
    for (address, value) in &listing.memory {
        out.push_str(&format!("@{:04X} {}\n", address, value.to_hex()));
    }
    for word in &listing.instructions {
        out.push_str(&word.to_hex());
        out.push('\n');
    }

    file.write_all(out.as_bytes())
        .map_err(|e| ListingError::Io(e.to_string()))
}

fn strip_comment(line: &str) -> &str {
    let text = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };
    text.trim()
}

fn parse_seed(seed: &str, line: usize) -> Result<(u16, Word), ListingError> {
    let mut parts = seed.split_whitespace();
    let (addr_part, value_part) = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(v), None) => (a, v),
        _ => return Err(ListingError::BadSeed { line }),
    };

    let address = u16::from_str_radix(addr_part, 16)
        .map_err(|_| ListingError::BadSeed { line })?;
    let value = Word::from_hex(value_part)
        .map_err(|source| ListingError::BadInstruction { line, source })?;

    Ok((address, value))
}

/// Errors that can occur loading or saving listings.
#[derive(Debug, Clone, Error)]
pub enum ListingError {
    /// Underlying file I/O failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// An instruction line failed to parse.
    #[error("line {line}: {source}")]
    BadInstruction { line: usize, source: BinaryError },

    /// A memory seed line was malformed.
    #[error("line {line}: expected '@AAAA HHHH' memory seed")]
    BadSeed { line: usize },
}
