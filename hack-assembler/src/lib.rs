//! Hack assembler: symbolic `.asm` text → 16-bit binary `.hack` text.
//!
//! # Architecture
//!
//! The classic two-pass design:
//! - **Pass 1** scans the source and binds each `(LABEL)` to the address of
//!   the following real instruction.
//! - **Pass 2** re-reads the source, allocating variables from RAM 16 on
//!   first sight and emitting one 16-character binary line per instruction.
//!
//! Modules:
//! - [`parser`]: zero-copy classification of source lines
//! - [`code`]: PHF-backed binary encoding of the instruction fields
//! - [`symbol_table`]: predefined symbols, labels and variable allocation
//! - [`error`]: the assembler error type
//!
//! # Example
//!
//! ```rust
//! let source = "@2\nD=A\n@3\nD=D+A\n@0\nM=D\n";
//! let binary = hack_assembler::assemble(source).unwrap();
//! assert_eq!(binary.lines().next(), Some("0000000000000010"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod code;
pub mod error;
pub mod parser;
pub mod symbol_table;

pub use error::AsmError;
pub use parser::Instruction;
pub use symbol_table::SymbolTable;

/// Assembles a complete source text into `.hack` binary text.
///
/// The returned string has one 16-character line per A- or C-instruction,
/// each terminated by a newline. Nothing is returned on error, which is
/// what lets the driver guarantee all-or-nothing output files.
pub fn assemble(source: &str) -> Result<String, AsmError> {
    let mut symbols = SymbolTable::new();
    first_pass(source, &mut symbols);
    second_pass(source, &mut symbols)
}

/// Pass 1: bind labels. Labels do not occupy an instruction slot, so only
/// A- and C-instructions advance the location counter.
fn first_pass(source: &str, symbols: &mut SymbolTable) {
    let mut pc: u16 = 0;
    for instruction in parser::instructions(source) {
        match instruction {
            Instruction::Label(name) => symbols.bind_label(name, pc),
            Instruction::A(_) | Instruction::C { .. } => pc += 1,
        }
    }
}

/// Pass 2: emit machine code, resolving symbols and allocating variables.
fn second_pass(source: &str, symbols: &mut SymbolTable) -> Result<String, AsmError> {
    let mut output = String::new();
    for instruction in parser::instructions(source) {
        let word = match instruction {
            Instruction::A(operand) => code::encode_a(a_operand(operand, symbols)?),
            Instruction::C { dest, comp, jump } => code::encode_c(dest, comp, jump)?,
            Instruction::Label(_) => continue,
        };
        output.push_str(&code::to_binary_text(word));
        output.push('\n');
    }
    Ok(output)
}

/// An all-digits operand is a decimal constant; anything else is a symbol,
/// allocated on first encounter.
fn a_operand(operand: &str, symbols: &mut SymbolTable) -> Result<u16, AsmError> {
    if operand.bytes().all(|b| b.is_ascii_digit()) && !operand.is_empty() {
        operand
            .parse::<u16>()
            .ok()
            .filter(|&n| n < 1 << 15)
            .ok_or_else(|| AsmError::AddressOutOfRange {
                operand: operand.to_string(),
            })
    } else {
        Ok(symbols.resolve(operand))
    }
}
