//! Hack assembler driver.
//!
//! Reads one `.asm` file, runs both passes in memory, and writes the
//! sibling `.hack` file only when the whole translation succeeds, so a
//! failed run never leaves a truncated output behind.
//!
//! # Usage
//! ```bash
//! hack-assembler <input.asm> [output.hack]
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.asm> [output.hack]", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    if input.extension().and_then(|e| e.to_str()) != Some("asm") {
        eprintln!("Error: input file must have the .asm extension");
        process::exit(1);
    }

    let output = args
        .get(2)
        .map_or_else(|| input.with_extension("hack"), PathBuf::from);

    if let Err(e) = run(input, &output) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    println!("Assembled {} -> {}", input.display(), output.display());
}

fn run(input: &Path, output: &Path) -> Result<(), hack_assembler::AsmError> {
    let source = fs::read_to_string(input)?;
    let binary = hack_assembler::assemble(&source)?;
    fs::write(output, binary)?;
    Ok(())
}
