//! Jack compiler driver.
//!
//! Accepts a single `.jack` file or a directory; every `X.jack` compiles
//! into a sibling `X.vm`. Each class compiles independently, and a file's
//! output is written only after its compilation has succeeded. The first
//! error aborts the run.
//!
//! # Usage
//! ```bash
//! jack-compiler <input.jack | directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use jack_compiler::CompileError;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack | directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    if !input.exists() {
        eprintln!("Error: '{}' does not exist", input.display());
        process::exit(1);
    }

    if let Err(e) = run(input) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(input: &Path) -> Result<(), CompileError> {
    for path in collect_inputs(input)? {
        let source = fs::read_to_string(&path)?;
        let file_label = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let vm_code = jack_compiler::compile_source(&file_label, &source)?;
        let output = path.with_extension("vm");
        fs::write(&output, vm_code)?;
        println!("Compiled {} -> {}", path.display(), output.display());
    }
    Ok(())
}

fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, CompileError> {
    if input.is_dir() {
        let mut paths: Vec<PathBuf> = fs::read_dir(input)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("jack"))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no .jack files in '{}'", input.display()),
            )
            .into());
        }
        Ok(paths)
    } else {
        if input.extension().and_then(|e| e.to_str()) != Some("jack") {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "input file must have the .jack extension",
            )
            .into());
        }
        Ok(vec![input.to_path_buf()])
    }
}
