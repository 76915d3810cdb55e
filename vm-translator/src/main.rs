//! VM translator driver.
//!
//! Accepts a single `.vm` file or a directory of them. A single file is
//! translated with a trailing halt loop into a sibling `.asm`; a directory
//! `D` is translated with the `Sys.init` bootstrap into `D/D.asm`. The
//! output is written only after the whole translation has succeeded.
//!
//! # Usage
//! ```bash
//! vm-translator <input.vm | directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use vm_translator::{translate, SourceFile, TranslateError};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    if !input.exists() {
        eprintln!("Error: '{}' does not exist", input.display());
        process::exit(1);
    }

    match run(input) {
        Ok(output) => println!("Translated {} -> {}", input.display(), output.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run(input: &Path) -> Result<PathBuf, TranslateError> {
    let (paths, output, bootstrap) = plan(input)?;

    let mut sources = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = short_name(path);
        let code = fs::read_to_string(path)?;
        sources.push(SourceFile::new(name, code));
    }

    let asm = translate(&sources, bootstrap)?;
    fs::write(&output, asm)?;
    Ok(output)
}

/// Decides inputs, output placement and bootstrap policy: a directory is
/// a whole program and gets the bootstrap, a lone file gets the halt loop.
fn plan(input: &Path) -> Result<(Vec<PathBuf>, PathBuf, bool), TranslateError> {
    if input.is_dir() {
        let mut paths: Vec<PathBuf> = fs::read_dir(input)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("vm"))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no .vm files in '{}'", input.display()),
            )
            .into());
        }
        let dir_name = input
            .file_name()
            .map_or_else(|| "out".to_string(), |n| n.to_string_lossy().into_owned());
        let output = input.join(format!("{dir_name}.asm"));
        Ok((paths, output, true))
    } else {
        if input.extension().and_then(|e| e.to_str()) != Some("vm") {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "input file must have the .vm extension",
            )
            .into());
        }
        let output = input.with_extension("asm");
        Ok((vec![input.to_path_buf()], output, false))
    }
}

fn short_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned())
}
