//! Jack compiler: object-based `.jack` source → stack-machine `.vm` code.
//!
//! # Architecture
//!
//! - [`tokenizer`]: regex-driven scan of the whole source into tagged
//!   tokens, behind a bidirectional cursor
//! - [`symbol_table`]: class and subroutine scopes with dense per-kind
//!   indices
//! - [`compilation_engine`]: recursive-descent parser fused to the code
//!   generator; parses and emits in a single pass with no AST
//! - [`vm_writer`]: one-line-per-command serializer
//!
//! # Example
//!
//! ```rust
//! let vm = jack_compiler::compile_source(
//!     "Main.jack",
//!     "class Main { function int f() { return 1; } }",
//! )
//! .unwrap();
//! assert!(vm.starts_with("function Main.f 0\n"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod compilation_engine;
pub mod error;
pub mod symbol_table;
pub mod tokenizer;
pub mod vm_writer;

pub use compilation_engine::CompilationEngine;
pub use error::CompileError;
pub use tokenizer::{Keyword, Token, Tokenizer};

/// Compiles one class source to VM code. `file` is used in error messages
/// only.
pub fn compile_source(file: &str, source: &str) -> Result<String, CompileError> {
    let engine = CompilationEngine::new(file, source, Vec::new())?;
    let out = engine.compile()?;
    Ok(String::from_utf8(out).expect("writer emits UTF-8"))
}
