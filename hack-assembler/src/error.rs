//! Error type shared by the assembler passes.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum AsmError {
    Io(io::Error),
    /// A `dest`, `comp` or `jump` field that is not in the instruction set.
    UnknownMnemonic { field: &'static str, mnemonic: String },
    /// An `@n` operand outside the 15-bit address space.
    AddressOutOfRange { operand: String },
}

impl std::error::Error for AsmError {}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnknownMnemonic { field, mnemonic } => {
                write!(f, "unknown {field} mnemonic '{mnemonic}'")
            }
            Self::AddressOutOfRange { operand } => {
                write!(f, "address '@{operand}' does not fit in 15 bits")
            }
        }
    }
}

impl From<io::Error> for AsmError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
