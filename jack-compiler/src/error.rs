use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CompileError {
    Io(io::Error),
    /// Malformed source. No recovery is attempted; the first parse error
    /// aborts the compilation of the file.
    Parse { file: String, message: String },
}

impl std::error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse { file, message } => write!(f, "{file}: {message}"),
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
