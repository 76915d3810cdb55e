use std::fmt;
use std::io;

#[derive(Debug)]
pub enum TranslateError {
    Io(io::Error),
    /// A line that is not a well-formed VM command.
    Parse {
        file: String,
        line: usize,
        message: String,
    },
    /// Two input files share a short name, which would collide in the
    /// `static` segment naming scheme.
    DuplicateStaticPrefix(String),
}

impl std::error::Error for TranslateError {}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse {
                file,
                line,
                message,
            } => write!(f, "{file}, line {line}: {message}"),
            Self::DuplicateStaticPrefix(name) => {
                write!(f, "two input files are both named '{name}.vm'")
            }
        }
    }
}

impl From<io::Error> for TranslateError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
