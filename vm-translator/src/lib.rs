//! VM translator: stack-machine `.vm` code → Hack assembly.
//!
//! The translation core is pure: [`translate`] takes in-memory sources and
//! returns the complete assembly text, which is what the driver writes to
//! disk and what the tests inspect directly.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::TranslateError;
pub use parser::{Command, Operator, Segment};

/// One `.vm` input: the short name (file stem, used to qualify `static`
/// references) and the source text.
pub struct SourceFile {
    pub name: String,
    pub code: String,
}

impl SourceFile {
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Translates a set of sources into one assembly text.
///
/// With `bootstrap` the output starts with `SP = 256; call Sys.init 0`;
/// without it a trailing infinite loop halts execution instead. Files
/// sharing a short name are rejected because their `static` allocations
/// would collide.
pub fn translate(sources: &[SourceFile], bootstrap: bool) -> Result<String, TranslateError> {
    for (i, source) in sources.iter().enumerate() {
        if sources[..i].iter().any(|other| other.name == source.name) {
            return Err(TranslateError::DuplicateStaticPrefix(source.name.clone()));
        }
    }

    let mut writer = CodeWriter::new(Vec::new());
    if bootstrap {
        writer.write_bootstrap()?;
    }
    for source in sources {
        let commands = parser::parse_source(&source.code, &format!("{}.vm", source.name))?;
        writer.set_file_name(&source.name);
        for command in &commands {
            writer.write_command(command)?;
        }
    }
    if !bootstrap {
        writer.write_end_loop()?;
    }

    Ok(String::from_utf8(writer.into_inner()).expect("writer emits ASCII"))
}
