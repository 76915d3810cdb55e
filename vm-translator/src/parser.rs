//! Line parser for the stack-machine intermediate language.
//!
//! Each non-blank, non-comment line is one command. Commands are parsed
//! into a typed [`Command`] so the writer can dispatch exhaustively
//! instead of re-splitting strings.

use std::fmt;

use crate::error::TranslateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Local,
    Argument,
    This,
    That,
    Static,
    Constant,
    Pointer,
    Temp,
}

impl Segment {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            "pointer" => Some(Self::Pointer),
            "temp" => Some(Self::Temp),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Argument => "argument",
            Self::This => "this",
            Self::That => "that",
            Self::Static => "static",
            Self::Constant => "constant",
            Self::Pointer => "pointer",
            Self::Temp => "temp",
        }
    }

    /// The assembler symbol holding the segment base, for the four
    /// indirect segments.
    #[must_use]
    pub fn base_symbol(self) -> Option<&'static str> {
        match self {
            Self::Local => Some("LCL"),
            Self::Argument => Some("ARG"),
            Self::This => Some("THIS"),
            Self::That => Some("THAT"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Neg,
    And,
    Or,
    Not,
    Eq,
    Lt,
    Gt,
}

impl Operator {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "sub" => Some(Self::Sub),
            "neg" => Some(Self::Neg),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            "eq" => Some(Self::Eq),
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Eq => "eq",
            Self::Lt => "lt",
            Self::Gt => "gt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(Operator),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl fmt::Display for Command {
    /// Renders the canonical source spelling of the command.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(segment, index) => write!(f, "push {} {index}", segment.name()),
            Self::Pop(segment, index) => write!(f, "pop {} {index}", segment.name()),
            Self::Arithmetic(op) => write!(f, "{}", op.name()),
            Self::Label(label) => write!(f, "label {label}"),
            Self::Goto(label) => write!(f, "goto {label}"),
            Self::IfGoto(label) => write!(f, "if-goto {label}"),
            Self::Function(name, n) => write!(f, "function {name} {n}"),
            Self::Call(name, n) => write!(f, "call {name} {n}"),
            Self::Return => write!(f, "return"),
        }
    }
}

/// Parses a whole `.vm` source into commands. `file` is only used for
/// error reporting.
pub fn parse_source(source: &str, file: &str) -> Result<Vec<Command>, TranslateError> {
    let mut commands = Vec::new();
    for (number, raw) in source.lines().enumerate() {
        let line = raw.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        commands.push(parse_line(line).map_err(|message| TranslateError::Parse {
            file: file.to_string(),
            line: number + 1,
            message,
        })?);
    }
    Ok(commands)
}

fn parse_line(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let op = parts.next().expect("line is non-empty");
    let arg1 = parts.next();
    let arg2 = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments in '{line}'"));
    }

    let command = match op {
        "push" | "pop" => {
            let segment = arg1
                .and_then(Segment::parse)
                .ok_or_else(|| format!("'{op}' needs a segment name"))?;
            let index = parse_index(arg2, op)?;
            if op == "push" {
                Command::Push(segment, index)
            } else {
                if segment == Segment::Constant {
                    return Err("cannot pop to the constant segment".to_string());
                }
                Command::Pop(segment, index)
            }
        }
        "label" | "goto" | "if-goto" => {
            let label = arg1.ok_or_else(|| format!("'{op}' needs a label"))?;
            if arg2.is_some() {
                return Err(format!("too many arguments in '{line}'"));
            }
            match op {
                "label" => Command::Label(label.to_string()),
                "goto" => Command::Goto(label.to_string()),
                _ => Command::IfGoto(label.to_string()),
            }
        }
        "function" | "call" => {
            let name = arg1
                .ok_or_else(|| format!("'{op}' needs a function name"))?
                .to_string();
            let n = parse_index(arg2, op)?;
            if op == "function" {
                Command::Function(name, n)
            } else {
                Command::Call(name, n)
            }
        }
        "return" => {
            if arg1.is_some() {
                return Err("'return' takes no arguments".to_string());
            }
            Command::Return
        }
        other => {
            let operator =
                Operator::parse(other).ok_or_else(|| format!("unknown command '{other}'"))?;
            if arg1.is_some() {
                return Err(format!("'{other}' takes no arguments"));
            }
            Command::Arithmetic(operator)
        }
    };
    Ok(command)
}

fn parse_index(arg: Option<&str>, op: &str) -> Result<u16, String> {
    arg.ok_or_else(|| format!("'{op}' needs a numeric argument"))?
        .parse::<u16>()
        .map_err(|_| format!("'{op}' argument must be a non-negative number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(line: &str) -> Command {
        parse_source(line, "test").unwrap().remove(0)
    }

    #[test]
    fn parses_push_and_pop() {
        assert_eq!(one("push constant 7"), Command::Push(Segment::Constant, 7));
        assert_eq!(one("pop local 2"), Command::Pop(Segment::Local, 2));
        assert_eq!(one("push static 0"), Command::Push(Segment::Static, 0));
    }

    #[test]
    fn parses_arithmetic() {
        assert_eq!(one("add"), Command::Arithmetic(Operator::Add));
        assert_eq!(one("not"), Command::Arithmetic(Operator::Not));
        assert_eq!(one("lt"), Command::Arithmetic(Operator::Lt));
    }

    #[test]
    fn parses_branching_and_functions() {
        assert_eq!(one("label WHILE"), Command::Label("WHILE".to_string()));
        assert_eq!(one("if-goto WHILE"), Command::IfGoto("WHILE".to_string()));
        assert_eq!(
            one("function Sys.init 0"),
            Command::Function("Sys.init".to_string(), 0)
        );
        assert_eq!(
            one("call Math.multiply 2"),
            Command::Call("Math.multiply".to_string(), 2)
        );
        assert_eq!(one("return"), Command::Return);
    }

    #[test]
    fn skips_comments_and_blanks() {
        let commands = parse_source("// header\n\npush constant 1 // note\nadd\n", "t").unwrap();
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn rejects_pop_constant() {
        assert!(parse_source("pop constant 3", "t").is_err());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_source("push nowhere 3", "t").is_err());
        assert!(parse_source("push constant x", "t").is_err());
        assert!(parse_source("frobnicate", "t").is_err());
        assert!(parse_source("add 1", "t").is_err());
    }

    #[test]
    fn errors_carry_file_and_line() {
        let err = parse_source("push constant 1\nbogus\n", "Main.vm").unwrap_err();
        match err {
            TranslateError::Parse { file, line, .. } => {
                assert_eq!(file, "Main.vm");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn display_round_trips_the_source_spelling() {
        for line in [
            "push argument 1",
            "pop that 5",
            "eq",
            "label LOOP",
            "goto LOOP",
            "if-goto LOOP",
            "function Main.main 2",
            "call Main.main 0",
            "return",
        ] {
            assert_eq!(one(line).to_string(), line);
        }
    }
}
