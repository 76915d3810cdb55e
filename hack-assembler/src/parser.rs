//! Line-level parsing of Hack assembly.
//!
//! Parsing is zero-copy: every [`Instruction`] borrows its fields from the
//! input line. Comment stripping uses a byte scan rather than `str::find`,
//! which is measurably faster on the short lines typical of `.asm` files.

/// One syntactic line of Hack assembly.
///
/// Labels emit no code; the two-pass driver uses them to bind symbols to
/// the address of the following real instruction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Instruction<'a> {
    /// `@operand` where the operand is a decimal constant or a symbol.
    A(&'a str),
    /// `dest=comp;jump` with dest and jump optional.
    C {
        dest: &'a str,
        comp: &'a str,
        jump: &'a str,
    },
    /// `(NAME)` pseudo-instruction.
    Label(&'a str),
}

impl<'a> Instruction<'a> {
    /// Parses a cleaned, non-empty line.
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        match line.as_bytes()[0] {
            b'@' => Instruction::A(&line[1..]),
            b'(' => Instruction::Label(&line[1..line.len() - 1]),
            _ => Self::parse_c(line),
        }
    }

    fn parse_c(line: &'a str) -> Self {
        let (dest, rest) = match line.find('=') {
            Some(pos) => (&line[..pos], &line[pos + 1..]),
            None => ("", line),
        };
        let (comp, jump) = match rest.find(';') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };
        Instruction::C { dest, comp, jump }
    }
}

/// Strips a `//` comment using a byte scan.
#[inline]
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        if bytes[i] == b'/' && bytes[i + 1] == b'/' {
            return &line[..i];
        }
    }
    line
}

/// Reduces a raw source line to instruction text, or `None` for blank
/// lines and comments.
#[inline]
#[must_use]
pub fn clean(line: &str) -> Option<&str> {
    let trimmed = strip_comment(line).trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Iterates the instructions of a source text, skipping blanks and
/// comments. Both assembler passes run this iterator over the same
/// in-memory source, which is how the pass 1 → pass 2 rewind is realized.
pub fn instructions(source: &str) -> impl Iterator<Item = Instruction<'_>> {
    source.lines().filter_map(clean).map(Instruction::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_instruction_form() {
        assert_eq!(Instruction::parse("@100"), Instruction::A("100"));
        assert_eq!(Instruction::parse("@LOOP"), Instruction::A("LOOP"));
        assert_eq!(Instruction::parse("(LOOP)"), Instruction::Label("LOOP"));
        assert_eq!(
            Instruction::parse("D=M"),
            Instruction::C {
                dest: "D",
                comp: "M",
                jump: ""
            }
        );
    }

    #[test]
    fn splits_full_c_instruction() {
        assert_eq!(
            Instruction::parse("MD=D+1;JGT"),
            Instruction::C {
                dest: "MD",
                comp: "D+1",
                jump: "JGT"
            }
        );
    }

    #[test]
    fn missing_dest_is_empty() {
        assert_eq!(
            Instruction::parse("D;JMP"),
            Instruction::C {
                dest: "",
                comp: "D",
                jump: "JMP"
            }
        );
    }

    #[test]
    fn missing_jump_is_empty() {
        assert_eq!(
            Instruction::parse("M=D+1"),
            Instruction::C {
                dest: "M",
                comp: "D+1",
                jump: ""
            }
        );
    }

    #[test]
    fn strips_comments_and_whitespace() {
        assert_eq!(clean("  @100  // inline"), Some("@100"));
        assert_eq!(clean("// only a comment"), None);
        assert_eq!(clean("   "), None);
        assert_eq!(clean(""), None);
    }

    #[test]
    fn iterates_real_instructions_only() {
        let source = "// add two numbers\n@2\nD=A\n\n(END)\n@END\n0;JMP\n";
        let parsed: Vec<_> = instructions(source).collect();
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[0], Instruction::A("2"));
        assert_eq!(parsed[2], Instruction::Label("END"));
    }
}
