//! Jack tokenizer.
//!
//! The whole source is scanned in one pass by a single regex alternation.
//! Alternation order gives longest-match behavior where it matters:
//! comments are consumed before `/` can match as a symbol, string literals
//! before `"`, identifiers and integers before their leading character.
//! Identifiers that spell a keyword are retagged.
//!
//! The token stream is held in memory behind a cursor that can move both
//! forward and one step back; the compilation engine uses the lookback to
//! disambiguate call shapes and array accesses.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(concat!(
        r"(?P<comment>/\*(?s:.*?)\*/|//[^\n]*)",
        r#"|(?P<string>"[^"\n]*")"#,
        r"|(?P<identifier>[_A-Za-z][_A-Za-z0-9]*)",
        r"|(?P<int>[0-9]+)",
        r"|(?P<symbol>\S)",
    ))
    .expect("token regex is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "class" => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            "field" => Some(Self::Field),
            "static" => Some(Self::Static),
            "var" => Some(Self::Var),
            "int" => Some(Self::Int),
            "char" => Some(Self::Char),
            "boolean" => Some(Self::Boolean),
            "void" => Some(Self::Void),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "null" => Some(Self::Null),
            "this" => Some(Self::This),
            "let" => Some(Self::Let),
            "do" => Some(Self::Do),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "while" => Some(Self::While),
            "return" => Some(Self::Return),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Constructor => "constructor",
            Self::Function => "function",
            Self::Method => "method",
            Self::Field => "field",
            Self::Static => "static",
            Self::Var => "var",
            Self::Int => "int",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::Void => "void",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::This => "this",
            Self::Let => "let",
            Self::Do => "do",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Return => "return",
        }
    }
}

/// One lexical element, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(Keyword),
    Symbol(char),
    IntConst(u16),
    StringConst(String),
    Identifier(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "'{}'", k.name()),
            Self::Symbol(c) => write!(f, "'{c}'"),
            Self::IntConst(n) => write!(f, "{n}"),
            Self::StringConst(s) => write!(f, "\"{s}\""),
            Self::Identifier(s) => write!(f, "'{s}'"),
        }
    }
}

/// Token stream with a bidirectional cursor.
pub struct Tokenizer {
    tokens: Vec<Token>,
    index: usize,
}

impl Tokenizer {
    /// Tokenizes a whole source text. The only token-level errors are
    /// integer constants outside the Hack 15-bit range.
    pub fn new(source: &str) -> Result<Self, String> {
        let mut tokens = Vec::new();
        for captures in TOKEN_RE.captures_iter(source) {
            if captures.name("comment").is_some() {
                continue;
            }
            let token = if let Some(m) = captures.name("string") {
                let text = m.as_str();
                Token::StringConst(text[1..text.len() - 1].to_string())
            } else if let Some(m) = captures.name("identifier") {
                match Keyword::parse(m.as_str()) {
                    Some(keyword) => Token::Keyword(keyword),
                    None => Token::Identifier(m.as_str().to_string()),
                }
            } else if let Some(m) = captures.name("int") {
                let value: u16 = m
                    .as_str()
                    .parse()
                    .ok()
                    .filter(|&n| n <= 32767)
                    .ok_or_else(|| format!("integer constant '{}' exceeds 32767", m.as_str()))?;
                Token::IntConst(value)
            } else {
                let m = captures.name("symbol").expect("alternation is exhaustive");
                Token::Symbol(m.as_str().chars().next().expect("symbol is one char"))
            };
            tokens.push(token);
        }
        Ok(Self { tokens, index: 0 })
    }

    #[must_use]
    pub fn has_more_tokens(&self) -> bool {
        self.index < self.tokens.len()
    }

    /// The token under the cursor, or `None` past the end.
    #[must_use]
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Moves the cursor forward one token.
    pub fn advance(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Moves the cursor back one token (the one-step lookback).
    pub fn retreat(&mut self) {
        self.index = self.index.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Tokenizer::new(source).unwrap().tokens
    }

    #[test]
    fn tags_each_token_kind() {
        assert_eq!(
            tokens("class Main { }"),
            [
                Token::Keyword(Keyword::Class),
                Token::Identifier("Main".to_string()),
                Token::Symbol('{'),
                Token::Symbol('}'),
            ]
        );
    }

    #[test]
    fn splits_symbols_without_whitespace() {
        assert_eq!(
            tokens("a[i+1]"),
            [
                Token::Identifier("a".to_string()),
                Token::Symbol('['),
                Token::Identifier("i".to_string()),
                Token::Symbol('+'),
                Token::IntConst(1),
                Token::Symbol(']'),
            ]
        );
    }

    #[test]
    fn strips_line_and_block_comments() {
        let source = "let x = 1; // trailing\n/* block\nspanning lines */ let y = 2;";
        let toks = tokens(source);
        assert!(!toks.iter().any(|t| matches!(t, Token::Symbol('/'))));
        assert_eq!(toks.iter().filter(|t| matches!(t, Token::Keyword(Keyword::Let))).count(), 2);
    }

    #[test]
    fn block_comment_is_non_greedy() {
        // Two comments must not swallow the code between them.
        let toks = tokens("/* one */ x /* two */");
        assert_eq!(toks, [Token::Identifier("x".to_string())]);
    }

    #[test]
    fn string_constants_keep_inner_text() {
        assert_eq!(
            tokens("\"hello world\""),
            [Token::StringConst("hello world".to_string())]
        );
        assert_eq!(tokens("\"\""), [Token::StringConst(String::new())]);
    }

    #[test]
    fn keywords_shadow_identifiers_exactly() {
        assert_eq!(tokens("return"), [Token::Keyword(Keyword::Return)]);
        assert_eq!(
            tokens("returned"),
            [Token::Identifier("returned".to_string())]
        );
    }

    #[test]
    fn underscore_identifiers_are_legal() {
        assert_eq!(
            tokens("_x x_1"),
            [
                Token::Identifier("_x".to_string()),
                Token::Identifier("x_1".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_oversized_integer_constants() {
        assert!(Tokenizer::new("32768").is_err());
        assert!(Tokenizer::new("32767").is_ok());
    }

    #[test]
    fn cursor_moves_both_ways() {
        let mut t = Tokenizer::new("a b").unwrap();
        assert_eq!(t.current(), Some(&Token::Identifier("a".to_string())));
        t.advance();
        assert_eq!(t.current(), Some(&Token::Identifier("b".to_string())));
        t.retreat();
        assert_eq!(t.current(), Some(&Token::Identifier("a".to_string())));
        t.advance();
        t.advance();
        assert!(!t.has_more_tokens());
        assert_eq!(t.current(), None);
    }
}
