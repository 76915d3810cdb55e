//! The compilation engine: a recursive-descent parser fused to the VM
//! code generator. No AST is built; every grammar rule emits its code as
//! it is recognized.
//!
//! Expressions are strictly left-associative with no operator precedence,
//! a property of the source language: `2 + 3 * 4` means `(2 + 3) * 4`.
//!
//! Call shapes are disambiguated with a one-token probe (advance, look,
//! retreat): `name[`, `name(`, `name.` and bare `name`, with the dotted
//! form split by scope lookup into a method call on a variable or a
//! function call on a class.

use std::io::Write;

use crate::error::CompileError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::tokenizer::{Keyword, Token, Tokenizer};
use crate::vm_writer::{Command, Segment, VmWriter};

type Result<T> = std::result::Result<T, CompileError>;

pub struct CompilationEngine<W: Write> {
    file: String,
    tokens: Tokenizer,
    writer: VmWriter<W>,
    class_table: SymbolTable,
    subroutine_table: SymbolTable,
    class_name: String,
    label_index: u32,
}

impl<W: Write> CompilationEngine<W> {
    pub fn new(file: &str, source: &str, out: W) -> Result<Self> {
        let tokens = Tokenizer::new(source).map_err(|message| CompileError::Parse {
            file: file.to_string(),
            message,
        })?;
        Ok(Self {
            file: file.to_string(),
            tokens,
            writer: VmWriter::new(out),
            class_table: SymbolTable::new(),
            subroutine_table: SymbolTable::new(),
            class_name: String::new(),
            label_index: 0,
        })
    }

    /// Compiles the single class the file contains and returns the output
    /// sink.
    pub fn compile(mut self) -> Result<W> {
        self.compile_class()?;
        Ok(self.writer.into_inner())
    }

    // ----- declarations -------------------------------------------------

    /// `'class' className '{' classVarDec* subroutineDec* '}'`
    fn compile_class(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.take_identifier()?;
        self.expect_symbol('{')?;
        while self.at_keyword(Keyword::Static) || self.at_keyword(Keyword::Field) {
            self.compile_class_var_dec()?;
        }
        while self.at_keyword(Keyword::Constructor)
            || self.at_keyword(Keyword::Function)
            || self.at_keyword(Keyword::Method)
        {
            self.compile_subroutine_dec()?;
        }
        self.expect_symbol('}')
    }

    /// `('static' | 'field') type varName (',' varName)* ';'`
    fn compile_class_var_dec(&mut self) -> Result<()> {
        let kind = match self.take()? {
            Token::Keyword(Keyword::Static) => Kind::Static,
            Token::Keyword(Keyword::Field) => Kind::Field,
            other => return Err(self.error(format!("expected 'static' or 'field', found {other}"))),
        };
        let type_name = self.take_type()?;
        loop {
            let name = self.take_identifier()?;
            self.class_table.define(&name, &type_name, kind);
            if self.at_symbol(',') {
                self.tokens.advance();
            } else {
                break;
            }
        }
        self.expect_symbol(';')
    }

    /// `('constructor' | 'function' | 'method') ('void' | type)
    ///  subroutineName '(' parameterList ')' subroutineBody`
    fn compile_subroutine_dec(&mut self) -> Result<()> {
        let flavor = match self.take()? {
            Token::Keyword(
                k @ (Keyword::Constructor | Keyword::Function | Keyword::Method),
            ) => k,
            other => return Err(self.error(format!("expected a subroutine kind, found {other}"))),
        };
        self.subroutine_table.reset();
        if flavor == Keyword::Method {
            // The receiver occupies argument 0; declared args start at 1.
            let class_name = self.class_name.clone();
            self.subroutine_table.define("this", &class_name, Kind::Arg);
        }
        let _return_type = self.take_return_type()?;
        let name = self.take_identifier()?;
        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;
        self.compile_subroutine_body(flavor, &name)
    }

    /// `((type varName) (',' type varName)*)?`
    fn compile_parameter_list(&mut self) -> Result<()> {
        if self.at_symbol(')') {
            return Ok(());
        }
        loop {
            let type_name = self.take_type()?;
            let name = self.take_identifier()?;
            self.subroutine_table.define(&name, &type_name, Kind::Arg);
            if self.at_symbol(',') {
                self.tokens.advance();
            } else {
                break;
            }
        }
        Ok(())
    }

    /// `'{' varDec* statements '}'`
    ///
    /// The `function` directive is emitted only after every `var`
    /// declaration has been seen, so its local count is final. It is
    /// followed by the preamble the subroutine flavor requires: a
    /// constructor allocates and anchors `this`, a method anchors the
    /// receiver passed as argument 0.
    fn compile_subroutine_body(&mut self, flavor: Keyword, name: &str) -> Result<()> {
        self.expect_symbol('{')?;
        while self.at_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let n_locals = self.subroutine_table.var_count(Kind::Var);
        let full_name = format!("{}.{name}", self.class_name);
        self.writer.write_function(&full_name, n_locals)?;
        match flavor {
            Keyword::Constructor => {
                let n_fields = self.class_table.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, n_fields)?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            Keyword::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    /// `'var' type varName (',' varName)* ';'`
    fn compile_var_dec(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Var)?;
        let type_name = self.take_type()?;
        loop {
            let name = self.take_identifier()?;
            self.subroutine_table.define(&name, &type_name, Kind::Var);
            if self.at_symbol(',') {
                self.tokens.advance();
            } else {
                break;
            }
        }
        self.expect_symbol(';')
    }

    // ----- statements ---------------------------------------------------

    fn compile_statements(&mut self) -> Result<()> {
        loop {
            match self.tokens.current() {
                Some(Token::Keyword(Keyword::Let)) => self.compile_let()?,
                Some(Token::Keyword(Keyword::If)) => self.compile_if()?,
                Some(Token::Keyword(Keyword::While)) => self.compile_while()?,
                Some(Token::Keyword(Keyword::Do)) => self.compile_do()?,
                Some(Token::Keyword(Keyword::Return)) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    /// `'let' varName ('[' expression ']')? '=' expression ';'`
    fn compile_let(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.take_identifier()?;
        if self.at_symbol('[') {
            self.compile_array_assignment(&name)?;
        } else {
            let (segment, index) = self.resolve(&name)?;
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.writer.write_pop(segment, index)?;
        }
        self.expect_symbol(';')
    }

    /// The destination address is computed before the right-hand side
    /// runs, and the value crosses through `temp 0` so an array access on
    /// the right cannot clobber `pointer 1` between address and store.
    fn compile_array_assignment(&mut self, name: &str) -> Result<()> {
        let (segment, index) = self.resolve(name)?;
        self.writer.write_push(segment, index)?;
        self.expect_symbol('[')?;
        self.compile_expression()?;
        self.expect_symbol(']')?;
        self.writer.write_arithmetic(Command::Add)?;

        self.expect_symbol('=')?;
        self.compile_expression()?;

        self.writer.write_pop(Segment::Temp, 0)?;
        self.writer.write_pop(Segment::Pointer, 1)?;
        self.writer.write_push(Segment::Temp, 0)?;
        Ok(self.writer.write_pop(Segment::That, 0)?)
    }

    /// `'if' '(' expression ')' '{' statements '}'
    ///  ('else' '{' statements '}')?`
    fn compile_if(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::If)?;
        let else_label = self.fresh_label();

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&else_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        if self.at_keyword(Keyword::Else) {
            let end_label = self.fresh_label();
            self.writer.write_goto(&end_label)?;
            self.writer.write_label(&else_label)?;
            self.tokens.advance();
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
            self.writer.write_label(&end_label)?;
        } else {
            self.writer.write_label(&else_label)?;
        }
        Ok(())
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn compile_while(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::While)?;
        let top_label = self.fresh_label();
        let exit_label = self.fresh_label();

        self.writer.write_label(&top_label)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&exit_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&top_label)?;
        Ok(self.writer.write_label(&exit_label)?)
    }

    /// `'do' subroutineCall ';'`; the void return value is discarded.
    fn compile_do(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Do)?;
        self.compile_expression()?;
        self.writer.write_pop(Segment::Temp, 0)?;
        self.expect_symbol(';')
    }

    /// `'return' expression? ';'`; a void return pushes 0.
    fn compile_return(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Return)?;
        if self.at_symbol(';') {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.writer.write_return()?;
        self.expect_symbol(';')
    }

    // ----- expressions --------------------------------------------------

    /// `term (op term)*`, reduced strictly left to right.
    fn compile_expression(&mut self) -> Result<()> {
        self.compile_term()?;
        while let Some(op) = self.current_binary_op() {
            self.tokens.advance();
            self.compile_term()?;
            match op {
                '+' => self.writer.write_arithmetic(Command::Add)?,
                '-' => self.writer.write_arithmetic(Command::Sub)?,
                '&' => self.writer.write_arithmetic(Command::And)?,
                '|' => self.writer.write_arithmetic(Command::Or)?,
                '<' => self.writer.write_arithmetic(Command::Lt)?,
                '>' => self.writer.write_arithmetic(Command::Gt)?,
                '=' => self.writer.write_arithmetic(Command::Eq)?,
                '*' => self.writer.write_call("Math.multiply", 2)?,
                _ => self.writer.write_call("Math.divide", 2)?,
            }
        }
        Ok(())
    }

    fn current_binary_op(&self) -> Option<char> {
        match self.tokens.current() {
            Some(Token::Symbol(c)) if "+-*/&|<>=".contains(*c) => Some(*c),
            _ => None,
        }
    }

    fn compile_term(&mut self) -> Result<()> {
        let token = self.current()?.clone();
        match token {
            Token::Symbol('(') => {
                self.tokens.advance();
                self.compile_expression()?;
                self.expect_symbol(')')
            }
            Token::Symbol('-') => {
                self.tokens.advance();
                self.compile_term()?;
                self.writer.write_arithmetic(Command::Neg)?;
                Ok(())
            }
            Token::Symbol('~') => {
                self.tokens.advance();
                self.compile_term()?;
                self.writer.write_arithmetic(Command::Not)?;
                Ok(())
            }
            Token::IntConst(value) => {
                self.tokens.advance();
                self.writer.write_push(Segment::Constant, value)?;
                Ok(())
            }
            Token::StringConst(text) => {
                self.tokens.advance();
                self.compile_string_constant(&text)
            }
            Token::Keyword(Keyword::True) => {
                self.tokens.advance();
                self.writer.write_push(Segment::Constant, 1)?;
                self.writer.write_arithmetic(Command::Neg)?;
                Ok(())
            }
            Token::Keyword(Keyword::False | Keyword::Null) => {
                self.tokens.advance();
                self.writer.write_push(Segment::Constant, 0)?;
                Ok(())
            }
            Token::Keyword(Keyword::This) => {
                self.tokens.advance();
                self.writer.write_push(Segment::Pointer, 0)?;
                Ok(())
            }
            Token::Identifier(name) => self.compile_identifier_term(&name),
            other => Err(self.error(format!("expected a term, found {other}"))),
        }
    }

    /// A fresh string object, built character by character.
    fn compile_string_constant(&mut self, text: &str) -> Result<()> {
        let length = u16::try_from(text.chars().count())
            .map_err(|_| self.error("string constant too long"))?;
        self.writer.write_push(Segment::Constant, length)?;
        self.writer.write_call("String.new", 1)?;
        for c in text.chars() {
            self.writer.write_push(Segment::Constant, c as u16)?;
            self.writer.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// Terms opening with an identifier: array access, the three call
    /// shapes, or a plain variable reference.
    fn compile_identifier_term(&mut self, name: &str) -> Result<()> {
        if self.next_symbol_is('[') {
            self.tokens.advance();
            self.compile_array_access(name)
        } else if self.next_symbol_is('(') {
            self.tokens.advance();
            self.compile_this_method_call(name)
        } else if self.next_symbol_is('.') {
            self.tokens.advance();
            self.compile_dotted_call(name)
        } else {
            self.tokens.advance();
            let (segment, index) = self.resolve(name)?;
            self.writer.write_push(segment, index)?;
            Ok(())
        }
    }

    /// `varName '[' expression ']'`
    fn compile_array_access(&mut self, name: &str) -> Result<()> {
        let (segment, index) = self.resolve(name)?;
        self.writer.write_push(segment, index)?;
        self.expect_symbol('[')?;
        self.compile_expression()?;
        self.expect_symbol(']')?;
        self.writer.write_arithmetic(Command::Add)?;
        self.writer.write_pop(Segment::Pointer, 1)?;
        Ok(self.writer.write_push(Segment::That, 0)?)
    }

    /// `subroutineName '(' expressionList ')'`, a method call on the
    /// current object.
    fn compile_this_method_call(&mut self, name: &str) -> Result<()> {
        self.writer.write_push(Segment::Pointer, 0)?;
        self.expect_symbol('(')?;
        let n_args = self.compile_expression_list()?;
        self.expect_symbol(')')?;
        let full_name = format!("{}.{name}", self.class_name);
        Ok(self.writer.write_call(&full_name, n_args + 1)?)
    }

    /// `name '.' subroutineName '(' expressionList ')'`, a method call
    /// when `name` is a variable in scope, otherwise a function call on
    /// the class `name`.
    fn compile_dotted_call(&mut self, name: &str) -> Result<()> {
        self.expect_symbol('.')?;
        let subroutine = self.take_identifier()?;
        self.expect_symbol('(')?;

        let receiver = self
            .subroutine_table
            .get(name)
            .or_else(|| self.class_table.get(name))
            .map(|entry| (entry.kind.segment(), entry.index, entry.type_name.clone()));

        match receiver {
            Some((segment, index, type_name)) => {
                self.writer.write_push(segment, index)?;
                let n_args = self.compile_expression_list()?;
                self.expect_symbol(')')?;
                Ok(self
                    .writer
                    .write_call(&format!("{type_name}.{subroutine}"), n_args + 1)?)
            }
            None => {
                let n_args = self.compile_expression_list()?;
                self.expect_symbol(')')?;
                Ok(self
                    .writer
                    .write_call(&format!("{name}.{subroutine}"), n_args)?)
            }
        }
    }

    /// `(expression (',' expression)*)?`; returns the argument count.
    fn compile_expression_list(&mut self) -> Result<u16> {
        if self.at_symbol(')') {
            return Ok(0);
        }
        self.compile_expression()?;
        let mut count = 1;
        while self.at_symbol(',') {
            self.tokens.advance();
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }

    // ----- helpers ------------------------------------------------------

    /// Subroutine scope shadows class scope.
    fn resolve(&self, name: &str) -> Result<(Segment, u16)> {
        self.subroutine_table
            .get(name)
            .or_else(|| self.class_table.get(name))
            .map(|entry| (entry.kind.segment(), entry.index))
            .ok_or_else(|| self.error(format!("undefined variable '{name}'")))
    }

    /// Class-scoped labels `L0, L1, ...`; they cannot collide with
    /// VM-level labels, which are namespaced by their enclosing function.
    fn fresh_label(&mut self) -> String {
        let label = format!("L{}", self.label_index);
        self.label_index += 1;
        label
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::Parse {
            file: self.file.clone(),
            message: message.into(),
        }
    }

    fn current(&self) -> Result<&Token> {
        self.tokens
            .current()
            .ok_or_else(|| CompileError::Parse {
                file: self.file.clone(),
                message: "unexpected end of input".to_string(),
            })
    }

    /// Clones the current token and moves past it.
    fn take(&mut self) -> Result<Token> {
        let token = self.current()?.clone();
        self.tokens.advance();
        Ok(token)
    }

    fn take_identifier(&mut self) -> Result<String> {
        match self.take()? {
            Token::Identifier(name) => Ok(name),
            other => Err(self.error(format!("expected an identifier, found {other}"))),
        }
    }

    /// `'int' | 'char' | 'boolean' | className`
    fn take_type(&mut self) -> Result<String> {
        match self.take()? {
            Token::Keyword(k @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => {
                Ok(k.name().to_string())
            }
            Token::Identifier(name) => Ok(name),
            other => Err(self.error(format!("expected a type, found {other}"))),
        }
    }

    fn take_return_type(&mut self) -> Result<String> {
        if self.at_keyword(Keyword::Void) {
            self.tokens.advance();
            return Ok("void".to_string());
        }
        self.take_type()
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<()> {
        match self.take()? {
            Token::Symbol(c) if c == symbol => Ok(()),
            other => Err(self.error(format!("expected '{symbol}', found {other}"))),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        match self.take()? {
            Token::Keyword(k) if k == keyword => Ok(()),
            other => Err(self.error(format!("expected '{}', found {other}", keyword.name()))),
        }
    }

    fn at_symbol(&self, symbol: char) -> bool {
        matches!(self.tokens.current(), Some(Token::Symbol(c)) if *c == symbol)
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.tokens.current(), Some(Token::Keyword(k)) if *k == keyword)
    }

    /// Probes the token after the current one: advance, look, retreat.
    fn next_symbol_is(&mut self, symbol: char) -> bool {
        self.tokens.advance();
        let matched = self.at_symbol(symbol);
        self.tokens.retreat();
        matched
    }
}
