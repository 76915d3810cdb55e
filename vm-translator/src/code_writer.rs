//! Lowers VM commands to Hack assembly.
//!
//! Stack discipline: `SP` points at the first free slot above the stack.
//! Push is `*SP = v; SP++`, pop is `SP--; v = *SP`. Arithmetic rewrites
//! the stack top in place instead of popping and re-pushing.
//!
//! The writer carries four pieces of state: the short name of the file
//! being translated (for `static` symbols), the enclosing function name
//! (for label namespacing), a comparison-label counter scoped to the
//! output file, and a return-label counter scoped to the function.

use std::io::{self, Write};

use crate::parser::{Command, Operator, Segment};

/// Scratch register holding a pop destination address.
const POP_SCRATCH: &str = "R13";

/// RAM base of the `pointer` segment (THIS/THAT).
const POINTER_BASE: u16 = 3;

/// RAM base of the `temp` segment.
const TEMP_BASE: u16 = 5;

pub struct CodeWriter<W: Write> {
    out: W,
    file_name: String,
    function_name: String,
    compare_index: usize,
    call_index: usize,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            file_name: String::new(),
            function_name: String::new(),
            compare_index: 0,
            call_index: 0,
        }
    }

    /// Sets the short name used to qualify `static` references. Called
    /// once per input file; the comparison-label counter deliberately
    /// survives the switch.
    pub fn set_file_name(&mut self, name: &str) {
        self.file_name.clear();
        self.file_name.push_str(name);
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// `SP = 256`, then `call Sys.init 0`.
    pub fn write_bootstrap(&mut self) -> io::Result<()> {
        writeln!(self.out, "// bootstrap")?;
        self.emit(&["@256", "D=A", "@SP", "M=D"])?;
        self.write_call("Sys.init", 0)
    }

    /// Trailing infinite loop for translations without a bootstrap call.
    pub fn write_end_loop(&mut self) -> io::Result<()> {
        writeln!(self.out, "// end")?;
        self.emit(&["(END)", "@END", "0;JMP"])
    }

    pub fn write_command(&mut self, command: &Command) -> io::Result<()> {
        writeln!(self.out, "// {command}")?;
        match command {
            Command::Push(segment, index) => self.write_push(*segment, *index),
            Command::Pop(segment, index) => self.write_pop(*segment, *index),
            Command::Arithmetic(op) => self.write_arithmetic(*op),
            Command::Label(label) => self.write_label(label),
            Command::Goto(label) => self.write_goto(label),
            Command::IfGoto(label) => self.write_if_goto(label),
            Command::Function(name, n_locals) => self.write_function(name, *n_locals),
            Command::Call(name, n_args) => self.write_call(name, *n_args),
            Command::Return => self.write_return(),
        }
    }

    fn write_arithmetic(&mut self, op: Operator) -> io::Result<()> {
        match op {
            Operator::Add => self.write_binary("M=D+M"),
            Operator::Sub => self.write_binary("M=M-D"),
            Operator::And => self.write_binary("M=D&M"),
            Operator::Or => self.write_binary("M=D|M"),
            Operator::Neg => self.write_unary("M=-M"),
            Operator::Not => self.write_unary("M=!M"),
            Operator::Eq => self.write_comparison("JEQ"),
            Operator::Lt => self.write_comparison("JLT"),
            Operator::Gt => self.write_comparison("JGT"),
        }
    }

    /// Pops the top operand into D, then combines it into the new top in
    /// place.
    fn write_binary(&mut self, combine: &str) -> io::Result<()> {
        self.emit(&["@SP", "AM=M-1", "D=M", "A=A-1", combine])
    }

    fn write_unary(&mut self, apply: &str) -> io::Result<()> {
        self.emit(&["@SP", "A=M-1", apply])
    }

    /// `x - y` jumped on `JEQ`/`JLT`/`JGT`; writes -1 (true) or 0 (false)
    /// over the second operand.
    fn write_comparison(&mut self, jump: &str) -> io::Result<()> {
        let label = format!("COMP_{}", self.compare_index);
        self.compare_index += 1;

        self.emit(&["@SP", "AM=M-1", "D=M", "A=A-1", "D=M-D"])?;
        self.emit(&[&format!("@{label}_TRUE"), &format!("D;{jump}")])?;
        self.emit(&["@SP", "A=M-1", "M=0"])?;
        self.emit(&[&format!("@{label}_END"), "0;JMP", &format!("({label}_TRUE)")])?;
        self.emit(&["@SP", "A=M-1", "M=-1"])?;
        writeln!(self.out, "({label}_END)")
    }

    fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Constant => self.emit(&[&format!("@{index}"), "D=A"])?,
            Segment::Static => {
                self.emit(&[&format!("@{}.{index}", self.file_name), "D=M"])?;
            }
            Segment::Pointer => self.emit(&[&format!("@{}", POINTER_BASE + index), "D=M"])?,
            Segment::Temp => self.emit(&[&format!("@{}", TEMP_BASE + index), "D=M"])?,
            _ => {
                self.write_indirect_address(segment, index)?;
                self.emit(&["D=M"])?;
            }
        }
        // *SP = D; SP++
        self.emit(&["@SP", "A=M", "M=D", "@SP", "M=M+1"])
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        // Leave the destination address in A, stash it, then pop into it.
        match segment {
            Segment::Static => {
                self.emit(&[&format!("@{}.{index}", self.file_name)])?;
            }
            Segment::Pointer => self.emit(&[&format!("@{}", POINTER_BASE + index)])?,
            Segment::Temp => self.emit(&[&format!("@{}", TEMP_BASE + index)])?,
            _ => self.write_indirect_address(segment, index)?,
        }
        self.emit(&[
            "D=A",
            &format!("@{POP_SCRATCH}"),
            "M=D",
            "@SP",
            "AM=M-1",
            "D=M",
            &format!("@{POP_SCRATCH}"),
            "A=M",
            "M=D",
        ])
    }

    /// Computes `A = *base + index` for the four indirect segments.
    fn write_indirect_address(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        let base = segment
            .base_symbol()
            .expect("segment resolves through a base pointer");
        self.emit(&[&format!("@{base}"), "D=M", &format!("@{index}"), "A=D+A"])
    }

    fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "({})", self.scoped_label(label))
    }

    fn write_goto(&mut self, label: &str) -> io::Result<()> {
        self.emit(&[&format!("@{}", self.scoped_label(label)), "0;JMP"])
    }

    fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        self.emit(&["@SP", "AM=M-1", "D=M"])?;
        self.emit(&[&format!("@{}", self.scoped_label(label)), "D;JNE"])
    }

    fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        self.function_name.clear();
        self.function_name.push_str(name);
        self.call_index = 0;

        writeln!(self.out, "({name})")?;
        for _ in 0..n_locals {
            self.emit(&["@SP", "A=M", "M=0", "@SP", "M=M+1"])?;
        }
        Ok(())
    }

    fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        let return_label = format!("{}$ret.{}", self.function_name, self.call_index);
        self.call_index += 1;

        // Push the return address, then the caller's frame.
        self.emit(&[
            &format!("@{return_label}"),
            "D=A",
            "@SP",
            "A=M",
            "M=D",
            "@SP",
            "M=M+1",
        ])?;
        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            self.emit(&[
                &format!("@{saved}"),
                "D=M",
                "@SP",
                "A=M",
                "M=D",
                "@SP",
                "M=M+1",
            ])?;
        }
        // ARG = SP - 5 - nArgs
        self.emit(&["@SP", "D=M", &format!("@{}", 5 + n_args), "D=D-A", "@ARG", "M=D"])?;
        // LCL = SP
        self.emit(&["@SP", "D=M", "@LCL", "M=D"])?;
        // Transfer control, then land the return address.
        self.emit(&[&format!("@{name}"), "0;JMP", &format!("({return_label})")])
    }

    fn write_return(&mut self) -> io::Result<()> {
        // retAddr = *(frame - 5), saved before *ARG is overwritten: a
        // zero-argument callee stores its return value exactly where the
        // return address sits.
        self.emit(&[
            "@LCL",
            "D=M",
            "@5",
            "A=D-A",
            "D=M",
            &format!("@{POP_SCRATCH}"),
            "M=D",
        ])?;
        // *ARG = pop(); SP = ARG + 1
        self.emit(&["@SP", "A=M-1", "D=M", "@ARG", "A=M", "M=D"])?;
        self.emit(&["@ARG", "D=M+1", "@SP", "M=D"])?;
        // Restore the caller's frame, walking down from frame - 1.
        for (offset, saved) in ["THAT", "THIS", "ARG", "LCL"].iter().enumerate() {
            self.emit(&[
                "@LCL",
                "D=M",
                &format!("@{}", offset + 1),
                "A=D-A",
                "D=M",
                &format!("@{saved}"),
                "M=D",
            ])?;
        }
        self.emit(&[&format!("@{POP_SCRATCH}"), "A=M", "0;JMP"])
    }

    fn scoped_label(&self, label: &str) -> String {
        format!("{}${label}", self.function_name)
    }

    fn emit(&mut self, lines: &[&str]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }
}
