//! A minimal Hack machine interpreter used to check the run-time behavior
//! of translated programs, not just their text.
#![allow(dead_code)] // each test binary uses a different subset
//!
//! The ALU is driven directly by the six control bits of the C-instruction
//! (zx nx zy ny f no), so every comp mnemonic the assembler can emit is
//! executed without a per-mnemonic table.

const RAM_WORDS: usize = 32768;

pub struct Machine {
    pub ram: Vec<i16>,
    rom: Vec<u16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
}

impl Machine {
    /// Loads `.hack` binary text (one 16-character line per word).
    pub fn load(binary: &str) -> Self {
        let rom = binary
            .lines()
            .map(|line| u16::from_str_radix(line, 2).expect("16-bit binary line"))
            .collect();
        Self {
            ram: vec![0; RAM_WORDS],
            rom,
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// Executes at most `max_steps` instructions. Stops early when the
    /// program counter leaves the ROM.
    pub fn run(&mut self, max_steps: usize) {
        for _ in 0..max_steps {
            if self.pc >= self.rom.len() {
                return;
            }
            self.step();
        }
    }

    fn step(&mut self) {
        let instruction = self.rom[self.pc];

        // A-instruction: load the 15-bit constant.
        if instruction & 0x8000 == 0 {
            self.a = instruction as i16;
            self.pc += 1;
            return;
        }

        let address = (self.a as u16 as usize) & (RAM_WORDS - 1);
        let use_m = instruction & 0x1000 != 0;

        let mut x = self.d;
        let mut y = if use_m { self.ram[address] } else { self.a };
        if instruction & 0x0800 != 0 {
            x = 0;
        }
        if instruction & 0x0400 != 0 {
            x = !x;
        }
        if instruction & 0x0200 != 0 {
            y = 0;
        }
        if instruction & 0x0100 != 0 {
            y = !y;
        }
        let mut out = if instruction & 0x0080 != 0 {
            x.wrapping_add(y)
        } else {
            x & y
        };
        if instruction & 0x0040 != 0 {
            out = !out;
        }

        let jump = match instruction & 0b111 {
            0b000 => false,
            0b001 => out > 0,
            0b010 => out == 0,
            0b011 => out >= 0,
            0b100 => out < 0,
            0b101 => out != 0,
            0b110 => out <= 0,
            _ => true,
        };
        // The jump target and the M address both come from A as it was
        // before this instruction writes it.
        let target = self.a as u16 as usize;

        if instruction & 0b001_000 != 0 {
            self.ram[address] = out;
        }
        if instruction & 0b010_000 != 0 {
            self.d = out;
        }
        if instruction & 0b100_000 != 0 {
            self.a = out;
        }

        if jump {
            self.pc = target;
        } else {
            self.pc += 1;
        }
    }
}

/// Named RAM locations used by the tests.
pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;
