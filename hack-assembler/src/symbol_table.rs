//! Symbol management for the two-pass assembler.
//!
//! Predefined symbols live in a PHF map built at compile time; labels and
//! variables go into an ordinary `HashMap`. Labels are bound during pass 1,
//! variables are allocated from RAM address 16 during pass 2, so the two
//! can never collide.

use phf::phf_map;
use std::collections::HashMap;

/// Symbols built into the Hack platform.
static PREDEFINED: phf::Map<&'static str, u16> = phf_map! {
    // Virtual registers
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,

    // Memory segment pointers
    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,

    // I/O maps
    "SCREEN" => 16384,
    "KBD" => 24576,
};

/// RAM address handed to the first variable.
const FIRST_VARIABLE_ADDRESS: u16 = 16;

/// Identifier → 15-bit address mapping.
///
/// Once resolved, a symbol's address is immutable: pass 1 binds every label
/// before pass 2 allocates any variable.
#[derive(Debug, Default)]
pub struct SymbolTable {
    bound: HashMap<String, u16>,
    next_variable: u16,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bound: HashMap::with_capacity(32),
            next_variable: FIRST_VARIABLE_ADDRESS,
        }
    }

    /// Binds a label to an instruction address (pass 1).
    pub fn bind_label(&mut self, name: &str, address: u16) {
        self.bound.insert(name.to_string(), address);
    }

    /// Resolves a symbol, allocating the next free RAM address for a
    /// variable seen for the first time (pass 2 hot path).
    pub fn resolve(&mut self, name: &str) -> u16 {
        if let Some(&address) = PREDEFINED.get(name) {
            return address;
        }
        match self.bound.entry(name.to_string()) {
            std::collections::hash_map::Entry::Occupied(e) => *e.get(),
            std::collections::hash_map::Entry::Vacant(e) => {
                let address = self.next_variable;
                self.next_variable += 1;
                *e.insert(address)
            }
        }
    }

    /// Looks a symbol up without allocating.
    #[must_use]
    pub fn address_of(&self, name: &str) -> Option<u16> {
        PREDEFINED
            .get(name)
            .or_else(|| self.bound.get(name))
            .copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        PREDEFINED.contains_key(name) || self.bound.contains_key(name)
    }
}
