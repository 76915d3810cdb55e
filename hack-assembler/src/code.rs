//! Binary encoding of Hack instructions.
//!
//! Mnemonic lookup uses perfect hash functions (PHF): the maps are built at
//! compile time, so every lookup is a single O(1) probe with no runtime
//! setup. Encoding is done on `u16` words and rendered as 16-character
//! binary text at the end.
//!
//! Unknown mnemonics are rejected with [`AsmError::UnknownMnemonic`] rather
//! than silently encoded as a default.

use phf::phf_map;

use crate::error::AsmError;

/// `dest` mnemonic → `ddd` bits. The three bits flag the presence of
/// `A`, `D`, `M` in that MSB order.
static DEST_MAP: phf::Map<&'static str, u16> = phf_map! {
    "" => 0b000,
    "M" => 0b001,
    "D" => 0b010,
    "MD" => 0b011,
    "A" => 0b100,
    "AM" => 0b101,
    "AD" => 0b110,
    "AMD" => 0b111,
};

/// `comp` mnemonic → `acccccc` bits. The leading `a` bit selects the
/// second ALU operand: 0 for A, 1 for M.
static COMP_MAP: phf::Map<&'static str, u16> = phf_map! {
    // a=0 (A register operations)
    "0" => 0b0101010,
    "1" => 0b0111111,
    "-1" => 0b0111010,
    "D" => 0b0001100,
    "A" => 0b0110000,
    "!D" => 0b0001101,
    "!A" => 0b0110001,
    "-D" => 0b0001111,
    "-A" => 0b0110011,
    "D+1" => 0b0011111,
    "A+1" => 0b0110111,
    "D-1" => 0b0001110,
    "A-1" => 0b0110010,
    "D+A" => 0b0000010,
    "D-A" => 0b0010011,
    "A-D" => 0b0000111,
    "D&A" => 0b0000000,
    "D|A" => 0b0010101,

    // a=1 (M register operations)
    "M" => 0b1110000,
    "!M" => 0b1110001,
    "-M" => 0b1110011,
    "M+1" => 0b1110111,
    "M-1" => 0b1110010,
    "D+M" => 0b1000010,
    "D-M" => 0b1010011,
    "M-D" => 0b1000111,
    "D&M" => 0b1000000,
    "D|M" => 0b1010101,
};

/// `jump` mnemonic → `jjj` bits.
static JUMP_MAP: phf::Map<&'static str, u16> = phf_map! {
    "" => 0b000,
    "JGT" => 0b001,
    "JEQ" => 0b010,
    "JGE" => 0b011,
    "JLT" => 0b100,
    "JNE" => 0b101,
    "JLE" => 0b110,
    "JMP" => 0b111,
};

fn lookup(
    map: &phf::Map<&'static str, u16>,
    field: &'static str,
    mnemonic: &str,
) -> Result<u16, AsmError> {
    map.get(mnemonic).copied().ok_or_else(|| AsmError::UnknownMnemonic {
        field,
        mnemonic: mnemonic.to_string(),
    })
}

/// Encodes an A-instruction: `0` followed by the 15-bit address.
///
/// The caller guarantees `address < 2^15`; the driver validates numeric
/// operands and the symbol table never allocates beyond the address space.
#[inline]
#[must_use]
pub fn encode_a(address: u16) -> u16 {
    address & 0x7FFF
}

/// Encodes a C-instruction: `111` + `acccccc` + `ddd` + `jjj`.
#[inline]
pub fn encode_c(dest: &str, comp: &str, jump: &str) -> Result<u16, AsmError> {
    let comp = lookup(&COMP_MAP, "comp", comp)?;
    let dest = lookup(&DEST_MAP, "dest", dest)?;
    let jump = lookup(&JUMP_MAP, "jump", jump)?;
    Ok(0b111 << 13 | comp << 6 | dest << 3 | jump)
}

/// Renders a machine word as one 16-character line of `0`/`1` text.
#[inline]
#[must_use]
pub fn to_binary_text(word: u16) -> String {
    format!("{word:016b}")
}
