//! Fixed lookups from 3-bit selector fields to register and base names.
//!
//! Selectors are masked to their low three bits (two for segment registers)
//! before lookup, so every table is total.

/// Register named by a `reg` or `rm` selector at the given operand width.
pub fn register(reg: u8, w_bit_set: bool) -> &'static str {
  match (reg & 0b111, w_bit_set) {
    (0b_000, false) => "al",
    (0b_001, false) => "cl",
    (0b_010, false) => "dl",
    (0b_011, false) => "bl",
    (0b_100, false) => "ah",
    (0b_101, false) => "ch",
    (0b_110, false) => "dh",
    (0b_111, false) => "bh",
    (0b_000, true) => "ax",
    (0b_001, true) => "cx",
    (0b_010, true) => "dx",
    (0b_011, true) => "bx",
    (0b_100, true) => "sp",
    (0b_101, true) => "bp",
    (0b_110, true) => "si",
    (0b_111, true) => "di",
    _ => unreachable!(),
  }
}

/// Accumulator at the given operand width.
pub fn accumulator(w_bit_set: bool) -> &'static str {
  register(0b_000, w_bit_set)
}

/// Base/index expression selected by `rm` in memory modes.
pub fn effective_address(rm: u8) -> &'static str {
  const BASES: [&str; 8] = [
    "bx + si", "bx + di", "bp + si", "bp + di", "si", "di", "bp", "bx",
  ];
  BASES[(rm & 0b111) as usize]
}

/// Segment register selected by the two `sr` bits.
pub fn segment_register(sr: u8) -> &'static str {
  const SEGMENTS: [&str; 4] = ["es", "cs", "ss", "ds"];
  SEGMENTS[(sr & 0b11) as usize]
}
