//! Mod-reg-rm byte split and effective-address resolution.

use crate::cursor::Cursor;
use crate::error::DecodeResult;
use crate::operand::{MemoryExpression, Operand};
use crate::tables;

/// `rm` value that selects a direct address when `mode` is 0b00.
const DIRECT_ADDRESS: u8 = 0b110;

/// Fields of the byte following an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRm {
  pub mode: u8,
  pub reg: u8,
  pub rm: u8,
}

impl ModRm {
  pub fn parse(byte: u8) -> Self {
    Self {
      mode: byte >> 6,
      reg: (byte >> 3) & 0b0000_0111,
      rm: byte & 0b0000_0111,
    }
  }

  /// Register-direct mode (mod=11).
  pub fn is_register(&self) -> bool {
    self.mode == 0b11
  }
}

/// Resolves the operand selected by `mode` and `rm`, consuming any
/// displacement bytes that follow.
///
/// Register mode reads nothing and names the `rm` register at the operand
/// width. Memory modes read 0, 1 or 2 displacement bytes; a zero displacement
/// is kept as zero and elided when printed.
pub fn resolve(mode: u8, rm: u8, w_bit_set: bool, cursor: &mut Cursor) -> DecodeResult<Operand> {
  let base = tables::effective_address(rm);
  let memory = match mode & 0b11 {
    0b11 => return Ok(Operand::Register(tables::register(rm, w_bit_set))),
    0b00 if rm & 0b111 == DIRECT_ADDRESS => MemoryExpression::Direct(cursor.read_u16()?),
    0b00 => MemoryExpression::Based {
      base,
      displacement: 0,
    },
    0b01 => MemoryExpression::Based {
      base,
      displacement: cursor.read_i8()?,
    },
    _ => MemoryExpression::Based {
      base,
      displacement: cursor.read_i16()?,
    },
  };
  Ok(memory.into())
}
