//! Decode error types.

use thiserror::Error;

/// Failure while consuming or interpreting instruction bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  /// The cursor has no byte left to read.
  #[error("end of buffer")]
  EndOfBuffer,

  /// A rewind would move the cursor before the start of the buffer.
  #[error("cannot unread {requested} bytes at position {position}")]
  InvalidRewind { requested: usize, position: usize },

  /// The byte matches no known opcode pattern.
  #[error("unknown opcode {0:#04x} ({0:08b})")]
  UnknownOpcode(u8),

  /// The buffer ends before the instruction starting at `offset` is complete.
  #[error("truncated instruction at offset {offset:#06x}")]
  TruncatedInstruction { offset: usize },

  /// A recognized opcode is followed by a reserved mod-reg-rm pattern.
  #[error("invalid encoding for opcode {opcode:#04x}: mod-reg-rm byte {modrm:08b}")]
  InvalidEncoding { opcode: u8, modrm: u8 },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// A failed disassembly run.
///
/// Carries the listing produced up to the failing instruction so callers can
/// still show how far decoding got.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to decode instruction at offset {offset:#06x}")]
pub struct DisassemblyError {
  pub offset: usize,
  pub lines: Vec<String>,
  pub source: DecodeError,
}

impl DisassemblyError {
  pub fn kind(&self) -> &DecodeError {
    &self.source
  }
}
