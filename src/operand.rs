use std::fmt;

/// A memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryExpression {
  /// Absolute 16-bit address with no base register.
  Direct(u16),
  /// Base/index registers plus a signed displacement.
  Based {
    base: &'static str,
    displacement: i16,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
  Register(&'static str),
  Memory(MemoryExpression),
  Immediate(i16),
  /// Immediate whose width can't be inferred from the other operand.
  SizedImmediate { value: i16, w_bit_set: bool },
}

impl Operand {
  pub fn is_memory(&self) -> bool {
    matches!(self, Self::Memory(_))
  }
}

impl fmt::Display for MemoryExpression {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::Direct(address) => write!(f, "[{address}]"),
      Self::Based {
        base,
        displacement: 0,
      } => write!(f, "[{base}]"),
      Self::Based { base, displacement } => write!(f, "[{base} + {displacement}]"),
    }
  }
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Register(name) => f.write_str(name),
      Self::Memory(memory) => memory.fmt(f),
      Self::Immediate(value) => write!(f, "{value}"),
      Self::SizedImmediate { value, w_bit_set } => {
        let size = if *w_bit_set { "word" } else { "byte" };
        write!(f, "{size} {value}")
      }
    }
  }
}

impl From<MemoryExpression> for Operand {
  fn from(memory: MemoryExpression) -> Self {
    Self::Memory(memory)
  }
}
