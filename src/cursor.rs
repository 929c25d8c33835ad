//! Sequential byte access over an instruction buffer.

use crate::error::{DecodeError, DecodeResult};

/// Read position over a borrowed byte buffer.
///
/// `position` never exceeds the buffer length; only reads and rewinds move it.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
  bytes: &'a [u8],
  position: usize,
}

impl<'a> Cursor<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self { bytes, position: 0 }
  }

  pub fn position(&self) -> usize {
    self.position
  }

  pub fn remaining(&self) -> usize {
    self.bytes.len() - self.position
  }

  pub fn is_at_end(&self) -> bool {
    self.position >= self.bytes.len()
  }

  /// Returns the byte at the current position and advances past it.
  pub fn read(&mut self) -> DecodeResult<u8> {
    let byte = self.peek()?;
    self.position += 1;
    Ok(byte)
  }

  /// Returns the byte at the current position without advancing.
  pub fn peek(&self) -> DecodeResult<u8> {
    self
      .bytes
      .get(self.position)
      .copied()
      .ok_or(DecodeError::EndOfBuffer)
  }

  /// Moves the position back by `n` bytes.
  pub fn unread(&mut self, n: usize) -> DecodeResult<()> {
    if n > self.position {
      return Err(DecodeError::InvalidRewind {
        requested: n,
        position: self.position,
      });
    }
    self.position -= n;
    Ok(())
  }

  /// Reads a sign-extended 8-bit value.
  pub fn read_i8(&mut self) -> DecodeResult<i16> {
    Ok(self.read()? as i8 as i16)
  }

  /// Reads a little-endian 16-bit word.
  pub fn read_u16(&mut self) -> DecodeResult<u16> {
    let lo = self.read()?;
    let hi = self.read()?;
    Ok(u16::from_le_bytes([lo, hi]))
  }

  /// Reads a little-endian signed 16-bit word.
  pub fn read_i16(&mut self) -> DecodeResult<i16> {
    Ok(self.read_u16()? as i16)
  }
}
