//! MOV decoders, one per encoding shape.
//!
//! Each decoder consumes exactly the bytes following the opcode that its
//! shape requires and returns the `(dest, src)` operand pair.

use log::trace;

use crate::addressing::{self, ModRm};
use crate::cursor::Cursor;
use crate::decode::OpcodeFields;
use crate::error::{DecodeError, DecodeResult};
use crate::operand::{MemoryExpression, Operand};
use crate::tables;

pub type Operands = (Operand, Operand);

/// `100010dw mod reg rm [disp-lo] [disp-hi]`
pub fn register_memory(fields: OpcodeFields, cursor: &mut Cursor) -> DecodeResult<Operands> {
  let (_, modrm) = read_modrm(cursor)?;
  if modrm.is_register() {
    Ok(register_register(fields, modrm))
  } else {
    memory_register(fields, modrm, cursor)
  }
}

/// Register to register (mod=11): both selectors name registers.
pub fn register_register(fields: OpcodeFields, modrm: ModRm) -> Operands {
  let reg = Operand::Register(tables::register(modrm.reg, fields.w_bit_set));
  let rm = Operand::Register(tables::register(modrm.rm, fields.w_bit_set));
  ordered(fields.reg_is_destination(), reg, rm)
}

/// Memory to/from register (mod=00/01/10).
pub fn memory_register(
  fields: OpcodeFields,
  modrm: ModRm,
  cursor: &mut Cursor,
) -> DecodeResult<Operands> {
  let reg = Operand::Register(tables::register(modrm.reg, fields.w_bit_set));
  let memory = addressing::resolve(modrm.mode, modrm.rm, fields.w_bit_set, cursor)?;
  Ok(ordered(fields.reg_is_destination(), reg, memory))
}

/// `1011wreg data [data-hi]`
pub fn immediate_to_register(fields: OpcodeFields, cursor: &mut Cursor) -> DecodeResult<Operands> {
  let reg = fields.reg.ok_or(DecodeError::UnknownOpcode(fields.opcode))?;
  let dest = Operand::Register(tables::register(reg, fields.w_bit_set));
  let value = read_immediate(fields.w_bit_set, cursor)?;
  Ok((dest, Operand::Immediate(value)))
}

/// `1100011w mod 000 rm [disp-lo] [disp-hi] data [data-hi]`
pub fn immediate_to_register_memory(
  fields: OpcodeFields,
  cursor: &mut Cursor,
) -> DecodeResult<Operands> {
  let (byte, modrm) = read_modrm(cursor)?;
  if modrm.reg != 0b000 {
    return Err(DecodeError::InvalidEncoding {
      opcode: fields.opcode,
      modrm: byte,
    });
  }
  let dest = addressing::resolve(modrm.mode, modrm.rm, fields.w_bit_set, cursor)?;
  let value = read_immediate(fields.w_bit_set, cursor)?;
  let src = if dest.is_memory() {
    Operand::SizedImmediate {
      value,
      w_bit_set: fields.w_bit_set,
    }
  } else {
    Operand::Immediate(value)
  };
  Ok((dest, src))
}

/// `101000dw addr-lo addr-hi`
///
/// Here the direction bit is set when the accumulator is the source.
pub fn memory_accumulator(fields: OpcodeFields, cursor: &mut Cursor) -> DecodeResult<Operands> {
  let memory = Operand::Memory(MemoryExpression::Direct(cursor.read_u16()?));
  let accumulator = Operand::Register(tables::accumulator(fields.w_bit_set));
  if fields.d_bit_set == Some(true) {
    Ok((memory, accumulator))
  } else {
    Ok((accumulator, memory))
  }
}

/// `100011d0 mod 0sr rm [disp-lo] [disp-hi]`
///
/// Segment moves are always 16-bit.
pub fn segment_register(fields: OpcodeFields, cursor: &mut Cursor) -> DecodeResult<Operands> {
  let (byte, modrm) = read_modrm(cursor)?;
  if modrm.reg & 0b100 != 0 {
    return Err(DecodeError::InvalidEncoding {
      opcode: fields.opcode,
      modrm: byte,
    });
  }
  let segment = Operand::Register(tables::segment_register(modrm.reg));
  let other = addressing::resolve(modrm.mode, modrm.rm, true, cursor)?;
  Ok(ordered(fields.reg_is_destination(), segment, other))
}

/// Reads the mod-reg-rm byte, returning it raw and split.
fn read_modrm(cursor: &mut Cursor) -> DecodeResult<(u8, ModRm)> {
  let byte = cursor.read()?;
  let modrm = ModRm::parse(byte);
  trace!(
    "mod={:02b} reg={:03b} rm={:03b}",
    modrm.mode,
    modrm.reg,
    modrm.rm
  );
  Ok((byte, modrm))
}

// 8-bit immediates are sign-extended, like 8-bit displacements.
fn read_immediate(w_bit_set: bool, cursor: &mut Cursor) -> DecodeResult<i16> {
  if w_bit_set {
    cursor.read_i16()
  } else {
    cursor.read_i8()
  }
}

fn ordered(reg_is_destination: bool, reg: Operand, other: Operand) -> Operands {
  if reg_is_destination {
    (reg, other)
  } else {
    (other, reg)
  }
}
