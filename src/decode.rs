use std::fmt;

use log::debug;

use crate::cursor::Cursor;
use crate::error::{DecodeError, DecodeResult, DisassemblyError};
use crate::mov::{self, Operands};
use crate::operand::Operand;

/// First line of every listing.
pub const BITS_DIRECTIVE: &str = "bits 16";

/// Flag and selector bits carried in an opcode byte.
///
/// `d_bit_set` and `reg` are `None` for opcode shapes that don't encode them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeFields {
  pub opcode: u8,
  pub d_bit_set: Option<bool>,
  pub w_bit_set: bool,
  pub reg: Option<u8>,
}

impl OpcodeFields {
  /// Whether the operand named by the reg (or sr) field is the destination.
  pub fn reg_is_destination(&self) -> bool {
    self.d_bit_set == Some(true)
  }
}

/// Splits `......dw`.
pub fn direction_width(opcode: u8) -> OpcodeFields {
  OpcodeFields {
    opcode,
    d_bit_set: Some((opcode >> 1) & 0b_0000_0001 == 1),
    w_bit_set: opcode & 0b_0000_0001 == 1,
    reg: None,
  }
}

/// Splits `....wreg`.
pub fn width_register(opcode: u8) -> OpcodeFields {
  OpcodeFields {
    opcode,
    d_bit_set: None,
    w_bit_set: (opcode >> 3) & 0b_0000_0001 == 1,
    reg: Some(opcode & 0b_0000_0111),
  }
}

pub type Decoder = fn(OpcodeFields, &mut Cursor) -> DecodeResult<Operands>;

/// An opcode byte `b` matches when `b & mask == fixed`.
pub struct OpcodePattern {
  pub mask: u8,
  pub fixed: u8,
  pub mnemonic: &'static str,
  pub fields: fn(u8) -> OpcodeFields,
  pub decode: Decoder,
}

impl OpcodePattern {
  pub fn matches(&self, opcode: u8) -> bool {
    opcode & self.mask == self.fixed
  }
}

/// Known opcodes, checked in order.
pub static OPCODES: [OpcodePattern; 6] = [
  OpcodePattern {
    mask: 0b_111111_00,
    fixed: 0b_100010_00,
    mnemonic: "mov",
    fields: direction_width,
    decode: mov::register_memory,
  },
  OpcodePattern {
    mask: 0b_1111_0000,
    fixed: 0b_1011_0000,
    mnemonic: "mov",
    fields: width_register,
    decode: mov::immediate_to_register,
  },
  OpcodePattern {
    mask: 0b_1111111_0,
    fixed: 0b_1100011_0,
    mnemonic: "mov",
    fields: direction_width,
    decode: mov::immediate_to_register_memory,
  },
  OpcodePattern {
    mask: 0b_111111_00,
    fixed: 0b_101000_00,
    mnemonic: "mov",
    fields: direction_width,
    decode: mov::memory_accumulator,
  },
  OpcodePattern {
    mask: 0b_11111111,
    fixed: 0b_10001110,
    mnemonic: "mov",
    fields: direction_width,
    decode: mov::segment_register,
  },
  OpcodePattern {
    mask: 0b_11111111,
    fixed: 0b_10001100,
    mnemonic: "mov",
    fields: direction_width,
    decode: mov::segment_register,
  },
];

pub fn find_pattern(opcode: u8) -> Option<&'static OpcodePattern> {
  OPCODES.iter().find(|pattern| pattern.matches(opcode))
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
  /// Offset of the opcode byte in the input.
  pub offset: usize,
  /// Bytes consumed, opcode included.
  pub length: usize,
  pub mnemonic: &'static str,
  pub dest: Operand,
  pub src: Operand,
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}, {}", self.mnemonic, self.dest, self.src)
  }
}

/// Decodes the instruction at the cursor.
///
/// Returns `Ok(None)` when the cursor is already at the end of its buffer.
/// Running out of bytes after the opcode is a `TruncatedInstruction`.
pub fn decode_next(cursor: &mut Cursor) -> DecodeResult<Option<Instruction>> {
  let offset = cursor.position();
  let opcode = match cursor.read() {
    Ok(opcode) => opcode,
    Err(DecodeError::EndOfBuffer) => return Ok(None),
    Err(err) => return Err(err),
  };
  let pattern = find_pattern(opcode).ok_or(DecodeError::UnknownOpcode(opcode))?;
  let (dest, src) = (pattern.decode)((pattern.fields)(opcode), cursor).map_err(|err| match err {
    DecodeError::EndOfBuffer => DecodeError::TruncatedInstruction { offset },
    err => err,
  })?;
  Ok(Some(Instruction {
    offset,
    length: cursor.position() - offset,
    mnemonic: pattern.mnemonic,
    dest,
    src,
  }))
}

/// Decodes `instructions` into a listing: the bits directive followed by
/// one line per instruction, in program order.
///
/// Stops at the first undecodable instruction; the error keeps the lines
/// decoded before it.
pub fn disassemble(instructions: &[u8]) -> Result<Vec<String>, DisassemblyError> {
  let mut lines = vec![BITS_DIRECTIVE.to_string()];
  let mut cursor = Cursor::new(instructions);
  loop {
    let offset = cursor.position();
    match decode_next(&mut cursor) {
      Ok(Some(instruction)) => {
        let line = instruction.to_string();
        debug!(
          "{:#06x}: {:02x} ({} bytes) {line}",
          instruction.offset,
          instructions[offset],
          instruction.length
        );
        lines.push(line);
      }
      Ok(None) => break,
      Err(source) => {
        debug!("decode failed at {offset:#06x}: {source}");
        return Err(DisassemblyError {
          offset,
          lines,
          source,
        });
      }
    }
  }
  debug!(
    "decoded {} bytes into {} instructions",
    instructions.len(),
    lines.len() - 1
  );
  Ok(lines)
}

#[cfg(test)]
mod tests {
  use super::*;
  use indoc::indoc as asm;
  use pretty_assertions::assert_eq;

  fn listing(bytes: &[u8]) -> String {
    let mut lines = disassemble(bytes).unwrap();
    lines.push("".to_string());
    lines.join("\n")
  }

  #[test]
  fn opcode_field_splits() {
    assert_eq!(
      direction_width(0b100010_1_1),
      OpcodeFields {
        opcode: 0x8B,
        d_bit_set: Some(true),
        w_bit_set: true,
        reg: None
      }
    );
    assert_eq!(
      width_register(0b1011_0_010),
      OpcodeFields {
        opcode: 0xB2,
        d_bit_set: None,
        w_bit_set: false,
        reg: Some(0b010)
      }
    );
    assert!(!width_register(0xB8).reg_is_destination());
    assert!(!direction_width(0x89).reg_is_destination());
  }

  #[test]
  fn test_empty_input() {
    assert_eq!(disassemble(&[]), Ok(vec!["bits 16".to_string()]));
  }

  #[test]
  fn test_listing_37() {
    assert_eq!(
      listing(&[0b100010_0_1, 0b11_011_001]),
      asm! {"
        bits 16
        mov cx, bx
      "}
    );
  }

  #[test]
  fn test_listing_38() {
    assert_eq!(
      listing(&[
        0b_10001001,
        0b_11011001,
        0b_10001000,
        0b_11100101,
        0b_10001001,
        0b_11011010,
        0b_10001001,
        0b_11011110,
        0b_10001001,
        0b_11111011,
        0b_10001000,
        0b_11001000,
        0b_10001000,
        0b_11101101,
        0b_10001001,
        0b_11000011,
        0b_10001001,
        0b_11110011,
        0b_10001001,
        0b_11111100,
        0b_10001001,
        0b_11000101,
      ]),
      asm! {"
        bits 16
        mov cx, bx
        mov ch, ah
        mov dx, bx
        mov si, bx
        mov bx, di
        mov al, cl
        mov ch, ch
        mov bx, ax
        mov bx, si
        mov sp, di
        mov bp, ax
      "}
    );
  }

  #[test]
  fn test_listing_39() {
    assert_eq!(
      listing(&[
        0x89, 0xDE, // mov si, bx
        0x88, 0xC6, // mov dh, al
        0xB1, 0x0C, // mov cl, 12
        0xB5, 0xF4, // mov ch, -12
        0xB9, 0x0C, 0x00, // mov cx, 12
        0xB9, 0xF4, 0xFF, // mov cx, -12
        0xBA, 0x6C, 0x0F, // mov dx, 3948
        0xBA, 0x94, 0xF0, // mov dx, -3948
        0x8A, 0x00, // mov al, [bx + si]
        0x8B, 0x1B, // mov bx, [bp + di]
        0x8B, 0x56, 0x00, // mov dx, [bp]
        0x8A, 0x60, 0x04, // mov ah, [bx + si + 4]
        0x8A, 0x80, 0x87, 0x13, // mov al, [bx + si + 4999]
        0x89, 0x09, // mov [bx + di], cx
        0x88, 0x0A, // mov [bp + si], cl
        0x88, 0x6E, 0x00, // mov [bp], ch
      ]),
      asm! {"
        bits 16
        mov si, bx
        mov dh, al
        mov cl, 12
        mov ch, -12
        mov cx, 12
        mov cx, -12
        mov dx, 3948
        mov dx, -3948
        mov al, [bx + si]
        mov bx, [bp + di]
        mov dx, [bp]
        mov ah, [bx + si + 4]
        mov al, [bx + si + 4999]
        mov [bx + di], cx
        mov [bp + si], cl
        mov [bp], ch
      "}
    );
  }

  #[test]
  fn test_listing_40() {
    assert_eq!(
      listing(&[
        0x8B, 0x41, 0xDB, // mov ax, [bx + di + -37]
        0x89, 0x8C, 0xD4, 0xFE, // mov [si + -300], cx
        0xC6, 0x03, 0x07, // mov [bp + di], byte 7
        0xC7, 0x85, 0x85, 0x03, 0x5B, 0x01, // mov [di + 901], word 347
        0x8B, 0x2E, 0x05, 0x00, // mov bp, [5]
        0x8B, 0x1E, 0x82, 0x0D, // mov bx, [3458]
        0xA1, 0xFB, 0x09, // mov ax, [2555]
        0xA1, 0x10, 0x00, // mov ax, [16]
        0xA3, 0xFA, 0x09, // mov [2554], ax
        0xA3, 0x0F, 0x00, // mov [15], ax
        0x8E, 0xC0, // mov es, ax
        0x8C, 0x1F, // mov [bx], ds
      ]),
      asm! {"
        bits 16
        mov ax, [bx + di + -37]
        mov [si + -300], cx
        mov [bp + di], byte 7
        mov [di + 901], word 347
        mov bp, [5]
        mov bx, [3458]
        mov ax, [2555]
        mov ax, [16]
        mov [2554], ax
        mov [15], ax
        mov es, ax
        mov [bx], ds
      "}
    );
  }

  #[test]
  fn zero_displacement_is_elided() {
    assert_eq!(
      disassemble(&[0x8B, 0x87, 0x00, 0x00]).unwrap(),
      ["bits 16", "mov ax, [bx]"]
    );
  }

  #[test]
  fn direct_address() {
    assert_eq!(
      disassemble(&[0x8B, 0x06, 0x34, 0x12]).unwrap(),
      ["bits 16", "mov ax, [4660]"]
    );
  }

  #[test]
  fn truncated_instruction_keeps_prior_lines() {
    let err = disassemble(&[0x89, 0xD8, 0x8B]).unwrap_err();
    assert_eq!(
      err,
      DisassemblyError {
        offset: 2,
        lines: vec!["bits 16".to_string(), "mov ax, bx".to_string()],
        source: DecodeError::TruncatedInstruction { offset: 2 },
      }
    );
  }

  #[test]
  fn truncated_displacement() {
    let err = disassemble(&[0x8A, 0x80, 0x87]).unwrap_err();
    assert_eq!(err.kind(), &DecodeError::TruncatedInstruction { offset: 0 });
    assert_eq!(err.lines, ["bits 16"]);
  }

  #[test]
  fn truncated_immediate() {
    let err = disassemble(&[0xB0, 0x01, 0xB8, 0x01]).unwrap_err();
    assert_eq!(err.kind(), &DecodeError::TruncatedInstruction { offset: 2 });
    assert_eq!(err.lines, ["bits 16", "mov al, 1"]);
  }

  #[test]
  fn unknown_opcode_is_fatal() {
    let err = disassemble(&[0x89, 0xD8, 0x00, 0x89, 0xD8]).unwrap_err();
    assert_eq!(err.kind(), &DecodeError::UnknownOpcode(0x00));
    assert_eq!(err.offset, 2);
    assert_eq!(err.lines, ["bits 16", "mov ax, bx"]);
  }

  #[test]
  fn disassembly_error_chains_decode_error_once() {
    use std::error::Error;

    let err = disassemble(&[0x89, 0xD8, 0x00]).unwrap_err();
    assert_eq!(err.to_string(), "failed to decode instruction at offset 0x0002");
    assert_eq!(
      err.source().map(|source| source.to_string()),
      Some("unknown opcode 0x00 (00000000)".to_string())
    );
  }

  #[test]
  fn reserved_opcodes_in_mov_range() {
    // lea and pop r/m sit between the mov encodings
    for opcode in [0x8D, 0x8F] {
      assert_eq!(
        disassemble(&[opcode, 0x00]).unwrap_err().kind(),
        &DecodeError::UnknownOpcode(opcode)
      );
    }
  }

  #[test]
  fn decode_next_reports_length() {
    let mut cursor = Cursor::new(&[0xC7, 0x85, 0x85, 0x03, 0x5B, 0x01, 0xB0, 0xFF]);
    let first = decode_next(&mut cursor).unwrap().unwrap();
    assert_eq!((first.offset, first.length), (0, 6));
    let second = decode_next(&mut cursor).unwrap().unwrap();
    assert_eq!((second.offset, second.length), (6, 2));
    assert_eq!(second.to_string(), "mov al, -1");
    assert_eq!(decode_next(&mut cursor), Ok(None));
  }

  #[test]
  fn opcode_table_covers_mov_family() {
    let matched: Vec<u8> = (0..=255u8).filter(|b| find_pattern(*b).is_some()).collect();
    let mut expected: Vec<u8> = (0x88..=0x8B).chain(0xA0..=0xA3).chain(0xB0..=0xBF).collect();
    expected.extend([0x8C, 0x8E, 0xC6, 0xC7]);
    expected.sort();
    assert_eq!(matched, expected);
  }
}
