//! 16-bit 8086 disassembler core for the MOV instruction family.
//!
//! ```
//! let lines = disasm_8086::disassemble(&[0x89, 0xD9, 0xB0, 0xFF]).unwrap();
//! assert_eq!(lines, ["bits 16", "mov cx, bx", "mov al, -1"]);
//! ```

pub mod addressing;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod mov;
pub mod operand;
pub mod tables;

pub use cursor::Cursor;
pub use decode::{decode_next, disassemble, Instruction, BITS_DIRECTIVE};
pub use error::{DecodeError, DecodeResult, DisassemblyError};
pub use operand::{MemoryExpression, Operand};
