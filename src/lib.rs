//! Stack-oriented virtual machine with a two-pass assembler.
//!
//! Programs are whitespace-separated token streams in a reverse-Polish
//! source language: literal constants, instruction mnemonics, `@Name` label
//! declarations and bare label references, plus a `""…` string-literal
//! shorthand and `;` comments. The [`asm`] module assembles source into a
//! [`CodeSegment`] and [`LabelTable`]; a [`Machine`] then executes the code
//! against a typed operand stack, a call stack, an optional virtual disk
//! and the I/O streams supplied through the [`Console`] seam.
//!
//! [`asm`]: asm/index.html
//! [`CodeSegment`]: struct.CodeSegment.html
//! [`LabelTable`]: struct.LabelTable.html
//! [`Machine`]: struct.Machine.html
//! [`Console`]: trait.Console.html

pub mod asm;
pub mod constants;

mod code;
mod console;
mod disk;
mod error;
mod instr;
mod labels;
mod machine;
mod stack;
mod value;

#[cfg(test)]
mod test;

pub use crate::code::{CodeSegment, Op};
pub use crate::console::{Console, LogLevel, ParseLevelError};
pub use crate::disk::{Disk, DiskProvider, Memory, MemoryDisks, Storage};
pub use crate::error::{Fault, RuntimeError};
pub use crate::instr::Instr;
pub use crate::labels::LabelTable;
pub use crate::machine::Machine;
pub use crate::stack::{CallStack, DataStack};
pub use crate::value::{Label, Value};

/// Byte order of every typed access on the virtual-disk tape.
pub type Endian = byteorder::BigEndian;
