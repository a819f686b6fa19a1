//! Bytecode representation for the stack VM.
//!
//! This module defines what lowering produces:
//! - [`Instruction`]: the instruction set, one variant per opcode
//! - [`InstructionBuffer`]: append-only emission with deferred jump
//!   resolution
//! - [`JumpTarget`] / [`JumpOperand`]: target handles and their resolved
//!   relative offsets
//! - [`UnitId`]: identity of a lowered method or lambda body
//! - [`TypeTag`]: runtime shape tags for type tests

mod buffer;
mod instruction;

pub use buffer::InstructionBuffer;
pub use instruction::{Instruction, JumpOperand, JumpTarget, TypeTag, UnitId};
