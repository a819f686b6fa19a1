//! # Stele Compiler
//!
//! Lowers typed method bodies to stack-machine instruction units.
//!
//! [`lower_program`] drives the pipeline: every declared method is
//! registered up front so call sites resolve in any order, then each body
//! is walked exactly once, emitting into a per-unit buffer whose jump
//! targets are resolved in a finalization pass. The result carries the
//! finished units and the count of static slots the program allocated for
//! declared static fields and lambda captures.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod bytecode;
pub mod error;
pub mod session;

mod call;
mod expr;
mod intrinsics;
mod lambda;
mod method;
mod operators;
mod range_check;
mod slots;

pub use error::{CompileError, CompileResult, DiagCode};
pub use method::lower_program;
pub use session::{Lowered, Options, Unit};
