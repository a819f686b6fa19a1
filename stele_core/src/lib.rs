//! # Stele Core
//!
//! Shared foundation types for the Stele contract compiler: source spans,
//! compile-time constant values, and the storage limits of the target
//! virtual machine.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod limits;
pub mod span;
pub mod value;

pub use span::Span;
pub use value::Const;
