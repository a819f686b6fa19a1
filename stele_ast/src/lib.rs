//! # Stele AST
//!
//! The resolved, typed expression tree the semantic analyzer hands to the
//! lowering engine. Every node already knows its static type, its resolved
//! symbol when it names a declaration, and its folded constant value when
//! one exists; the lowering stage performs no name resolution or type
//! inference of its own.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod expr;
pub mod stmt;
pub mod symbol;
pub mod types;

pub use expr::{BinOp, Expr, ExprKind, IncDecOp, InterpPart, UnOp};
pub use stmt::{MethodDecl, Program, Stmt};
pub use symbol::{FieldSym, MethodSym, PropertySym, SymbolId, SymbolRef, VarSym};
pub use types::{EnumDef, EnumMember, FieldDef, IntKind, TypeDef, TypeDesc};
