//! The minimal statement surface the lowering engine accepts.
//!
//! Statement-level control flow (loops, switches) belongs to the surrounding
//! compiler; what remains here is exactly what a method body needs to drive
//! expression lowering: declarations, expression statements, and `return`.

use std::sync::Arc;

use stele_core::Span;

use crate::expr::Expr;
use crate::symbol::{MethodSym, VarSym};

/// A body statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Local declaration, with an optional initializer.
    Local {
        /// The declared variable.
        sym: Arc<VarSym>,
        /// Initializer; without one the slot holds the type's default.
        init: Option<Expr>,
        /// Source span.
        span: Span,
    },
    /// Expression evaluated for effect; a non-void value is dropped.
    Expr(Expr),
    /// Return from the method.
    Return {
        /// Returned value, absent for void methods.
        value: Option<Expr>,
        /// Source span.
        span: Span,
    },
}

/// A method ready for lowering.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    /// Resolved symbol; `is_static` decides whether a receiver slot exists.
    pub sym: Arc<MethodSym>,
    /// Explicit parameters in order, receiver excluded.
    pub params: Vec<Arc<VarSym>>,
    /// Body statements.
    pub body: Vec<Stmt>,
}

/// A whole compilation: declared methods in a fixed enumeration order.
///
/// The order is load-bearing: static-field indices accumulate across
/// methods in this order, and reproducible output depends on it.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Methods in declaration order.
    pub methods: Vec<MethodDecl>,
}

impl Program {
    /// A program with a single method.
    #[must_use]
    pub fn single(method: MethodDecl) -> Self {
        Self {
            methods: vec![method],
        }
    }
}
