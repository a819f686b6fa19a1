//! Typed expression nodes.
//!
//! Shapes mirror the surface language after resolution: every node carries
//! its static type, an optional folded constant, and a source span. Children
//! are boxed; the tree is immutable once built.

use std::sync::Arc;

use stele_core::{Const, Span};

use crate::symbol::{MethodSym, SymbolRef, VarSym};
use crate::types::TypeDesc;

// =============================================================================
// Operators
// =============================================================================

/// Binary operators, including the short-circuit and coalescing forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+` (arithmetic add, or concatenation when string-typed).
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&` (short-circuit, value-passing).
    AndAlso,
    /// `||` (short-circuit, value-passing).
    OrElse,
    /// `??`
    Coalesce,
}

impl BinOp {
    /// Whether the operator's result can leave the fixed-width range and
    /// therefore needs a range check after emission.
    #[must_use]
    pub const fn can_overflow(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Shl
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// `-`
    Neg,
    /// `+` (no-op, kept for span fidelity).
    Plus,
    /// `!`
    Not,
    /// `~`
    BitNot,
}

/// Increment or decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    /// `++`
    Inc,
    /// `--`
    Dec,
}

// =============================================================================
// Expressions
// =============================================================================

/// A typed expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    /// The expression shape.
    pub kind: ExprKind,
    /// Static type, already resolved.
    pub ty: TypeDesc,
    /// Folded compile-time value, when the analyzer proved one.
    pub constant: Option<Const>,
    /// Source span.
    pub span: Span,
}

impl Expr {
    /// Create a node with no folded constant and a dummy span.
    #[must_use]
    pub fn new(kind: ExprKind, ty: TypeDesc) -> Self {
        Self {
            kind,
            ty,
            constant: None,
            span: Span::dummy(),
        }
    }

    /// Attach a source span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Attach a folded constant value.
    #[must_use]
    pub fn with_const(mut self, value: Const) -> Self {
        self.constant = Some(value);
        self
    }

    /// A literal node whose constant is the literal itself.
    #[must_use]
    pub fn literal(value: Const, ty: TypeDesc) -> Self {
        Self {
            kind: ExprKind::Literal(value.clone()),
            ty,
            constant: Some(value),
            span: Span::dummy(),
        }
    }
}

/// One segment of an interpolated string.
#[derive(Debug, Clone)]
pub enum InterpPart {
    /// Verbatim text between holes.
    Literal(String),
    /// A hole; the value is stringified at runtime.
    Value(Expr),
}

/// Expression shapes.
#[derive(Debug, Clone)]
pub enum ExprKind {
    // === Constants and names ===
    /// Source literal.
    Literal(Const),
    /// `default` literal; the zero value of the node's type.
    Default,
    /// A resolved name.
    Ident(SymbolRef),
    /// The receiver of the enclosing instance method.
    This,

    // === Operators ===
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Ternary conditional.
    Conditional {
        /// Condition.
        cond: Box<Expr>,
        /// Value when true.
        then_arm: Box<Expr>,
        /// Value when false.
        else_arm: Box<Expr>,
    },

    // === Assignment ===
    /// Simple assignment; value of the expression is the assigned value.
    Assign {
        /// Storage target.
        target: Box<Expr>,
        /// Value.
        value: Box<Expr>,
    },
    /// `target op= value`; the target's receiver is evaluated exactly once.
    CompoundAssign {
        /// Underlying operator.
        op: BinOp,
        /// Storage target.
        target: Box<Expr>,
        /// Right operand.
        value: Box<Expr>,
    },
    /// `target ??= value`; `value` is untouched when the target is non-null.
    CoalesceAssign {
        /// Storage target.
        target: Box<Expr>,
        /// Fallback value.
        value: Box<Expr>,
    },
    /// `++`/`--` in either position.
    IncDec {
        /// Increment or decrement.
        op: IncDecOp,
        /// Storage target.
        target: Box<Expr>,
        /// Postfix yields the pre-mutation value, prefix the post-mutation.
        postfix: bool,
    },

    // === Access ===
    /// Member access. A missing receiver means static access or an implicit
    /// `this` (decided by the member symbol).
    Member {
        /// Receiver, if written.
        receiver: Option<Box<Expr>>,
        /// Resolved member.
        member: SymbolRef,
        /// `?.` form.
        null_conditional: bool,
    },
    /// Element access. More than one index is a rejected surface form.
    Index {
        /// Receiver.
        receiver: Box<Expr>,
        /// Index expressions.
        indices: Vec<Expr>,
        /// `?[` form.
        null_conditional: bool,
    },
    /// `^n` from-end index, valid only inside an index position.
    FromEnd(Box<Expr>),
    /// `a..b` range, valid only inside an index position; open endpoints
    /// default to the start/end of the receiver.
    Range {
        /// Start endpoint.
        start: Option<Box<Expr>>,
        /// End endpoint.
        end: Option<Box<Expr>>,
    },

    // === Calls ===
    /// Direct call to a resolved method (user-declared or intrinsic).
    Call {
        /// Resolved callee.
        method: Arc<MethodSym>,
        /// Receiver for instance calls.
        receiver: Option<Box<Expr>>,
        /// Arguments, left to right.
        args: Vec<Expr>,
        /// `?.` call form.
        null_conditional: bool,
    },
    /// Invocation of a callable value (lambda/delegate).
    Invoke {
        /// The callable.
        callee: Box<Expr>,
        /// Arguments, left to right.
        args: Vec<Expr>,
    },

    // === Creation ===
    /// `new T(args)`; missing trailing arguments default per field type.
    New {
        /// Arguments in field order.
        args: Vec<Expr>,
    },
    /// Anonymous object; builds a dynamic record by repeated append.
    AnonymousObject {
        /// Member values in declaration order.
        values: Vec<Expr>,
    },
    /// Array literal.
    ArrayLit {
        /// Elements.
        elements: Vec<Expr>,
    },
    /// Collection literal.
    CollectionLit {
        /// Elements.
        elements: Vec<Expr>,
    },
    /// Tuple literal.
    TupleLit {
        /// Elements.
        elements: Vec<Expr>,
    },
    /// Lambda. The body is a single expression; captures are discovered
    /// during lowering, not recorded in the tree.
    Lambda {
        /// Parameters.
        params: Vec<Arc<VarSym>>,
        /// Body expression.
        body: Box<Expr>,
    },

    // === Conversion and tests ===
    /// Cast to the node's own static type.
    Cast {
        /// Operand.
        operand: Box<Expr>,
    },
    /// `checked(...)` / `unchecked(...)` wrapper.
    Checked {
        /// True for `checked`, false for `unchecked`.
        checked: bool,
        /// Wrapped expression.
        body: Box<Expr>,
    },
    /// `x is T` type test.
    Is {
        /// Operand.
        operand: Box<Expr>,
        /// Tested type.
        tested: TypeDesc,
    },
    /// Interpolated string.
    Interpolated {
        /// Segments in order.
        parts: Vec<InterpPart>,
    },
}
