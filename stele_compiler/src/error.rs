//! Structured lowering diagnostics.
//!
//! Every user-facing failure carries a stable code, a message, and the span
//! of the offending node. Lowering aborts on the first error; there is no
//! recovery or continuation, and nothing is ever silently skipped. Internal
//! invariant violations (an unbound jump target, a double bind) are bugs in
//! the lowering logic itself and panic instead of producing a diagnostic.

use std::fmt;

use stele_core::Span;

/// Stable diagnostic identifiers, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagCode {
    /// A source construct with no lowering rule.
    UnsupportedSyntax,
    /// A literal that fails to decode into the form its type requires.
    InvalidConstant,
    /// A range check or operator requested on a type outside the subsystem's
    /// coverage; signals a gap in type coverage rather than a user mistake.
    UnsupportedType,
    /// More locals, parameters, or static fields than the storage model
    /// can address.
    SlotOverflow,
}

impl DiagCode {
    /// The stable identifier rendered in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagCode::UnsupportedSyntax => "E0001",
            DiagCode::InvalidConstant => "E0002",
            DiagCode::UnsupportedType => "E0003",
            DiagCode::SlotOverflow => "E0004",
        }
    }
}

/// A fatal lowering diagnostic.
#[derive(Debug, Clone)]
pub struct CompileError {
    /// Stable diagnostic code.
    pub code: DiagCode,
    /// Human-readable message.
    pub message: String,
    /// Span of the offending node.
    pub span: Span,
}

impl CompileError {
    /// Create a diagnostic.
    pub fn new(code: DiagCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }

    /// A construct with no lowering rule.
    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagCode::UnsupportedSyntax, message, span)
    }

    /// A literal that does not decode to its required form.
    pub fn invalid_constant(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagCode::InvalidConstant, message, span)
    }

    /// A type outside the subsystem's coverage.
    pub fn unsupported_type(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagCode::UnsupportedType, message, span)
    }

    /// Storage addressing width exceeded.
    pub fn slot_overflow(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagCode::SlotOverflow, message, span)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {} ({})", self.code.as_str(), self.message, self.span)
    }
}

impl std::error::Error for CompileError {}

/// Result type for lowering.
pub type CompileResult<T> = Result<T, CompileError>;
