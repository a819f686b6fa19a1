//! Compile-time constant values.
//!
//! The semantic analyzer folds what it can and attaches the result to the
//! expression node; the lowering engine pushes folded values directly instead
//! of dispatching on the node's shape. Integers are arbitrary precision
//! because the target VM's number stack is.

use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;

/// A folded compile-time constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Const {
    /// The null reference.
    Null,
    /// Boolean constant.
    Bool(bool),
    /// Integer constant of any width, including char code units.
    Int(BigInt),
    /// String constant (UTF-8).
    Str(String),
    /// Raw byte-string constant.
    Bytes(Vec<u8>),
}

impl Const {
    /// Integer constant from anything convertible.
    #[must_use]
    pub fn int(v: impl Into<BigInt>) -> Self {
        Const::Int(v.into())
    }

    /// Whether this constant is the null reference.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Const::Null)
    }

    /// The integer payload, if this is an integer constant.
    #[must_use]
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Const::Int(v) => Some(v),
            _ => None,
        }
    }

    /// The string payload, if this is a string constant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Const::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness under the target VM's rules: null and zero are false,
    /// empty byte strings are false, everything else is true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Const::Null => false,
            Const::Bool(b) => *b,
            Const::Int(v) => !v.is_zero(),
            Const::Str(s) => !s.is_empty(),
            Const::Bytes(b) => !b.is_empty(),
        }
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Null => write!(f, "null"),
            Const::Bool(b) => write!(f, "{b}"),
            Const::Int(v) => write!(f, "{v}"),
            Const::Str(s) => write!(f, "{s:?}"),
            Const::Bytes(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}
