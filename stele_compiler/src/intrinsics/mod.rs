//! Table-driven lowering for built-in methods.
//!
//! Built-in types have no user-lowered bodies; every method or accessor
//! the front end resolves against them maps here instead. The table is
//! keyed by the normalized signature key (`family.name/arity`, see
//! [`MethodSym::key`]), built once on first use, and immutable afterwards.
//! Handlers emit their implementation inline into the calling unit.
//!
//! The target VM has no standard library to call into. Anything beyond a
//! single opcode (string search, case mapping, rotation, enum reflection)
//! is emitted as explicit loops and compare-and-branch chains over stack
//! primitives, parametrized by compile-time knowledge baked into each call
//! site: the integer width from the receiver's type, the member list from
//! the enum definition.

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashMap;
use stele_ast::{IntKind, MethodSym, TypeDesc};
use stele_core::Span;

use crate::error::CompileResult;
use crate::method::MethodLowering;

mod bits;
mod enums;
mod nullable;
mod numeric;
pub(crate) mod strings;

// =============================================================================
// Table shape
// =============================================================================

/// Operand order a handler expects on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallConvention {
    /// Receiver below the arguments, evaluation order.
    ReceiverFirst,
    /// Receiver rotated above the arguments before the handler runs.
    ReceiverLast,
}

/// Emits a built-in method's body inline. Operands are already on the
/// stack per the entry's convention.
pub(crate) type Handler =
    fn(&mut MethodLowering<'_>, &Arc<MethodSym>, Span) -> CompileResult<()>;

/// One table entry.
pub(crate) struct Intrinsic {
    /// Operand order this handler expects.
    pub(crate) convention: CallConvention,
    /// Emission routine.
    pub(crate) handler: Handler,
}

impl Intrinsic {
    const fn first(handler: Handler) -> Self {
        Self {
            convention: CallConvention::ReceiverFirst,
            handler,
        }
    }

    const fn last(handler: Handler) -> Self {
        Self {
            convention: CallConvention::ReceiverLast,
            handler,
        }
    }
}

type Table = FxHashMap<String, Intrinsic>;

/// The sized integer kinds that get per-width table rows. `char` is text,
/// not arithmetic; it has its own rows in the string family.
const SIZED_KINDS: [IntKind; 8] = [
    IntKind::I8,
    IntKind::U8,
    IntKind::I16,
    IntKind::U16,
    IntKind::I32,
    IntKind::U32,
    IntKind::I64,
    IntKind::U64,
];

static TABLE: LazyLock<Table> = LazyLock::new(|| {
    let mut table = Table::default();
    numeric::register(&mut table);
    bits::register(&mut table);
    strings::register(&mut table);
    enums::register(&mut table);
    nullable::register(&mut table);
    table
});

/// Handler registered for a normalized signature key, if any.
pub(crate) fn lookup(key: &str) -> Option<&'static Intrinsic> {
    TABLE.get(key)
}

// =============================================================================
// Receiver-type extraction
// =============================================================================

/// Integer kind of the declaring type. Only reachable through keys the
/// integer families registered.
fn int_kind_of(method: &MethodSym) -> IntKind {
    match &method.declaring {
        TypeDesc::Int(kind) => *kind,
        other => unreachable!("integer intrinsic keyed to '{}'", other.display_name()),
    }
}
