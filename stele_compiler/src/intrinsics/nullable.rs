//! Nullable wrapper handlers.
//!
//! A nullable value is its payload or null; there is no box to open. The
//! accessors reduce to null tests, and `value_or` is the one table entry
//! that wants its receiver above the argument: the fallback is evaluated
//! either way, and selecting between two stack values needs the tested one
//! on top.

use std::sync::Arc;

use stele_ast::MethodSym;
use stele_core::Span;

use super::{Intrinsic, Table};
use crate::bytecode::Instruction;
use crate::error::CompileResult;
use crate::method::MethodLowering;

pub(super) fn register(table: &mut Table) {
    table.insert("nullable.has_value/0".into(), Intrinsic::first(has_value));
    table.insert("nullable.value/0".into(), Intrinsic::first(value));
    table.insert("nullable.value_or/1".into(), Intrinsic::last(value_or));
}

/// `( x -- b )`
fn has_value(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    m.emit(Instruction::IsNull);
    m.emit(Instruction::Not);
    Ok(())
}

/// `( x -- x )` fault on null.
fn value(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    m.emit_null_unwrap(span);
    Ok(())
}

/// `( fallback x -- x-or-fallback )` receiver rotated on top.
fn value_or(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    let null_case = m.buf.create_target();
    let end = m.buf.create_target();
    m.emit(Instruction::Dup);
    m.emit(Instruction::IsNull);
    m.buf.jump_if(null_case);
    m.emit(Instruction::Nip);
    m.buf.jump(end);
    m.buf.bind(null_case);
    m.emit(Instruction::Drop);
    m.buf.bind(end);
    Ok(())
}
