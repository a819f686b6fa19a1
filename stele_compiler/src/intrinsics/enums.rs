//! Enum reflection handlers.
//!
//! The target VM has no runtime reflection, but the member list of every
//! enum is compile-time knowledge. Each reflective operation unrolls into
//! a linear compare-and-branch scan over that list at the call site, with
//! a per-operation fallback when nothing matched. Code size is quadratic
//! in member count across a contract that reflects often; acceptable for
//! the enum sizes contracts declare in practice.

use std::sync::Arc;

use num_bigint::BigInt;
use stele_ast::{EnumDef, MethodSym, TypeDesc};
use stele_core::Span;

use super::{Intrinsic, Table};
use crate::bytecode::Instruction;
use crate::error::{CompileError, CompileResult};
use crate::method::MethodLowering;

pub(super) fn register(table: &mut Table) {
    table.insert("enum.parse/1".into(), Intrinsic::first(parse));
    table.insert("enum.try_parse/1".into(), Intrinsic::first(try_parse));
    table.insert("enum.name_of/1".into(), Intrinsic::first(name_of));
    table.insert("enum.is_defined/1".into(), Intrinsic::first(is_defined));
    table.insert("enum.values/0".into(), Intrinsic::first(values));
    table.insert("enum.to_string/0".into(), Intrinsic::first(to_string));
}

/// Definition behind an enum-family key.
fn enum_def_of(method: &MethodSym) -> &Arc<EnumDef> {
    match &method.declaring {
        TypeDesc::Enum(def) => def,
        other => unreachable!("enum intrinsic keyed to '{}'", other.display_name()),
    }
}

/// `( name -- value )` match a member name; fault on anything else.
fn parse(m: &mut MethodLowering<'_>, method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    let def = enum_def_of(method);
    let end = m.buf.create_target();
    for member in &def.members {
        let next = m.buf.create_target();
        m.emit(Instruction::Dup);
        m.emit(Instruction::PushBytes(member.name.as_bytes().to_vec()));
        m.emit(Instruction::Equal);
        m.buf.jump_if_not(next);
        m.emit(Instruction::Drop);
        m.emit(Instruction::PushInt(member.value.clone()));
        m.buf.jump(end);
        m.buf.bind(next);
    }
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushBytes(
        format!("unrecognized member of {}", def.name).into_bytes(),
    ));
    m.emit(Instruction::Throw);
    m.buf.bind(end);
    Ok(())
}

/// `( name -- (ok, value) )` match a member name; `(false, 0)` on a miss.
fn try_parse(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let def = enum_def_of(method);
    let end = m.buf.create_target();
    for member in &def.members {
        let next = m.buf.create_target();
        m.emit(Instruction::Dup);
        m.emit(Instruction::PushBytes(member.name.as_bytes().to_vec()));
        m.emit(Instruction::Equal);
        m.buf.jump_if_not(next);
        m.emit(Instruction::Drop);
        m.emit(Instruction::PushBool(true));
        m.emit(Instruction::PushInt(member.value.clone()));
        m.emit(Instruction::Pack(2));
        m.buf.jump(end);
        m.buf.bind(next);
    }
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushBool(false));
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::Pack(2));
    m.buf.bind(end);
    Ok(())
}

/// `( value -- name )` match a member value; null on a miss.
fn name_of(m: &mut MethodLowering<'_>, method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    let def = enum_def_of(method);
    let end = m.buf.create_target();
    for member in &def.members {
        let next = m.buf.create_target();
        m.emit(Instruction::Dup);
        m.emit(Instruction::PushInt(member.value.clone()));
        m.emit(Instruction::Equal);
        m.buf.jump_if_not(next);
        m.emit(Instruction::Drop);
        m.emit(Instruction::PushBytes(member.name.as_bytes().to_vec()));
        m.buf.jump(end);
        m.buf.bind(next);
    }
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushNull);
    m.buf.bind(end);
    Ok(())
}

/// `( value -- b )` whether some member has this value.
fn is_defined(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let def = enum_def_of(method);
    let end = m.buf.create_target();
    for member in &def.members {
        let next = m.buf.create_target();
        m.emit(Instruction::Dup);
        m.emit(Instruction::PushInt(member.value.clone()));
        m.emit(Instruction::Equal);
        m.buf.jump_if_not(next);
        m.emit(Instruction::Drop);
        m.emit(Instruction::PushBool(true));
        m.buf.jump(end);
        m.buf.bind(next);
    }
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushBool(false));
    m.buf.bind(end);
    Ok(())
}

/// `( -- values )` every member value, declaration order.
fn values(m: &mut MethodLowering<'_>, method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    let def = enum_def_of(method);
    let count = u16::try_from(def.members.len()).map_err(|_| {
        CompileError::unsupported("enum has more members than a record can hold", span)
    })?;
    for member in &def.members {
        m.emit(Instruction::PushInt(member.value.clone()));
    }
    m.emit(Instruction::Pack(count));
    Ok(())
}

/// `( value -- s )` member name, or decimal rendering for an unmatched
/// value.
fn to_string(m: &mut MethodLowering<'_>, method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    m.emit_enum_stringify(enum_def_of(method), span)
}
