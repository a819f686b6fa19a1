//! Numeric parsing, conversion, and math handlers.
//!
//! Sized-integer rows share one handler per operation; the width comes
//! from the receiver's type at each call site. Parsing goes through the
//! VM's decimal primitive and then the same range machinery every checked
//! arithmetic result uses, so a parsed value can never sit outside its
//! declared type.

use std::sync::Arc;

use num_bigint::BigInt;
use stele_ast::MethodSym;
use stele_core::Span;

use super::{int_kind_of, Intrinsic, Table, SIZED_KINDS};
use crate::bytecode::Instruction;
use crate::error::CompileResult;
use crate::method::MethodLowering;
use crate::range_check;

pub(super) fn register(table: &mut Table) {
    for kind in SIZED_KINDS {
        let n = kind.name();
        table.insert(format!("{n}.parse/1"), Intrinsic::first(parse));
        table.insert(format!("{n}.to_string/0"), Intrinsic::first(to_string));
        table.insert(
            format!("{n}.create_saturating/1"),
            Intrinsic::first(create_saturating),
        );
        table.insert(
            format!("{n}.create_checked/1"),
            Intrinsic::first(create_checked),
        );
    }

    table.insert("bigint.parse/1".into(), Intrinsic::first(parse_unbounded));
    table.insert("bigint.to_string/0".into(), Intrinsic::first(to_string));
    table.insert("bigint.abs/1".into(), Intrinsic::first(abs));
    table.insert("bigint.sign/0".into(), Intrinsic::first(sign));
    table.insert("bigint.pow/2".into(), Intrinsic::first(pow));
    table.insert("bigint.min/2".into(), Intrinsic::first(min));
    table.insert("bigint.max/2".into(), Intrinsic::first(max));
    table.insert("bigint.is_zero/0".into(), Intrinsic::first(is_zero));
    table.insert("bigint.is_one/0".into(), Intrinsic::first(is_one));
    table.insert("bigint.is_even/0".into(), Intrinsic::first(is_even));

    table.insert("bool.to_string/0".into(), Intrinsic::first(bool_to_string));

    table.insert("math.abs/1".into(), Intrinsic::first(abs));
    table.insert("math.sign/1".into(), Intrinsic::first(sign));
    table.insert("math.min/2".into(), Intrinsic::first(min));
    table.insert("math.max/2".into(), Intrinsic::first(max));
    table.insert("math.pow/2".into(), Intrinsic::first(pow));
    table.insert("math.clamp/3".into(), Intrinsic::first(clamp));
}

/// `( s -- n )` decimal text to a sized integer, trapping out of range.
fn parse(m: &mut MethodLowering<'_>, method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    let kind = int_kind_of(method);
    m.emit(Instruction::Atoi);
    range_check::emit_trap(&mut m.buf, kind);
    Ok(())
}

/// `( s -- n )` decimal text to an unbounded integer.
fn parse_unbounded(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    m.emit(Instruction::Atoi);
    Ok(())
}

/// `( n -- s )` decimal rendering.
fn to_string(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    m.emit(Instruction::Itoa);
    Ok(())
}

/// `( b -- s )` `"true"` or `"false"`.
fn bool_to_string(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let no = m.buf.create_target();
    let end = m.buf.create_target();
    m.buf.jump_if_not(no);
    m.emit(Instruction::PushBytes(b"true".to_vec()));
    m.buf.jump(end);
    m.buf.bind(no);
    m.emit(Instruction::PushBytes(b"false".to_vec()));
    m.buf.bind(end);
    Ok(())
}

/// `( n -- clamped )` clamp into the target width instead of wrapping.
fn create_saturating(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let kind = int_kind_of(method);
    m.emit(Instruction::PushInt(BigInt::from(kind.min_value())));
    m.emit(Instruction::Max);
    m.emit(Instruction::PushInt(BigInt::from(kind.max_value())));
    m.emit(Instruction::Min);
    Ok(())
}

/// `( n -- n )` fault unless the value already fits the target width.
fn create_checked(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let kind = int_kind_of(method);
    range_check::emit_trap(&mut m.buf, kind);
    Ok(())
}

fn abs(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Abs);
    Ok(())
}

fn sign(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Sign);
    Ok(())
}

fn min(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Min);
    Ok(())
}

fn max(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Max);
    Ok(())
}

fn pow(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Pow);
    Ok(())
}

/// `( x lo hi -- clamped )`
fn clamp(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Rot);
    m.emit(Instruction::Rot);
    m.emit(Instruction::Max);
    m.emit(Instruction::Swap);
    m.emit(Instruction::Min);
    Ok(())
}

fn is_zero(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::Equal);
    Ok(())
}

fn is_one(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Equal);
    Ok(())
}

fn is_even(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::Equal);
    Ok(())
}
