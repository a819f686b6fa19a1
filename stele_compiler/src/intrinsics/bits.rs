//! Bit-manipulation handlers for the sized integer kinds.
//!
//! The VM computes on unbounded integers, so fixed-width bit semantics are
//! reconstructed at each call site: operate on the low `bits` of the
//! two's-complement pattern (`v & mask`), then map the result back into
//! the receiver's signed range when needed. Rotation composes two shifts
//! and an OR; the counting operations emit one-bit-at-a-time shift loops,
//! which is the only formulation available without native bit instructions.

use std::sync::Arc;

use num_bigint::BigInt;
use stele_ast::{IntKind, MethodSym};
use stele_core::Span;

use super::{int_kind_of, Intrinsic, Table, SIZED_KINDS};
use crate::bytecode::Instruction;
use crate::error::CompileResult;
use crate::method::MethodLowering;

pub(super) fn register(table: &mut Table) {
    for kind in SIZED_KINDS {
        let n = kind.name();
        table.insert(format!("{n}.rotate_left/1"), Intrinsic::first(rotate_left));
        table.insert(format!("{n}.rotate_right/1"), Intrinsic::first(rotate_right));
        table.insert(format!("{n}.pop_count/0"), Intrinsic::first(pop_count));
        table.insert(
            format!("{n}.leading_zero_count/0"),
            Intrinsic::first(leading_zero_count),
        );
    }
}

/// Reduce the rotation count modulo the width and the value to its
/// unsigned bit pattern. `( v c -- pattern count )`
fn emit_rotation_operands(m: &mut MethodLowering<'_>, kind: IntKind) {
    m.emit(Instruction::PushInt(BigInt::from(kind.bits() - 1)));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::Swap);
    m.emit(Instruction::PushInt(BigInt::from(kind.mask())));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::Swap);
}

/// Map an unsigned bit pattern back into a signed kind's value range.
/// Unsigned kinds are already in range.
fn emit_pattern_rebias(m: &mut MethodLowering<'_>, kind: IntKind) {
    if !kind.is_signed() {
        return;
    }
    let end = m.buf.create_target();
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(kind.max_value())));
    m.emit(Instruction::Gt);
    m.buf.jump_if_not(end);
    m.emit(Instruction::PushInt(BigInt::from(kind.modulus())));
    m.emit(Instruction::Sub);
    m.buf.bind(end);
}

/// `( v c -- rotated )` rotate the width-sized bit pattern left.
fn rotate_left(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let kind = int_kind_of(method);
    emit_rotation_operands(m, kind);
    // ( p c ) high part: (p << c) & mask
    m.emit(Instruction::Over);
    m.emit(Instruction::Over);
    m.emit(Instruction::Shl);
    m.emit(Instruction::PushInt(BigInt::from(kind.mask())));
    m.emit(Instruction::BitAnd);
    // ( p c hi ) low part: p >> (w - c)
    m.emit(Instruction::Rot);
    m.emit(Instruction::Rot);
    m.emit(Instruction::PushInt(BigInt::from(kind.bits())));
    m.emit(Instruction::Swap);
    m.emit(Instruction::Sub);
    m.emit(Instruction::Shr);
    m.emit(Instruction::BitOr);
    emit_pattern_rebias(m, kind);
    Ok(())
}

/// `( v c -- rotated )` rotate the width-sized bit pattern right.
fn rotate_right(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let kind = int_kind_of(method);
    emit_rotation_operands(m, kind);
    // ( p c ) low part: p >> c
    m.emit(Instruction::Over);
    m.emit(Instruction::Over);
    m.emit(Instruction::Shr);
    // ( p c lo ) high part: (p << (w - c)) & mask
    m.emit(Instruction::Rot);
    m.emit(Instruction::Rot);
    m.emit(Instruction::PushInt(BigInt::from(kind.bits())));
    m.emit(Instruction::Swap);
    m.emit(Instruction::Sub);
    m.emit(Instruction::Shl);
    m.emit(Instruction::PushInt(BigInt::from(kind.mask())));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::BitOr);
    emit_pattern_rebias(m, kind);
    Ok(())
}

/// `( v -- count )` ones in the width-sized bit pattern.
fn pop_count(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let kind = int_kind_of(method);
    let head = m.buf.create_target();
    let done = m.buf.create_target();
    m.emit(Instruction::PushInt(BigInt::from(kind.mask())));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::PushInt(BigInt::from(0)));
    // ( p n ) add the low bit, shift, repeat while p is nonzero.
    m.buf.bind(head);
    m.emit(Instruction::Over);
    m.buf.jump_if_not(done);
    m.emit(Instruction::Over);
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::Add);
    m.emit(Instruction::Swap);
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Shr);
    m.emit(Instruction::Swap);
    m.buf.jump(head);
    m.buf.bind(done);
    m.emit(Instruction::Nip);
    Ok(())
}

/// `( v -- count )` leading zeros in the width-sized bit pattern; the
/// width itself for zero, `0` for negative values of signed kinds.
fn leading_zero_count(
    m: &mut MethodLowering<'_>,
    method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let kind = int_kind_of(method);
    let head = m.buf.create_target();
    let done = m.buf.create_target();
    m.emit(Instruction::PushInt(BigInt::from(kind.mask())));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::PushInt(BigInt::from(0)));
    // ( p n ) n counts the pattern's bit length; the answer is w - n.
    m.buf.bind(head);
    m.emit(Instruction::Over);
    m.buf.jump_if_not(done);
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Add);
    m.emit(Instruction::Swap);
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Shr);
    m.emit(Instruction::Swap);
    m.buf.jump(head);
    m.buf.bind(done);
    m.emit(Instruction::Nip);
    m.emit(Instruction::PushInt(BigInt::from(kind.bits())));
    m.emit(Instruction::Swap);
    m.emit(Instruction::Sub);
    Ok(())
}
