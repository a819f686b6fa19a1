//! Width adjustment for sized integer types.
//!
//! The VM computes on unbounded integers, so every operation whose source
//! type is a sized integer needs an explicit adjustment afterwards to keep
//! the value inside the type's range. Two policies exist. `Wrap` reduces
//! the value modulo `2^bits` and re-biases signed results, matching
//! unchecked source semantics. `Trap` faults the VM when the value has left
//! the range, matching checked semantics. Both start with an in-range fast
//! path so well-behaved values pay a single `Within` test.

use num_bigint::BigInt;
use stele_ast::IntKind;

use crate::bytecode::{Instruction, InstructionBuffer};

/// What to do with a value that has left its type's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fault the VM with an out-of-range message.
    Trap,
    /// Reduce modulo `2^bits`, re-biasing signed results.
    Wrap,
}

/// Emit the adjustment for `kind` under `policy`. Expects the value on top
/// of the stack and leaves the adjusted value there.
pub fn emit_adjust(buf: &mut InstructionBuffer, kind: IntKind, policy: OverflowPolicy) {
    match policy {
        OverflowPolicy::Trap => emit_trap(buf, kind),
        OverflowPolicy::Wrap => emit_wrap(buf, kind),
    }
}

/// Emit the in-range test shared by both policies. Leaves the value in
/// place and the test result on top.
fn emit_within(buf: &mut InstructionBuffer, kind: IntKind) {
    buf.emit(Instruction::Dup);
    buf.emit(Instruction::PushInt(BigInt::from(kind.min_value())));
    buf.emit(Instruction::PushInt(BigInt::from(kind.max_value() + 1)));
    buf.emit(Instruction::Within);
}

/// Fault unless the value is inside `kind`'s range.
pub fn emit_trap(buf: &mut InstructionBuffer, kind: IntKind) {
    let ok = buf.create_target();
    emit_within(buf, kind);
    buf.jump_if(ok);
    let msg = format!("value out of range for {}", kind.name());
    buf.emit(Instruction::PushBytes(msg.into_bytes()));
    buf.emit(Instruction::Throw);
    buf.bind(ok);
}

/// Wrap the value into `kind`'s range modulo `2^bits`.
///
/// The mask leaves the low `bits` of the two's-complement representation,
/// which is already the answer for unsigned kinds. Signed kinds then map
/// residues above the positive maximum back down by one modulus.
pub fn emit_wrap(buf: &mut InstructionBuffer, kind: IntKind) {
    let done = buf.create_target();
    emit_within(buf, kind);
    buf.jump_if(done);
    buf.emit(Instruction::PushInt(BigInt::from(kind.mask())));
    buf.emit(Instruction::BitAnd);
    if kind.is_signed() {
        buf.emit(Instruction::Dup);
        buf.emit(Instruction::PushInt(BigInt::from(kind.max_value())));
        buf.emit(Instruction::Gt);
        buf.jump_if_not(done);
        buf.emit(Instruction::PushInt(BigInt::from(kind.modulus())));
        buf.emit(Instruction::Sub);
    }
    buf.bind(done);
}
