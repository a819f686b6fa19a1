//! Operator lowering.
//!
//! This module provides the `OperatorLowering` extension trait over
//! [`MethodLowering`]: binary and unary operators, the ternary conditional,
//! and the four assignment forms (`=`, `op=`, `??=`, `++`/`--`).
//!
//! Two rules shape everything here. First, an assignment target's receiver
//! and index are evaluated exactly once, whatever the form; the emitted
//! code keeps them on the stack with `Dup`/`Tuck`/`Over` shuffles instead
//! of re-lowering the subexpressions. Second, every assignment form leaves
//! the assigned value on the stack, because assignments are expressions;
//! statement position drops the leftover via the normal discard path.
//!
//! Short-circuit operators are value-passing: `a || b` yields `a` itself
//! when `a` is truthy, not a re-made boolean.

use std::sync::Arc;

use stele_ast::{
    BinOp, EnumDef, Expr, ExprKind, FieldSym, IncDecOp, IntKind, MethodSym, PropertySym,
    SymbolRef, TypeDesc, UnOp, VarSym,
};
use stele_core::{Const, Span};

use crate::bytecode::Instruction;
use crate::call::CallLowering;
use crate::error::{CompileError, CompileResult};
use crate::expr::ExprLowering;
use crate::intrinsics::strings::emit_char_to_string;
use crate::method::MethodLowering;

// =============================================================================
// Trait
// =============================================================================

/// Operator emission over [`MethodLowering`].
pub(crate) trait OperatorLowering {
    /// Lower `lhs op rhs`, leaving the result on the stack.
    fn lower_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        result_ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()>;

    /// Lower `op operand`.
    fn lower_unary(
        &mut self,
        op: UnOp,
        operand: &Expr,
        result_ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()>;

    /// Lower `cond ? then_arm : else_arm`.
    fn lower_conditional(
        &mut self,
        cond: &Expr,
        then_arm: &Expr,
        else_arm: &Expr,
    ) -> CompileResult<()>;

    /// Lower `target = value`, leaving the assigned value.
    fn lower_assign(&mut self, target: &Expr, value: &Expr, span: Span) -> CompileResult<()>;

    /// Lower `target op= value`, leaving the new value.
    fn lower_compound_assign(
        &mut self,
        op: BinOp,
        target: &Expr,
        value: &Expr,
        result_ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()>;

    /// Lower `target ??= value`, leaving the target's final value. The
    /// fallback is neither evaluated nor stored when the target is
    /// non-null.
    fn lower_coalesce_assign(&mut self, target: &Expr, value: &Expr, span: Span)
        -> CompileResult<()>;

    /// Lower `++`/`--`. Postfix leaves the pre-mutation value, prefix the
    /// post-mutation value.
    fn lower_incdec(
        &mut self,
        op: IncDecOp,
        target: &Expr,
        postfix: bool,
        ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()>;

    /// Convert the stack top from `ty` to its string rendering.
    fn stringify(&mut self, ty: &TypeDesc, span: Span) -> CompileResult<()>;
}

impl OperatorLowering for MethodLowering<'_> {
    fn lower_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        result_ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        match op {
            BinOp::AndAlso => {
                self.lower_expr(lhs)?;
                let end = self.buf.create_target();
                self.emit(Instruction::Dup);
                self.buf.jump_if_not(end);
                self.emit(Instruction::Drop);
                self.lower_expr(rhs)?;
                self.buf.bind(end);
                Ok(())
            }
            BinOp::OrElse => {
                self.lower_expr(lhs)?;
                let end = self.buf.create_target();
                self.emit(Instruction::Dup);
                self.buf.jump_if(end);
                self.emit(Instruction::Drop);
                self.lower_expr(rhs)?;
                self.buf.bind(end);
                Ok(())
            }
            BinOp::Coalesce => {
                self.lower_expr(lhs)?;
                let end = self.buf.create_target();
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if_not(end);
                self.emit(Instruction::Drop);
                self.lower_expr(rhs)?;
                self.buf.bind(end);
                Ok(())
            }
            BinOp::Eq | BinOp::Ne if is_null_literal(lhs) || is_null_literal(rhs) => {
                let tested = if is_null_literal(lhs) { rhs } else { lhs };
                self.lower_expr(tested)?;
                self.emit(Instruction::IsNull);
                if op == BinOp::Ne {
                    self.emit(Instruction::Not);
                }
                Ok(())
            }
            BinOp::Add if matches!(result_ty, TypeDesc::Str) => {
                self.lower_expr(lhs)?;
                self.stringify(&lhs.ty, span)?;
                self.lower_expr(rhs)?;
                self.stringify(&rhs.ty, span)?;
                self.emit(Instruction::Cat);
                Ok(())
            }
            _ => {
                self.lower_expr(lhs)?;
                self.lower_expr(rhs)?;
                self.emit_applied_op(op, result_ty, &rhs.ty, span)
            }
        }
    }

    fn lower_unary(
        &mut self,
        op: UnOp,
        operand: &Expr,
        result_ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        self.lower_expr(operand)?;
        match op {
            UnOp::Plus => {}
            UnOp::Not => self.emit(Instruction::Not),
            UnOp::Neg => {
                self.emit(Instruction::Neg);
                self.adjust_to(result_ty, span)?;
            }
            UnOp::BitNot => {
                self.emit(Instruction::Invert);
                self.adjust_to(result_ty, span)?;
            }
        }
        Ok(())
    }

    fn lower_conditional(
        &mut self,
        cond: &Expr,
        then_arm: &Expr,
        else_arm: &Expr,
    ) -> CompileResult<()> {
        self.lower_expr(cond)?;
        let else_at = self.buf.create_target();
        let end = self.buf.create_target();
        self.buf.jump_if_not(else_at);
        self.lower_expr(then_arm)?;
        self.buf.jump(end);
        self.buf.bind(else_at);
        self.lower_expr(else_arm)?;
        self.buf.bind(end);
        Ok(())
    }

    fn lower_assign(&mut self, target: &Expr, value: &Expr, span: Span) -> CompileResult<()> {
        match classify_target(target, span)? {
            TargetShape::Discard => self.lower_expr(value),
            TargetShape::Var(sym) => {
                self.lower_expr(value)?;
                let storage = self.resolve_var(sym, span)?;
                self.emit(Instruction::Dup);
                self.emit_store_var(storage);
                Ok(())
            }
            TargetShape::StaticField(field) => {
                self.lower_expr(value)?;
                let slot = self.resolve_static_field(field, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::StoreStatic(slot));
                Ok(())
            }
            TargetShape::InstanceField { receiver, index } => {
                self.lower_receiver(receiver, span)?;
                self.lower_expr(value)?;
                self.emit(Instruction::Tuck);
                self.emit(Instruction::PushInt(index.into()));
                self.emit(Instruction::Swap);
                self.emit(Instruction::SetItem);
                Ok(())
            }
            TargetShape::Element { receiver, index } => {
                self.lower_expr(receiver)?;
                self.lower_element_index(index)?;
                self.lower_expr(value)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::Reverse(4));
                self.emit(Instruction::Reverse(3));
                self.emit(Instruction::SetItem);
                Ok(())
            }
            TargetShape::StaticProp(prop) => {
                let setter = require_setter(prop, span)?;
                self.lower_expr(value)?;
                self.emit(Instruction::Dup);
                self.emit_accessor_call(&setter, span)
            }
            TargetShape::InstanceProp { receiver, prop } => {
                let setter = require_setter(prop, span)?;
                self.lower_receiver(receiver, span)?;
                self.lower_expr(value)?;
                self.emit(Instruction::Tuck);
                self.emit_accessor_call(&setter, span)
            }
        }
    }

    fn lower_compound_assign(
        &mut self,
        op: BinOp,
        target: &Expr,
        value: &Expr,
        result_ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        match classify_target(target, span)? {
            TargetShape::Discard => Err(CompileError::unsupported(
                "discard is not a compound-assignment target",
                span,
            )),
            TargetShape::Var(sym) => {
                let storage = self.resolve_var(sym, span)?;
                self.emit_load_var(storage);
                self.lower_expr(value)?;
                self.emit_applied_op(op, result_ty, &value.ty, span)?;
                self.emit(Instruction::Dup);
                self.emit_store_var(storage);
                Ok(())
            }
            TargetShape::StaticField(field) => {
                let slot = self.resolve_static_field(field, span)?;
                self.emit(Instruction::LoadStatic(slot));
                self.lower_expr(value)?;
                self.emit_applied_op(op, result_ty, &value.ty, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::StoreStatic(slot));
                Ok(())
            }
            TargetShape::InstanceField { receiver, index } => {
                self.lower_receiver(receiver, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::PushInt(index.into()));
                self.emit(Instruction::PickItem);
                self.lower_expr(value)?;
                self.emit_applied_op(op, result_ty, &value.ty, span)?;
                self.emit(Instruction::Tuck);
                self.emit(Instruction::PushInt(index.into()));
                self.emit(Instruction::Swap);
                self.emit(Instruction::SetItem);
                Ok(())
            }
            TargetShape::Element { receiver, index } => {
                self.lower_expr(receiver)?;
                self.lower_element_index(index)?;
                self.emit(Instruction::Over);
                self.emit(Instruction::Over);
                self.emit(Instruction::PickItem);
                self.lower_expr(value)?;
                self.emit_applied_op(op, result_ty, &value.ty, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::Reverse(4));
                self.emit(Instruction::Reverse(3));
                self.emit(Instruction::SetItem);
                Ok(())
            }
            TargetShape::StaticProp(prop) => {
                let setter = require_setter(prop, span)?;
                self.emit_accessor_call(&prop.getter, span)?;
                self.lower_expr(value)?;
                self.emit_applied_op(op, result_ty, &value.ty, span)?;
                self.emit(Instruction::Dup);
                self.emit_accessor_call(&setter, span)
            }
            TargetShape::InstanceProp { receiver, prop } => {
                let setter = require_setter(prop, span)?;
                self.lower_receiver(receiver, span)?;
                self.emit(Instruction::Dup);
                self.emit_accessor_call(&prop.getter, span)?;
                self.lower_expr(value)?;
                self.emit_applied_op(op, result_ty, &value.ty, span)?;
                self.emit(Instruction::Tuck);
                self.emit_accessor_call(&setter, span)
            }
        }
    }

    fn lower_coalesce_assign(
        &mut self,
        target: &Expr,
        value: &Expr,
        span: Span,
    ) -> CompileResult<()> {
        match classify_target(target, span)? {
            TargetShape::Discard => Err(CompileError::unsupported(
                "discard is not a coalescing-assignment target",
                span,
            )),
            TargetShape::Var(sym) => {
                let storage = self.resolve_var(sym, span)?;
                let end = self.buf.create_target();
                self.emit_load_var(storage);
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if_not(end);
                self.emit(Instruction::Drop);
                self.lower_expr(value)?;
                self.emit(Instruction::Dup);
                self.emit_store_var(storage);
                self.buf.bind(end);
                Ok(())
            }
            TargetShape::StaticField(field) => {
                let slot = self.resolve_static_field(field, span)?;
                let end = self.buf.create_target();
                self.emit(Instruction::LoadStatic(slot));
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if_not(end);
                self.emit(Instruction::Drop);
                self.lower_expr(value)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::StoreStatic(slot));
                self.buf.bind(end);
                Ok(())
            }
            TargetShape::InstanceField { receiver, index } => {
                let assign = self.buf.create_target();
                let end = self.buf.create_target();
                self.lower_receiver(receiver, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::PushInt(index.into()));
                self.emit(Instruction::PickItem);
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if(assign);
                self.emit(Instruction::Nip);
                self.buf.jump(end);
                self.buf.bind(assign);
                self.emit(Instruction::Drop);
                self.lower_expr(value)?;
                self.emit(Instruction::Tuck);
                self.emit(Instruction::PushInt(index.into()));
                self.emit(Instruction::Swap);
                self.emit(Instruction::SetItem);
                self.buf.bind(end);
                Ok(())
            }
            TargetShape::Element { receiver, index } => {
                let assign = self.buf.create_target();
                let end = self.buf.create_target();
                self.lower_expr(receiver)?;
                self.lower_element_index(index)?;
                self.emit(Instruction::Over);
                self.emit(Instruction::Over);
                self.emit(Instruction::PickItem);
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if(assign);
                self.emit(Instruction::Reverse(3));
                self.emit(Instruction::Drop);
                self.emit(Instruction::Drop);
                self.buf.jump(end);
                self.buf.bind(assign);
                self.emit(Instruction::Drop);
                self.lower_expr(value)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::Reverse(4));
                self.emit(Instruction::Reverse(3));
                self.emit(Instruction::SetItem);
                self.buf.bind(end);
                Ok(())
            }
            TargetShape::StaticProp(prop) => {
                let setter = require_setter(prop, span)?;
                let end = self.buf.create_target();
                self.emit_accessor_call(&prop.getter, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if_not(end);
                self.emit(Instruction::Drop);
                self.lower_expr(value)?;
                self.emit(Instruction::Dup);
                self.emit_accessor_call(&setter, span)?;
                self.buf.bind(end);
                Ok(())
            }
            TargetShape::InstanceProp { receiver, prop } => {
                let setter = require_setter(prop, span)?;
                let assign = self.buf.create_target();
                let end = self.buf.create_target();
                self.lower_receiver(receiver, span)?;
                self.emit(Instruction::Dup);
                self.emit_accessor_call(&prop.getter, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if(assign);
                self.emit(Instruction::Nip);
                self.buf.jump(end);
                self.buf.bind(assign);
                self.emit(Instruction::Drop);
                self.lower_expr(value)?;
                self.emit(Instruction::Tuck);
                self.emit_accessor_call(&setter, span)?;
                self.buf.bind(end);
                Ok(())
            }
        }
    }

    fn lower_incdec(
        &mut self,
        op: IncDecOp,
        target: &Expr,
        postfix: bool,
        ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        let step = match op {
            IncDecOp::Inc => Instruction::Add,
            IncDecOp::Dec => Instruction::Sub,
        };
        match classify_target(target, span)? {
            TargetShape::Discard => Err(CompileError::unsupported(
                "discard is not an increment target",
                span,
            )),
            TargetShape::Var(sym) => {
                let storage = self.resolve_var(sym, span)?;
                self.emit_load_var(storage);
                if postfix {
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit_store_var(storage);
                } else {
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::Dup);
                    self.emit_store_var(storage);
                }
                Ok(())
            }
            TargetShape::StaticField(field) => {
                let slot = self.resolve_static_field(field, span)?;
                self.emit(Instruction::LoadStatic(slot));
                if postfix {
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::StoreStatic(slot));
                } else {
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::StoreStatic(slot));
                }
                Ok(())
            }
            TargetShape::InstanceField { receiver, index } => {
                self.lower_receiver(receiver, span)?;
                self.emit(Instruction::Dup);
                self.emit(Instruction::PushInt(index.into()));
                self.emit(Instruction::PickItem);
                if postfix {
                    self.emit(Instruction::Tuck);
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::PushInt(index.into()));
                    self.emit(Instruction::Swap);
                    self.emit(Instruction::SetItem);
                } else {
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::Tuck);
                    self.emit(Instruction::PushInt(index.into()));
                    self.emit(Instruction::Swap);
                    self.emit(Instruction::SetItem);
                }
                Ok(())
            }
            TargetShape::Element { receiver, index } => {
                self.lower_expr(receiver)?;
                self.lower_element_index(index)?;
                self.emit(Instruction::Over);
                self.emit(Instruction::Over);
                self.emit(Instruction::PickItem);
                if postfix {
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::Reverse(4));
                    self.emit(Instruction::Reverse(3));
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::SetItem);
                } else {
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::Reverse(4));
                    self.emit(Instruction::Reverse(3));
                    self.emit(Instruction::SetItem);
                }
                Ok(())
            }
            TargetShape::StaticProp(prop) => {
                let setter = require_setter(prop, span)?;
                self.emit_accessor_call(&prop.getter, span)?;
                if postfix {
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit_accessor_call(&setter, span)?;
                } else {
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::Dup);
                    self.emit_accessor_call(&setter, span)?;
                }
                Ok(())
            }
            TargetShape::InstanceProp { receiver, prop } => {
                let setter = require_setter(prop, span)?;
                self.lower_receiver(receiver, span)?;
                self.emit(Instruction::Dup);
                self.emit_accessor_call(&prop.getter, span)?;
                if postfix {
                    self.emit(Instruction::Tuck);
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit_accessor_call(&setter, span)?;
                } else {
                    self.emit(Instruction::PushInt(1.into()));
                    self.emit(step);
                    self.adjust_to(ty, span)?;
                    self.emit(Instruction::Tuck);
                    self.emit_accessor_call(&setter, span)?;
                }
                Ok(())
            }
        }
    }

    fn stringify(&mut self, ty: &TypeDesc, span: Span) -> CompileResult<()> {
        match ty {
            TypeDesc::Str
            | TypeDesc::Bytes
            | TypeDesc::Address
            | TypeDesc::Hash
            | TypeDesc::PubKey => Ok(()),
            TypeDesc::BigInt => {
                self.emit(Instruction::Itoa);
                Ok(())
            }
            TypeDesc::Int(IntKind::Char) => {
                emit_char_to_string(self);
                Ok(())
            }
            TypeDesc::Int(_) => {
                self.emit(Instruction::Itoa);
                Ok(())
            }
            TypeDesc::Bool => {
                let no = self.buf.create_target();
                let end = self.buf.create_target();
                self.buf.jump_if_not(no);
                self.emit(Instruction::PushBytes(b"true".to_vec()));
                self.buf.jump(end);
                self.buf.bind(no);
                self.emit(Instruction::PushBytes(b"false".to_vec()));
                self.buf.bind(end);
                Ok(())
            }
            TypeDesc::Enum(def) => self.emit_enum_stringify(def, span),
            TypeDesc::Nullable(inner) => {
                let some = self.buf.create_target();
                let end = self.buf.create_target();
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if_not(some);
                self.emit(Instruction::Drop);
                self.emit(Instruction::PushBytes(Vec::new()));
                self.buf.jump(end);
                self.buf.bind(some);
                self.stringify(inner, span)?;
                self.buf.bind(end);
                Ok(())
            }
            other => Err(CompileError::unsupported_type(
                format!("no string conversion for '{}'", other.display_name()),
                span,
            )),
        }
    }
}

// =============================================================================
// Shared emission helpers
// =============================================================================

impl MethodLowering<'_> {
    /// Emit the receiver of a member target: the written expression, or the
    /// enclosing instance when the source omitted it.
    pub(crate) fn lower_receiver(
        &mut self,
        receiver: Option<&Expr>,
        span: Span,
    ) -> CompileResult<()> {
        match receiver {
            Some(expr) => self.lower_expr(expr),
            None => self.emit_load_this(span),
        }
    }

    /// Emit an element index with the receiver on the stack. From-end
    /// indices read the receiver's size without re-evaluating it.
    pub(crate) fn lower_element_index(&mut self, index: &Expr) -> CompileResult<()> {
        if let ExprKind::FromEnd(inner) = &index.kind {
            self.emit(Instruction::Dup);
            self.emit(Instruction::Size);
            self.lower_expr(inner)?;
            self.emit(Instruction::Sub);
        } else {
            self.lower_expr(index)?;
        }
        Ok(())
    }

    /// Resolve a static field to its slot.
    pub(crate) fn resolve_static_field(
        &mut self,
        field: &Arc<FieldSym>,
        span: Span,
    ) -> CompileResult<u16> {
        self.session
            .statics
            .resolve(crate::slots::StaticKey::Field(field.static_key()), span)
    }

    /// Apply a non-short-circuit operator to the two stack operands,
    /// re-ranging the result when the operator can leave the type's range.
    /// String-typed `+` concatenates, stringifying the right operand.
    fn emit_applied_op(
        &mut self,
        op: BinOp,
        result_ty: &TypeDesc,
        rhs_ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        if op == BinOp::Add && matches!(result_ty, TypeDesc::Str) {
            self.stringify(rhs_ty, span)?;
            self.emit(Instruction::Cat);
            return Ok(());
        }
        let ins = arith_instruction(op).ok_or_else(|| {
            CompileError::unsupported(
                "short-circuit operator is not a compound-assignment operator",
                span,
            )
        })?;
        self.emit(ins);
        if op.can_overflow() {
            self.adjust_to(result_ty, span)?;
        }
        Ok(())
    }

    /// Scan an enum's members against the stack value and leave the name of
    /// the first match; unmatched values fall back to their decimal
    /// rendering.
    pub(crate) fn emit_enum_stringify(&mut self, def: &Arc<EnumDef>, _span: Span) -> CompileResult<()> {
        let end = self.buf.create_target();
        for member in &def.members {
            let next = self.buf.create_target();
            self.emit(Instruction::Dup);
            self.emit(Instruction::PushInt(member.value.clone()));
            self.emit(Instruction::Equal);
            self.buf.jump_if_not(next);
            self.emit(Instruction::Drop);
            self.emit(Instruction::PushBytes(member.name.as_bytes().to_vec()));
            self.buf.jump(end);
            self.buf.bind(next);
        }
        self.emit(Instruction::Itoa);
        self.buf.bind(end);
        Ok(())
    }
}

// =============================================================================
// Assignment target classification
// =============================================================================

/// The storage shapes an assignment target can take.
enum TargetShape<'a> {
    /// `_ = value`.
    Discard,
    /// Local or parameter.
    Var(&'a Arc<VarSym>),
    /// Static field, addressed through the static table.
    StaticField(&'a Arc<FieldSym>),
    /// Instance field; `receiver: None` is an implicit `this`.
    InstanceField {
        receiver: Option<&'a Expr>,
        index: u16,
    },
    /// Array or tuple element.
    Element {
        receiver: &'a Expr,
        index: &'a Expr,
    },
    /// Static property, written through its setter.
    StaticProp(&'a Arc<PropertySym>),
    /// Instance property; `receiver: None` is an implicit `this`.
    InstanceProp {
        receiver: Option<&'a Expr>,
        prop: &'a Arc<PropertySym>,
    },
}

fn classify_target<'a>(target: &'a Expr, span: Span) -> CompileResult<TargetShape<'a>> {
    match &target.kind {
        ExprKind::Ident(SymbolRef::Discard) => Ok(TargetShape::Discard),
        ExprKind::Ident(SymbolRef::Local(sym) | SymbolRef::Param(sym)) => {
            Ok(TargetShape::Var(sym))
        }
        ExprKind::Ident(SymbolRef::Field(field)) => field_target(field, None, span),
        ExprKind::Ident(SymbolRef::Property(prop)) => Ok(prop_target(prop, None)),
        ExprKind::Member {
            receiver,
            member,
            null_conditional,
        } => {
            if *null_conditional {
                return Err(CompileError::unsupported(
                    "null-conditional access is not an assignment target",
                    span,
                ));
            }
            match member {
                SymbolRef::Field(field) => field_target(field, receiver.as_deref(), span),
                SymbolRef::Property(prop) => Ok(prop_target(prop, receiver.as_deref())),
                other => Err(CompileError::unsupported(
                    format!("member '{}' is not assignable", other.name()),
                    span,
                )),
            }
        }
        ExprKind::Index {
            receiver,
            indices,
            null_conditional,
        } => {
            if *null_conditional {
                return Err(CompileError::unsupported(
                    "null-conditional access is not an assignment target",
                    span,
                ));
            }
            if indices.len() != 1 {
                return Err(CompileError::unsupported(
                    "multi-dimensional element assignment",
                    span,
                ));
            }
            Ok(TargetShape::Element {
                receiver,
                index: &indices[0],
            })
        }
        _ => Err(CompileError::unsupported(
            "expression is not an assignment target",
            span,
        )),
    }
}

fn field_target<'a>(
    field: &'a Arc<FieldSym>,
    receiver: Option<&'a Expr>,
    span: Span,
) -> CompileResult<TargetShape<'a>> {
    if field.is_static {
        return Ok(TargetShape::StaticField(field));
    }
    let index = field
        .declaring
        .instance_field_index(&field.name)
        .ok_or_else(|| {
            CompileError::unsupported(
                format!("'{}' has no field '{}'", field.declaring.name, field.name),
                span,
            )
        })?;
    // Static receivers never reach here; a typename receiver resolves to a
    // static field.
    let receiver = receiver.filter(|r| !matches!(r.kind, ExprKind::Ident(SymbolRef::Type(_))));
    Ok(TargetShape::InstanceField {
        receiver,
        index: index as u16,
    })
}

fn prop_target<'a>(prop: &'a Arc<PropertySym>, receiver: Option<&'a Expr>) -> TargetShape<'a> {
    if prop.is_static {
        TargetShape::StaticProp(prop)
    } else {
        let receiver =
            receiver.filter(|r| !matches!(r.kind, ExprKind::Ident(SymbolRef::Type(_))));
        TargetShape::InstanceProp { receiver, prop }
    }
}

fn require_setter(prop: &Arc<PropertySym>, span: Span) -> CompileResult<Arc<MethodSym>> {
    prop.setter.clone().ok_or_else(|| {
        CompileError::unsupported(format!("property '{}' is read-only", prop.name), span)
    })
}

fn arith_instruction(op: BinOp) -> Option<Instruction> {
    Some(match op {
        BinOp::Add => Instruction::Add,
        BinOp::Sub => Instruction::Sub,
        BinOp::Mul => Instruction::Mul,
        BinOp::Div => Instruction::Div,
        BinOp::Rem => Instruction::Rem,
        BinOp::BitAnd => Instruction::BitAnd,
        BinOp::BitOr => Instruction::BitOr,
        BinOp::BitXor => Instruction::BitXor,
        BinOp::Shl => Instruction::Shl,
        BinOp::Shr => Instruction::Shr,
        BinOp::Eq => Instruction::Equal,
        BinOp::Ne => Instruction::NotEqual,
        BinOp::Lt => Instruction::Lt,
        BinOp::Le => Instruction::Le,
        BinOp::Gt => Instruction::Gt,
        BinOp::Ge => Instruction::Ge,
        BinOp::AndAlso | BinOp::OrElse | BinOp::Coalesce => return None,
    })
}

fn is_null_literal(expr: &Expr) -> bool {
    matches!(expr.constant, Some(Const::Null))
}
