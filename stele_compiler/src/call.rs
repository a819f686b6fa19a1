//! Call lowering.
//!
//! Every call site lowers operands the same way: receiver first (explicit
//! or implicit `this`), then arguments left to right. Dispatch then picks
//! the cheapest resolution that fits: a user-declared method becomes a
//! direct `Call` to its unit; otherwise the method's normalized key is
//! looked up in the intrinsic table and the matching handler emits inline
//! instructions. A handler that wants its receiver on top of the operands
//! declares `ReceiverLast`, and dispatch rotates the receiver up without
//! re-evaluating it.
//!
//! Null-conditional receivers are tested by the member-chain plumbing
//! before this module runs; by the time dispatch fires, the receiver is on
//! the stack and known non-null.

use std::sync::Arc;

use stele_ast::{Expr, MethodSym};
use stele_core::Span;

use crate::bytecode::Instruction;
use crate::error::{CompileError, CompileResult};
use crate::expr::ExprLowering;
use crate::intrinsics::{self, CallConvention};
use crate::method::MethodLowering;

/// Call emission over [`MethodLowering`].
pub(crate) trait CallLowering {
    /// Lower a direct method call, receiver and all.
    fn lower_call(
        &mut self,
        method: &Arc<MethodSym>,
        receiver: Option<&Expr>,
        args: &[Expr],
        span: Span,
    ) -> CompileResult<()>;

    /// Lower arguments and dispatch, with the receiver (when the method has
    /// one) already on the stack.
    fn finish_call(&mut self, method: &Arc<MethodSym>, args: &[Expr], span: Span)
        -> CompileResult<()>;

    /// Lower an invocation of a callable value.
    fn lower_invoke(&mut self, callee: &Expr, args: &[Expr], span: Span) -> CompileResult<()>;

    /// Dispatch an accessor whose operands are already on the stack.
    fn emit_accessor_call(&mut self, method: &Arc<MethodSym>, span: Span) -> CompileResult<()>;
}

impl CallLowering for MethodLowering<'_> {
    fn lower_call(
        &mut self,
        method: &Arc<MethodSym>,
        receiver: Option<&Expr>,
        args: &[Expr],
        span: Span,
    ) -> CompileResult<()> {
        if !method.is_static {
            self.lower_receiver(receiver, span)?;
        }
        self.finish_call(method, args, span)
    }

    fn finish_call(
        &mut self,
        method: &Arc<MethodSym>,
        args: &[Expr],
        span: Span,
    ) -> CompileResult<()> {
        for arg in args {
            self.lower_expr(arg)?;
        }
        self.emit_dispatch(method, args.len(), span)
    }

    fn lower_invoke(&mut self, callee: &Expr, args: &[Expr], span: Span) -> CompileResult<()> {
        self.lower_expr(callee)?;
        for arg in args {
            self.lower_expr(arg)?;
        }
        // The callable was evaluated first, so it sits under the arguments;
        // CallFunc wants it on top.
        if !args.is_empty() {
            let depth = u8::try_from(args.len()).map_err(|_| {
                CompileError::unsupported("more arguments than the stack can address", span)
            })?;
            self.emit(Instruction::Roll(depth));
        }
        self.emit(Instruction::CallFunc);
        Ok(())
    }

    fn emit_accessor_call(&mut self, method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
        self.emit_dispatch(method, method.params.len(), span)
    }
}

impl MethodLowering<'_> {
    /// Resolve `method` and emit the call, operands already on the stack.
    fn emit_dispatch(
        &mut self,
        method: &Arc<MethodSym>,
        argc: usize,
        span: Span,
    ) -> CompileResult<()> {
        if let Some(id) = self.session.lookup_method(&method.unit_key()) {
            self.emit(Instruction::Call(id));
            return Ok(());
        }
        let key = method.key();
        if let Some(intr) = intrinsics::lookup(&key) {
            if intr.convention == CallConvention::ReceiverLast && !method.is_static && argc > 0 {
                let depth = u8::try_from(argc).map_err(|_| {
                    CompileError::unsupported("more arguments than the stack can address", span)
                })?;
                self.emit(Instruction::Roll(depth));
            }
            return (intr.handler)(self, method, span);
        }
        Err(CompileError::unsupported(
            format!("no lowering for method '{key}'"),
            span,
        ))
    }
}
