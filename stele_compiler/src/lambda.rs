//! Lambda lowering.
//!
//! A lambda compiles to its own unit with the same shape as a method
//! body: an `InitSlots` prologue, the body expression, `Ret`. Its
//! parameters bind to parameter slots of the new unit. Free variables
//! cannot stay in the enclosing unit's slots once the function value
//! escapes, so each one is promoted to a shared static slot keyed by
//! symbol identity. The enclosing unit copies the variable's current
//! value into that slot immediately before pushing the function value;
//! from then on every reference in the lambda reads the slot.
//!
//! Promotion is transparent to the body: `resolve_var` answers a frame
//! miss with the static slot and records the capture. A lambda nested
//! inside another lambda records the same slot in its own capture set,
//! extending the copy-in chain outward to the variable's defining frame.

use std::sync::Arc;

use stele_ast::{Expr, VarSym};
use stele_core::Span;

use crate::bytecode::Instruction;
use crate::error::CompileResult;
use crate::expr::ExprLowering;
use crate::method::MethodLowering;
use crate::slots::VarStorage;

// =====================================================================
// Capture tracking
// =====================================================================

/// Free variables a lambda body reads from enclosing units, in first-use
/// order, with the static slot each one was promoted to.
#[derive(Debug, Default)]
pub(crate) struct CaptureSet {
    entries: Vec<(Arc<VarSym>, u16)>,
}

impl CaptureSet {
    /// Record a promoted variable. Later uses of the same symbol are
    /// collapsed into the first entry.
    pub(crate) fn record(&mut self, sym: Arc<VarSym>, slot: u16) {
        if self.entries.iter().any(|(s, _)| s.id == sym.id) {
            return;
        }
        self.entries.push((sym, slot));
    }
}

// =====================================================================
// Lowering
// =====================================================================

pub(crate) trait LambdaLowering {
    /// Lower a lambda to a fresh unit and leave the function value on the
    /// enclosing unit's stack.
    fn lower_lambda(
        &mut self,
        params: &[Arc<VarSym>],
        body: &Expr,
        span: Span,
    ) -> CompileResult<()>;
}

impl LambdaLowering for MethodLowering<'_> {
    fn lower_lambda(
        &mut self,
        params: &[Arc<VarSym>],
        body: &Expr,
        span: Span,
    ) -> CompileResult<()> {
        let (id, name) = self.session.register_lambda(&self.name);
        let checked = self.is_checked();

        let mut inner = MethodLowering::new(
            &mut *self.session,
            name,
            params,
            false,
            checked,
            Some(CaptureSet::default()),
        )?;
        inner.lower_expr(body)?;
        let captures = inner.captures.take().unwrap_or_default();
        let unit = inner.finish_unit(!body.ty.is_void());
        self.session.complete_unit(id, unit);

        // Copy the current value of every captured variable into its
        // slot. A variable that is itself a capture of this unit already
        // lives there and needs no copy.
        for (sym, slot) in &captures.entries {
            let storage = self.resolve_var(sym, span)?;
            if storage == VarStorage::Static(*slot) {
                continue;
            }
            self.emit_load_var(storage);
            self.emit(Instruction::StoreStatic(*slot));
        }
        self.emit(Instruction::PushFunc(id));
        Ok(())
    }
}

// =====================================================================
// Tests
// =====================================================================
