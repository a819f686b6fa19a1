//! Per-unit lowering driver.
//!
//! [`MethodLowering`] holds everything one unit's lowering needs: the
//! instruction buffer, the slot frame, the checked-context stack, and a
//! mutable borrow of the shared [`Session`]. The expression, operator,
//! call, and lambda routines are extension traits over this struct, so the
//! whole lowering surface shares one `&mut self`.
//!
//! [`lower_program`] is the entry point. It registers every declared
//! method before lowering any body, which is what lets call sites resolve
//! methods declared later in the program.

use std::sync::Arc;

use smallvec::SmallVec;
use stele_ast::{MethodDecl, Program, Stmt, TypeDesc, VarSym};
use stele_core::Span;

use crate::bytecode::{Instruction, InstructionBuffer};
use crate::error::{CompileError, CompileResult};
use crate::expr::ExprLowering;
use crate::lambda::CaptureSet;
use crate::range_check::{self, OverflowPolicy};
use crate::session::{Lowered, Options, Session, Unit};
use crate::slots::{SlotFrame, StaticKey, VarStorage};

/// Lower a whole program to stack-VM units.
///
/// Unit ids follow declaration order, with lambda units appended as their
/// definitions are encountered. Static slots are assigned in first-reference
/// order during body lowering. Both orders are deterministic, so equal
/// inputs produce equal output.
pub fn lower_program(program: &Program, options: Options) -> CompileResult<Lowered> {
    let mut session = Session::new(options);
    let mut ids = Vec::with_capacity(program.methods.len());
    for decl in &program.methods {
        ids.push(session.register_method(decl.sym.unit_key()));
    }
    for (decl, id) in program.methods.iter().zip(ids) {
        let unit = lower_method(&mut session, decl)?;
        session.complete_unit(id, unit);
    }
    Ok(session.finish())
}

fn lower_method(session: &mut Session, decl: &MethodDecl) -> CompileResult<Unit> {
    let sym = &decl.sym;
    let name: Arc<str> = format!("{}.{}", sym.declaring.display_name(), sym.name).into();
    let initial_checked = session.options.default_checked;
    let mut lowering = MethodLowering::new(
        session,
        name,
        &decl.params,
        !sym.is_static,
        initial_checked,
        None,
    )?;
    lowering.lower_block(&decl.body)?;
    Ok(lowering.finish_unit(!sym.ret.is_void()))
}

// =============================================================================
// Unit lowering state
// =============================================================================

/// Lowering state for one unit (a method body or a lambda body).
pub struct MethodLowering<'s> {
    /// Shared compilation state.
    pub(crate) session: &'s mut Session,
    /// Instruction buffer under construction.
    pub(crate) buf: InstructionBuffer,
    /// Local and parameter slots of this unit.
    pub(crate) frame: SlotFrame,
    /// Capture set when this unit is a lambda body, `None` for methods.
    pub(crate) captures: Option<CaptureSet>,
    /// Display name of the unit being lowered.
    pub(crate) name: Arc<str>,
    /// Nested checked/unchecked regions, innermost last. Never empty.
    checked: SmallVec<[bool; 4]>,
    has_receiver: bool,
}

impl<'s> MethodLowering<'s> {
    /// Create the state for one unit and emit its `InitSlots` prologue
    /// placeholder. Slot counts are patched in by [`Self::finish_unit`].
    pub(crate) fn new(
        session: &'s mut Session,
        name: Arc<str>,
        params: &[Arc<VarSym>],
        has_receiver: bool,
        initial_checked: bool,
        captures: Option<CaptureSet>,
    ) -> CompileResult<Self> {
        let frame = SlotFrame::new(params, has_receiver, Span::dummy())?;
        let mut buf = InstructionBuffer::new();
        buf.emit(Instruction::InitSlots {
            locals: 0,
            params: 0,
        });
        let mut checked = SmallVec::new();
        checked.push(initial_checked);
        Ok(Self {
            session,
            buf,
            frame,
            captures,
            name,
            checked,
            has_receiver,
        })
    }

    /// Append one instruction.
    #[inline]
    pub(crate) fn emit(&mut self, ins: Instruction) {
        self.buf.emit(ins);
    }

    // === Checked context ===

    /// Enter an explicit `checked` or `unchecked` region.
    pub(crate) fn enter_checked(&mut self, checked: bool) {
        self.checked.push(checked);
    }

    /// Leave the innermost explicit region.
    pub(crate) fn exit_checked(&mut self) {
        self.checked.pop();
    }

    /// Whether the innermost enclosing context is checked.
    #[must_use]
    pub(crate) fn is_checked(&self) -> bool {
        self.checked.last().copied().unwrap_or(false)
    }

    /// Overflow policy of the innermost enclosing context.
    #[must_use]
    pub(crate) fn policy(&self) -> OverflowPolicy {
        if self.is_checked() {
            OverflowPolicy::Trap
        } else {
            OverflowPolicy::Wrap
        }
    }

    /// Emit the width adjustment for a result of type `ty` under the
    /// current context. Unbounded integers need none; anything else
    /// reaching here is a typing error in the input tree.
    pub(crate) fn adjust_to(&mut self, ty: &TypeDesc, span: Span) -> CompileResult<()> {
        match ty.int_kind() {
            Some(kind) => {
                let policy = self.policy();
                range_check::emit_adjust(&mut self.buf, kind, policy);
                Ok(())
            }
            None if matches!(ty, TypeDesc::BigInt) => Ok(()),
            None => Err(CompileError::unsupported_type(
                format!("unsupported type '{}' for range check", ty.display_name()),
                span,
            )),
        }
    }

    // === Variable storage ===

    /// Resolve a variable to its storage.
    ///
    /// Frame residents win. In a lambda body, a frame miss means the
    /// variable belongs to an enclosing unit and is promoted to a static
    /// capture slot. In a method body, a frame miss binds the variable to
    /// a fresh local on first use.
    pub(crate) fn resolve_var(&mut self, sym: &Arc<VarSym>, span: Span) -> CompileResult<VarStorage> {
        if let Some(storage) = self.frame.lookup(sym.id) {
            return Ok(storage);
        }
        if self.captures.is_some() {
            let slot = self
                .session
                .statics
                .resolve(StaticKey::Capture(sym.id), span)?;
            if let Some(caps) = &mut self.captures {
                caps.record(Arc::clone(sym), slot);
            }
            return Ok(VarStorage::Static(slot));
        }
        let slot = self.frame.declare_local(sym, span)?;
        Ok(VarStorage::Local(slot))
    }

    /// Emit a load from a resolved storage location.
    pub(crate) fn emit_load_var(&mut self, storage: VarStorage) {
        match storage {
            VarStorage::Local(s) => self.emit(Instruction::LoadLocal(s)),
            VarStorage::Param(s) => self.emit(Instruction::LoadParam(s)),
            VarStorage::Static(s) => self.emit(Instruction::LoadStatic(s)),
        }
    }

    /// Emit a store to a resolved storage location.
    pub(crate) fn emit_store_var(&mut self, storage: VarStorage) {
        match storage {
            VarStorage::Local(s) => self.emit(Instruction::StoreLocal(s)),
            VarStorage::Param(s) => self.emit(Instruction::StoreParam(s)),
            VarStorage::Static(s) => self.emit(Instruction::StoreStatic(s)),
        }
    }

    /// Load the receiver of the enclosing instance method.
    pub(crate) fn emit_load_this(&mut self, span: Span) -> CompileResult<()> {
        if !self.has_receiver {
            return Err(CompileError::unsupported(
                "'this' outside an instance method",
                span,
            ));
        }
        self.emit(Instruction::LoadParam(0));
        Ok(())
    }

    // === Statements ===

    /// Lower a statement list in order.
    pub(crate) fn lower_block(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        for stmt in stmts {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Local { sym, init, span } => {
                let slot = self.frame.declare_local(sym, *span)?;
                match init {
                    Some(value) => self.lower_expr(value)?,
                    None => self.lower_default(&sym.ty, *span)?,
                }
                self.emit(Instruction::StoreLocal(slot));
                Ok(())
            }
            Stmt::Expr(expr) => {
                self.lower_expr(expr)?;
                if !expr.ty.is_void() {
                    self.emit(Instruction::Drop);
                }
                Ok(())
            }
            Stmt::Return { value, .. } => {
                if let Some(v) = value {
                    self.lower_expr(v)?;
                }
                self.emit(Instruction::Ret);
                Ok(())
            }
        }
    }

    /// Seal the unit: make sure it ends in `Ret`, patch the prologue slot
    /// counts, and resolve jumps.
    pub(crate) fn finish_unit(mut self, returns_value: bool) -> Unit {
        if !matches!(self.buf.last(), Some(Instruction::Ret)) {
            self.buf.emit(Instruction::Ret);
        }
        let locals = self.frame.local_count();
        let params = self.frame.param_count();
        self.buf.patch_init_slots(locals, params);
        Unit {
            name: self.name,
            instructions: self.buf.finish(),
            locals,
            params,
            returns_value,
        }
    }
}
