//! Expression dispatch.
//!
//! `lower_expr` is the single entry point for putting an expression's value
//! on the stack. Folded constants win over structure: a node that carries a
//! compile-time value is emitted as a push, whatever its shape. Everything
//! else dispatches exhaustively on the node kind; operators and calls are
//! delegated to their own modules, and the access forms (member, index,
//! slice, null-conditional chains) are lowered here.
//!
//! Null-conditional chains compile to one shared exit per chain: each `?.`
//! edge tests the receiver and bails to the chain's exit with the receiver
//! dropped, and the exit pushes the chain's null result. Chains nested in
//! argument position get their own exit, because only the receiver spine
//! belongs to a chain.

use std::sync::Arc;

use num_traits::ToPrimitive;
use stele_ast::{Expr, ExprKind, FieldSym, IntKind, InterpPart, SymbolRef, TypeDesc};
use stele_core::{Const, Span};

use crate::bytecode::{Instruction, JumpTarget, TypeTag};
use crate::call::CallLowering;
use crate::error::{CompileError, CompileResult};
use crate::lambda::LambdaLowering;
use crate::method::MethodLowering;
use crate::operators::OperatorLowering;

/// Expression emission over [`MethodLowering`].
pub(crate) trait ExprLowering {
    /// Emit code leaving the expression's value on the stack (nothing for a
    /// void call).
    fn lower_expr(&mut self, expr: &Expr) -> CompileResult<()>;

    /// Emit the zero value of a type.
    fn lower_default(&mut self, ty: &TypeDesc, span: Span) -> CompileResult<()>;
}

impl ExprLowering for MethodLowering<'_> {
    fn lower_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        if let Some(value) = &expr.constant {
            return self.emit_const(value, &expr.ty, expr.span);
        }
        match &expr.kind {
            ExprKind::Literal(value) => self.emit_const(value, &expr.ty, expr.span),
            ExprKind::Default => self.lower_default(&expr.ty, expr.span),
            ExprKind::Ident(sym) => self.lower_ident(sym, expr.span),
            ExprKind::This => self.emit_load_this(expr.span),
            ExprKind::Binary { op, lhs, rhs } => {
                self.lower_binary(*op, lhs, rhs, &expr.ty, expr.span)
            }
            ExprKind::Unary { op, operand } => {
                self.lower_unary(*op, operand, &expr.ty, expr.span)
            }
            ExprKind::Conditional {
                cond,
                then_arm,
                else_arm,
            } => self.lower_conditional(cond, then_arm, else_arm),
            ExprKind::Assign { target, value } => self.lower_assign(target, value, expr.span),
            ExprKind::CompoundAssign { op, target, value } => {
                self.lower_compound_assign(*op, target, value, &expr.ty, expr.span)
            }
            ExprKind::CoalesceAssign { target, value } => {
                self.lower_coalesce_assign(target, value, expr.span)
            }
            ExprKind::IncDec {
                op,
                target,
                postfix,
            } => self.lower_incdec(*op, target, *postfix, &expr.ty, expr.span),
            ExprKind::Member { .. } | ExprKind::Index { .. } | ExprKind::Call { .. } => {
                self.lower_chain_root(expr)
            }
            ExprKind::FromEnd(_) => Err(CompileError::unsupported(
                "from-end index outside an index position",
                expr.span,
            )),
            ExprKind::Range { .. } => Err(CompileError::unsupported(
                "range outside an index position",
                expr.span,
            )),
            ExprKind::Invoke { callee, args } => self.lower_invoke(callee, args, expr.span),
            ExprKind::New { args } => self.lower_new(&expr.ty, args, expr.span),
            ExprKind::AnonymousObject { values: elements }
            | ExprKind::TupleLit { elements } => {
                self.emit(Instruction::NewRecord);
                for element in elements {
                    self.emit(Instruction::Dup);
                    self.lower_expr(element)?;
                    self.emit(Instruction::Append);
                }
                Ok(())
            }
            ExprKind::ArrayLit { elements } | ExprKind::CollectionLit { elements } => {
                self.lower_sequence(elements, &expr.ty, expr.span)
            }
            ExprKind::Lambda { params, body } => self.lower_lambda(params, body, expr.span),
            ExprKind::Cast { operand } => {
                self.lower_expr(operand)?;
                self.emit_conversion(&operand.ty, &expr.ty, expr.span)
            }
            ExprKind::Checked { checked, body } => {
                self.enter_checked(*checked);
                let result = self.lower_expr(body);
                self.exit_checked();
                result
            }
            ExprKind::Is { operand, tested } => {
                self.lower_expr(operand)?;
                let tag = type_tag(tested, expr.span)?;
                self.emit(Instruction::IsType(tag));
                Ok(())
            }
            ExprKind::Interpolated { parts } => self.lower_interpolated(parts),
        }
    }

    fn lower_default(&mut self, ty: &TypeDesc, span: Span) -> CompileResult<()> {
        if ty.defaults_to_null() {
            self.emit(Instruction::PushNull);
            return Ok(());
        }
        match ty {
            TypeDesc::Bool => self.emit(Instruction::PushBool(false)),
            TypeDesc::Int(_) | TypeDesc::BigInt | TypeDesc::Enum(_) => {
                self.emit(Instruction::PushInt(0.into()));
            }
            TypeDesc::Object(def) => {
                // Value types zero their fields recursively.
                self.emit(Instruction::NewRecord);
                for field in def.instance_fields() {
                    self.emit(Instruction::Dup);
                    self.lower_default(&field.ty, span)?;
                    self.emit(Instruction::Append);
                }
            }
            TypeDesc::Tuple(elems) => {
                self.emit(Instruction::NewRecord);
                for elem in elems {
                    self.emit(Instruction::Dup);
                    self.lower_default(elem, span)?;
                    self.emit(Instruction::Append);
                }
            }
            other => {
                return Err(CompileError::unsupported_type(
                    format!("'{}' has no default value", other.display_name()),
                    span,
                ))
            }
        }
        Ok(())
    }
}

// =============================================================================
// Constants and names
// =============================================================================

impl MethodLowering<'_> {
    /// Push a compile-time constant, honoring the node's type. String
    /// constants typed as fixed-size byte values are hex-decoded here, at
    /// compile time.
    pub(crate) fn emit_const(
        &mut self,
        value: &Const,
        ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        match value {
            Const::Null => self.emit(Instruction::PushNull),
            Const::Bool(b) => self.emit(Instruction::PushBool(*b)),
            Const::Int(v) => self.emit(Instruction::PushInt(v.clone())),
            Const::Str(s) => {
                if let Some(len) = ty.fixed_byte_len() {
                    let bytes = decode_fixed_hex(s, len, span)?;
                    self.emit(Instruction::PushBytes(bytes));
                } else {
                    self.emit(Instruction::PushBytes(s.clone().into_bytes()));
                }
            }
            Const::Bytes(b) => {
                if let Some(len) = ty.fixed_byte_len() {
                    if b.len() != len {
                        return Err(CompileError::invalid_constant(
                            format!(
                                "expected {len} bytes for '{}', found {}",
                                ty.display_name(),
                                b.len()
                            ),
                            span,
                        ));
                    }
                }
                self.emit(Instruction::PushBytes(b.clone()));
            }
        }
        Ok(())
    }

    fn lower_ident(&mut self, sym: &SymbolRef, span: Span) -> CompileResult<()> {
        match sym {
            SymbolRef::Local(var) | SymbolRef::Param(var) => {
                let storage = self.resolve_var(var, span)?;
                self.emit_load_var(storage);
                Ok(())
            }
            SymbolRef::Field(field) => {
                if field.is_static {
                    let slot = self.resolve_static_field(field, span)?;
                    self.emit(Instruction::LoadStatic(slot));
                    Ok(())
                } else {
                    self.emit_load_this(span)?;
                    self.emit_instance_field_read(field, span)
                }
            }
            SymbolRef::Property(prop) => {
                if !prop.is_static {
                    self.emit_load_this(span)?;
                }
                self.emit_accessor_call(&prop.getter, span)
            }
            SymbolRef::Method(method) => {
                let Some(id) = self.session.lookup_method(&method.unit_key()) else {
                    return Err(CompileError::unsupported(
                        format!("method '{}' is not a function value", method.name),
                        span,
                    ));
                };
                self.emit(Instruction::PushFunc(id));
                Ok(())
            }
            SymbolRef::Type(ty) => Err(CompileError::unsupported(
                format!("type '{}' is not a value", ty.display_name()),
                span,
            )),
            SymbolRef::Discard => Err(CompileError::unsupported(
                "discard read has no value",
                span,
            )),
        }
    }
}

// =============================================================================
// Access chains
// =============================================================================

impl MethodLowering<'_> {
    /// Entry point for member/index/call expressions. Calls with no `?.`
    /// edge anywhere in their receiver spine take the direct call path;
    /// chains containing a null-conditional edge get a wrapper that
    /// supplies the null result.
    fn lower_chain_root(&mut self, expr: &Expr) -> CompileResult<()> {
        if !chain_has_null_conditional(expr) {
            if let ExprKind::Call {
                method,
                receiver,
                args,
                ..
            } = &expr.kind
            {
                return self.lower_call(method, value_receiver(receiver), args, expr.span);
            }
            return self.lower_chained(expr, None);
        }
        let exit = self.buf.create_target();
        let done = self.buf.create_target();
        self.lower_chained(expr, Some(exit))?;
        self.buf.jump(done);
        self.buf.bind(exit);
        if !expr.ty.is_void() {
            self.emit(Instruction::PushNull);
        }
        self.buf.bind(done);
        Ok(())
    }

    /// Lower one link of a receiver spine. `chain` is the enclosing
    /// null-conditional exit, shared by every `?.` edge of the same chain.
    fn lower_chained(&mut self, expr: &Expr, chain: Option<JumpTarget>) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Member {
                receiver,
                member,
                null_conditional,
            } => {
                match member {
                    SymbolRef::Field(field) if field.is_static => {
                        let slot = self.resolve_static_field(field, expr.span)?;
                        self.emit(Instruction::LoadStatic(slot));
                        Ok(())
                    }
                    SymbolRef::Property(prop) if prop.is_static => {
                        self.emit_accessor_call(&prop.getter, expr.span)
                    }
                    SymbolRef::Method(method) => {
                        // Method group in value position.
                        self.lower_ident(&SymbolRef::Method(method.clone()), expr.span)
                    }
                    _ => {
                        self.lower_chain_receiver(value_receiver(receiver), chain, expr.span)?;
                        if *null_conditional {
                            self.emit_null_break(chain, expr.span)?;
                        }
                        match member {
                            SymbolRef::Field(field) => {
                                self.emit_instance_field_read(field, expr.span)
                            }
                            SymbolRef::Property(prop) => {
                                self.emit_accessor_call(&prop.getter, expr.span)
                            }
                            other => Err(CompileError::unsupported(
                                format!("member '{}' has no value", other.name()),
                                expr.span,
                            )),
                        }
                    }
                }
            }
            ExprKind::Index {
                receiver,
                indices,
                null_conditional,
            } => {
                if indices.len() != 1 {
                    return Err(CompileError::unsupported(
                        "multi-dimensional element access",
                        expr.span,
                    ));
                }
                self.lower_chained(receiver, chain)?;
                if *null_conditional {
                    self.emit_null_break(chain, expr.span)?;
                }
                let index = &indices[0];
                if let ExprKind::Range { start, end } = &index.kind {
                    self.emit_slice(start.as_deref(), end.as_deref(), expr.span)
                } else {
                    self.lower_element_index(index)?;
                    self.emit(Instruction::PickItem);
                    Ok(())
                }
            }
            ExprKind::Call {
                method,
                receiver,
                args,
                null_conditional,
            } => {
                if !method.is_static {
                    self.lower_chain_receiver(value_receiver(receiver), chain, expr.span)?;
                    if *null_conditional {
                        self.emit_null_break(chain, expr.span)?;
                    }
                }
                self.finish_call(method, args, expr.span)
            }
            _ => self.lower_expr(expr),
        }
    }

    fn lower_chain_receiver(
        &mut self,
        receiver: Option<&Expr>,
        chain: Option<JumpTarget>,
        span: Span,
    ) -> CompileResult<()> {
        match receiver {
            Some(expr) => self.lower_chained(expr, chain),
            None => self.emit_load_this(span),
        }
    }

    /// Test the receiver on top of the stack; a null receiver is dropped
    /// and control leaves for the chain exit.
    fn emit_null_break(
        &mut self,
        chain: Option<JumpTarget>,
        span: Span,
    ) -> CompileResult<()> {
        let Some(exit) = chain else {
            return Err(CompileError::unsupported(
                "null-conditional access outside a value position",
                span,
            ));
        };
        let cont = self.buf.create_target();
        self.emit(Instruction::Dup);
        self.emit(Instruction::IsNull);
        self.buf.jump_if_not(cont);
        self.emit(Instruction::Drop);
        self.buf.jump(exit);
        self.buf.bind(cont);
        Ok(())
    }

    fn emit_instance_field_read(
        &mut self,
        field: &Arc<FieldSym>,
        span: Span,
    ) -> CompileResult<()> {
        let index = field
            .declaring
            .instance_field_index(&field.name)
            .ok_or_else(|| {
                CompileError::unsupported(
                    format!("'{}' has no field '{}'", field.declaring.name, field.name),
                    span,
                )
            })?;
        self.emit(Instruction::PushInt(index.into()));
        self.emit(Instruction::PickItem);
        Ok(())
    }

    /// Extract `receiver[start..end]` with the receiver on the stack. Open
    /// endpoints default to the receiver's bounds, and from-end endpoints
    /// count back from its size; the receiver is never re-evaluated.
    fn emit_slice(
        &mut self,
        start: Option<&Expr>,
        end: Option<&Expr>,
        _span: Span,
    ) -> CompileResult<()> {
        match start {
            None => self.emit(Instruction::PushInt(0.into())),
            Some(e) => {
                if let ExprKind::FromEnd(inner) = &e.kind {
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::Size);
                    self.lower_expr(inner)?;
                    self.emit(Instruction::Sub);
                } else {
                    self.lower_expr(e)?;
                }
            }
        }
        match end {
            None => {
                self.emit(Instruction::Over);
                self.emit(Instruction::Size);
            }
            Some(e) => {
                if let ExprKind::FromEnd(inner) = &e.kind {
                    self.emit(Instruction::Over);
                    self.emit(Instruction::Size);
                    self.lower_expr(inner)?;
                    self.emit(Instruction::Sub);
                } else {
                    self.lower_expr(e)?;
                }
            }
        }
        // ( s start end ) -> ( s start len )
        self.emit(Instruction::Over);
        self.emit(Instruction::Sub);
        self.emit(Instruction::SubStr);
        Ok(())
    }
}

// =============================================================================
// Creation, conversion, interpolation
// =============================================================================

impl MethodLowering<'_> {
    fn lower_new(&mut self, ty: &TypeDesc, args: &[Expr], span: Span) -> CompileResult<()> {
        let TypeDesc::Object(def) = ty else {
            return Err(CompileError::unsupported_type(
                format!("'{}' has no constructor", ty.display_name()),
                span,
            ));
        };
        self.emit(Instruction::NewRecord);
        for (i, field) in def.instance_fields().enumerate() {
            self.emit(Instruction::Dup);
            match args.get(i) {
                Some(arg) => self.lower_expr(arg)?,
                None => self.lower_default(&field.ty, span)?,
            }
            self.emit(Instruction::Append);
        }
        Ok(())
    }

    fn lower_sequence(
        &mut self,
        elements: &[Expr],
        ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        if elements.len() > usize::from(u16::MAX) {
            return Err(CompileError::unsupported(
                "sequence literal is too long",
                span,
            ));
        }
        if let Some(bytes) = constant_byte_elements(elements, ty) {
            self.emit(Instruction::PushBytes(bytes));
            return Ok(());
        }
        for element in elements {
            self.lower_expr(element)?;
        }
        self.emit(Instruction::Pack(elements.len() as u16));
        Ok(())
    }

    /// Convert the stack top from `from` to `to`.
    pub(crate) fn emit_conversion(
        &mut self,
        from: &TypeDesc,
        to: &TypeDesc,
        span: Span,
    ) -> CompileResult<()> {
        use TypeDesc as T;
        if from == to {
            return Ok(());
        }
        match (from, to) {
            // Nulls pass through nullable-to-nullable conversions.
            (T::Nullable(fi), T::Nullable(ti)) => {
                let end = self.buf.create_target();
                self.emit(Instruction::Dup);
                self.emit(Instruction::IsNull);
                self.buf.jump_if(end);
                self.emit_conversion(fi, ti, span)?;
                self.buf.bind(end);
                return Ok(());
            }
            (T::Nullable(fi), t) => {
                self.emit_null_unwrap(span);
                return self.emit_conversion(fi, t, span);
            }
            (f, T::Nullable(ti)) => return self.emit_conversion(f, ti, span),
            _ => {}
        }
        if let Some(kind) = to.int_kind() {
            if !from.is_integer() {
                return Err(unsupported_cast(from, to, span));
            }
            match from.int_kind() {
                Some(fk) if fits_within(fk, kind) => {}
                _ => self.adjust_to(to, span)?,
            }
            return Ok(());
        }
        match (from, to) {
            (f, T::BigInt) if f.is_integer() => Ok(()),
            (T::Str | T::Bytes | T::Address | T::Hash | T::PubKey, T::Str | T::Bytes) => Ok(()),
            (T::Str | T::Bytes | T::Address | T::Hash | T::PubKey, t) => {
                match t.fixed_byte_len() {
                    Some(len) => {
                        self.emit_length_check(len, span);
                        Ok(())
                    }
                    None => Err(unsupported_cast(from, to, span)),
                }
            }
            (T::Object(_) | T::Tuple(_), T::Object(_) | T::Tuple(_)) => Ok(()),
            (T::Array(_), T::Array(_)) => Ok(()),
            _ => Err(unsupported_cast(from, to, span)),
        }
    }

    /// Fault at runtime when the stack top is null; leaves the value.
    pub(crate) fn emit_null_unwrap(&mut self, _span: Span) {
        let ok = self.buf.create_target();
        self.emit(Instruction::Dup);
        self.emit(Instruction::IsNull);
        self.buf.jump_if_not(ok);
        self.emit(Instruction::PushBytes(b"nullable has no value".to_vec()));
        self.emit(Instruction::Throw);
        self.buf.bind(ok);
    }

    /// Fault at runtime unless the byte string on top has exactly `len`
    /// bytes; leaves the value.
    fn emit_length_check(&mut self, len: usize, _span: Span) {
        let ok = self.buf.create_target();
        self.emit(Instruction::Dup);
        self.emit(Instruction::Size);
        self.emit(Instruction::PushInt(len.into()));
        self.emit(Instruction::Equal);
        self.buf.jump_if(ok);
        let msg = format!("expected a {len}-byte value");
        self.emit(Instruction::PushBytes(msg.into_bytes()));
        self.emit(Instruction::Throw);
        self.buf.bind(ok);
    }

    fn lower_interpolated(&mut self, parts: &[InterpPart]) -> CompileResult<()> {
        if parts.is_empty() {
            self.emit(Instruction::PushBytes(Vec::new()));
            return Ok(());
        }
        for (i, part) in parts.iter().enumerate() {
            match part {
                InterpPart::Literal(text) => {
                    self.emit(Instruction::PushBytes(text.clone().into_bytes()));
                }
                InterpPart::Value(value) => {
                    self.lower_expr(value)?;
                    self.stringify(&value.ty, value.span)?;
                }
            }
            if i > 0 {
                self.emit(Instruction::Cat);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Free helpers
// =============================================================================

/// The receiver expression that actually produces a value; typename
/// receivers of static accesses produce none.
fn value_receiver(receiver: &Option<Box<Expr>>) -> Option<&Expr> {
    receiver
        .as_deref()
        .filter(|r| !matches!(r.kind, ExprKind::Ident(SymbolRef::Type(_))))
}

fn chain_has_null_conditional(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Member {
            receiver,
            null_conditional,
            ..
        } => {
            *null_conditional
                || receiver
                    .as_deref()
                    .is_some_and(chain_has_null_conditional)
        }
        ExprKind::Index {
            receiver,
            null_conditional,
            ..
        } => *null_conditional || chain_has_null_conditional(receiver),
        ExprKind::Call {
            receiver,
            null_conditional,
            ..
        } => {
            *null_conditional
                || receiver
                    .as_deref()
                    .is_some_and(chain_has_null_conditional)
        }
        _ => false,
    }
}

/// Runtime shape tag for a type test. Null matches no tag, which is what
/// `is` wants for nullable types too.
fn type_tag(ty: &TypeDesc, span: Span) -> CompileResult<TypeTag> {
    match ty {
        TypeDesc::Bool => Ok(TypeTag::Bool),
        TypeDesc::Int(_) | TypeDesc::BigInt | TypeDesc::Enum(_) => Ok(TypeTag::Int),
        TypeDesc::Str
        | TypeDesc::Bytes
        | TypeDesc::Address
        | TypeDesc::Hash
        | TypeDesc::PubKey => Ok(TypeTag::Bytes),
        TypeDesc::Array(_) | TypeDesc::Tuple(_) | TypeDesc::Object(_) => Ok(TypeTag::Record),
        TypeDesc::Func { .. } => Ok(TypeTag::Func),
        TypeDesc::Nullable(inner) => type_tag(inner, span),
        TypeDesc::Void => Err(CompileError::unsupported_type(
            "'void' is not a testable type",
            span,
        )),
    }
}

fn fits_within(from: IntKind, to: IntKind) -> bool {
    from.min_value() >= to.min_value() && from.max_value() <= to.max_value()
}

fn unsupported_cast(from: &TypeDesc, to: &TypeDesc, span: Span) -> CompileError {
    CompileError::unsupported_type(
        format!(
            "no conversion from '{}' to '{}'",
            from.display_name(),
            to.display_name()
        ),
        span,
    )
}

/// When every element of a `uint8[]` literal is a compile-time byte, the
/// whole literal collapses into one byte-string push.
fn constant_byte_elements(elements: &[Expr], ty: &TypeDesc) -> Option<Vec<u8>> {
    match ty {
        TypeDesc::Array(elem) if matches!(**elem, TypeDesc::Int(IntKind::U8)) => {}
        _ => return None,
    }
    let mut bytes = Vec::with_capacity(elements.len());
    for element in elements {
        match &element.constant {
            Some(Const::Int(v)) => match v.to_u8() {
                Some(b) => bytes.push(b),
                None => return None,
            },
            _ => return None,
        }
    }
    Some(bytes)
}

fn decode_fixed_hex(text: &str, len: usize, span: Span) -> CompileResult<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.len() != len * 2 {
        return Err(CompileError::invalid_constant(
            format!(
                "expected {} hex digits for a {len}-byte literal, found {}",
                len * 2,
                digits.len()
            ),
            span,
        ));
    }
    let mut bytes = Vec::with_capacity(len);
    for pair in digits.as_bytes().chunks(2) {
        let hi = hex_digit(pair[0], span)?;
        let lo = hex_digit(pair[1], span)?;
        bytes.push(hi << 4 | lo);
    }
    Ok(bytes)
}

fn hex_digit(c: u8, span: Span) -> CompileResult<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(CompileError::invalid_constant(
            format!("'{}' is not a hex digit", c as char),
            span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Options, Session};
    use std::sync::Arc;
    use stele_ast::{IntKind, VarSym};

    fn lowered_body(f: impl FnOnce(&mut MethodLowering<'_>)) -> Vec<Instruction> {
        let mut session = Session::new(Options::default());
        let mut m =
            MethodLowering::new(&mut session, "t".into(), &[], false, false, None).unwrap();
        f(&mut m);
        m.finish_unit(false).instructions
    }

    fn local(id: u32, name: &str, ty: TypeDesc) -> Expr {
        let sym = VarSym::new(id, name, ty.clone());
        Expr::new(ExprKind::Ident(SymbolRef::Local(sym)), ty)
    }

    #[test]
    fn test_defaults_per_type() {
        let code = lowered_body(|m| {
            m.lower_default(&TypeDesc::Int(IntKind::I32), Span::dummy())
                .unwrap();
            m.lower_default(&TypeDesc::Bool, Span::dummy()).unwrap();
            m.lower_default(&TypeDesc::Str, Span::dummy()).unwrap();
        });
        assert_eq!(code[1], Instruction::PushInt(0.into()));
        assert_eq!(code[2], Instruction::PushBool(false));
        assert_eq!(code[3], Instruction::PushNull);
    }

    #[test]
    fn test_constant_byte_array_collapses_to_push_bytes() {
        let ty = TypeDesc::Array(Box::new(TypeDesc::Int(IntKind::U8)));
        let elements: Vec<Expr> = [1i64, 2, 255]
            .iter()
            .map(|v| Expr::literal(Const::int(*v), TypeDesc::Int(IntKind::U8)))
            .collect();
        let expr = Expr::new(ExprKind::ArrayLit { elements }, ty);
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert_eq!(code[1], Instruction::PushBytes(vec![1, 2, 255]));
    }

    #[test]
    fn test_out_of_range_element_defeats_byte_collapse() {
        let ty = TypeDesc::Array(Box::new(TypeDesc::Int(IntKind::U8)));
        let elements = vec![
            Expr::literal(Const::int(1), TypeDesc::Int(IntKind::U8)),
            Expr::literal(Const::int(300), TypeDesc::Int(IntKind::U8)),
        ];
        let expr = Expr::new(ExprKind::ArrayLit { elements }, ty);
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert!(code.contains(&Instruction::Pack(2)));
    }

    #[test]
    fn test_tuple_literal_appends_each_field() {
        let ty = TypeDesc::Tuple(vec![TypeDesc::BigInt, TypeDesc::Bool]);
        let expr = Expr::new(
            ExprKind::TupleLit {
                elements: vec![
                    Expr::literal(Const::int(1), TypeDesc::BigInt),
                    Expr::literal(Const::Bool(true), TypeDesc::Bool),
                ],
            },
            ty,
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert_eq!(
            code[1..8],
            [
                Instruction::NewRecord,
                Instruction::Dup,
                Instruction::PushInt(1.into()),
                Instruction::Append,
                Instruction::Dup,
                Instruction::PushBool(true),
                Instruction::Append,
            ]
        );
    }

    #[test]
    fn test_address_literal_hex_decodes() {
        let expr = Expr::literal(
            Const::Str(format!("0x{}", "ab".repeat(20))),
            TypeDesc::Address,
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert_eq!(code[1], Instruction::PushBytes(vec![0xab; 20]));
    }

    #[test]
    fn test_short_hex_literal_is_rejected() {
        let mut session = Session::new(Options::default());
        let mut m =
            MethodLowering::new(&mut session, "t".into(), &[], false, false, None).unwrap();
        let expr = Expr::literal(Const::Str("0x1234".into()), TypeDesc::Hash);
        let err = m.lower_expr(&expr).unwrap_err();
        assert!(err.to_string().contains("hex digits"));
    }

    #[test]
    fn test_from_end_index_reads_size_once() {
        let arr = local(1, "a", TypeDesc::Array(Box::new(TypeDesc::BigInt)));
        let expr = Expr::new(
            ExprKind::Index {
                receiver: Box::new(arr),
                indices: vec![Expr::new(
                    ExprKind::FromEnd(Box::new(Expr::literal(Const::int(1), TypeDesc::BigInt))),
                    TypeDesc::BigInt,
                )],
                null_conditional: false,
            },
            TypeDesc::BigInt,
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert_eq!(
            &code[1..7],
            &[
                Instruction::LoadLocal(0),
                Instruction::Dup,
                Instruction::Size,
                Instruction::PushInt(1.into()),
                Instruction::Sub,
                Instruction::PickItem,
            ]
        );
    }

    #[test]
    fn test_open_range_slice_shape() {
        let s = local(1, "s", TypeDesc::Str);
        let expr = Expr::new(
            ExprKind::Index {
                receiver: Box::new(s),
                indices: vec![Expr::new(
                    ExprKind::Range {
                        start: Some(Box::new(Expr::literal(Const::int(1), TypeDesc::BigInt))),
                        end: None,
                    },
                    TypeDesc::Str,
                )],
                null_conditional: false,
            },
            TypeDesc::Str,
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert_eq!(
            &code[1..9],
            &[
                Instruction::LoadLocal(0),
                Instruction::PushInt(1.into()),
                Instruction::Over,
                Instruction::Size,
                Instruction::Over,
                Instruction::Sub,
                Instruction::SubStr,
                Instruction::Ret,
            ]
        );
    }

    #[test]
    fn test_null_conditional_chain_supplies_null_result() {
        let s = local(1, "s", TypeDesc::Nullable(Box::new(TypeDesc::Str)));
        let length_get = stele_ast::MethodSym::new(
            TypeDesc::Str,
            "length",
            false,
            vec![],
            TypeDesc::BigInt,
        );
        let prop = Arc::new(stele_ast::PropertySym {
            name: "length".into(),
            declaring: TypeDesc::Str,
            is_static: false,
            ty: TypeDesc::BigInt,
            getter: length_get,
            setter: None,
        });
        let expr = Expr::new(
            ExprKind::Member {
                receiver: Some(Box::new(s)),
                member: SymbolRef::Property(prop),
                null_conditional: true,
            },
            TypeDesc::Nullable(Box::new(TypeDesc::BigInt)),
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert!(code.contains(&Instruction::IsNull));
        assert!(code.contains(&Instruction::PushNull));
        assert!(code.contains(&Instruction::Size));
    }

    #[test]
    fn test_nullable_unwrap_cast_traps_on_null() {
        let v = local(1, "v", TypeDesc::Nullable(Box::new(TypeDesc::BigInt)));
        let expr = Expr::new(
            ExprKind::Cast {
                operand: Box::new(v),
            },
            TypeDesc::BigInt,
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert!(code.contains(&Instruction::Throw));
    }

    #[test]
    fn test_widening_cast_is_free() {
        let b = local(1, "b", TypeDesc::Int(IntKind::U8));
        let expr = Expr::new(
            ExprKind::Cast {
                operand: Box::new(b),
            },
            TypeDesc::Int(IntKind::I32),
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert_eq!(
            code,
            vec![
                Instruction::InitSlots {
                    locals: 1,
                    params: 0
                },
                Instruction::LoadLocal(0),
                Instruction::Ret,
            ]
        );
    }

    #[test]
    fn test_interpolation_concatenates_parts() {
        let x = local(1, "x", TypeDesc::BigInt);
        let expr = Expr::new(
            ExprKind::Interpolated {
                parts: vec![
                    InterpPart::Literal("x=".into()),
                    InterpPart::Value(x),
                ],
            },
            TypeDesc::Str,
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert_eq!(
            &code[1..6],
            &[
                Instruction::PushBytes(b"x=".to_vec()),
                Instruction::LoadLocal(0),
                Instruction::Itoa,
                Instruction::Cat,
                Instruction::Ret,
            ]
        );
    }

    #[test]
    fn test_is_test_tags() {
        let x = local(1, "x", TypeDesc::BigInt);
        let expr = Expr::new(
            ExprKind::Is {
                operand: Box::new(x),
                tested: TypeDesc::Nullable(Box::new(TypeDesc::Int(IntKind::I32))),
            },
            TypeDesc::Bool,
        );
        let code = lowered_body(|m| m.lower_expr(&expr).unwrap());
        assert!(code.contains(&Instruction::IsType(TypeTag::Int)));
    }
}
