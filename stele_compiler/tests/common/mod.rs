//! Test-side evaluator and program builders for the integration suites.
//!
//! The evaluator executes finalized units directly so lowering properties
//! can be asserted behaviorally: final values, trap messages, and counts of
//! load/store/call events. It is deliberately small; anything it cannot
//! execute is a lowering bug and panics with the unit name, while conditions
//! the target VM would fault on surface as [`Outcome::Trap`].

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive, Zero};
use stele_ast::{
    BinOp, EnumDef, EnumMember, Expr, ExprKind, FieldDef, FieldSym, IntKind, MethodDecl,
    MethodSym, Program, Stmt, SymbolRef, TypeDef, TypeDesc, VarSym,
};
use stele_compiler::bytecode::{Instruction, JumpOperand, TypeTag, UnitId};
use stele_compiler::{lower_program, Lowered, Options};
use stele_core::{Const, Span};

// =============================================================================
// Runtime values
// =============================================================================

/// A value on the evaluator's operand stack.
///
/// `PartialEq` is structural (records compare by content) so test
/// assertions read naturally; the `Equal` instruction itself compares
/// records by identity, as the target VM does.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(BigInt),
    Bytes(Vec<u8>),
    Record(Rc<RefCell<Vec<Value>>>),
    Func(UnitId),
}

impl Value {
    pub fn int(v: impl Into<BigInt>) -> Self {
        Value::Int(v.into())
    }

    pub fn str(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }

    pub fn record(items: Vec<Value>) -> Self {
        Value::Record(Rc::new(RefCell::new(items)))
    }

    /// The record elements, cloned out of the shared cell.
    pub fn items(&self) -> Vec<Value> {
        match self {
            Value::Record(items) => items.borrow().clone(),
            other => panic!("expected a record, found {other:?}"),
        }
    }
}

/// How a unit's execution ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Normal return, with the value when the unit declares one.
    Ok(Option<Value>),
    /// The program faulted; the payload is the decoded throw message.
    Trap(String),
}

impl Outcome {
    pub fn value(self) -> Value {
        match self {
            Outcome::Ok(Some(v)) => v,
            other => panic!("expected a returned value, got {other:?}"),
        }
    }

    pub fn int(self) -> BigInt {
        match self.value() {
            Value::Int(n) => n,
            other => panic!("expected an integer result, got {other:?}"),
        }
    }

    pub fn bytes(self) -> Vec<u8> {
        match self.value() {
            Value::Bytes(b) => b,
            other => panic!("expected a byte-string result, got {other:?}"),
        }
    }

    pub fn trap(self) -> String {
        match self {
            Outcome::Trap(msg) => msg,
            other => panic!("expected a trap, got {other:?}"),
        }
    }

    pub fn is_trap(&self) -> bool {
        matches!(self, Outcome::Trap(_))
    }
}

/// Events observed while executing, across every unit of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Local, parameter, and static slot loads.
    pub loads: usize,
    /// Local, parameter, and static slot stores.
    pub stores: usize,
    /// `Call` and `CallFunc` instructions executed.
    pub calls: usize,
}

// =============================================================================
// Evaluator
// =============================================================================

/// Executes lowered units against shared static storage.
pub struct Evaluator<'a> {
    program: &'a Lowered,
    /// Static slot contents; every slot starts null.
    pub statics: Vec<Value>,
    /// Accumulated event counts.
    pub counters: Counters,
    fuel: u64,
}

impl<'a> Evaluator<'a> {
    pub fn new(program: &'a Lowered) -> Self {
        Self {
            program,
            statics: vec![Value::Null; program.static_count],
            counters: Counters::default(),
            fuel: 1_000_000,
        }
    }

    /// Run one unit with `args` bound to its parameter slots in order.
    pub fn run(&mut self, id: UnitId, args: Vec<Value>) -> Outcome {
        let program = self.program;
        let unit = program
            .units
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("no unit {id}"));
        let name = &*unit.name;
        assert_eq!(
            args.len(),
            usize::from(unit.params),
            "arity mismatch calling {name}"
        );
        let mut params = args;
        let mut locals = vec![Value::Null; usize::from(unit.locals)];
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0usize;
        loop {
            assert!(self.fuel > 0, "evaluator fuel exhausted in {name}");
            self.fuel -= 1;
            let at = pc;
            let ins = unit
                .instructions
                .get(at)
                .unwrap_or_else(|| panic!("execution left the end of {name}"));
            pc = at + 1;
            match ins {
                // === Constants ===
                Instruction::PushInt(n) => stack.push(Value::Int(n.clone())),
                Instruction::PushBool(b) => stack.push(Value::Bool(*b)),
                Instruction::PushNull => stack.push(Value::Null),
                Instruction::PushBytes(b) => stack.push(Value::Bytes(b.clone())),
                Instruction::PushFunc(f) => stack.push(Value::Func(*f)),

                // === Stack shuffling ===
                Instruction::Dup => {
                    let v = stack
                        .last()
                        .cloned()
                        .unwrap_or_else(|| panic!("operand stack underflow in {name}"));
                    stack.push(v);
                }
                Instruction::Drop => {
                    pop(&mut stack, name);
                }
                Instruction::Nip => {
                    let b = pop(&mut stack, name);
                    pop(&mut stack, name);
                    stack.push(b);
                }
                Instruction::Swap => {
                    let b = pop(&mut stack, name);
                    let a = pop(&mut stack, name);
                    stack.push(b);
                    stack.push(a);
                }
                Instruction::Over => {
                    let i = stack
                        .len()
                        .checked_sub(2)
                        .unwrap_or_else(|| panic!("operand stack underflow in {name}"));
                    let v = stack[i].clone();
                    stack.push(v);
                }
                Instruction::Tuck => {
                    let b = pop(&mut stack, name);
                    let a = pop(&mut stack, name);
                    stack.push(b.clone());
                    stack.push(a);
                    stack.push(b);
                }
                Instruction::Rot => {
                    let c = pop(&mut stack, name);
                    let b = pop(&mut stack, name);
                    let a = pop(&mut stack, name);
                    stack.push(b);
                    stack.push(c);
                    stack.push(a);
                }
                Instruction::Reverse(n) => {
                    let n = usize::from(*n);
                    let len = stack.len();
                    assert!(n <= len, "reverse past the stack bottom in {name}");
                    stack[len - n..].reverse();
                }
                Instruction::Roll(n) => {
                    let n = usize::from(*n);
                    assert!(n < stack.len(), "roll past the stack bottom in {name}");
                    let i = stack.len() - 1 - n;
                    let v = stack.remove(i);
                    stack.push(v);
                }

                // === Slots ===
                Instruction::InitSlots {
                    locals: l,
                    params: p,
                } => {
                    assert_eq!(usize::from(*l), locals.len(), "local prologue of {name}");
                    assert_eq!(usize::from(*p), params.len(), "param prologue of {name}");
                }
                Instruction::LoadLocal(i) => {
                    self.counters.loads += 1;
                    stack.push(locals[usize::from(*i)].clone());
                }
                Instruction::StoreLocal(i) => {
                    self.counters.stores += 1;
                    locals[usize::from(*i)] = pop(&mut stack, name);
                }
                Instruction::LoadParam(i) => {
                    self.counters.loads += 1;
                    stack.push(params[usize::from(*i)].clone());
                }
                Instruction::StoreParam(i) => {
                    self.counters.stores += 1;
                    params[usize::from(*i)] = pop(&mut stack, name);
                }
                Instruction::LoadStatic(i) => {
                    self.counters.loads += 1;
                    stack.push(self.statics[usize::from(*i)].clone());
                }
                Instruction::StoreStatic(i) => {
                    self.counters.stores += 1;
                    self.statics[usize::from(*i)] = pop(&mut stack, name);
                }

                // === Arithmetic ===
                Instruction::Add => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a + b));
                }
                Instruction::Sub => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a - b));
                }
                Instruction::Mul => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a * b));
                }
                Instruction::Div => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    if b.is_zero() {
                        return Outcome::Trap("division by zero".into());
                    }
                    stack.push(Value::Int(a / b));
                }
                Instruction::Rem => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    if b.is_zero() {
                        return Outcome::Trap("division by zero".into());
                    }
                    stack.push(Value::Int(a % b));
                }
                Instruction::Pow => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    let Some(exp) = b.to_u32() else {
                        return Outcome::Trap("exponent out of range".into());
                    };
                    stack.push(Value::Int(a.pow(exp)));
                }
                Instruction::Neg => {
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(-a));
                }
                Instruction::Abs => {
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a.abs()));
                }
                Instruction::Sign => {
                    let a = pop_int(&mut stack, name);
                    let s = match a.sign() {
                        Sign::Minus => -1,
                        Sign::NoSign => 0,
                        Sign::Plus => 1,
                    };
                    stack.push(Value::int(s));
                }
                Instruction::Min => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a.min(b)));
                }
                Instruction::Max => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a.max(b)));
                }
                Instruction::Within => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    let x = pop_int(&mut stack, name);
                    stack.push(Value::Bool(a <= x && x < b));
                }

                // === Bitwise ===
                Instruction::Shl => {
                    let sh = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    let Some(sh) = sh.to_usize().filter(|&s| s <= 256) else {
                        return Outcome::Trap("shift out of range".into());
                    };
                    stack.push(Value::Int(a << sh));
                }
                Instruction::Shr => {
                    let sh = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    let Some(sh) = sh.to_usize().filter(|&s| s <= 256) else {
                        return Outcome::Trap("shift out of range".into());
                    };
                    stack.push(Value::Int(a >> sh));
                }
                Instruction::BitAnd => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a & b));
                }
                Instruction::BitOr => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a | b));
                }
                Instruction::BitXor => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(a ^ b));
                }
                Instruction::Invert => {
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Int(-(a + BigInt::from(1))));
                }

                // === Comparison and tests ===
                Instruction::Not => {
                    let v = pop(&mut stack, name);
                    stack.push(Value::Bool(!truthy(&v)));
                }
                Instruction::Equal => {
                    let b = pop(&mut stack, name);
                    let a = pop(&mut stack, name);
                    stack.push(Value::Bool(value_eq(&a, &b)));
                }
                Instruction::NotEqual => {
                    let b = pop(&mut stack, name);
                    let a = pop(&mut stack, name);
                    stack.push(Value::Bool(!value_eq(&a, &b)));
                }
                Instruction::Lt => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Bool(a < b));
                }
                Instruction::Le => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Bool(a <= b));
                }
                Instruction::Gt => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Bool(a > b));
                }
                Instruction::Ge => {
                    let b = pop_int(&mut stack, name);
                    let a = pop_int(&mut stack, name);
                    stack.push(Value::Bool(a >= b));
                }
                Instruction::IsNull => {
                    let v = pop(&mut stack, name);
                    stack.push(Value::Bool(matches!(v, Value::Null)));
                }
                Instruction::IsType(tag) => {
                    let v = pop(&mut stack, name);
                    let hit = matches!(
                        (tag, &v),
                        (TypeTag::Bool, Value::Bool(_))
                            | (TypeTag::Int, Value::Int(_))
                            | (TypeTag::Bytes, Value::Bytes(_))
                            | (TypeTag::Record, Value::Record(_))
                            | (TypeTag::Func, Value::Func(_))
                    );
                    stack.push(Value::Bool(hit));
                }

                // === Control ===
                Instruction::Jump(op) => pc = dest(at, op, name),
                Instruction::JumpIf(op) => {
                    let c = pop(&mut stack, name);
                    if truthy(&c) {
                        pc = dest(at, op, name);
                    }
                }
                Instruction::JumpIfNot(op) => {
                    let c = pop(&mut stack, name);
                    if !truthy(&c) {
                        pc = dest(at, op, name);
                    }
                }
                Instruction::Call(callee) => {
                    let target = program
                        .units
                        .get(callee.0 as usize)
                        .unwrap_or_else(|| panic!("call to missing unit {callee} in {name}"));
                    let mut call_args = Vec::with_capacity(usize::from(target.params));
                    for _ in 0..target.params {
                        call_args.push(pop(&mut stack, name));
                    }
                    call_args.reverse();
                    self.counters.calls += 1;
                    match self.run(*callee, call_args) {
                        Outcome::Ok(Some(v)) => stack.push(v),
                        Outcome::Ok(None) => {}
                        trap @ Outcome::Trap(_) => return trap,
                    }
                }
                Instruction::CallFunc => {
                    let callee = match pop(&mut stack, name) {
                        Value::Func(f) => f,
                        other => panic!("call through non-callable {other:?} in {name}"),
                    };
                    let target = program
                        .units
                        .get(callee.0 as usize)
                        .unwrap_or_else(|| panic!("call to missing unit {callee} in {name}"));
                    let mut call_args = Vec::with_capacity(usize::from(target.params));
                    for _ in 0..target.params {
                        call_args.push(pop(&mut stack, name));
                    }
                    call_args.reverse();
                    self.counters.calls += 1;
                    match self.run(callee, call_args) {
                        Outcome::Ok(Some(v)) => stack.push(v),
                        Outcome::Ok(None) => {}
                        trap @ Outcome::Trap(_) => return trap,
                    }
                }
                Instruction::Ret => {
                    let result = if unit.returns_value {
                        Some(pop(&mut stack, name))
                    } else {
                        None
                    };
                    assert!(
                        stack.is_empty(),
                        "unbalanced operand stack in {name}: {stack:?}"
                    );
                    return Outcome::Ok(result);
                }
                Instruction::Throw => {
                    let msg = pop(&mut stack, name);
                    return Outcome::Trap(match msg {
                        Value::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
                        other => format!("{other:?}"),
                    });
                }

                // === Compound values ===
                Instruction::NewRecord => stack.push(Value::record(Vec::new())),
                Instruction::Pack(n) => {
                    let mut items = Vec::with_capacity(usize::from(*n));
                    for _ in 0..*n {
                        items.push(pop(&mut stack, name));
                    }
                    items.reverse();
                    stack.push(Value::record(items));
                }
                Instruction::Append => {
                    let v = pop(&mut stack, name);
                    match pop(&mut stack, name) {
                        Value::Record(items) => items.borrow_mut().push(v),
                        other => panic!("append to {other:?} in {name}"),
                    }
                }
                Instruction::PickItem => {
                    let index = pop_int(&mut stack, name);
                    let receiver = pop(&mut stack, name);
                    let Some(i) = index.to_usize() else {
                        return Outcome::Trap("index out of range".into());
                    };
                    match receiver {
                        Value::Record(items) => {
                            let item = items.borrow().get(i).cloned();
                            match item {
                                Some(v) => stack.push(v),
                                None => return Outcome::Trap("index out of range".into()),
                            }
                        }
                        Value::Bytes(b) => match b.get(i) {
                            Some(&byte) => stack.push(Value::int(byte)),
                            None => return Outcome::Trap("index out of range".into()),
                        },
                        other => panic!("element read on {other:?} in {name}"),
                    }
                }
                Instruction::SetItem => {
                    let v = pop(&mut stack, name);
                    let index = pop_int(&mut stack, name);
                    match pop(&mut stack, name) {
                        Value::Record(items) => {
                            let Some(i) = index.to_usize() else {
                                return Outcome::Trap("index out of range".into());
                            };
                            let mut items = items.borrow_mut();
                            if i >= items.len() {
                                return Outcome::Trap("index out of range".into());
                            }
                            items[i] = v;
                        }
                        other => panic!("element write on {other:?} in {name}"),
                    }
                }
                Instruction::Size => {
                    let v = pop(&mut stack, name);
                    let n = match v {
                        Value::Record(items) => items.borrow().len(),
                        Value::Bytes(b) => b.len(),
                        other => panic!("size of {other:?} in {name}"),
                    };
                    stack.push(Value::int(n));
                }

                // === Byte strings ===
                Instruction::Cat => {
                    let b = pop_bytes(&mut stack, name);
                    let mut a = pop_bytes(&mut stack, name);
                    a.extend_from_slice(&b);
                    stack.push(Value::Bytes(a));
                }
                Instruction::SubStr => {
                    let len = pop_int(&mut stack, name);
                    let start = pop_int(&mut stack, name);
                    let s = pop_bytes(&mut stack, name);
                    let (Some(start), Some(len)) = (start.to_usize(), len.to_usize()) else {
                        return Outcome::Trap("substring out of range".into());
                    };
                    match start.checked_add(len) {
                        Some(end) if end <= s.len() => {
                            stack.push(Value::Bytes(s[start..end].to_vec()));
                        }
                        _ => return Outcome::Trap("substring out of range".into()),
                    }
                }
                Instruction::IntToBytes => {
                    let n = pop_int(&mut stack, name);
                    if n.sign() == Sign::Minus {
                        return Outcome::Trap("negative value has no unsigned encoding".into());
                    }
                    if n.is_zero() {
                        stack.push(Value::Bytes(Vec::new()));
                    } else {
                        stack.push(Value::Bytes(n.to_bytes_le().1));
                    }
                }
                Instruction::Itoa => {
                    let n = pop_int(&mut stack, name);
                    stack.push(Value::Bytes(n.to_string().into_bytes()));
                }
                Instruction::Atoi => {
                    let b = pop_bytes(&mut stack, name);
                    let parsed = std::str::from_utf8(&b)
                        .ok()
                        .and_then(|text| text.parse::<BigInt>().ok());
                    match parsed {
                        Some(n) => stack.push(Value::Int(n)),
                        None => return Outcome::Trap("invalid digits".into()),
                    }
                }
            }
        }
    }
}

fn pop(stack: &mut Vec<Value>, name: &str) -> Value {
    stack
        .pop()
        .unwrap_or_else(|| panic!("operand stack underflow in {name}"))
}

fn pop_int(stack: &mut Vec<Value>, name: &str) -> BigInt {
    match pop(stack, name) {
        Value::Int(n) => n,
        other => panic!("expected an integer in {name}, found {other:?}"),
    }
}

fn pop_bytes(stack: &mut Vec<Value>, name: &str) -> Vec<u8> {
    match pop(stack, name) {
        Value::Bytes(b) => b,
        other => panic!("expected a byte string in {name}, found {other:?}"),
    }
}

fn dest(at: usize, op: &JumpOperand, name: &str) -> usize {
    match op {
        JumpOperand::Offset(d) => usize::try_from(at as i64 + i64::from(*d))
            .unwrap_or_else(|_| panic!("jump before the start of {name}")),
        JumpOperand::Target(t) => {
            panic!("unresolved jump target {t} reached the evaluator in {name}")
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(n) => !n.is_zero(),
        Value::Bytes(b) => !b.is_empty(),
        Value::Record(_) | Value::Func(_) => true,
    }
}

/// Equality as the `Equal` instruction sees it: numeric for integers,
/// content for byte strings, identity for records.
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Record(x), Value::Record(y)) => Rc::ptr_eq(x, y),
        (Value::Func(x), Value::Func(y)) => x == y,
        _ => false,
    }
}

// =============================================================================
// Program builders
// =============================================================================

/// Declaring type shared by every built method.
pub fn contract() -> TypeDesc {
    TypeDesc::Object(Arc::new(TypeDef {
        name: "contract".into(),
        is_value: false,
        fields: vec![],
    }))
}

/// A declaring type with the given fields, for static-field tests.
pub fn contract_with(fields: Vec<FieldDef>) -> Arc<TypeDef> {
    Arc::new(TypeDef {
        name: "contract".into(),
        is_value: false,
        fields,
    })
}

pub fn static_field(def: &Arc<TypeDef>, name: &str, ty: TypeDesc) -> Arc<FieldSym> {
    Arc::new(FieldSym {
        name: name.into(),
        declaring: Arc::clone(def),
        is_static: true,
        ty,
    })
}

/// A static method on the shared contract type.
pub fn method(name: &str, params: Vec<Arc<VarSym>>, ret: TypeDesc, body: Vec<Stmt>) -> MethodDecl {
    let sym = MethodSym::new(
        contract(),
        name,
        true,
        params.iter().map(|p| p.ty.clone()).collect(),
        ret,
    );
    MethodDecl { sym, params, body }
}

/// A one-method program named `main`.
pub fn single_method(ret: TypeDesc, body: Vec<Stmt>) -> Program {
    Program::single(method("main", vec![], ret, body))
}

pub fn lower(program: &Program) -> Lowered {
    lower_program(program, Options::default()).expect("lowering failed")
}

pub fn lower_checked(program: &Program) -> Lowered {
    lower_program(program, Options {
        default_checked: true,
    })
    .expect("lowering failed")
}

/// Run unit 0 with no arguments.
pub fn eval_main(lowered: &Lowered) -> Outcome {
    Evaluator::new(lowered).run(UnitId(0), vec![])
}

// =============================================================================
// Expression builders
// =============================================================================

pub fn var(id: u32, name: &str, ty: TypeDesc) -> Arc<VarSym> {
    VarSym::new(id, name, ty)
}

pub fn local_ref(sym: &Arc<VarSym>) -> Expr {
    Expr::new(ExprKind::Ident(SymbolRef::Local(Arc::clone(sym))), sym.ty.clone())
}

pub fn param_ref(sym: &Arc<VarSym>) -> Expr {
    Expr::new(ExprKind::Ident(SymbolRef::Param(Arc::clone(sym))), sym.ty.clone())
}

pub fn field_ref(field: &Arc<FieldSym>) -> Expr {
    Expr::new(ExprKind::Ident(SymbolRef::Field(Arc::clone(field))), field.ty.clone())
}

pub fn int_lit(v: i64) -> Expr {
    Expr::literal(Const::int(v), TypeDesc::BigInt)
}

pub fn sized_lit(v: i64, kind: IntKind) -> Expr {
    Expr::literal(Const::int(v), TypeDesc::Int(kind))
}

pub fn big_lit(v: BigInt) -> Expr {
    Expr::literal(Const::Int(v), TypeDesc::BigInt)
}

pub fn str_lit(s: &str) -> Expr {
    Expr::literal(Const::Str(s.into()), TypeDesc::Str)
}

pub fn bool_lit(b: bool) -> Expr {
    Expr::literal(Const::Bool(b), TypeDesc::Bool)
}

pub fn null_lit(ty: TypeDesc) -> Expr {
    Expr::literal(Const::Null, ty)
}

pub fn decl(sym: &Arc<VarSym>, init: Expr) -> Stmt {
    Stmt::Local {
        sym: Arc::clone(sym),
        init: Some(init),
        span: Span::dummy(),
    }
}

pub fn expr_stmt(e: Expr) -> Stmt {
    Stmt::Expr(e)
}

pub fn ret(e: Expr) -> Stmt {
    Stmt::Return {
        value: Some(e),
        span: Span::dummy(),
    }
}

pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, ty: TypeDesc) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        ty,
    )
}

pub fn unary(op: stele_ast::UnOp, operand: Expr, ty: TypeDesc) -> Expr {
    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
    )
}

/// A `checked(...)` / `unchecked(...)` wrapper around `body`.
pub fn checked_expr(checked: bool, body: Expr) -> Expr {
    let ty = body.ty.clone();
    Expr::new(
        ExprKind::Checked {
            checked,
            body: Box::new(body),
        },
        ty,
    )
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    let ty = target.ty.clone();
    Expr::new(
        ExprKind::Assign {
            target: Box::new(target),
            value: Box::new(value),
        },
        ty,
    )
}

pub fn compound(op: BinOp, target: Expr, value: Expr) -> Expr {
    let ty = target.ty.clone();
    Expr::new(
        ExprKind::CompoundAssign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        },
        ty,
    )
}

pub fn coalesce_assign(target: Expr, value: Expr) -> Expr {
    let ty = target.ty.clone();
    Expr::new(
        ExprKind::CoalesceAssign {
            target: Box::new(target),
            value: Box::new(value),
        },
        ty,
    )
}

pub fn incdec(op: stele_ast::IncDecOp, target: Expr, postfix: bool) -> Expr {
    let ty = target.ty.clone();
    Expr::new(
        ExprKind::IncDec {
            op,
            target: Box::new(target),
            postfix,
        },
        ty,
    )
}

pub fn conditional(cond: Expr, then_arm: Expr, else_arm: Expr) -> Expr {
    let ty = then_arm.ty.clone();
    Expr::new(
        ExprKind::Conditional {
            cond: Box::new(cond),
            then_arm: Box::new(then_arm),
            else_arm: Box::new(else_arm),
        },
        ty,
    )
}

/// `receiver[index]`, typed as the element type.
pub fn index(receiver: Expr, idx: Expr, ty: TypeDesc) -> Expr {
    Expr::new(
        ExprKind::Index {
            receiver: Box::new(receiver),
            indices: vec![idx],
            null_conditional: false,
        },
        ty,
    )
}

pub fn array_lit(elements: Vec<Expr>, elem_ty: TypeDesc) -> Expr {
    let ty = TypeDesc::Array(Box::new(elem_ty));
    Expr::new(ExprKind::ArrayLit { elements }, ty)
}

pub fn cast(operand: Expr, to: TypeDesc) -> Expr {
    Expr::new(
        ExprKind::Cast {
            operand: Box::new(operand),
        },
        to,
    )
}

/// A call expression; pass a receiver for instance methods.
pub fn call(sym: &Arc<MethodSym>, receiver: Option<Expr>, args: Vec<Expr>) -> Expr {
    Expr::new(
        ExprKind::Call {
            method: Arc::clone(sym),
            receiver: receiver.map(Box::new),
            args,
            null_conditional: false,
        },
        sym.ret.clone(),
    )
}

pub fn static_sym(
    declaring: TypeDesc,
    name: &str,
    params: Vec<TypeDesc>,
    ret: TypeDesc,
) -> Arc<MethodSym> {
    MethodSym::new(declaring, name, true, params, ret)
}

pub fn instance_sym(
    declaring: TypeDesc,
    name: &str,
    params: Vec<TypeDesc>,
    ret: TypeDesc,
) -> Arc<MethodSym> {
    MethodSym::new(declaring, name, false, params, ret)
}

// =============================================================================
// Fixtures and references
// =============================================================================

/// Two-member enum used by the reflective-operation tests.
pub fn direction_enum() -> Arc<EnumDef> {
    Arc::new(EnumDef {
        name: "direction".into(),
        underlying: IntKind::I32,
        members: vec![
            EnumMember {
                name: "A".into(),
                value: BigInt::from(0),
            },
            EnumMember {
                name: "B".into(),
                value: BigInt::from(1),
            },
        ],
    })
}

/// Reference two's-complement wraparound of `value` into `kind`'s range.
pub fn wrap_reference(value: i128, kind: IntKind) -> i128 {
    (value - kind.min_value()).rem_euclid(kind.modulus()) + kind.min_value()
}
