//! Operator semantics observed through execution.
//!
//! The side-effect properties use helper methods that write a static field
//! when they run, so "the right operand never executed" is visible in the
//! static storage and the call counter, not inferred from instruction
//! shapes. Coverage:
//! - `&&` / `||` short-circuit evaluation
//! - compound assignment: single target load, single receiver evaluation
//! - `??=` value skipping
//! - string `+` stringification of the non-string side
//! - conditional and increment/decrement value semantics

mod common;

use common::*;
use num_bigint::BigInt;
use std::sync::Arc;
use stele_ast::{BinOp, FieldDef, IncDecOp, IntKind, Program, TypeDesc, UnOp};
use stele_compiler::bytecode::UnitId;

/// Two flag methods that record having run by writing a static field.
/// Declaration order is `main`, `run_a`, `run_b`, so after execution the
/// statics are `[a_ran, b_ran]`.
fn flag_program(main_value: stele_ast::Expr, a_result: bool, b_result: bool) -> Program {
    let def = contract_with(vec![
        FieldDef {
            name: "a_ran".into(),
            ty: TypeDesc::BigInt,
            is_static: true,
        },
        FieldDef {
            name: "b_ran".into(),
            ty: TypeDesc::BigInt,
            is_static: true,
        },
    ]);
    let a_field = static_field(&def, "a_ran", TypeDesc::BigInt);
    let b_field = static_field(&def, "b_ran", TypeDesc::BigInt);
    let run_a = method(
        "run_a",
        vec![],
        TypeDesc::Bool,
        vec![
            expr_stmt(assign(field_ref(&a_field), int_lit(1))),
            ret(bool_lit(a_result)),
        ],
    );
    let run_b = method(
        "run_b",
        vec![],
        TypeDesc::Bool,
        vec![
            expr_stmt(assign(field_ref(&b_field), int_lit(1))),
            ret(bool_lit(b_result)),
        ],
    );
    let main = method("main", vec![], TypeDesc::Bool, vec![ret(main_value)]);
    Program {
        methods: vec![main, run_a, run_b],
    }
}

fn flag_call(name: &str) -> stele_ast::Expr {
    let sym = static_sym(contract(), name, vec![], TypeDesc::Bool);
    call(&sym, None, vec![])
}

#[test]
fn test_and_also_skips_rhs_when_lhs_false() {
    let cond = binary(
        BinOp::AndAlso,
        flag_call("run_a"),
        flag_call("run_b"),
        TypeDesc::Bool,
    );
    let lowered = lower(&flag_program(cond, false, true));
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.value(), Value::Bool(false));
    assert_eq!(ev.counters.calls, 1);
    assert_eq!(ev.statics[0], Value::int(1));
    assert_eq!(ev.statics[1], Value::Null);
}

#[test]
fn test_and_also_runs_rhs_when_lhs_true() {
    let cond = binary(
        BinOp::AndAlso,
        flag_call("run_a"),
        flag_call("run_b"),
        TypeDesc::Bool,
    );
    let lowered = lower(&flag_program(cond, true, false));
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.value(), Value::Bool(false));
    assert_eq!(ev.counters.calls, 2);
    assert_eq!(ev.statics[0], Value::int(1));
    assert_eq!(ev.statics[1], Value::int(1));
}

#[test]
fn test_or_else_skips_rhs_when_lhs_true() {
    let cond = binary(
        BinOp::OrElse,
        flag_call("run_a"),
        flag_call("run_b"),
        TypeDesc::Bool,
    );
    let lowered = lower(&flag_program(cond, true, false));
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.value(), Value::Bool(true));
    assert_eq!(ev.counters.calls, 1);
    assert_eq!(ev.statics[1], Value::Null);
}

#[test]
fn test_or_else_runs_rhs_when_lhs_false() {
    let cond = binary(
        BinOp::OrElse,
        flag_call("run_a"),
        flag_call("run_b"),
        TypeDesc::Bool,
    );
    let lowered = lower(&flag_program(cond, false, true));
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.value(), Value::Bool(true));
    assert_eq!(ev.counters.calls, 2);
    assert_eq!(ev.statics[1], Value::int(1));
}

#[test]
fn test_compound_assign_single_load_of_target() {
    let a = var(1, "a", TypeDesc::Int(IntKind::I32));
    let program = single_method(
        TypeDesc::Int(IntKind::I32),
        vec![
            decl(&a, sized_lit(5, IntKind::I32)),
            expr_stmt(compound(
                BinOp::Add,
                local_ref(&a),
                sized_lit(9, IntKind::I32),
            )),
            ret(local_ref(&a)),
        ],
    );
    let lowered = lower(&program);
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.int(), BigInt::from(14));
    // One load inside the `+=`, one for the return read; the declaration
    // stores and the compound stores.
    assert_eq!(ev.counters.loads, 2);
    assert_eq!(ev.counters.stores, 2);
}

#[test]
fn test_compound_assign_evaluates_receiver_once() {
    let make = method(
        "make",
        vec![],
        TypeDesc::Array(Box::new(TypeDesc::BigInt)),
        vec![ret(array_lit(vec![int_lit(10)], TypeDesc::BigInt))],
    );
    let make_sym = Arc::clone(&make.sym);
    let target = index(call(&make_sym, None, vec![]), int_lit(0), TypeDesc::BigInt);
    let main = method(
        "main",
        vec![],
        TypeDesc::BigInt,
        vec![
            expr_stmt(compound(BinOp::Add, target, int_lit(5))),
            ret(int_lit(0)),
        ],
    );
    let lowered = lower(&Program {
        methods: vec![main, make],
    });
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.int(), BigInt::from(0));
    assert_eq!(ev.counters.calls, 1);
}

#[test]
fn test_coalesce_assign_skips_value_when_non_null() {
    let def = contract_with(vec![FieldDef {
        name: "side_ran".into(),
        ty: TypeDesc::BigInt,
        is_static: true,
    }]);
    let side_field = static_field(&def, "side_ran", TypeDesc::BigInt);
    let side = method(
        "side",
        vec![],
        TypeDesc::BigInt,
        vec![
            expr_stmt(assign(field_ref(&side_field), int_lit(1))),
            ret(int_lit(7)),
        ],
    );
    let side_sym = Arc::clone(&side.sym);
    let nullable_int = TypeDesc::Nullable(Box::new(TypeDesc::BigInt));
    let x = var(1, "x", nullable_int.clone());
    let main = method(
        "main",
        vec![],
        nullable_int.clone(),
        vec![
            decl(&x, stele_ast::Expr::literal(stele_core::Const::int(5), nullable_int)),
            expr_stmt(coalesce_assign(local_ref(&x), call(&side_sym, None, vec![]))),
            ret(local_ref(&x)),
        ],
    );
    let lowered = lower(&Program {
        methods: vec![main, side],
    });
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.value(), Value::int(5));
    assert_eq!(ev.counters.calls, 0);
    assert_eq!(ev.statics[0], Value::Null);
}

#[test]
fn test_coalesce_assign_assigns_when_null() {
    let nullable_int = TypeDesc::Nullable(Box::new(TypeDesc::BigInt));
    let x = var(1, "x", nullable_int.clone());
    let program = single_method(
        nullable_int.clone(),
        vec![
            decl(&x, null_lit(nullable_int)),
            expr_stmt(coalesce_assign(local_ref(&x), int_lit(7))),
            ret(local_ref(&x)),
        ],
    );
    let lowered = lower(&program);
    assert_eq!(eval_main(&lowered).value(), Value::int(7));
}

#[test]
fn test_string_plus_number_stringifies() {
    let program = single_method(
        TypeDesc::Str,
        vec![ret(binary(
            BinOp::Add,
            str_lit("a"),
            int_lit(1),
            TypeDesc::Str,
        ))],
    );
    let lowered = lower(&program);
    assert_eq!(eval_main(&lowered).bytes(), b"a1".to_vec());
}

#[test]
fn test_string_plus_bool_stringifies() {
    let program = single_method(
        TypeDesc::Str,
        vec![ret(binary(
            BinOp::Add,
            str_lit("v="),
            bool_lit(true),
            TypeDesc::Str,
        ))],
    );
    let lowered = lower(&program);
    assert_eq!(eval_main(&lowered).bytes(), b"v=true".to_vec());
}

#[test]
fn test_conditional_evaluates_single_arm() {
    let def = contract_with(vec![
        FieldDef {
            name: "a_ran".into(),
            ty: TypeDesc::BigInt,
            is_static: true,
        },
        FieldDef {
            name: "b_ran".into(),
            ty: TypeDesc::BigInt,
            is_static: true,
        },
    ]);
    let a_field = static_field(&def, "a_ran", TypeDesc::BigInt);
    let b_field = static_field(&def, "b_ran", TypeDesc::BigInt);
    let pick_a = method(
        "pick_a",
        vec![],
        TypeDesc::BigInt,
        vec![
            expr_stmt(assign(field_ref(&a_field), int_lit(1))),
            ret(int_lit(10)),
        ],
    );
    let pick_b = method(
        "pick_b",
        vec![],
        TypeDesc::BigInt,
        vec![
            expr_stmt(assign(field_ref(&b_field), int_lit(1))),
            ret(int_lit(20)),
        ],
    );
    let a_sym = Arc::clone(&pick_a.sym);
    let b_sym = Arc::clone(&pick_b.sym);
    let main = method(
        "main",
        vec![],
        TypeDesc::BigInt,
        vec![ret(conditional(
            bool_lit(false),
            call(&a_sym, None, vec![]),
            call(&b_sym, None, vec![]),
        ))],
    );
    let lowered = lower(&Program {
        methods: vec![main, pick_a, pick_b],
    });
    let mut ev = Evaluator::new(&lowered);
    let out = ev.run(UnitId(0), vec![]);
    assert_eq!(out.int(), BigInt::from(20));
    assert_eq!(ev.counters.calls, 1);
    assert_eq!(ev.statics[0], Value::Null);
    assert_eq!(ev.statics[1], Value::int(1));
}

#[test]
fn test_postfix_increment_yields_prior_value() {
    let i32_ty = TypeDesc::Int(IntKind::I32);
    let a = var(1, "a", i32_ty.clone());
    let b = var(2, "b", i32_ty.clone());
    let program = single_method(
        i32_ty.clone(),
        vec![
            decl(&a, sized_lit(5, IntKind::I32)),
            decl(&b, incdec(IncDecOp::Inc, local_ref(&a), true)),
            ret(binary(
                BinOp::Add,
                binary(
                    BinOp::Mul,
                    local_ref(&a),
                    sized_lit(100, IntKind::I32),
                    i32_ty.clone(),
                ),
                local_ref(&b),
                i32_ty,
            )),
        ],
    );
    let lowered = lower(&program);
    assert_eq!(eval_main(&lowered).int(), BigInt::from(605));
}

#[test]
fn test_prefix_increment_yields_new_value() {
    let i32_ty = TypeDesc::Int(IntKind::I32);
    let a = var(1, "a", i32_ty.clone());
    let b = var(2, "b", i32_ty.clone());
    let program = single_method(
        i32_ty.clone(),
        vec![
            decl(&a, sized_lit(5, IntKind::I32)),
            decl(&b, incdec(IncDecOp::Inc, local_ref(&a), false)),
            ret(local_ref(&b)),
        ],
    );
    let lowered = lower(&program);
    assert_eq!(eval_main(&lowered).int(), BigInt::from(6));
}

#[test]
fn test_null_comparison_observes_is_null() {
    let nullable_str = TypeDesc::Nullable(Box::new(TypeDesc::Str));
    let s = var(1, "s", nullable_str.clone());
    let program = single_method(
        TypeDesc::Bool,
        vec![
            decl(&s, null_lit(nullable_str.clone())),
            ret(binary(
                BinOp::Eq,
                local_ref(&s),
                null_lit(nullable_str),
                TypeDesc::Bool,
            )),
        ],
    );
    let lowered = lower(&program);
    assert_eq!(eval_main(&lowered).value(), Value::Bool(true));
}

#[test]
fn test_coalesce_operator_picks_non_null_side() {
    let nullable_str = TypeDesc::Nullable(Box::new(TypeDesc::Str));
    let s = var(1, "s", nullable_str.clone());
    let program = single_method(
        TypeDesc::Str,
        vec![
            decl(&s, null_lit(nullable_str)),
            ret(binary(
                BinOp::Coalesce,
                local_ref(&s),
                str_lit("fallback"),
                TypeDesc::Str,
            )),
        ],
    );
    let lowered = lower(&program);
    assert_eq!(eval_main(&lowered).bytes(), b"fallback".to_vec());
}

#[test]
fn test_bitwise_complement_value() {
    let program = single_method(
        TypeDesc::BigInt,
        vec![ret(unary(UnOp::BitNot, int_lit(5), TypeDesc::BigInt))],
    );
    assert_eq!(eval_main(&lower(&program)).int(), BigInt::from(-6));

    let program = single_method(
        TypeDesc::BigInt,
        vec![ret(unary(UnOp::BitNot, int_lit(-1), TypeDesc::BigInt))],
    );
    assert_eq!(eval_main(&lower(&program)).int(), BigInt::from(0));
}
