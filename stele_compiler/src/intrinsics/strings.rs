//! String, char, and collection handlers.
//!
//! The VM gives byte strings four primitives: length, concatenation,
//! absolute substring, and byte reads through the element accessor.
//! Everything else here (search, trim, case mapping, replace) is emitted
//! as an explicit index walk over those primitives, with loop state held
//! in scratch locals of the calling unit.
//!
//! `char` values are integers holding a code point. Converting one to its
//! string form means UTF-8 encoding it at runtime, branch by branch, since
//! the encoding is not a VM primitive.

use std::sync::Arc;

use num_bigint::BigInt;
use stele_ast::MethodSym;
use stele_core::Span;

use super::{Intrinsic, Table};
use crate::bytecode::Instruction;
use crate::error::CompileResult;
use crate::method::MethodLowering;

pub(super) fn register(table: &mut Table) {
    table.insert("string.length/0".into(), Intrinsic::first(length));
    table.insert("string.substring/1".into(), Intrinsic::first(substring_from));
    table.insert("string.substring/2".into(), Intrinsic::first(substring_len));
    table.insert("string.concat/2".into(), Intrinsic::first(concat));
    table.insert("string.contains/1".into(), Intrinsic::first(contains));
    table.insert("string.index_of/1".into(), Intrinsic::first(index_of));
    table.insert("string.starts_with/1".into(), Intrinsic::first(starts_with));
    table.insert("string.ends_with/1".into(), Intrinsic::first(ends_with));
    table.insert("string.trim/0".into(), Intrinsic::first(trim));
    table.insert("string.to_upper/0".into(), Intrinsic::first(to_upper));
    table.insert("string.to_lower/0".into(), Intrinsic::first(to_lower));
    table.insert("string.replace/2".into(), Intrinsic::first(replace));
    table.insert(
        "string.is_null_or_empty/1".into(),
        Intrinsic::first(is_null_or_empty),
    );
    table.insert("string.to_bytes/0".into(), Intrinsic::first(reinterpret));

    table.insert("bytes.length/0".into(), Intrinsic::first(length));
    table.insert("bytes.to_string/0".into(), Intrinsic::first(reinterpret));

    table.insert("array.length/0".into(), Intrinsic::first(length));
    table.insert("array.append/1".into(), Intrinsic::first(append));

    table.insert("char.to_string/0".into(), Intrinsic::first(char_to_string));
    table.insert("char.is_digit/0".into(), Intrinsic::first(char_is_digit));
    table.insert("char.is_letter/0".into(), Intrinsic::first(char_is_letter));
    table.insert(
        "char.is_white_space/0".into(),
        Intrinsic::first(char_is_white_space),
    );
    table.insert("char.to_upper/0".into(), Intrinsic::first(char_to_upper));
    table.insert("char.to_lower/0".into(), Intrinsic::first(char_to_lower));
}

// =============================================================================
// Single-opcode rows
// =============================================================================

fn length(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Size);
    Ok(())
}

fn concat(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Cat);
    Ok(())
}

/// `( arr v -- )` in-place element append.
fn append(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, _span: Span) -> CompileResult<()> {
    m.emit(Instruction::Append);
    Ok(())
}

/// Strings and raw byte strings share a representation; the conversion is
/// free.
fn reinterpret(
    _m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    Ok(())
}

/// `( s start -- sub )` suffix from an absolute offset.
fn substring_from(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    m.emit(Instruction::Over);
    m.emit(Instruction::Size);
    m.emit(Instruction::Over);
    m.emit(Instruction::Sub);
    m.emit(Instruction::SubStr);
    Ok(())
}

/// `( s start len -- sub )`
fn substring_len(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    m.emit(Instruction::SubStr);
    Ok(())
}

/// `( s -- b )` null or zero-length.
fn is_null_or_empty(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let null_case = m.buf.create_target();
    let end = m.buf.create_target();
    m.emit(Instruction::Dup);
    m.emit(Instruction::IsNull);
    m.buf.jump_if(null_case);
    m.emit(Instruction::Size);
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::Equal);
    m.buf.jump(end);
    m.buf.bind(null_case);
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushBool(true));
    m.buf.bind(end);
    Ok(())
}

// =============================================================================
// Search
// =============================================================================

/// `( s needle -- index )` first match offset or `-1`. One comparison per
/// candidate position through the substring primitive.
fn emit_search(m: &mut MethodLowering<'_>, span: Span) -> CompileResult<()> {
    let s = m.frame.alloc_scratch(span)?;
    let needle = m.frame.alloc_scratch(span)?;
    let nlen = m.frame.alloc_scratch(span)?;
    let limit = m.frame.alloc_scratch(span)?;
    let i = m.frame.alloc_scratch(span)?;
    let head = m.buf.create_target();
    let hit = m.buf.create_target();
    let miss = m.buf.create_target();
    let end = m.buf.create_target();

    m.emit(Instruction::StoreLocal(needle));
    m.emit(Instruction::LoadLocal(needle));
    m.emit(Instruction::Size);
    m.emit(Instruction::StoreLocal(nlen));
    m.emit(Instruction::Dup);
    m.emit(Instruction::Size);
    m.emit(Instruction::LoadLocal(nlen));
    m.emit(Instruction::Sub);
    m.emit(Instruction::StoreLocal(limit));
    m.emit(Instruction::StoreLocal(s));
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::StoreLocal(i));

    m.buf.bind(head);
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::LoadLocal(limit));
    m.emit(Instruction::Gt);
    m.buf.jump_if(miss);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::LoadLocal(nlen));
    m.emit(Instruction::SubStr);
    m.emit(Instruction::LoadLocal(needle));
    m.emit(Instruction::Equal);
    m.buf.jump_if(hit);
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Add);
    m.emit(Instruction::StoreLocal(i));
    m.buf.jump(head);

    m.buf.bind(miss);
    m.emit(Instruction::PushInt(BigInt::from(-1)));
    m.buf.jump(end);
    m.buf.bind(hit);
    m.emit(Instruction::LoadLocal(i));
    m.buf.bind(end);
    Ok(())
}

fn index_of(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    emit_search(m, span)
}

fn contains(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    emit_search(m, span)?;
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::Ge);
    Ok(())
}

// =============================================================================
// Prefix and suffix
// =============================================================================

/// `( s p -- b )` prefix test: length guard, then one substring compare.
fn starts_with(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    span: Span,
) -> CompileResult<()> {
    let (s, p, slen, plen) = emit_affix_operands(m, span)?;
    let no = m.buf.create_target();
    let end = m.buf.create_target();
    m.emit(Instruction::LoadLocal(plen));
    m.emit(Instruction::LoadLocal(slen));
    m.emit(Instruction::Gt);
    m.buf.jump_if(no);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::LoadLocal(plen));
    m.emit(Instruction::SubStr);
    m.emit(Instruction::LoadLocal(p));
    m.emit(Instruction::Equal);
    m.buf.jump(end);
    m.buf.bind(no);
    m.emit(Instruction::PushBool(false));
    m.buf.bind(end);
    Ok(())
}

/// `( s p -- b )` suffix test.
fn ends_with(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    span: Span,
) -> CompileResult<()> {
    let (s, p, slen, plen) = emit_affix_operands(m, span)?;
    let no = m.buf.create_target();
    let end = m.buf.create_target();
    m.emit(Instruction::LoadLocal(plen));
    m.emit(Instruction::LoadLocal(slen));
    m.emit(Instruction::Gt);
    m.buf.jump_if(no);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(slen));
    m.emit(Instruction::LoadLocal(plen));
    m.emit(Instruction::Sub);
    m.emit(Instruction::LoadLocal(plen));
    m.emit(Instruction::SubStr);
    m.emit(Instruction::LoadLocal(p));
    m.emit(Instruction::Equal);
    m.buf.jump(end);
    m.buf.bind(no);
    m.emit(Instruction::PushBool(false));
    m.buf.bind(end);
    Ok(())
}

/// Spill `( s p )` and both lengths into scratch slots.
fn emit_affix_operands(
    m: &mut MethodLowering<'_>,
    span: Span,
) -> CompileResult<(u8, u8, u8, u8)> {
    let s = m.frame.alloc_scratch(span)?;
    let p = m.frame.alloc_scratch(span)?;
    let slen = m.frame.alloc_scratch(span)?;
    let plen = m.frame.alloc_scratch(span)?;
    m.emit(Instruction::StoreLocal(p));
    m.emit(Instruction::Dup);
    m.emit(Instruction::Size);
    m.emit(Instruction::StoreLocal(slen));
    m.emit(Instruction::StoreLocal(s));
    m.emit(Instruction::LoadLocal(p));
    m.emit(Instruction::Size);
    m.emit(Instruction::StoreLocal(plen));
    Ok((s, p, slen, plen))
}

// =============================================================================
// Trim
// =============================================================================

/// `( s -- trimmed )` walk both ends past whitespace, then one substring.
fn trim(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    let s = m.frame.alloc_scratch(span)?;
    let lo = m.frame.alloc_scratch(span)?;
    let hi = m.frame.alloc_scratch(span)?;
    let head = m.buf.create_target();
    let tail = m.buf.create_target();
    let done = m.buf.create_target();

    m.emit(Instruction::Dup);
    m.emit(Instruction::Size);
    m.emit(Instruction::StoreLocal(hi));
    m.emit(Instruction::StoreLocal(s));
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::StoreLocal(lo));

    m.buf.bind(head);
    m.emit(Instruction::LoadLocal(lo));
    m.emit(Instruction::LoadLocal(hi));
    m.emit(Instruction::Lt);
    m.buf.jump_if_not(tail);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(lo));
    m.emit(Instruction::PickItem);
    emit_is_space(m);
    m.buf.jump_if_not(tail);
    m.emit(Instruction::LoadLocal(lo));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Add);
    m.emit(Instruction::StoreLocal(lo));
    m.buf.jump(head);

    m.buf.bind(tail);
    m.emit(Instruction::LoadLocal(hi));
    m.emit(Instruction::LoadLocal(lo));
    m.emit(Instruction::Gt);
    m.buf.jump_if_not(done);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(hi));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Sub);
    m.emit(Instruction::PickItem);
    emit_is_space(m);
    m.buf.jump_if_not(done);
    m.emit(Instruction::LoadLocal(hi));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Sub);
    m.emit(Instruction::StoreLocal(hi));
    m.buf.jump(tail);

    m.buf.bind(done);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(lo));
    m.emit(Instruction::LoadLocal(hi));
    m.emit(Instruction::LoadLocal(lo));
    m.emit(Instruction::Sub);
    m.emit(Instruction::SubStr);
    Ok(())
}

/// `( b -- bool )` ASCII whitespace: HT..CR or space.
fn emit_is_space(m: &mut MethodLowering<'_>) {
    let ws = m.buf.create_target();
    let after = m.buf.create_target();
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(9)));
    m.emit(Instruction::PushInt(BigInt::from(14)));
    m.emit(Instruction::Within);
    m.buf.jump_if(ws);
    m.emit(Instruction::PushInt(BigInt::from(32)));
    m.emit(Instruction::Equal);
    m.buf.jump(after);
    m.buf.bind(ws);
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushBool(true));
    m.buf.bind(after);
}

// =============================================================================
// Case mapping
// =============================================================================

fn to_upper(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    emit_case_map(m, span, 97, 123, Instruction::Sub)
}

fn to_lower(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    emit_case_map(m, span, 65, 91, Instruction::Add)
}

/// `( s -- mapped )` rebuild the string byte by byte, shifting bytes in
/// `[from_lo, from_hi)` by 32 and passing everything else through as a
/// one-byte substring, which keeps multi-byte sequences intact.
fn emit_case_map(
    m: &mut MethodLowering<'_>,
    span: Span,
    from_lo: u8,
    from_hi: u8,
    shift: Instruction,
) -> CompileResult<()> {
    let s = m.frame.alloc_scratch(span)?;
    let len = m.frame.alloc_scratch(span)?;
    let out = m.frame.alloc_scratch(span)?;
    let i = m.frame.alloc_scratch(span)?;
    let head = m.buf.create_target();
    let keep = m.buf.create_target();
    let append = m.buf.create_target();
    let done = m.buf.create_target();

    m.emit(Instruction::Dup);
    m.emit(Instruction::Size);
    m.emit(Instruction::StoreLocal(len));
    m.emit(Instruction::StoreLocal(s));
    m.emit(Instruction::PushBytes(Vec::new()));
    m.emit(Instruction::StoreLocal(out));
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::StoreLocal(i));

    m.buf.bind(head);
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::LoadLocal(len));
    m.emit(Instruction::Lt);
    m.buf.jump_if_not(done);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::PickItem);
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(from_lo)));
    m.emit(Instruction::PushInt(BigInt::from(from_hi)));
    m.emit(Instruction::Within);
    m.buf.jump_if_not(keep);
    m.emit(Instruction::PushInt(BigInt::from(32)));
    m.emit(shift);
    m.emit(Instruction::IntToBytes);
    m.buf.jump(append);
    m.buf.bind(keep);
    m.emit(Instruction::Drop);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::SubStr);
    m.buf.bind(append);
    m.emit(Instruction::LoadLocal(out));
    m.emit(Instruction::Swap);
    m.emit(Instruction::Cat);
    m.emit(Instruction::StoreLocal(out));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Add);
    m.emit(Instruction::StoreLocal(i));
    m.buf.jump(head);

    m.buf.bind(done);
    m.emit(Instruction::LoadLocal(out));
    Ok(())
}

// =============================================================================
// Replace
// =============================================================================

/// `( s old new -- replaced )` builder walk: on a match append `new` and
/// skip `old`'s length, otherwise copy one byte. An empty pattern never
/// advances, so it faults instead.
fn replace(m: &mut MethodLowering<'_>, _method: &Arc<MethodSym>, span: Span) -> CompileResult<()> {
    let s = m.frame.alloc_scratch(span)?;
    let old = m.frame.alloc_scratch(span)?;
    let new = m.frame.alloc_scratch(span)?;
    let slen = m.frame.alloc_scratch(span)?;
    let olen = m.frame.alloc_scratch(span)?;
    let out = m.frame.alloc_scratch(span)?;
    let i = m.frame.alloc_scratch(span)?;
    let nonempty = m.buf.create_target();
    let head = m.buf.create_target();
    let copy = m.buf.create_target();
    let tail = m.buf.create_target();

    m.emit(Instruction::StoreLocal(new));
    m.emit(Instruction::StoreLocal(old));
    m.emit(Instruction::Dup);
    m.emit(Instruction::Size);
    m.emit(Instruction::StoreLocal(slen));
    m.emit(Instruction::StoreLocal(s));
    m.emit(Instruction::LoadLocal(old));
    m.emit(Instruction::Size);
    m.emit(Instruction::StoreLocal(olen));
    m.emit(Instruction::LoadLocal(olen));
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::Equal);
    m.buf.jump_if_not(nonempty);
    m.emit(Instruction::PushBytes(b"replace of an empty string".to_vec()));
    m.emit(Instruction::Throw);
    m.buf.bind(nonempty);
    m.emit(Instruction::PushBytes(Vec::new()));
    m.emit(Instruction::StoreLocal(out));
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::StoreLocal(i));

    m.buf.bind(head);
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::LoadLocal(slen));
    m.emit(Instruction::LoadLocal(olen));
    m.emit(Instruction::Sub);
    m.emit(Instruction::Gt);
    m.buf.jump_if(tail);
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::LoadLocal(olen));
    m.emit(Instruction::SubStr);
    m.emit(Instruction::LoadLocal(old));
    m.emit(Instruction::Equal);
    m.buf.jump_if_not(copy);
    m.emit(Instruction::LoadLocal(out));
    m.emit(Instruction::LoadLocal(new));
    m.emit(Instruction::Cat);
    m.emit(Instruction::StoreLocal(out));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::LoadLocal(olen));
    m.emit(Instruction::Add);
    m.emit(Instruction::StoreLocal(i));
    m.buf.jump(head);
    m.buf.bind(copy);
    m.emit(Instruction::LoadLocal(out));
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::SubStr);
    m.emit(Instruction::Cat);
    m.emit(Instruction::StoreLocal(out));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::PushInt(BigInt::from(1)));
    m.emit(Instruction::Add);
    m.emit(Instruction::StoreLocal(i));
    m.buf.jump(head);

    m.buf.bind(tail);
    m.emit(Instruction::LoadLocal(out));
    m.emit(Instruction::LoadLocal(s));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::LoadLocal(slen));
    m.emit(Instruction::LoadLocal(i));
    m.emit(Instruction::Sub);
    m.emit(Instruction::SubStr);
    m.emit(Instruction::Cat);
    Ok(())
}

// =============================================================================
// Char
// =============================================================================

/// `( c -- s )` UTF-8 encode a code point (one to three bytes; the char
/// kind is sixteen bits wide).
///
/// The minimal-encoding primitive cannot produce a lone NUL byte, so zero
/// is special-cased; every other branch produces bytes in `1..=255`,
/// which encode to exactly one byte each.
pub(crate) fn emit_char_to_string(m: &mut MethodLowering<'_>) {
    let wide = m.buf.create_target();
    let three = m.buf.create_target();
    let zero = m.buf.create_target();
    let end = m.buf.create_target();

    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(0x80)));
    m.emit(Instruction::Lt);
    m.buf.jump_if_not(wide);
    // ASCII.
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(0)));
    m.emit(Instruction::Equal);
    m.buf.jump_if(zero);
    m.emit(Instruction::IntToBytes);
    m.buf.jump(end);
    m.buf.bind(zero);
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushBytes(vec![0]));
    m.buf.jump(end);

    m.buf.bind(wide);
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(0x800)));
    m.emit(Instruction::Lt);
    m.buf.jump_if_not(three);
    // Two bytes: 110xxxxx 10xxxxxx.
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(6)));
    m.emit(Instruction::Shr);
    m.emit(Instruction::PushInt(BigInt::from(0xC0)));
    m.emit(Instruction::BitOr);
    m.emit(Instruction::IntToBytes);
    m.emit(Instruction::Swap);
    m.emit(Instruction::PushInt(BigInt::from(0x3F)));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::PushInt(BigInt::from(0x80)));
    m.emit(Instruction::BitOr);
    m.emit(Instruction::IntToBytes);
    m.emit(Instruction::Cat);
    m.buf.jump(end);

    m.buf.bind(three);
    // Three bytes: 1110xxxx 10xxxxxx 10xxxxxx.
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(12)));
    m.emit(Instruction::Shr);
    m.emit(Instruction::PushInt(BigInt::from(0xE0)));
    m.emit(Instruction::BitOr);
    m.emit(Instruction::IntToBytes);
    m.emit(Instruction::Over);
    m.emit(Instruction::PushInt(BigInt::from(6)));
    m.emit(Instruction::Shr);
    m.emit(Instruction::PushInt(BigInt::from(0x3F)));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::PushInt(BigInt::from(0x80)));
    m.emit(Instruction::BitOr);
    m.emit(Instruction::IntToBytes);
    m.emit(Instruction::Rot);
    m.emit(Instruction::PushInt(BigInt::from(0x3F)));
    m.emit(Instruction::BitAnd);
    m.emit(Instruction::PushInt(BigInt::from(0x80)));
    m.emit(Instruction::BitOr);
    m.emit(Instruction::IntToBytes);
    m.emit(Instruction::Cat);
    m.emit(Instruction::Cat);
    m.buf.bind(end);
}

fn char_to_string(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    emit_char_to_string(m);
    Ok(())
}

/// `( c -- b )` ASCII decimal digit.
fn char_is_digit(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    m.emit(Instruction::PushInt(BigInt::from(48)));
    m.emit(Instruction::PushInt(BigInt::from(58)));
    m.emit(Instruction::Within);
    Ok(())
}

/// `( c -- b )` ASCII letter of either case.
fn char_is_letter(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let yes = m.buf.create_target();
    let end = m.buf.create_target();
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(65)));
    m.emit(Instruction::PushInt(BigInt::from(91)));
    m.emit(Instruction::Within);
    m.buf.jump_if(yes);
    m.emit(Instruction::PushInt(BigInt::from(97)));
    m.emit(Instruction::PushInt(BigInt::from(123)));
    m.emit(Instruction::Within);
    m.buf.jump(end);
    m.buf.bind(yes);
    m.emit(Instruction::Drop);
    m.emit(Instruction::PushBool(true));
    m.buf.bind(end);
    Ok(())
}

fn char_is_white_space(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    emit_is_space(m);
    Ok(())
}

/// `( c -- c' )` ASCII lowercase letters shift down by 32.
fn char_to_upper(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let end = m.buf.create_target();
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(97)));
    m.emit(Instruction::PushInt(BigInt::from(123)));
    m.emit(Instruction::Within);
    m.buf.jump_if_not(end);
    m.emit(Instruction::PushInt(BigInt::from(32)));
    m.emit(Instruction::Sub);
    m.buf.bind(end);
    Ok(())
}

/// `( c -- c' )` ASCII uppercase letters shift up by 32.
fn char_to_lower(
    m: &mut MethodLowering<'_>,
    _method: &Arc<MethodSym>,
    _span: Span,
) -> CompileResult<()> {
    let end = m.buf.create_target();
    m.emit(Instruction::Dup);
    m.emit(Instruction::PushInt(BigInt::from(65)));
    m.emit(Instruction::PushInt(BigInt::from(91)));
    m.emit(Instruction::Within);
    m.buf.jump_if_not(end);
    m.emit(Instruction::PushInt(BigInt::from(32)));
    m.emit(Instruction::Add);
    m.buf.bind(end);
    Ok(())
}
