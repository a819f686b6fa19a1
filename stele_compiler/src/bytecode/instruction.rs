//! Stack-machine instruction set.
//!
//! One enum variant per opcode, with typed operands. The target VM works on
//! arbitrary-precision integers, byte strings, records, and callable values;
//! instructions that push constants carry the constant inline. Jump
//! instructions carry a [`JumpOperand`] that starts as an unresolved target
//! handle and is rewritten to a relative offset when the owning buffer is
//! finalized.

use std::fmt;

use num_bigint::BigInt;

/// Identity of an independently lowered instruction unit (a method or a
/// lambda body) within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// A forward-declared jump destination handle.
///
/// Handles index into the owning buffer's target arena; they carry no
/// position themselves. See [`InstructionBuffer`](super::InstructionBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JumpTarget(pub(crate) u32);

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Operand of a jump instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOperand {
    /// Unresolved handle; only valid before buffer finalization.
    Target(JumpTarget),
    /// Resolved instruction-index delta, relative to the jump itself.
    /// `0` would be a self-loop; `1` is the next instruction.
    Offset(i32),
}

impl fmt::Display for JumpOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpOperand::Target(t) => write!(f, "->{t}"),
            JumpOperand::Offset(d) => write!(f, "{d:+}"),
        }
    }
}

/// Runtime type tags for `IsType` tests.
///
/// The VM distinguishes value shapes, not source types: every declared
/// record looks like `Record`, every string-like value like `Bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Byte string.
    Bytes,
    /// Record (array, tuple, object).
    Record,
    /// Callable value.
    Func,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Bytes => "bytes",
            TypeTag::Record => "record",
            TypeTag::Func => "func",
        };
        write!(f, "{name}")
    }
}

/// One VM instruction.
///
/// Stack-effect comments use `( before -- after )` with the top of the
/// stack on the right.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // === Constants ===
    /// `( -- n )` push an integer constant.
    PushInt(BigInt),
    /// `( -- b )` push a boolean constant.
    PushBool(bool),
    /// `( -- null )` push the null reference.
    PushNull,
    /// `( -- s )` push a byte-string constant.
    PushBytes(Vec<u8>),
    /// `( -- f )` push a callable referencing a lowered unit.
    PushFunc(UnitId),

    // === Stack shuffling ===
    /// `( a -- a a )`
    Dup,
    /// `( a -- )`
    Drop,
    /// `( a b -- b )`
    Nip,
    /// `( a b -- b a )`
    Swap,
    /// `( a b -- a b a )`
    Over,
    /// `( a b -- b a b )`
    Tuck,
    /// `( a b c -- b c a )`
    Rot,
    /// Reverse the order of the top `n` items.
    Reverse(u8),
    /// Move the item at depth `n` to the top. `Roll(1)` is `Swap`.
    Roll(u8),

    // === Slots ===
    /// Method prologue: declare local and parameter slot counts. Parameters
    /// are popped from the stack into slots, last parameter on top.
    InitSlots {
        /// Local slot count.
        locals: u8,
        /// Parameter slot count, receiver included.
        params: u8,
    },
    /// `( -- v )` load a local slot.
    LoadLocal(u8),
    /// `( v -- )` store to a local slot.
    StoreLocal(u8),
    /// `( -- v )` load a parameter slot.
    LoadParam(u8),
    /// `( v -- )` store to a parameter slot.
    StoreParam(u8),
    /// `( -- v )` load a static field slot.
    LoadStatic(u16),
    /// `( v -- )` store to a static field slot.
    StoreStatic(u16),

    // === Arithmetic ===
    /// `( a b -- a+b )`
    Add,
    /// `( a b -- a-b )`
    Sub,
    /// `( a b -- a*b )`
    Mul,
    /// `( a b -- a/b )` truncated toward zero; faults on zero divisor.
    Div,
    /// `( a b -- a%b )` remainder with the sign of the dividend.
    Rem,
    /// `( a b -- a^b )` integer power; faults on negative exponent.
    Pow,
    /// `( a -- -a )`
    Neg,
    /// `( a -- |a| )`
    Abs,
    /// `( a -- sign )` -1, 0, or 1.
    Sign,
    /// `( a b -- min )`
    Min,
    /// `( a b -- max )`
    Max,
    /// `( x a b -- a<=x<b )`
    Within,

    // === Bitwise ===
    /// `( a b -- a<<b )` faults past the VM shift limit.
    Shl,
    /// `( a b -- a>>b )` arithmetic shift.
    Shr,
    /// `( a b -- a&b )` two's-complement AND.
    BitAnd,
    /// `( a b -- a|b )`
    BitOr,
    /// `( a b -- a^b )` exclusive or.
    BitXor,
    /// `( a -- ~a )`
    Invert,

    // === Comparison and tests ===
    /// `( a -- !a )` boolean not.
    Not,
    /// `( a b -- a==b )` numeric for integers, content for byte strings,
    /// identity for records.
    Equal,
    /// `( a b -- a!=b )`
    NotEqual,
    /// `( a b -- a<b )`
    Lt,
    /// `( a b -- a<=b )`
    Le,
    /// `( a b -- a>b )`
    Gt,
    /// `( a b -- a>=b )`
    Ge,
    /// `( a -- a==null )`
    IsNull,
    /// `( a -- bool )` runtime type tag test; null matches nothing.
    IsType(TypeTag),

    // === Control ===
    /// Unconditional jump.
    Jump(JumpOperand),
    /// `( c -- )` jump when truthy.
    JumpIf(JumpOperand),
    /// `( c -- )` jump when falsy.
    JumpIfNot(JumpOperand),
    /// `( args.. -- ret? )` call a lowered unit; pops its declared
    /// parameters, last on top.
    Call(UnitId),
    /// `( args.. f -- ret? )` call through a callable value.
    CallFunc,
    /// Return; carries the remaining stack value out when the unit
    /// returns one.
    Ret,
    /// `( msg -- )` fault the VM with a message payload.
    Throw,

    // === Compound values ===
    /// `( -- r )` push a fresh empty record.
    NewRecord,
    /// `( v.. -- r )` pop `n` values into a record, first pushed at index 0.
    Pack(u16),
    /// `( r v -- )` append to a record.
    Append,
    /// `( r i -- v )` read element `i`; byte strings yield the byte value.
    PickItem,
    /// `( r i v -- )` write element `i`.
    SetItem,
    /// `( x -- n )` element count of a record or byte length of a string.
    Size,

    // === Byte strings ===
    /// `( a b -- a++b )` concatenation.
    Cat,
    /// `( s start len -- sub )` absolute-offset substring; faults out of
    /// bounds.
    SubStr,
    /// `( n -- s )` minimal unsigned little-endian encoding; faults on
    /// negative input, `0` becomes the empty string.
    IntToBytes,
    /// `( n -- s )` decimal ASCII rendering, `-` prefix for negatives.
    Itoa,
    /// `( s -- n )` parse decimal ASCII with optional sign; faults on
    /// anything else.
    Atoi,
}

impl Instruction {
    /// Whether this instruction's operand is an unresolved jump target.
    #[must_use]
    pub fn pending_target(&self) -> Option<JumpTarget> {
        match self {
            Instruction::Jump(JumpOperand::Target(t))
            | Instruction::JumpIf(JumpOperand::Target(t))
            | Instruction::JumpIfNot(JumpOperand::Target(t)) => Some(*t),
            _ => None,
        }
    }

    /// Mnemonic, for disassembly.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::PushInt(_) => "PUSH_INT",
            Instruction::PushBool(_) => "PUSH_BOOL",
            Instruction::PushNull => "PUSH_NULL",
            Instruction::PushBytes(_) => "PUSH_BYTES",
            Instruction::PushFunc(_) => "PUSH_FUNC",
            Instruction::Dup => "DUP",
            Instruction::Drop => "DROP",
            Instruction::Nip => "NIP",
            Instruction::Swap => "SWAP",
            Instruction::Over => "OVER",
            Instruction::Tuck => "TUCK",
            Instruction::Rot => "ROT",
            Instruction::Reverse(_) => "REVERSE",
            Instruction::Roll(_) => "ROLL",
            Instruction::InitSlots { .. } => "INIT_SLOTS",
            Instruction::LoadLocal(_) => "LOAD_LOCAL",
            Instruction::StoreLocal(_) => "STORE_LOCAL",
            Instruction::LoadParam(_) => "LOAD_PARAM",
            Instruction::StoreParam(_) => "STORE_PARAM",
            Instruction::LoadStatic(_) => "LOAD_STATIC",
            Instruction::StoreStatic(_) => "STORE_STATIC",
            Instruction::Add => "ADD",
            Instruction::Sub => "SUB",
            Instruction::Mul => "MUL",
            Instruction::Div => "DIV",
            Instruction::Rem => "REM",
            Instruction::Pow => "POW",
            Instruction::Neg => "NEG",
            Instruction::Abs => "ABS",
            Instruction::Sign => "SIGN",
            Instruction::Min => "MIN",
            Instruction::Max => "MAX",
            Instruction::Within => "WITHIN",
            Instruction::Shl => "SHL",
            Instruction::Shr => "SHR",
            Instruction::BitAnd => "AND",
            Instruction::BitOr => "OR",
            Instruction::BitXor => "XOR",
            Instruction::Invert => "INVERT",
            Instruction::Not => "NOT",
            Instruction::Equal => "EQUAL",
            Instruction::NotEqual => "NOT_EQUAL",
            Instruction::Lt => "LT",
            Instruction::Le => "LE",
            Instruction::Gt => "GT",
            Instruction::Ge => "GE",
            Instruction::IsNull => "IS_NULL",
            Instruction::IsType(_) => "IS_TYPE",
            Instruction::Jump(_) => "JMP",
            Instruction::JumpIf(_) => "JMP_IF",
            Instruction::JumpIfNot(_) => "JMP_IF_NOT",
            Instruction::Call(_) => "CALL",
            Instruction::CallFunc => "CALL_FUNC",
            Instruction::Ret => "RET",
            Instruction::Throw => "THROW",
            Instruction::NewRecord => "NEW_RECORD",
            Instruction::Pack(_) => "PACK",
            Instruction::Append => "APPEND",
            Instruction::PickItem => "PICK_ITEM",
            Instruction::SetItem => "SET_ITEM",
            Instruction::Size => "SIZE",
            Instruction::Cat => "CAT",
            Instruction::SubStr => "SUB_STR",
            Instruction::IntToBytes => "INT_TO_BYTES",
            Instruction::Itoa => "ITOA",
            Instruction::Atoi => "ATOI",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushInt(v) => write!(f, "PUSH_INT {v}"),
            Instruction::PushBool(b) => write!(f, "PUSH_BOOL {b}"),
            Instruction::PushBytes(b) => {
                // Printable ASCII renders as a quoted string, else hex.
                if b.iter().all(|c| (0x20..0x7f).contains(c)) {
                    write!(f, "PUSH_BYTES \"{}\"", String::from_utf8_lossy(b))
                } else {
                    write!(f, "PUSH_BYTES 0x")?;
                    for byte in b {
                        write!(f, "{byte:02x}")?;
                    }
                    Ok(())
                }
            }
            Instruction::PushFunc(u) => write!(f, "PUSH_FUNC {u}"),
            Instruction::Reverse(n) => write!(f, "REVERSE {n}"),
            Instruction::Roll(n) => write!(f, "ROLL {n}"),
            Instruction::InitSlots { locals, params } => {
                write!(f, "INIT_SLOTS locals={locals} params={params}")
            }
            Instruction::LoadLocal(s) => write!(f, "LOAD_LOCAL {s}"),
            Instruction::StoreLocal(s) => write!(f, "STORE_LOCAL {s}"),
            Instruction::LoadParam(s) => write!(f, "LOAD_PARAM {s}"),
            Instruction::StoreParam(s) => write!(f, "STORE_PARAM {s}"),
            Instruction::LoadStatic(s) => write!(f, "LOAD_STATIC {s}"),
            Instruction::StoreStatic(s) => write!(f, "STORE_STATIC {s}"),
            Instruction::IsType(tag) => write!(f, "IS_TYPE {tag}"),
            Instruction::Jump(op) => write!(f, "JMP {op}"),
            Instruction::JumpIf(op) => write!(f, "JMP_IF {op}"),
            Instruction::JumpIfNot(op) => write!(f, "JMP_IF_NOT {op}"),
            Instruction::Call(u) => write!(f, "CALL {u}"),
            Instruction::Pack(n) => write!(f, "PACK {n}"),
            other => write!(f, "{}", other.mnemonic()),
        }
    }
}
