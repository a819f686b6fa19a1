//! Structured type descriptors.
//!
//! The front end resolves every expression to one of these. The lowering
//! engine only ever inspects structure; names are carried for diagnostics
//! and intrinsic keying, never re-resolved.

use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

// =============================================================================
// Fixed-width integer kinds
// =============================================================================

/// A fixed-width integer classification.
///
/// `Char` is a UTF-16 code unit and behaves as an unsigned 16-bit integer for
/// every range computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    /// Signed 8-bit.
    I8,
    /// Unsigned 8-bit.
    U8,
    /// Signed 16-bit.
    I16,
    /// Unsigned 16-bit.
    U16,
    /// Signed 32-bit.
    I32,
    /// Unsigned 32-bit.
    U32,
    /// Signed 64-bit.
    I64,
    /// Unsigned 64-bit.
    U64,
    /// UTF-16 code unit; ranges like [`IntKind::U16`].
    Char,
}

impl IntKind {
    /// All kinds, in width order. Handy for table-driven emission and tests.
    pub const ALL: [IntKind; 9] = [
        IntKind::I8,
        IntKind::U8,
        IntKind::I16,
        IntKind::U16,
        IntKind::I32,
        IntKind::U32,
        IntKind::I64,
        IntKind::U64,
        IntKind::Char,
    ];

    /// Bit width of the representation.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            IntKind::I8 | IntKind::U8 => 8,
            IntKind::I16 | IntKind::U16 | IntKind::Char => 16,
            IntKind::I32 | IntKind::U32 => 32,
            IntKind::I64 | IntKind::U64 => 64,
        }
    }

    /// Whether the kind is signed.
    #[inline]
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64)
    }

    /// Smallest representable value.
    #[must_use]
    pub const fn min_value(self) -> i128 {
        if self.is_signed() {
            -(1i128 << (self.bits() - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    #[must_use]
    pub const fn max_value(self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.bits() - 1)) - 1
        } else {
            (1i128 << self.bits()) - 1
        }
    }

    /// All-ones mask for the width, `2^bits - 1`.
    #[must_use]
    pub const fn mask(self) -> i128 {
        (1i128 << self.bits()) - 1
    }

    /// Size of the value domain, `2^bits`.
    #[must_use]
    pub const fn modulus(self) -> i128 {
        1i128 << self.bits()
    }

    /// Canonical source-level type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "int8",
            IntKind::U8 => "uint8",
            IntKind::I16 => "int16",
            IntKind::U16 => "uint16",
            IntKind::I32 => "int32",
            IntKind::U32 => "uint32",
            IntKind::I64 => "int64",
            IntKind::U64 => "uint64",
            IntKind::Char => "char",
        }
    }

    /// Whether `v` is representable in this kind.
    #[must_use]
    pub fn contains(self, v: &BigInt) -> bool {
        *v >= BigInt::from(self.min_value()) && *v <= BigInt::from(self.max_value())
    }
}

// =============================================================================
// Declared type definitions
// =============================================================================

/// A non-static field position inside a declared record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: Arc<str>,
    /// Field type.
    pub ty: TypeDesc,
    /// Whether the field lives in static storage rather than the instance.
    pub is_static: bool,
}

/// A user-declared record or contract class.
///
/// Instances lower to VM records; the ordered `fields` list is the contract
/// every access site relies on to compute a field's element index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// Declared type name.
    pub name: Arc<str>,
    /// Whether the type has value semantics (`default` builds a fresh
    /// aggregate instead of null).
    pub is_value: bool,
    /// Declared fields in declaration order, static and instance mixed.
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    /// Index of `name` within the ordered non-static field list.
    #[must_use]
    pub fn instance_field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .filter(|f| !f.is_static)
            .position(|f| &*f.name == name)
    }

    /// Instance fields in declaration order.
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.is_static)
    }
}

/// One named member of an enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Member name.
    pub name: Arc<str>,
    /// Member value in the underlying representation.
    pub value: BigInt,
}

/// A user-declared enum.
///
/// The member list is compile-time knowledge; the target VM has no runtime
/// reflection, so every reflective operation is unrolled over this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Declared enum name.
    pub name: Arc<str>,
    /// Underlying integer kind.
    pub underlying: IntKind,
    /// Members in declaration order.
    pub members: Vec<EnumMember>,
}

// =============================================================================
// Type descriptors
// =============================================================================

/// The static type of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDesc {
    /// No value (void-returning calls).
    Void,
    /// Boolean.
    Bool,
    /// Fixed-width integer or char.
    Int(IntKind),
    /// Arbitrary-precision integer (the VM's native number type).
    BigInt,
    /// UTF-8 string (a byte string to the VM).
    Str,
    /// Raw byte string.
    Bytes,
    /// 20-byte account address.
    Address,
    /// 32-byte hash.
    Hash,
    /// 33-byte compressed public key.
    PubKey,
    /// Array with a single element type.
    Array(Box<TypeDesc>),
    /// Nullable wrapper around a value type.
    Nullable(Box<TypeDesc>),
    /// Fixed-arity tuple.
    Tuple(Vec<TypeDesc>),
    /// Declared record type.
    Object(Arc<TypeDef>),
    /// Declared enum type.
    Enum(Arc<EnumDef>),
    /// Callable value (lambdas, delegate-typed storage).
    Func {
        /// Parameter types.
        params: Vec<TypeDesc>,
        /// Return type.
        ret: Box<TypeDesc>,
    },
}

impl TypeDesc {
    /// Fixed byte length for the fixed-size byte types.
    #[must_use]
    pub const fn fixed_byte_len(&self) -> Option<usize> {
        match self {
            TypeDesc::Address => Some(20),
            TypeDesc::Hash => Some(32),
            TypeDesc::PubKey => Some(33),
            _ => None,
        }
    }

    /// The fixed-width integer kind, looking through enums (which range-check
    /// as their underlying kind) but not through `Nullable`.
    #[must_use]
    pub fn int_kind(&self) -> Option<IntKind> {
        match self {
            TypeDesc::Int(k) => Some(*k),
            TypeDesc::Enum(def) => Some(def.underlying),
            _ => None,
        }
    }

    /// Whether values of this type are integers on the VM stack.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, TypeDesc::Int(_) | TypeDesc::BigInt | TypeDesc::Enum(_))
    }

    /// Whether this is one of the two types that admit sub-range extraction.
    #[must_use]
    pub fn is_sliceable(&self) -> bool {
        matches!(self, TypeDesc::Str | TypeDesc::Bytes)
    }

    /// Whether `default` for this type is the null reference.
    #[must_use]
    pub fn defaults_to_null(&self) -> bool {
        match self {
            TypeDesc::Str
            | TypeDesc::Bytes
            | TypeDesc::Address
            | TypeDesc::Hash
            | TypeDesc::PubKey
            | TypeDesc::Array(_)
            | TypeDesc::Nullable(_)
            | TypeDesc::Func { .. } => true,
            TypeDesc::Object(def) => !def.is_value,
            _ => false,
        }
    }

    /// Strip one `Nullable` wrapper, if present.
    #[must_use]
    pub fn strip_nullable(&self) -> &TypeDesc {
        match self {
            TypeDesc::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Whether this is the void type.
    #[inline]
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDesc::Void)
    }

    /// Source-level display name, used in diagnostics and intrinsic keys.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            TypeDesc::Void => "void".into(),
            TypeDesc::Bool => "bool".into(),
            TypeDesc::Int(k) => k.name().into(),
            TypeDesc::BigInt => "bigint".into(),
            TypeDesc::Str => "string".into(),
            TypeDesc::Bytes => "bytes".into(),
            TypeDesc::Address => "address".into(),
            TypeDesc::Hash => "hash".into(),
            TypeDesc::PubKey => "pubkey".into(),
            TypeDesc::Array(elem) => format!("{}[]", elem.display_name()),
            TypeDesc::Nullable(inner) => format!("{}?", inner.display_name()),
            TypeDesc::Tuple(elems) => {
                let inner: Vec<String> = elems.iter().map(TypeDesc::display_name).collect();
                format!("({})", inner.join(", "))
            }
            TypeDesc::Object(def) => def.name.to_string(),
            TypeDesc::Enum(def) => def.name.to_string(),
            TypeDesc::Func { params, ret } => {
                let inner: Vec<String> = params.iter().map(TypeDesc::display_name).collect();
                format!("fn({}) -> {}", inner.join(", "), ret.display_name())
            }
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
