//! Resolved symbol references.
//!
//! The semantic analyzer resolves every name to one of these before lowering
//! begins. Lowering never sees a bare identifier string.

use std::fmt;
use std::sync::Arc;

use crate::types::{TypeDef, TypeDesc};

/// Identity of a local or parameter, unique within one compilation.
///
/// Lambdas reference enclosing-method variables by this id; a variable id
/// that is not bound in the current frame is, by construction, a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A local variable or parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSym {
    /// Compilation-unique identity.
    pub id: SymbolId,
    /// Declared name.
    pub name: Arc<str>,
    /// Declared type.
    pub ty: TypeDesc,
}

impl VarSym {
    /// Create a variable symbol.
    #[must_use]
    pub fn new(id: u32, name: &str, ty: TypeDesc) -> Arc<Self> {
        Arc::new(Self {
            id: SymbolId(id),
            name: name.into(),
            ty,
        })
    }
}

/// A resolved field reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSym {
    /// Field name.
    pub name: Arc<str>,
    /// The type declaring the field; its ordered field list decides the
    /// instance element index every access site agrees on.
    pub declaring: Arc<TypeDef>,
    /// Whether the field lives in static storage.
    pub is_static: bool,
    /// Field type.
    pub ty: TypeDesc,
}

impl FieldSym {
    /// Stable key for the static-field table.
    #[must_use]
    pub fn static_key(&self) -> String {
        format!("{}.{}", self.declaring.name, self.name)
    }
}

/// A resolved method reference.
///
/// Covers user-declared methods, property accessors, and the built-in
/// methods the intrinsic table recognizes by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSym {
    /// Method name. Property accessors use the property name; arity
    /// disambiguates get (0 explicit args) from set (1).
    pub name: Arc<str>,
    /// The declaring type.
    pub declaring: TypeDesc,
    /// Whether the method is static (no receiver).
    pub is_static: bool,
    /// Explicit parameter types, receiver excluded.
    pub params: Vec<TypeDesc>,
    /// Return type.
    pub ret: TypeDesc,
}

impl MethodSym {
    /// Create a method symbol.
    #[must_use]
    pub fn new(
        declaring: TypeDesc,
        name: &str,
        is_static: bool,
        params: Vec<TypeDesc>,
        ret: TypeDesc,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            declaring,
            is_static,
            params,
            ret,
        })
    }

    /// Normalized dispatch key: `family.name/arity`.
    ///
    /// The family collapses surface syntax the handlers do not care about:
    /// any `Nullable<T>` receiver keys as `nullable`, any enum as `enum`,
    /// any array as `array`. Everything else keys by its canonical type
    /// name, so each integer width gets its own table row.
    #[must_use]
    pub fn key(&self) -> String {
        let family = match &self.declaring {
            TypeDesc::Nullable(_) => "nullable".to_string(),
            TypeDesc::Enum(_) => "enum".to_string(),
            TypeDesc::Array(_) => "array".to_string(),
            other => other.display_name(),
        };
        format!("{}.{}/{}", family, self.name, self.params.len())
    }

    /// Key for the unit registry (user-declared methods), qualified by the
    /// exact declaring type so two contracts' methods never collide.
    #[must_use]
    pub fn unit_key(&self) -> String {
        format!(
            "{}.{}/{}",
            self.declaring.display_name(),
            self.name,
            self.params.len()
        )
    }
}

/// A resolved property reference; accessors are plain method symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySym {
    /// Property name.
    pub name: Arc<str>,
    /// The declaring type.
    pub declaring: TypeDesc,
    /// Whether the property is static.
    pub is_static: bool,
    /// Property type.
    pub ty: TypeDesc,
    /// Getter method.
    pub getter: Arc<MethodSym>,
    /// Setter method, absent for read-only properties.
    pub setter: Option<Arc<MethodSym>>,
}

/// What a name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolRef {
    /// A field of some type.
    Field(Arc<FieldSym>),
    /// A method-local variable.
    Local(Arc<VarSym>),
    /// A method parameter.
    Param(Arc<VarSym>),
    /// A property; reads/writes go through its accessors.
    Property(Arc<PropertySym>),
    /// A method group member (callee position).
    Method(Arc<MethodSym>),
    /// A type name (static member access receiver).
    Type(TypeDesc),
    /// The `_` discard designator.
    Discard,
}

impl SymbolRef {
    /// The declared name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SymbolRef::Field(f) => &f.name,
            SymbolRef::Local(v) | SymbolRef::Param(v) => &v.name,
            SymbolRef::Property(p) => &p.name,
            SymbolRef::Method(m) => &m.name,
            SymbolRef::Type(_) => "<type>",
            SymbolRef::Discard => "_",
        }
    }
}
