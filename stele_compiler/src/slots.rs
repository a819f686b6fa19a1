//! Storage slot resolution.
//!
//! Every variable a lowered body touches lives in exactly one of three
//! stores: the unit's parameter slots, its local slots, or the
//! compilation-wide static field table. [`SlotFrame`] owns the per-unit
//! byte-addressed slots; [`StaticTable`] owns the shared two-byte-addressed
//! statics, which also receive promoted lambda captures. Indices are
//! assigned in first-reference order, so repeated compilations of the same
//! program produce identical slot layouts.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use stele_ast::{SymbolId, VarSym};
use stele_core::limits::{MAX_LOCAL_SLOTS, MAX_PARAM_SLOTS, MAX_STATIC_SLOTS};
use stele_core::Span;

use crate::error::{CompileError, CompileResult};

// =============================================================================
// Per-unit storage
// =============================================================================

/// Resolved storage location of one variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarStorage {
    /// Local slot of the current unit.
    Local(u8),
    /// Parameter slot of the current unit.
    Param(u8),
    /// Entry in the shared static field table.
    Static(u16),
}

/// Local and parameter slot assignment for one unit.
#[derive(Debug, Default)]
pub struct SlotFrame {
    params: FxHashMap<SymbolId, u8>,
    locals: FxHashMap<SymbolId, u8>,
    next_local: usize,
    param_count: usize,
}

impl SlotFrame {
    /// Create a frame with the given parameters bound, in declaration
    /// order, to consecutive slots. When `has_receiver` is set, slot 0 is
    /// reserved for the receiver and declared parameters start at slot 1.
    pub fn new(params: &[Arc<VarSym>], has_receiver: bool, span: Span) -> CompileResult<Self> {
        let offset = usize::from(has_receiver);
        if params.len() + offset > MAX_PARAM_SLOTS {
            return Err(CompileError::slot_overflow(
                format!(
                    "method declares {} parameters, limit is {MAX_PARAM_SLOTS}",
                    params.len() + offset
                ),
                span,
            ));
        }
        let mut map = FxHashMap::default();
        for (idx, sym) in params.iter().enumerate() {
            map.insert(sym.id, (idx + offset) as u8);
        }
        Ok(Self {
            params: map,
            locals: FxHashMap::default(),
            next_local: 0,
            param_count: params.len() + offset,
        })
    }

    /// Assign the next free local slot to `sym`. Re-declaring a symbol
    /// keeps its existing slot.
    pub fn declare_local(&mut self, sym: &VarSym, span: Span) -> CompileResult<u8> {
        if let Some(slot) = self.locals.get(&sym.id) {
            return Ok(*slot);
        }
        let slot = self.alloc_local(span)?;
        self.locals.insert(sym.id, slot);
        Ok(slot)
    }

    /// Reserve an anonymous local slot. Used by lowering routines that need
    /// VM-invisible temporaries, e.g. string scan loops.
    pub fn alloc_scratch(&mut self, span: Span) -> CompileResult<u8> {
        self.alloc_local(span)
    }

    fn alloc_local(&mut self, span: Span) -> CompileResult<u8> {
        if self.next_local >= MAX_LOCAL_SLOTS {
            return Err(CompileError::slot_overflow(
                format!("method needs more than {MAX_LOCAL_SLOTS} local slots"),
                span,
            ));
        }
        let slot = self.next_local as u8;
        self.next_local += 1;
        Ok(slot)
    }

    /// Look up a symbol in this frame. Statics are not frame-resident and
    /// always miss here.
    #[must_use]
    pub fn lookup(&self, id: SymbolId) -> Option<VarStorage> {
        if let Some(slot) = self.params.get(&id) {
            return Some(VarStorage::Param(*slot));
        }
        self.locals.get(&id).map(|slot| VarStorage::Local(*slot))
    }

    /// Number of local slots assigned so far.
    #[must_use]
    pub fn local_count(&self) -> u8 {
        self.next_local as u8
    }

    /// Number of parameter slots.
    #[must_use]
    pub fn param_count(&self) -> u8 {
        self.param_count as u8
    }
}

// =============================================================================
// Shared statics
// =============================================================================

/// Key into the static field table.
///
/// Declared static fields key by their qualified `Type.field` name;
/// promoted lambda captures key by the captured variable's symbol, which
/// keeps two captures of like-named variables from colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaticKey {
    /// Declared static field, qualified name.
    Field(String),
    /// Promoted capture of a local or parameter.
    Capture(SymbolId),
}

/// Compilation-wide static slot table.
///
/// Slots are handed out on first reference and never reclaimed, so every
/// key resolves to the same index for the whole compilation.
#[derive(Debug, Default)]
pub struct StaticTable {
    indices: FxHashMap<StaticKey, u16>,
    next: usize,
}

impl StaticTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a key to its slot, allocating one on first reference.
    pub fn resolve(&mut self, key: StaticKey, span: Span) -> CompileResult<u16> {
        if let Some(slot) = self.indices.get(&key) {
            return Ok(*slot);
        }
        if self.next >= MAX_STATIC_SLOTS {
            return Err(CompileError::slot_overflow(
                format!("compilation needs more than {MAX_STATIC_SLOTS} static slots"),
                span,
            ));
        }
        let slot = self.next as u16;
        self.next += 1;
        self.indices.insert(key, slot);
        Ok(slot)
    }

    /// Slot of an already-resolved key, if any.
    #[must_use]
    pub fn lookup(&self, key: &StaticKey) -> Option<u16> {
        self.indices.get(key).copied()
    }

    /// Number of slots allocated.
    #[must_use]
    pub fn count(&self) -> usize {
        self.next
    }
}
