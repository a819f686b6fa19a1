//! Compilation session state shared across units.
//!
//! A [`Session`] lives for one `lower_program` call. It owns the static
//! slot table, the unit registry, and the lowering options. Units are
//! registered before any body is lowered so calls can reference methods
//! declared later in the program; each registered slot is completed exactly
//! once when its body finishes.

use std::fmt::Write as _;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::bytecode::{Instruction, UnitId};
use crate::slots::StaticTable;

/// Lowering options.
///
/// Plain data so callers can construct it field by field. The default is
/// unchecked arithmetic, matching the source language's default context.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Whether arithmetic outside any explicit `checked`/`unchecked`
    /// region traps on overflow instead of wrapping.
    pub default_checked: bool,
}

/// One finished instruction unit: a method body or a lambda body.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Display name, `Type.method` for methods, owner-derived for lambdas.
    pub name: Arc<str>,
    /// Finalized instructions, jumps resolved to relative offsets.
    pub instructions: Vec<Instruction>,
    /// Local slot count declared by the prologue.
    pub locals: u8,
    /// Parameter slot count declared by the prologue.
    pub params: u8,
    /// Whether a call to this unit leaves a value on the caller's stack.
    pub returns_value: bool,
}

impl Unit {
    /// Render the unit as indexed mnemonic lines.
    #[must_use]
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Unit: {} (locals={}, params={})",
            self.name, self.locals, self.params
        );
        for (i, ins) in self.instructions.iter().enumerate() {
            let _ = writeln!(out, "  {i:4}: {ins}");
        }
        out
    }
}

/// Output of lowering one program.
#[derive(Debug)]
pub struct Lowered {
    /// All units, indexed by [`UnitId`]. Unit 0 is the first declared
    /// method.
    pub units: Vec<Unit>,
    /// Number of static slots the program needs, declared fields and
    /// promoted captures combined.
    pub static_count: usize,
}

impl Lowered {
    /// Disassemble every unit, in id order.
    #[must_use]
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for unit in &self.units {
            out.push_str(&unit.disassemble());
        }
        out
    }
}

/// Mutable state threaded through every unit's lowering.
#[derive(Debug)]
pub struct Session {
    /// Lowering options.
    pub options: Options,
    /// Shared static slot table.
    pub statics: StaticTable,
    units: Vec<Option<Unit>>,
    unit_ids: FxHashMap<String, UnitId>,
    lambda_counter: u32,
}

impl Session {
    /// Create a session with the given options.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            statics: StaticTable::new(),
            units: Vec::new(),
            unit_ids: FxHashMap::default(),
            lambda_counter: 0,
        }
    }

    /// Reserve a unit id for a named method. Ids are handed out in call
    /// order, so registering declarations first gives declaration-order
    /// ids.
    pub fn register_method(&mut self, key: String) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(None);
        self.unit_ids.insert(key, id);
        id
    }

    /// Reserve a unit id for a lambda and derive its display name from the
    /// enclosing unit.
    pub fn register_lambda(&mut self, owner: &str) -> (UnitId, Arc<str>) {
        let id = UnitId(self.units.len() as u32);
        self.units.push(None);
        let name: Arc<str> = format!("{owner}.lambda#{}", self.lambda_counter).into();
        self.lambda_counter += 1;
        (id, name)
    }

    /// Unit id previously registered under `key`.
    #[must_use]
    pub fn lookup_method(&self, key: &str) -> Option<UnitId> {
        self.unit_ids.get(key).copied()
    }

    /// Fill a reserved unit slot.
    ///
    /// # Panics
    /// Panics if the slot is already completed.
    pub fn complete_unit(&mut self, id: UnitId, unit: Unit) {
        let slot = &mut self.units[id.0 as usize];
        assert!(slot.is_none(), "unit {id} completed twice");
        *slot = Some(unit);
    }

    /// Consume the session after every registered unit has a body.
    ///
    /// # Panics
    /// Panics if some registered unit was never completed.
    #[must_use]
    pub fn finish(self) -> Lowered {
        let static_count = self.statics.count();
        let units = self
            .units
            .into_iter()
            .map(|u| u.expect("registered unit never completed"))
            .collect();
        Lowered {
            units,
            static_count,
        }
    }
}
