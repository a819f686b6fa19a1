//! Append-only instruction buffer with deferred jump resolution.
//!
//! Lowering emits jumps against [`JumpTarget`] handles allocated from the
//! buffer's target arena. A target may be bound to a position before or
//! after the jumps that reference it, so forward control flow needs no
//! placeholder bookkeeping at the call sites. [`InstructionBuffer::finish`]
//! rewrites every handle into a relative instruction-index offset; an
//! unbound or doubly bound target at that point is a lowering bug and
//! panics.

use super::instruction::{Instruction, JumpOperand, JumpTarget};

/// Growable instruction sequence for one unit under construction.
#[derive(Debug, Default)]
pub struct InstructionBuffer {
    /// Emitted instructions, jumps still carrying target handles.
    instructions: Vec<Instruction>,
    /// Target arena: position per handle, `None` until bound.
    targets: Vec<Option<u32>>,
}

impl InstructionBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instructions emitted so far. The next emitted instruction
    /// lands at this index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether nothing has been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append one instruction.
    #[inline]
    pub fn emit(&mut self, ins: Instruction) {
        self.instructions.push(ins);
    }

    /// The most recently emitted instruction, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// Allocate a fresh unbound jump target.
    pub fn create_target(&mut self) -> JumpTarget {
        let handle = JumpTarget(self.targets.len() as u32);
        self.targets.push(None);
        handle
    }

    /// Bind a target to the current position, i.e. to the next instruction
    /// emitted after this call.
    ///
    /// # Panics
    /// Panics if the target is already bound.
    pub fn bind(&mut self, target: JumpTarget) {
        let slot = &mut self.targets[target.0 as usize];
        assert!(slot.is_none(), "jump target {target} bound twice");
        *slot = Some(self.instructions.len() as u32);
    }

    /// Emit an unconditional jump to `target`.
    pub fn jump(&mut self, target: JumpTarget) {
        self.emit(Instruction::Jump(JumpOperand::Target(target)));
    }

    /// Emit a jump taken when the popped value is truthy.
    pub fn jump_if(&mut self, target: JumpTarget) {
        self.emit(Instruction::JumpIf(JumpOperand::Target(target)));
    }

    /// Emit a jump taken when the popped value is falsy.
    pub fn jump_if_not(&mut self, target: JumpTarget) {
        self.emit(Instruction::JumpIfNot(JumpOperand::Target(target)));
    }

    /// Rewrite the slot counts of the `InitSlots` prologue at index 0.
    ///
    /// Units reserve the prologue before their body is lowered and patch in
    /// the final counts afterwards, once every slot has been assigned.
    ///
    /// # Panics
    /// Panics if instruction 0 is not `InitSlots`.
    pub fn patch_init_slots(&mut self, locals: u8, params: u8) {
        match self.instructions.first_mut() {
            Some(Instruction::InitSlots {
                locals: l,
                params: p,
            }) => {
                *l = locals;
                *p = params;
            }
            _ => panic!("instruction 0 is not an InitSlots prologue"),
        }
    }

    /// Resolve every jump to a relative offset and return the finished
    /// sequence. Offsets are relative to the jump's own index, so the
    /// resolved program is position-independent.
    ///
    /// # Panics
    /// Panics if any referenced target was never bound.
    #[must_use]
    pub fn finish(self) -> Vec<Instruction> {
        let Self {
            mut instructions,
            targets,
        } = self;
        for (idx, ins) in instructions.iter_mut().enumerate() {
            let operand = match ins {
                Instruction::Jump(op)
                | Instruction::JumpIf(op)
                | Instruction::JumpIfNot(op) => op,
                _ => continue,
            };
            if let JumpOperand::Target(t) = *operand {
                let pos = targets[t.0 as usize].expect("unbound jump target");
                let delta = i64::from(pos) - idx as i64;
                *operand = JumpOperand::Offset(delta as i32);
            }
        }
        instructions
    }
}
