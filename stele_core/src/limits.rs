//! Addressing limits of the target virtual machine's storage model.
//!
//! Local and parameter slots are addressed with a single byte; static fields
//! with two. Exceeding any of these is a user-facing diagnostic, not an
//! internal error, because real contracts do run into them.

/// Maximum local-variable slots per method (one-byte addressing).
pub const MAX_LOCAL_SLOTS: usize = 256;

/// Maximum parameter slots per method, including the receiver slot of
/// instance methods (one-byte addressing).
pub const MAX_PARAM_SLOTS: usize = 256;

/// Maximum static-field slots per compilation, shared between declared
/// statics and promoted lambda captures (two-byte addressing).
pub const MAX_STATIC_SLOTS: usize = 65536;

/// Maximum shift distance the VM accepts for `Shl`/`Shr` before faulting.
pub const MAX_SHIFT: u32 = 256;
