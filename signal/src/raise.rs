//! `signal_register`/`signal_raise`.
//!
//! These operate directly on the [`SignalBlock`] embedded in a TCB rather
//! than on a thread id: `utk-signal` sits below `utk-sched` in the
//! dependency order, so it can't look threads up itself; the scheduler
//! calls these two functions while holding the target thread's own lock,
//! the same lock that guards `state` and the rest of its mutable fields.

use utk_abi::{KernelError, KernelResult, SignalBlock, SignalHandler, SignalKind};

/// Install (or clear, passing `None`) the handler for `kind`.
pub fn signal_register(block: &mut SignalBlock, kind: SignalKind, handler: Option<SignalHandler>) {
    block.set_handler(kind, handler);
}

/// Mark `kind` pending on `block`, provided the thread isn't a zombie and
/// a handler is installed. `is_zombie` is
/// passed in by the caller (the scheduler), which owns `ThreadState`.
pub fn signal_raise(
    block: &mut SignalBlock,
    is_zombie: bool,
    kind: SignalKind,
) -> KernelResult<()> {
    if is_zombie {
        return Err(KernelError::NoSuchId);
    }
    if block.handler(kind).is_none() {
        return Err(KernelError::NoSuchId);
    }
    block.raise(kind);
    Ok(())
}
