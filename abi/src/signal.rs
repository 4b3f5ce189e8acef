//! The signal subsystem's per-thread kind taxonomy.

/// One bit of the per-thread pending mask; also the index into the
/// per-thread handler table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignalKind {
    /// Illegal instruction.
    Ill = 0,
    /// Floating point / arithmetic exception (also used for divide-by-zero).
    Fpe = 1,
    /// Forced termination, raised by `signal_raise(thread, Kill)`.
    Kill = 2,
    /// Invalid memory reference.
    Segv = 3,
    /// User-defined signal 1.
    Usr1 = 4,
    /// User-defined signal 2.
    Usr2 = 5,
    /// Generic CPU exception with no more specific mapping.
    Exc = 6,
}

/// Total number of signal kinds; sizes the per-thread handler table and the
/// pending bitmask.
pub const NUM_SIGNALS: usize = 7;

impl SignalKind {
    pub const ALL: [SignalKind; NUM_SIGNALS] = [
        SignalKind::Ill,
        SignalKind::Fpe,
        SignalKind::Kill,
        SignalKind::Segv,
        SignalKind::Usr1,
        SignalKind::Usr2,
        SignalKind::Exc,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as u8 as usize
    }

    #[inline]
    pub const fn mask_bit(self) -> u64 {
        1u64 << self.index()
    }

    /// Signals with a mandatory default handler that terminates the thread
    ///. USR1/USR2/EXC have no default handler.
    #[inline]
    pub const fn has_default_terminating_handler(self) -> bool {
        matches!(
            self,
            SignalKind::Kill | SignalKind::Segv | SignalKind::Fpe | SignalKind::Ill
        )
    }
}

/// A handler entry: `None` means "no handler installed", matching spec
/// §4.4's "provided... a handler is installed" gate on `signal_raise`. The
/// handler runs with the original return address pushed onto the thread's
/// stack; a handler that returns normally resumes the
/// interrupted code, one that never returns (the default KILL/SEGV/FPE/ILL
/// handlers) instead falls into `sched_thread_exit`.
pub type SignalHandler = fn();

/// Per-thread signal state, embedded directly in the TCB so `utk-sched`
/// doesn't need to depend on `utk-signal` just to store it; `utk-signal`
/// is the only crate that mutates it through `signal_register`/`signal_raise`.
#[derive(Debug, Clone, Copy)]
pub struct SignalBlock {
    pending: u64,
    handlers: [Option<SignalHandler>; NUM_SIGNALS],
}

impl SignalBlock {
    pub const fn new() -> SignalBlock {
        SignalBlock {
            pending: 0,
            handlers: [None; NUM_SIGNALS],
        }
    }

    pub fn set_handler(&mut self, kind: SignalKind, handler: Option<SignalHandler>) {
        self.handlers[kind.index()] = handler;
    }

    pub fn handler(&self, kind: SignalKind) -> Option<SignalHandler> {
        self.handlers[kind.index()]
    }

    pub fn raise(&mut self, kind: SignalKind) {
        self.pending |= kind.mask_bit();
    }

    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// The highest-numbered pending signal with a non-null handler, cleared
    /// as a side effect. `None` if nothing
    /// dispatchable is pending.
    pub fn take_highest_dispatchable(&mut self) -> Option<(SignalKind, SignalHandler)> {
        for kind in SignalKind::ALL.iter().rev() {
            if self.pending & kind.mask_bit() != 0 {
                if let Some(handler) = self.handlers[kind.index()] {
                    self.pending &= !kind.mask_bit();
                    return Some((*kind, handler));
                }
            }
        }
        None
    }
}

impl Default for SignalBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_bits_are_distinct() {
        let mut seen = 0u64;
        for kind in SignalKind::ALL {
            assert_eq!(seen & kind.mask_bit(), 0);
            seen |= kind.mask_bit();
        }
    }

    #[test]
    fn only_core_faults_have_default_handlers() {
        assert!(SignalKind::Kill.has_default_terminating_handler());
        assert!(SignalKind::Segv.has_default_terminating_handler());
        assert!(SignalKind::Fpe.has_default_terminating_handler());
        assert!(SignalKind::Ill.has_default_terminating_handler());
        assert!(!SignalKind::Usr1.has_default_terminating_handler());
        assert!(!SignalKind::Usr2.has_default_terminating_handler());
        assert!(!SignalKind::Exc.has_default_terminating_handler());
    }

    fn noop() {}

    #[test]
    fn raise_without_handler_is_not_dispatchable() {
        let mut block = SignalBlock::new();
        block.raise(SignalKind::Usr1);
        assert!(block.take_highest_dispatchable().is_none());
        assert_ne!(block.pending(), 0);
    }

    #[test]
    fn dispatch_takes_highest_numbered_first_and_clears_bit() {
        let mut block = SignalBlock::new();
        block.set_handler(SignalKind::Ill, Some(noop));
        block.set_handler(SignalKind::Kill, Some(noop));
        block.raise(SignalKind::Ill);
        block.raise(SignalKind::Kill);
        let (kind, _) = block.take_highest_dispatchable().unwrap();
        assert_eq!(kind, SignalKind::Kill);
        let (kind, _) = block.take_highest_dispatchable().unwrap();
        assert_eq!(kind, SignalKind::Ill);
        assert!(block.take_highest_dispatchable().is_none());
    }
}
