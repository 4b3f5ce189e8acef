//! `critical_enter`/`critical_exit`: the cheapest concurrency
//! primitive, disabling interrupts on the current CPU for a short,
//! non-contended section and restore whatever the state was before. Unlike
//! [`Spinlock`](crate::spinlock::Spinlock) there is no CAS word to spin on;
//! this is just the save/disable/restore pattern by itself, used where a
//! section touches only CPU-local state.
//!
//! Built on the `x86_64` crate's typed `interrupts::are_enabled`/`enable`/
//! `disable` rather than hand-rolled `pushfq`/`popfq` inline assembly.

use x86_64::instructions::interrupts;

/// Opaque token returned by [`critical_enter`]; pass it to [`critical_exit`]
/// to restore the prior interrupt-enable state. Values are not
/// `Copy`-shareable across CPUs: each must be exited on the CPU that
/// produced it, and no cross-CPU restoration is allowed.
#[derive(Debug)]
pub struct CriticalState {
    was_enabled: bool,
}

/// Disable interrupts on the current CPU, remembering whether they were
/// enabled beforehand.
#[inline]
pub fn critical_enter() -> CriticalState {
    let was_enabled = interrupts::are_enabled();
    interrupts::disable();
    CriticalState { was_enabled }
}

/// Restore the interrupt-enable state captured by the matching
/// [`critical_enter`].
#[inline]
pub fn critical_exit(state: CriticalState) {
    if state.was_enabled {
        interrupts::enable();
    }
}
