//! The scheduler-side half of signal delivery: thread lookup
//! plus the thread lock live here, not in `utk-signal`, which only owns the
//! pure bitmask/handler-table logic. Exposed so the exception manager's
//! stubs and the return-from-interrupt path (both wired up by the `kernel`
//! integration crate, which depends on this one) never need to reach into
//! [`state::SchedulerState`] themselves.

use utk_abi::{KernelError, KernelResult, SignalKind, ThreadId};

use crate::state;

/// `signal_register`, addressed by [`ThreadId`] rather than a
/// live `&mut SignalBlock` since callers outside this crate never hold one
/// directly, since the TCB is private to the scheduler arena.
pub fn sched_signal_register(
    thread: ThreadId,
    kind: SignalKind,
    handler: Option<utk_abi::SignalHandler>,
) -> KernelResult<()> {
    state::with_state(|state| {
        let tcb = state.arena.get_mut(thread).ok_or(KernelError::NoSuchId)?;
        utk_signal::signal_register(&mut tcb.signals, kind, handler);
        Ok(())
    })
}

/// `signal_raise`: sets `kind` pending on `thread`, provided it
/// isn't a zombie and has a handler installed.
pub fn sched_signal_raise(thread: ThreadId, kind: SignalKind) -> KernelResult<()> {
    state::with_state(|state| {
        let tcb = state.arena.get_mut(thread).ok_or(KernelError::NoSuchId)?;
        let is_zombie = tcb.is_zombie();
        utk_signal::signal_raise(&mut tcb.signals, is_zombie, kind)
    })
}

/// Raise `kind` on whichever thread is current on this CPU, the shape the
/// exception manager's stubs actually need.
pub fn sched_signal_raise_current(kind: SignalKind) -> KernelResult<()> {
    state::with_state(|state| {
        let cpu = utk_lib::current_cpu_id();
        let index = state.percpu[cpu].current.ok_or(KernelError::NoSuchId)?;
        let tcb = state
            .arena
            .get_by_index_mut(index)
            .ok_or(KernelError::NoSuchId)?;
        let is_zombie = tcb.is_zombie();
        utk_signal::signal_raise(&mut tcb.signals, is_zombie, kind)
    })
}

/// The return-from-interrupt dispatch point: if the current
/// thread has a dispatchable pending signal, rewrite its saved `VcpuFrame`
/// to enter the handler on resume. Called by the `kernel` crate's vector
/// entry immediately before `schedule_no_int`.
pub fn sched_dispatch_pending_signal() -> Option<SignalKind> {
    state::with_state(|state| {
        let cpu = utk_lib::current_cpu_id();
        let index = state.percpu[cpu].current?;
        let tcb = state.arena.get_by_index_mut(index)?;
        // SAFETY: `tcb.vcpu`'s stack pointer addresses this thread's own
        // live kernel stack; it is the thread currently executing.
        unsafe { utk_signal::dispatch_on_return(&mut tcb.signals, &mut tcb.vcpu) }
    })
}
