//! Read-only scheduler diagnostics for `utk-panic` and `utk-tests`. Nothing here blocks, posts, or
//! mutates state beyond what a snapshot read requires.

use utk_abi::{Priority, ThreadId};

use crate::state;

/// A point-in-time copy of the running thread's identity, cheap enough to
/// take from inside a panic handler with interrupts already disabled.
#[derive(Debug, Clone, Copy)]
pub struct ThreadDiag {
    pub id: ThreadId,
    pub name: &'static str,
    pub priority: Priority,
}

/// The thread currently running on this CPU, if the scheduler has been
/// installed and a thread is actually current (both false only during the
/// narrow window before `bootstrap_current` runs).
pub fn sched_current_thread() -> Option<ThreadDiag> {
    if !state::is_installed() {
        return None;
    }
    state::with_state(|state| {
        let cpu = utk_lib::current_cpu_id();
        let index = state.percpu.get(cpu)?.current?;
        let tcb = state.arena.get_by_index_mut(index)?;
        Some(ThreadDiag {
            id: tcb.id,
            name: tcb.name,
            priority: tcb.current_priority,
        })
    })
}
