//! The system-wide sleep queue.
//!
//! One deadline-ordered list threaded through the TCB arena.

use utk_abi::{KernelError, KernelResult, ThreadState, WaitResource};

use crate::queue::{drain_while, list_insert_sorted};
use crate::state::{self, SchedulerState};
use crate::tcb::Arena;

/// `sched_sleep`: parks the calling thread until
/// `time_uptime_ns() + ns`, ordered by absolute deadline, FIFO within
/// ties. Rejected from the idle thread, which never sleeps.
pub fn sched_sleep(ns: u64) -> KernelResult<()> {
    let caller_index = state::with_state(|state| -> KernelResult<u32> {
        let cpu = utk_lib::current_cpu_id();
        let caller_index = state.percpu[cpu].current.ok_or(KernelError::NoSuchId)?;

        {
            let tcb = state
                .arena
                .get_by_index_mut(caller_index)
                .ok_or(KernelError::NoSuchId)?;
            if tcb.is_idle {
                return Err(KernelError::UnauthorizedAction);
            }
            let deadline = utk_timer::uptime_ns().saturating_add(ns);
            tcb.state = ThreadState::Sleeping;
            tcb.wait_resource = WaitResource::Sleep;
            tcb.wake_deadline_ns = deadline;
        }

        let SchedulerState {
            arena, sleep_head, ..
        } = state;
        list_insert_sorted(arena, sleep_head, caller_index, |t| t.wake_deadline_ns);
        Ok(caller_index)
    })?;

    crate::dispatch::reschedule_after_block(caller_index);
    Ok(())
}

/// Drain and wake every sleeper whose deadline has passed, called once per MAIN
/// tick from [`crate::dispatch::on_main_tick`].
pub(crate) fn drain_expired(state: &mut SchedulerState) {
    let now = utk_timer::uptime_ns();
    let mut woken = [0u32; utk_abi::thread::MAX_THREADS];
    let mut count = 0usize;

    {
        let SchedulerState {
            arena,
            sleep_head,
            sleep_tail,
            ..
        } = state;
        drain_while(
            arena,
            sleep_head,
            sleep_tail,
            |t| t.wake_deadline_ns,
            |deadline| deadline <= now,
            |_arena: &mut Arena, index: u32| {
                if count < woken.len() {
                    woken[count] = index;
                    count += 1;
                }
            },
        );
    }

    for index in &woken[..count] {
        crate::dispatch::wake_thread(state, *index);
    }
}
