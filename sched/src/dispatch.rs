//! Dispatch policy and the suspension/resume machinery shared by every
//! blocking call.
//!
//! Splits "decide the next task" from "perform the actual register swap":
//! the latter is a registered routine, since the register-level work has
//! no pure-Rust representation here. `sched_schedule_no_int` is the
//! non-quantum-consuming variant called after a deferred-ISR handler
//! runs; `schedule_tick` is the quantum-aware variant driven by the MAIN
//! timer.

use utk_abi::{CpuId, Priority, TerminationCause, ThreadState, VcpuFrame, WaitResource};
use utk_lib::{current_cpu, current_cpu_id};

use crate::glue;
use crate::percpu::PerCpu;
use crate::queue::{bucket_pop_head, bucket_push_tail};
use crate::state::{self, SchedulerState};
use crate::tcb::{Arena, Termination};

/// Pop the next thread to run on this CPU: the lowest-numbered non-empty
/// bucket's head, or the idle thread if every bucket is empty.
fn pop_next_ready(arena: &mut Arena, per_cpu: &mut PerCpu) -> u32 {
    match per_cpu.highest_ready_bucket() {
        Some(bucket_idx) => bucket_pop_head(arena, &mut per_cpu.buckets[bucket_idx])
            .expect("non-empty bucket reported by highest_ready_bucket"),
        None => per_cpu.idle.expect("per-CPU idle thread not installed"),
    }
}

/// Transition `index` (currently `SLEEPING`/`WAITING`) back to `READY` and
/// enqueue it on its home CPU. Cross-CPU enqueue takes only the one scheduler lock
/// already held by the caller.
pub(crate) fn wake_thread(state: &mut SchedulerState, index: u32) {
    let (home_cpu, priority) = match state.arena.get_by_index_mut(index) {
        Some(tcb) => {
            tcb.state = ThreadState::Ready;
            tcb.wait_resource = WaitResource::None;
            (tcb.home_cpu, tcb.current_priority)
        }
        None => return,
    };
    if let Some(bucket_idx) = priority.bucket_index() {
        let cpu_idx = state::cpu_index(home_cpu);
        let arena = &mut state.arena;
        bucket_push_tail(arena, &mut state.percpu[cpu_idx].buckets[bucket_idx], index);
    }
}

/// Move `old_index` off the CPU (its state/queue membership must already
/// reflect where it's going: `READY`+enqueued, `SLEEPING`, `WAITING`, or
/// `ZOMBIE`), pick the next thread, and return the raw frame pointers for
/// the caller to hand to [`glue::context_switch`] once the scheduler lock
/// is released.
fn switch_away(
    state: &mut SchedulerState,
    cpu_idx: usize,
    old_index: u32,
) -> (*mut VcpuFrame, *const VcpuFrame) {
    let new_index = pop_next_ready(&mut state.arena, &mut state.percpu[cpu_idx]);
    state.percpu[cpu_idx].current = Some(new_index);
    state.percpu[cpu_idx].ticks_since_switch = 0;
    if let Some(new_tcb) = state.arena.get_by_index_mut(new_index) {
        new_tcb.state = ThreadState::Running;
    }
    let new_ptr: *const VcpuFrame = &state.arena.get_by_index_mut(new_index).unwrap().vcpu;
    let old_ptr: *mut VcpuFrame = &mut state.arena.get_by_index_mut(old_index).unwrap().vcpu;
    (old_ptr, new_ptr)
}

/// Called by every blocking path (`sched_sleep`, `sem_wait`, `sched_join`)
/// once it has already marked `old_index` `SLEEPING`/`WAITING` and, for
/// `sem_wait`/`sched_sleep`, inserted it into the relevant wait structure
/// under the same [`state::with_state`] call. Picks the next thread and
/// performs the real switch outside the lock.
pub(crate) fn reschedule_after_block(old_index: u32) {
    let cpu_idx = current_cpu_id();
    let (old_ptr, new_ptr) = state::with_state(|state| switch_away(state, cpu_idx, old_index));
    // SAFETY: both point at live VcpuFrames owned by TCBs the scheduler
    // just transitioned out of / into `Running`.
    unsafe { glue::context_switch(old_ptr, new_ptr) };
}

/// First thread a CPU ever runs, chosen once at boot. The caller (the
/// out-of-scope boot glue) is expected to resume this thread's `VcpuFrame`
/// directly rather than falling through a `context_switch`.
pub fn bootstrap_current(cpu: CpuId) -> VcpuFrame {
    state::with_state(|state| {
        let cpu_idx = state::cpu_index(cpu);
        let index = pop_next_ready(&mut state.arena, &mut state.percpu[cpu_idx]);
        state.percpu[cpu_idx].current = Some(index);
        let tcb = state
            .arena
            .get_by_index_mut(index)
            .expect("bootstrapped thread vanished");
        tcb.state = ThreadState::Running;
        tcb.vcpu
    })
}

/// `sched_schedule_no_int`.
/// Switches only if a strictly higher-priority thread (lower number) than
/// the one currently running is ready; never consumes a quantum tick.
pub fn schedule_no_int() {
    let cpu_idx = current_cpu_id();
    let switch = state::with_state(|state| -> Option<(*mut VcpuFrame, *const VcpuFrame)> {
        let per_cpu = &mut state.percpu[cpu_idx];
        let old_index = per_cpu.current?;
        let old_priority = state.arena.get_by_index_mut(old_index)?.current_priority;
        let head_bucket = per_cpu.highest_ready_bucket()?;

        let should_preempt = old_priority.is_idle() || (old_priority.get() as usize) > head_bucket;
        if !should_preempt {
            return None;
        }

        let new_index = bucket_pop_head(
            &mut state.arena,
            &mut state.percpu[cpu_idx].buckets[head_bucket],
        )?;
        requeue_preempted(state, cpu_idx, old_index);
        state.percpu[cpu_idx].current = Some(new_index);
        state.percpu[cpu_idx].ticks_since_switch = 0;
        if let Some(new_tcb) = state.arena.get_by_index_mut(new_index) {
            new_tcb.state = ThreadState::Running;
        }
        let new_ptr: *const VcpuFrame = &state.arena.get_by_index_mut(new_index).unwrap().vcpu;
        let old_ptr: *mut VcpuFrame = &mut state.arena.get_by_index_mut(old_index).unwrap().vcpu;
        Some((old_ptr, new_ptr))
    });

    if let Some((old_ptr, new_ptr)) = switch {
        unsafe { glue::context_switch(old_ptr, new_ptr) };
    }
}

/// Put a preempted (still runnable) thread back on its own CPU's ready
/// bucket, `READY`: enqueue current at the tail of its own bucket.
fn requeue_preempted(state: &mut SchedulerState, cpu_idx: usize, index: u32) {
    let priority = match state.arena.get_by_index_mut(index) {
        Some(tcb) => {
            tcb.state = ThreadState::Ready;
            tcb.current_priority
        }
        None => return,
    };
    if let Some(bucket_idx) = priority.bucket_index() {
        let arena = &mut state.arena;
        bucket_push_tail(arena, &mut state.percpu[cpu_idx].buckets[bucket_idx], index);
    }
}

/// The MAIN-timer-driven tick entry. Drains
/// the sleep queue, then applies strict-priority preemption and
/// same-priority round-robin.
pub(crate) fn on_main_tick() {
    let cpu = current_cpu();
    let cpu_idx = state::cpu_index(cpu);

    let switch = state::with_state(|state| -> Option<(*mut VcpuFrame, *const VcpuFrame)> {
        crate::sleep::drain_expired(state);
        crate::load::record_tick(state, cpu_idx);

        let old_index = state.percpu[cpu_idx].current?;
        let old_priority = state.arena.get_by_index_mut(old_index)?.current_priority;
        let quantum = state.cfg.quantum_ticks;

        match state.percpu[cpu_idx].highest_ready_bucket() {
            None => {
                state.percpu[cpu_idx].ticks_since_switch = 0;
                None
            }
            Some(head_bucket) => {
                if old_priority.is_idle() || (old_priority.get() as usize) > head_bucket {
                    let new_index = bucket_pop_head(
                        &mut state.arena,
                        &mut state.percpu[cpu_idx].buckets[head_bucket],
                    )?;
                    requeue_preempted(state, cpu_idx, old_index);
                    finish_switch(state, cpu_idx, old_index, new_index)
                } else if (old_priority.get() as usize) == head_bucket {
                    state.percpu[cpu_idx].ticks_since_switch += 1;
                    if state.percpu[cpu_idx].ticks_since_switch < quantum {
                        return None;
                    }
                    requeue_preempted(state, cpu_idx, old_index);
                    let new_index = bucket_pop_head(
                        &mut state.arena,
                        &mut state.percpu[cpu_idx].buckets[head_bucket],
                    )?;
                    finish_switch(state, cpu_idx, old_index, new_index)
                } else {
                    state.percpu[cpu_idx].ticks_since_switch = 0;
                    None
                }
            }
        }
    });

    if let Some((old_ptr, new_ptr)) = switch {
        unsafe { glue::context_switch(old_ptr, new_ptr) };
    }
}

fn finish_switch(
    state: &mut SchedulerState,
    cpu_idx: usize,
    old_index: u32,
    new_index: u32,
) -> Option<(*mut VcpuFrame, *const VcpuFrame)> {
    if old_index == new_index {
        // Round-robin within a singleton bucket: nothing actually moved.
        if let Some(tcb) = state.arena.get_by_index_mut(old_index) {
            tcb.state = ThreadState::Running;
        }
        state.percpu[cpu_idx].current = Some(old_index);
        state.percpu[cpu_idx].ticks_since_switch = 0;
        return None;
    }
    state.percpu[cpu_idx].current = Some(new_index);
    state.percpu[cpu_idx].ticks_since_switch = 0;
    if let Some(new_tcb) = state.arena.get_by_index_mut(new_index) {
        new_tcb.state = ThreadState::Running;
    }
    let new_ptr: *const VcpuFrame = &state.arena.get_by_index_mut(new_index).unwrap().vcpu;
    let old_ptr: *mut VcpuFrame = &mut state.arena.get_by_index_mut(old_index).unwrap().vcpu;
    Some((old_ptr, new_ptr))
}

/// `sched_thread_exit`. Marks the calling
/// thread `ZOMBIE`, drains its owned resources, records the outcome, wakes
/// a parked joiner if any, and switches away; the exited thread's frame
/// is never resumed again.
pub fn sched_thread_exit(cause: TerminationCause, retval: u64) -> ! {
    let cpu_idx = current_cpu_id();
    let (old_ptr, new_ptr) = state::with_state(|state| {
        let old_index = state.percpu[cpu_idx]
            .current
            .expect("thread_exit with no current thread");

        let joiner = if let Some(tcb) = state.arena.get_by_index_mut(old_index) {
            while let Some(resource) = tcb.resources.try_pop() {
                (resource.release)(resource.arg);
            }
            tcb.state = ThreadState::Zombie;
            tcb.termination = Some(Termination { cause, retval });
            tcb.joiner.take()
        } else {
            None
        };

        if let Some(joiner_index) = joiner {
            wake_thread(state, joiner_index);
        }

        switch_away(state, cpu_idx, old_index)
    });

    unsafe { glue::context_switch(old_ptr, new_ptr) };
    unreachable!("a zombie thread's frame was resumed")
}

/// `sched_cpu_load`'s bucket-search peer: whether `priority` is strictly
/// more urgent than everything currently ready on `cpu` (used by
/// `utk-syscall`'s yield entry to decide whether giving up the remaining
/// quantum actually changes anything).
pub fn would_preempt(cpu: CpuId, priority: Priority) -> bool {
    state::with_state(|state| {
        let cpu_idx = state::cpu_index(cpu);
        match state.percpu[cpu_idx].highest_ready_bucket() {
            Some(head_bucket) => (priority.get() as usize) < head_bucket,
            None => false,
        }
    })
}
