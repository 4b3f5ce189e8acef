//! Thread creation, exit, and join.
//!
//! Stack allocation, initial register-frame setup, and the free-list
//! return on destroy, all built on the arena of [`crate::tcb`] and the
//! typed [`VcpuFrame`] accessors of `utk-abi` instead of raw field writes.

use utk_abi::{
    AffinityMask, CpuId, KernelError, KernelResult, Priority, SignalBlock, StackAllocation,
    TerminationCause, ThreadId, ThreadState, VcpuFrame, WaitResource,
};
use utk_lib::{RingBuffer, klog_info};

use crate::queue::bucket_push_tail;
use crate::state::{self, SchedulerState};
use crate::tcb::{Tcb, ThreadEntry, empty_resource_fill};

/// The address every newly-created thread's `VcpuFrame` resumes at. Reads
/// the entry point and argument back out of the TCB (by CPU id, via
/// [`state::with_state`]) instead of recovering them from registers, so no
/// architecture-specific trampoline assembly is needed here: jumping to a
/// trampoline that invokes `entry(arg)` and then routes through
/// `sched_thread_exit` is satisfied entirely in safe Rust. The
/// out-of-scope CPU glue only needs to resume the frame; this function
/// does the rest.
extern "C" fn kernel_thread_trampoline() -> ! {
    let retval = state::with_state(|state| {
        let cpu = utk_lib::current_cpu_id();
        let index = state.percpu[cpu]
            .current
            .expect("trampoline entered with no current thread");
        let tcb = state
            .arena
            .get_by_index_mut(index)
            .expect("current thread vanished from arena");
        (tcb.entry, tcb.entry_arg)
    });
    let (entry, arg) = retval;
    let result = entry(arg);
    crate::dispatch::sched_thread_exit(TerminationCause::Returned, result);
}

/// Pick the least-loaded CPU within `affinity`.
/// Load is approximated as the number of threads currently owned by that
/// CPU (ready buckets plus its current slot), which is what's available
/// without waiting out a load-accounting window at creation time.
fn least_loaded_cpu(state: &SchedulerState, affinity: AffinityMask) -> CpuId {
    let mut best_cpu = None;
    let mut best_load = u32::MAX;
    for cpu in affinity.iter() {
        if state::cpu_index(cpu) >= state.cfg.cpu_count {
            continue;
        }
        let per_cpu = &state.percpu[state::cpu_index(cpu)];
        let load: u32 =
            per_cpu.buckets.iter().map(|b| b.len).sum::<u32>() + per_cpu.current.is_some() as u32;
        if load < best_load {
            best_load = load;
            best_cpu = Some(cpu);
        }
    }
    best_cpu.unwrap_or_else(|| affinity.iter().next().expect("affinity is non-empty"))
}

fn validate_stack_size(state: &SchedulerState, stack_size: usize) -> KernelResult<()> {
    if stack_size == 0 || stack_size % state.cfg.page_size != 0 {
        return Err(KernelError::UnauthorizedAction);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_tcb(
    kernel_cs: u64,
    id: ThreadId,
    name: &'static str,
    priority: Priority,
    affinity: AffinityMask,
    home_cpu: CpuId,
    entry: ThreadEntry,
    arg: usize,
    stack: StackAllocation,
    is_idle: bool,
) -> Tcb {
    let mut signals = SignalBlock::new();
    utk_signal::install_default_handlers(&mut signals);

    let vcpu = VcpuFrame::for_new_kernel_thread(
        kernel_thread_trampoline as usize as u64,
        0,
        stack.top as u64,
        kernel_cs,
    );

    Tcb {
        id,
        name,
        base_priority: priority,
        current_priority: priority,
        affinity,
        home_cpu,
        state: ThreadState::Ready,
        wait_resource: WaitResource::None,
        wake_deadline_ns: 0,
        vcpu,
        stack,
        signals,
        resources: RingBuffer::new_with(empty_resource_fill()),
        entry,
        entry_arg: arg,
        termination: None,
        joiner: None,
        next: None,
        is_idle,
        wait_wake_destroyed: false,
    }
}

/// `sched_create_kernel_thread`. Allocates a TCB and a
/// page-aligned stack, wires the VCPU frame through
/// [`kernel_thread_trampoline`], copies in the default signal table, and
/// enqueues the new thread READY on its placement CPU.
pub fn sched_create_kernel_thread(
    name: &'static str,
    priority: Priority,
    stack_size: usize,
    affinity: AffinityMask,
    entry: ThreadEntry,
    arg: usize,
) -> KernelResult<ThreadId> {
    state::with_state(|state| {
        validate_stack_size(state, stack_size)?;
        let home_cpu = least_loaded_cpu(state, affinity);
        let stack = state
            .stack_allocator
            .alloc_stack(stack_size)
            .map_err(|_| KernelError::NoMoreMemory)?;

        let cpu_idx = state::cpu_index(home_cpu);
        let kernel_cs = state.kernel_cs;
        let build_result = state.arena.alloc(|id| {
            build_tcb(
                kernel_cs, id, name, priority, affinity, home_cpu, entry, arg, stack, false,
            )
        });

        let id = match build_result {
            Ok(id) => id,
            Err(e) => {
                state.stack_allocator.dealloc_stack(stack);
                return Err(e);
            }
        };

        let index = id.index() as u32;
        if let Some(bucket_idx) = priority.bucket_index() {
            let arena = &mut state.arena;
            bucket_push_tail(arena, &mut state.percpu[cpu_idx].buckets[bucket_idx], index);
        }
        klog_info!("sched: thread {} created on cpu {}", name, cpu_idx);
        Ok(id)
    })
}

/// Bootstrap a CPU's idle thread: priority
/// `IDLE`, pinned to exactly one CPU, never enqueued in a priority bucket
/// (it has none), reached only when every bucket is empty.
pub(crate) fn create_idle_thread(
    state: &mut SchedulerState,
    cpu: CpuId,
    entry: ThreadEntry,
) -> KernelResult<ThreadId> {
    let stack = state
        .stack_allocator
        .alloc_stack(state.cfg.page_size)
        .map_err(|_| KernelError::NoMoreMemory)?;
    let affinity = AffinityMask::single(cpu);
    let kernel_cs = state.kernel_cs;
    let id = state
        .arena
        .alloc(|id| {
            build_tcb(
                kernel_cs,
                id,
                "idle",
                Priority::IDLE,
                affinity,
                cpu,
                entry,
                0,
                stack,
                true,
            )
        })
        .inspect_err(|_| state.stack_allocator.dealloc_stack(stack))?;
    state.percpu[state::cpu_index(cpu)].idle = Some(id.index() as u32);
    Ok(id)
}

/// `sched_join`: blocks until `target` reaches `ZOMBIE`, copies
/// out the recorded cause/retval, and frees its TCB and stack.
pub fn sched_join(target: ThreadId) -> KernelResult<(TerminationCause, u64)> {
    enum Outcome {
        Done(TerminationCause, u64),
        Blocked(u32),
    }

    loop {
        let outcome = state::with_state(|state| -> KernelResult<Outcome> {
            let cpu = utk_lib::current_cpu_id();
            let caller_index = state.percpu[cpu].current.ok_or(KernelError::NoSuchId)?;

            let is_zombie_already = {
                let target_tcb = state.arena.get(target).ok_or(KernelError::NoSuchId)?;
                target_tcb.is_zombie()
            };

            if is_zombie_already {
                let termination = state
                    .arena
                    .get(target)
                    .and_then(|t| t.termination)
                    .ok_or(KernelError::NoSuchId)?;
                let tcb = state.arena.free(target).ok_or(KernelError::NoSuchId)?;
                state.stack_allocator.dealloc_stack(tcb.stack);
                return Ok(Outcome::Done(termination.cause, termination.retval));
            }

            // Park the caller; woken by `sched_thread_exit` on `target`.
            let caller = state
                .arena
                .get_by_index_mut(caller_index)
                .ok_or(KernelError::NoSuchId)?;
            caller.state = ThreadState::Waiting;
            caller.wait_resource = WaitResource::Join(target.index() as u32);
            if let Some(target_tcb) = state.arena.get_mut(target) {
                target_tcb.joiner = Some(caller_index);
            }
            state.percpu[cpu].current = None;
            Ok(Outcome::Blocked(caller_index))
        })?;

        match outcome {
            Outcome::Done(cause, retval) => return Ok((cause, retval)),
            Outcome::Blocked(caller_index) => crate::dispatch::reschedule_after_block(caller_index),
        }
    }
}
