//! The single global scheduler state: the TCB arena, one [`PerCpu`] per
//! compiled-in CPU, and the system-wide sleep queue.
//!
//! A scheduling structure per lock (a `ready_queue` lock, a separate
//! sleep-queue lock, a per-TCB lock) names a fixed acquisition order
//! (run-queue, then thread) to avoid deadlock; this rewrite instead folds
//! all of it into a single [`utk_lib::Spinlock`] guarding the whole
//! `SchedulerState`. One coarse lock preserves every ordering and
//! mutual-exclusion invariant the scattered-lock design would need, without
//! the cross-lock handoff bugs that would otherwise need careful proof in
//! a crate nobody can compile here. Semaphores (`crate::semaphore`) are
//! folded into the same lock rather than given one of their own: a
//! semaphore's wait queue is linked through the same TCB arena `next`
//! field as the ready buckets and the sleep queue, so a separate lock
//! would only add a second acquisition order to prove correct for no real
//! concurrency benefit.

use core::cell::UnsafeCell;

use utk_abi::thread::MAX_CPUS;
use utk_abi::{CpuId, KernelConfig, StackAllocator};
use utk_lib::Spinlock;

use crate::percpu::PerCpu;
use crate::semaphore::{self, Semaphore};
use crate::tcb::Arena;

pub struct SchedulerState {
    pub arena: Arena,
    pub percpu: [PerCpu; MAX_CPUS],
    pub sleep_head: Option<u32>,
    pub sleep_tail: Option<u32>,
    pub(crate) semaphores: [Semaphore; semaphore::MAX_SEMAPHORES],
    pub cfg: KernelConfig,
    pub kernel_cs: u64,
    pub stack_allocator: &'static dyn StackAllocator,
}

impl SchedulerState {
    fn new(
        cfg: KernelConfig,
        kernel_cs: u64,
        stack_allocator: &'static dyn StackAllocator,
    ) -> SchedulerState {
        SchedulerState {
            arena: Arena::new(),
            percpu: [PerCpu::empty(); MAX_CPUS],
            sleep_head: None,
            sleep_tail: None,
            semaphores: semaphore::empty_pool(),
            cfg,
            kernel_cs,
            stack_allocator,
        }
    }
}

struct StateCell(UnsafeCell<Option<SchedulerState>>);
// SAFETY: every access goes through `LOCK`.
unsafe impl Sync for StateCell {}

static LOCK: Spinlock = Spinlock::new();
static STATE: StateCell = StateCell(UnsafeCell::new(None));

/// Construct the global scheduler state. Called exactly once, from
/// `utk_sched::sched_init`.
pub fn install(cfg: KernelConfig, kernel_cs: u64, stack_allocator: &'static dyn StackAllocator) {
    LOCK.acquire();
    unsafe {
        let slot = &mut *STATE.0.get();
        assert!(slot.is_none(), "scheduler state already installed");
        *slot = Some(SchedulerState::new(cfg, kernel_cs, stack_allocator));
    }
    LOCK.release();
}

pub fn is_installed() -> bool {
    LOCK.acquire();
    let installed = unsafe { (*STATE.0.get()).is_some() };
    LOCK.release();
    installed
}

/// Run `f` with exclusive access to the scheduler state. Panics if
/// [`install`] has not run yet; every public entry point in this crate
/// requires `sched_init` to have completed first.
pub fn with_state<R>(f: impl FnOnce(&mut SchedulerState) -> R) -> R {
    LOCK.acquire();
    let result = unsafe {
        let state = (*STATE.0.get())
            .as_mut()
            .expect("scheduler used before sched_init");
        f(state)
    };
    LOCK.release();
    result
}

pub fn cpu_index(cpu: CpuId) -> usize {
    cpu.get()
}
