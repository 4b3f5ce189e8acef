//! The dedicated deferred-ISR worker thread.
//!
//! `utk-interrupt` owns the job queue but can't depend back on this crate,
//! so the hookup runs the other way: this module creates the semaphore,
//! registers it as `utk-interrupt`'s post-on-enqueue notifier, and spawns
//! the worker thread that waits on it.

use core::sync::atomic::{AtomicU32, Ordering};

use utk_abi::{AffinityMask, KernelResult, Priority};

use crate::lifecycle::sched_create_kernel_thread;
use crate::semaphore::{QueueDiscipline, sem_init, sem_post, sem_wait};

const WORKER_STACK_SIZE: usize = 4096 * 4;
const NO_SEMAPHORE: u32 = u32::MAX;

static WORKER_SEMAPHORE: AtomicU32 = AtomicU32::new(NO_SEMAPHORE);

fn notify_worker() {
    let id = WORKER_SEMAPHORE.load(Ordering::Acquire);
    if id != NO_SEMAPHORE {
        let _ = sem_post(id);
    }
}

fn worker_loop(_arg: usize) -> u64 {
    let id = WORKER_SEMAPHORE.load(Ordering::Acquire);
    loop {
        let _ = sem_wait(id);
        while utk_interrupt::deferred_run_one() {}
    }
}

/// Spawn the worker thread at `Priority::HIGHEST`, pinned to no particular
/// CPU (placement follows the usual least-loaded rule).
pub(crate) fn spawn() -> KernelResult<()> {
    let id = sem_init(0, QueueDiscipline::Fifo)?;
    WORKER_SEMAPHORE.store(id, Ordering::Release);
    utk_interrupt::deferred_set_notify(notify_worker);
    sched_create_kernel_thread(
        "deferred-isr",
        Priority::HIGHEST,
        WORKER_STACK_SIZE,
        AffinityMask::all(),
        worker_loop,
        0,
    )?;
    Ok(())
}
