//! Priority-based preemptive scheduler.
//!
//! Owns the TCB arena, one ready-bucket set per CPU, the system-wide sleep
//! queue, and the semaphore pool; everything that would otherwise need a
//! carefully proven lock order collapses here into the single
//! [`utk_lib::Spinlock`] documented in [`state`]. Three boundaries are
//! crossed with a registered callback instead of a direct call, the same
//! shape used throughout this workspace to avoid a dependency cycle:
//! the real context switch ([`glue::ContextSwitch`], installed by the
//! out-of-scope CPU/boot layer), the MAIN-timer tick sink
//! ([`utk_timer::register_sched_sink`]), and the deferred-ISR notifier
//! ([`utk_interrupt::deferred_set_notify`], wired up in
//! [`deferred_worker`]).

#![no_std]

mod deferred_worker;
mod diag;
mod dispatch;
mod glue;
mod idle;
mod lifecycle;
mod load;
mod percpu;
mod queue;
mod semaphore;
mod signal_bridge;
mod sleep;
mod state;
mod tcb;

use utk_abi::{CpuId, KernelConfig, KernelResult, StackAllocator};

pub use diag::{ThreadDiag, sched_current_thread};
pub use dispatch::{sched_thread_exit, schedule_no_int, would_preempt};
pub use glue::{ContextSwitch, register_context_switch};
pub use lifecycle::{sched_create_kernel_thread, sched_join};
pub use load::sched_cpu_load;
pub use semaphore::{
    QueueDiscipline, SemaphoreId, sem_destroy, sem_init, sem_post, sem_try_wait, sem_wait,
};
pub use signal_bridge::{
    sched_dispatch_pending_signal, sched_signal_raise, sched_signal_raise_current,
    sched_signal_register,
};
pub use sleep::sched_sleep;
pub use state::is_installed;
pub use tcb::ThreadEntry;

/// Bring up the scheduler: installs the global state, creates one idle
/// thread per configured CPU, registers this crate's MAIN-tick entry point
/// with `utk-timer`, and spawns the deferred-ISR worker thread. Must run after `int_init`/timer binding but before any CPU is
/// handed its first thread via [`dispatch::bootstrap_current`].
pub fn sched_init(
    cfg: KernelConfig,
    kernel_cs: u64,
    stack_allocator: &'static dyn StackAllocator,
) -> KernelResult<()> {
    state::install(cfg, kernel_cs, stack_allocator);

    for cpu_idx in 0..cfg.cpu_count {
        let cpu = CpuId::new_unchecked(cpu_idx);
        state::with_state(|state| lifecycle::create_idle_thread(state, cpu, idle::idle_loop))?;
    }

    utk_timer::register_sched_sink(sched_on_main_tick);
    deferred_worker::spawn()?;
    Ok(())
}

/// The registered MAIN-timer tick sink. Public only so [`utk_timer::register_sched_sink`]
/// can take it as a plain `fn()`.
pub fn sched_on_main_tick() {
    dispatch::on_main_tick();
}

/// First thread a CPU ever runs at boot. Re-exported rather
/// than folded into `sched_init` because the out-of-scope boot layer needs
/// to resume the returned frame directly, one CPU at a time, as each comes
/// online.
pub use dispatch::bootstrap_current;
