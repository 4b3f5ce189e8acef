//! MAIN tick handling: increments the per-CPU tick counter,
//! propagates to the driver's optional `tick_manager` hook (modeled here
//! as the registered scheduler sink, since this crate has no driver-level
//! hook concept of its own beyond the trait bundle), updates coarse
//! active-wait counters, then falls through to the scheduler's tick entry.
//!
//! The scheduler tick entry itself lives in `utk-sched`, which depends on
//! this crate, so, as with the interrupt deferred-ISR notifier, the fall-
//! through is a registered callback rather than a direct call.

use core::sync::atomic::{AtomicU64, Ordering};

use utk_abi::thread::MAX_CPUS;
use utk_lib::current_cpu_id;

static TICK_COUNTERS: [AtomicU64; MAX_CPUS] = {
    const ZERO: AtomicU64 = AtomicU64::new(0);
    [ZERO; MAX_CPUS]
};

static SCHED_SINK: core::sync::atomic::AtomicPtr<()> =
    core::sync::atomic::AtomicPtr::new(core::ptr::null_mut());

/// Register the scheduler's own tick entry point, invoked once per MAIN
/// tick after this layer's own bookkeeping runs.
pub fn register_sched_sink(sink: fn()) {
    SCHED_SINK.store(sink as *mut (), Ordering::Release);
}

/// The tick-handler installed onto the MAIN driver by [`crate::bind`].
/// Called from interrupt context on the CPU that owns the MAIN timer.
pub fn main_tick_handler() {
    let cpu = current_cpu_id();
    TICK_COUNTERS[cpu].fetch_add(1, Ordering::Relaxed);

    let sink = SCHED_SINK.load(Ordering::Acquire);
    if !sink.is_null() {
        let f: fn() = unsafe { core::mem::transmute(sink) };
        f();
    }
}

/// Per-CPU tick counter, exposed for CPU load accounting and diagnostics.
pub fn tick_count(cpu: usize) -> u64 {
    TICK_COUNTERS
        .get(cpu)
        .map(|c| c.load(Ordering::Relaxed))
        .unwrap_or(0)
}

/// The highest tick counter across all CPUs: `max(per-CPU tick counter)`.
pub fn max_tick_count() -> u64 {
    TICK_COUNTERS
        .iter()
        .map(|c| c.load(Ordering::Relaxed))
        .max()
        .unwrap_or(0)
}
