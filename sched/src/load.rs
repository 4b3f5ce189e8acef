//! Per-CPU load accounting: a sliding window of
//! active/idle nanoseconds, sampled once per MAIN tick and exposed as a
//! percentage.
//!
//! A per-CPU window that resets instead of an accumulate-forever global
//! counter, so the reported load reflects roughly the last second of
//! activity rather than the system's entire uptime.

use utk_abi::CpuId;

use crate::state::{self, SchedulerState};

fn tick_period_ns() -> u64 {
    match utk_timer::main() {
        Some(driver) if driver.frequency_hz() > 0 => 1_000_000_000 / driver.frequency_hz(),
        _ => 1_000_000,
    }
}

/// Called once per MAIN tick, before dispatch decisions are made, so the
/// window accounts for the tick that's about to complete (spec
/// §4.7/[`crate::dispatch::on_main_tick`]).
pub(crate) fn record_tick(state: &mut SchedulerState, cpu_idx: usize) {
    let period = tick_period_ns();

    let was_idle = {
        let SchedulerState { arena, percpu, .. } = state;
        match percpu[cpu_idx].current {
            Some(index) => arena
                .get_by_index_mut(index)
                .map(|t| t.is_idle)
                .unwrap_or(true),
            None => true,
        }
    };

    let now = utk_timer::uptime_ns();
    let window = state.cfg.load_window_ns;
    let per_cpu = &mut state.percpu[cpu_idx];

    if was_idle {
        per_cpu.idle_ns = per_cpu.idle_ns.saturating_add(period);
    } else {
        per_cpu.active_ns = per_cpu.active_ns.saturating_add(period);
    }

    if now.saturating_sub(per_cpu.window_start_ns) >= window {
        per_cpu.active_ns = 0;
        per_cpu.idle_ns = 0;
        per_cpu.window_start_ns = now;
    }
}

/// `sched_cpu_load`: percentage of the current window spent
/// running non-idle work. An out-of-range CPU id reads as 0 rather than
/// erroring, matching a diagnostic rather than a programming-contract call.
pub fn sched_cpu_load(cpu: CpuId) -> u8 {
    state::with_state(|state| {
        let cpu_idx = state::cpu_index(cpu);
        if cpu_idx >= state.cfg.cpu_count {
            return 0;
        }
        let per_cpu = &state.percpu[cpu_idx];
        let total = per_cpu.active_ns + per_cpu.idle_ns;
        if total == 0 {
            return 0;
        }
        ((per_cpu.active_ns.saturating_mul(100)) / total) as u8
    })
}
