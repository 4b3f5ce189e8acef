//! The return-from-interrupt vector entry.
//!
//! The out-of-scope CPU glue saves the trapping frame into the current
//! thread's `VcpuFrame`, reads `int_number` out of it, and calls
//! [`handle_interrupt`]. This is the one place in the whole core where
//! dispatch, signal delivery, and rescheduling are stitched together, in a
//! trace-then-restore order chosen so tracing always observes the frame
//! exactly as the trap left it.

use utk_abi::KernelConfig;
use utk_interrupt::DispatchOutcome;

/// Run the full return-from-interrupt sequence for one trap: classify and
/// dispatch through the handler table, trace the event (if the `tracing`
/// feature is compiled into `utk-lib`), deliver any pending signal by
/// rewriting the resuming frame, then let the scheduler decide whether a
/// higher-priority thread should run instead. Returns whether the caller
/// must hand off to `utk-panic` instead of resuming normally: both the
/// panic line firing and an unhandled regular interrupt are invariant
/// breaks the caller must not paper over by rescheduling anyway.
pub fn handle_interrupt(cfg: &KernelConfig, int_number: u8) -> DispatchOutcome {
    let outcome = utk_interrupt::int_main_handler(cfg, int_number);
    if outcome == DispatchOutcome::Panic || outcome == DispatchOutcome::UnhandledPanicked {
        return outcome;
    }

    #[cfg(feature = "tracing")]
    utk_lib::trace_record(int_number as u32, utk_timer::uptime_ns(), &[]);

    // Trace-then-restore: the event
    // above is recorded before interrupts are ever considered for
    // restoration by the caller, so a trace read can never observe a gap
    // where this trap happened but wasn't logged yet.
    let _ = utk_sched::sched_dispatch_pending_signal();
    utk_sched::schedule_no_int();
    outcome
}
