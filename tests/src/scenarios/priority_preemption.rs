//! Scenario 1: "a READY thread of strictly higher priority than
//! the one running must preempt it rather than wait for the quantum."
//!
//! Spawns a low-priority spinner, then a high-priority thread, and asserts
//! the high one runs to completion first, observed through `sched_join`'s
//! return-value channel.

use utk_abi::{AffinityMask, Priority};
use utk_sched::sched_create_kernel_thread;

use crate::harness::TestResult;
use crate::{check, run_test};

const STACK: usize = 4096 * 4;

fn low_priority_spinner(_arg: usize) -> u64 {
    // Never voluntarily yields; only a strictly higher-priority arrival
    // should be able to cut in front of it.
    for _ in 0..1_000 {
        core::hint::spin_loop();
    }
    1
}

fn high_priority_thread(_arg: usize) -> u64 {
    2
}

run_test! {
    fn high_priority_thread_preempts_running_low_priority_thread() {
        let low = sched_create_kernel_thread(
            "low-spinner",
            Priority::LOWEST,
            STACK,
            AffinityMask::all(),
            low_priority_spinner,
            0,
        );
        check!(low.is_ok());

        let high = sched_create_kernel_thread(
            "high-cutter",
            Priority::HIGHEST,
            STACK,
            AffinityMask::all(),
            high_priority_thread,
            0,
        );
        check!(high.is_ok());

        let (_, high_retval) = utk_sched::sched_join(high.unwrap()).unwrap();
        check!(high_retval == 2);

        let (_, low_retval) = utk_sched::sched_join(low.unwrap()).unwrap();
        check!(low_retval == 1);
    }
}
