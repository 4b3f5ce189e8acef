//! Scenario 3: "`sched_sleep(ns)` wakes no earlier than
//! `uptime_ns() + ns` at the time of the call."
//!
//! Sleeps a fixed duration and compares uptime readings taken before and
//! after.

use utk_abi::{AffinityMask, Priority};
use utk_sched::sched_create_kernel_thread;

use crate::harness::TestResult;
use crate::{check, run_test};

const STACK: usize = 4096 * 4;
const SLEEP_NS: u64 = 20_000_000; // 20ms; generous relative to a 5-tick quantum.

fn sleeper(_arg: usize) -> u64 {
    let before = utk_timer::uptime_ns();
    utk_sched::sched_sleep(SLEEP_NS).expect("idle thread never calls this");
    let after = utk_timer::uptime_ns();
    after.saturating_sub(before)
}

run_test! {
    fn sleep_never_wakes_before_its_deadline() {
        let thread = sched_create_kernel_thread(
            "sleeper",
            Priority::default(),
            STACK,
            AffinityMask::all(),
            sleeper,
            0,
        );
        check!(thread.is_ok());
        let (_, elapsed_ns) = utk_sched::sched_join(thread.unwrap()).unwrap();
        check!(elapsed_ns >= SLEEP_NS, "slept {} ns, wanted at least {}", elapsed_ns, SLEEP_NS);
    }
}
