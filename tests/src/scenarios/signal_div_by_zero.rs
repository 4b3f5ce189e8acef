//! Scenario 6: "a divide-by-zero trap on a thread with no
//! handler installed for FPE beyond the mandatory default terminates that
//! thread with `TerminationCause::Faulted`, not the whole system."
//!
//! The actual CPU trap stub lives in the out-of-scope `kernel` integration
//! crate (it needs the real vector entry); this exercises the signal path
//! it calls into: `sched_signal_raise_current(Fpe)` followed by the
//! return-from-interrupt dispatch, standing in for the stub the way
//! `utk_interrupt::exception::assert_is_div_by_zero_vector`'s own doc
//! comment describes the split of responsibility.

use utk_abi::{AffinityMask, Priority, SignalKind, TerminationCause};
use utk_sched::sched_create_kernel_thread;

use crate::harness::TestResult;
use crate::{check, run_test};

const STACK: usize = 4096 * 4;

fn victim(_arg: usize) -> u64 {
    // Stands in for the trapping instruction: raises FPE on itself exactly
    // as the divide-by-zero stub would, then never touches the signal
    // again; the default handler is the only thing that can resume past
    // this park, and it never returns.
    utk_sched::sched_signal_raise_current(SignalKind::Fpe).expect("raise on self never fails");
    loop {
        utk_sched::schedule_no_int();
    }
}

run_test! {
    fn unhandled_divide_by_zero_faults_only_the_offending_thread() {
        let thread = sched_create_kernel_thread(
            "div-by-zero-victim",
            Priority::default(),
            STACK,
            AffinityMask::all(),
            victim,
            0,
        );
        check!(thread.is_ok());

        let id = thread.unwrap();
        // The victim's own return-from-interrupt path dispatches the
        // pending FPE into the mandatory default handler, which calls
        // `sched_thread_exit(Faulted, _)`; `schedule_no_int` inside the
        // victim's loop is what drives that dispatch point here.
        let (cause, _) = utk_sched::sched_join(id).unwrap();
        check!(cause == TerminationCause::Faulted);
    }
}
