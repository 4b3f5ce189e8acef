//! Scenario 4: "a thread blocked in `sem_wait` on a handle that is
//! then `sem_destroy`'d wakes with `DESTROYED`, not `OK`."
//!

use utk_abi::{AffinityMask, KernelError, Priority};
use utk_sched::{QueueDiscipline, SemaphoreId, sched_create_kernel_thread};

use crate::harness::TestResult;
use crate::{check, run_test};

const STACK: usize = 4096 * 4;

fn waiter(sem_id: usize) -> u64 {
    match utk_sched::sem_wait(sem_id as SemaphoreId) {
        Err(KernelError::Destroyed) => 1,
        _ => 0,
    }
}

run_test! {
    fn destroying_a_semaphore_wakes_waiters_with_destroyed() {
        let sem = utk_sched::sem_init(0, QueueDiscipline::Fifo).unwrap();

        let thread = sched_create_kernel_thread(
            "sem-waiter",
            Priority::default(),
            STACK,
            AffinityMask::all(),
            waiter,
            sem as usize,
        );
        check!(thread.is_ok());

        // Give the waiter a chance to block before the handle is torn down.
        utk_sched::schedule_no_int();

        utk_sched::sem_destroy(sem).unwrap();

        let (_, retval) = utk_sched::sched_join(thread.unwrap()).unwrap();
        check!(retval == 1, "waiter did not observe Destroyed");

        check!(utk_sched::sem_wait(sem) == Err(KernelError::Destroyed));
        check!(utk_sched::sem_post(sem) == Err(KernelError::Destroyed));
    }
}
