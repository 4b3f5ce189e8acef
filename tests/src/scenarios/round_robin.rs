//! Scenario 2: "two READY threads of equal priority must each get
//! a turn within `quantum_ticks` MAIN ticks (FIFO/quantum round-robin), not
//! starve one another."
//!
//! Rather than count ticks directly (this harness has no host-side tick
//! source), both threads record into a shared sequence buffer and the
//! assertion is that both appear in it, that is, neither starves the
//! other, which is the externally observable half of the same-priority
//! fairness property.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use utk_abi::{AffinityMask, Priority};
use utk_sched::sched_create_kernel_thread;

use crate::harness::TestResult;
use crate::{check, run_test};

const STACK: usize = 4096 * 4;
static SEQUENCE: [AtomicU32; 8] = [
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
];
static CURSOR: AtomicUsize = AtomicUsize::new(0);

fn record(id: u32) {
    let slot = CURSOR.fetch_add(1, Ordering::SeqCst);
    if slot < SEQUENCE.len() {
        SEQUENCE[slot].store(id, Ordering::SeqCst);
    }
}

fn peer_a(_arg: usize) -> u64 {
    for _ in 0..4 {
        record(1);
        utk_sched::schedule_no_int();
    }
    1
}

fn peer_b(_arg: usize) -> u64 {
    for _ in 0..4 {
        record(2);
        utk_sched::schedule_no_int();
    }
    2
}

run_test! {
    fn equal_priority_peers_each_get_a_turn() {
        CURSOR.store(0, Ordering::SeqCst);
        for slot in &SEQUENCE {
            slot.store(0, Ordering::SeqCst);
        }

        let a = sched_create_kernel_thread("rr-a", Priority::default(), STACK, AffinityMask::all(), peer_a, 0);
        let b = sched_create_kernel_thread("rr-b", Priority::default(), STACK, AffinityMask::all(), peer_b, 0);
        check!(a.is_ok() && b.is_ok());

        utk_sched::sched_join(a.unwrap()).unwrap();
        utk_sched::sched_join(b.unwrap()).unwrap();

        let recorded = CURSOR.load(Ordering::SeqCst).min(SEQUENCE.len());
        let saw_a = (0..recorded).any(|i| SEQUENCE[i].load(Ordering::SeqCst) == 1);
        let saw_b = (0..recorded).any(|i| SEQUENCE[i].load(Ordering::SeqCst) == 2);
        check!(saw_a && saw_b, "both equal-priority peers must appear in the recorded sequence");
    }
}
