//! One module per end-to-end scenario plus the quantified invariants and
//! round-trip properties, each exposing a [`crate::harness::TestSuite`].

mod driver_attach;
mod invariants;
mod priority_preemption;
mod round_robin;
mod semaphore_destroyed;
mod signal_div_by_zero;
mod sleep_accuracy;

crate::test_suite! {
    pub static SCHEDULING_SUITE = "scheduling" {
        high_priority_thread_preempts_running_low_priority_thread,
        equal_priority_peers_each_get_a_turn,
        sleep_never_wakes_before_its_deadline,
    }
}

crate::test_suite! {
    pub static CONCURRENCY_SUITE = "concurrency" {
        destroying_a_semaphore_wakes_waiters_with_destroyed,
    }
}

crate::test_suite! {
    pub static DRIVER_SUITE = "drivers" {
        walking_a_tree_with_one_enabled_pic_node_attaches_it_once,
    }
}

crate::test_suite! {
    pub static SIGNAL_SUITE = "signals" {
        unhandled_divide_by_zero_faults_only_the_offending_thread,
    }
}

crate::test_suite! {
    pub static INVARIANT_SUITE = "invariants" {
        new_thread_current_priority_starts_at_base_priority,
        interrupt_line_register_remove_round_trips,
        post_before_wait_never_blocks,
        registered_signal_is_dispatchable_once_raised,
    }
}

/// Every suite this crate defines, in the order `run_all` should run them
/// (scheduling/concurrency first since later suites lean on a scheduler
/// that's already known to behave).
pub fn all_suites() -> [&'static crate::harness::TestSuite; 5] {
    [
        &SCHEDULING_SUITE,
        &CONCURRENCY_SUITE,
        &DRIVER_SUITE,
        &SIGNAL_SUITE,
        &INVARIANT_SUITE,
    ]
}
