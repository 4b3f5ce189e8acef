//! Kernel-side test harness and scenario suite.
//!
//! A harness plus a set of suites a boot-time caller runs once the full
//! stack is up. A suite is just a `&'static` slice of Rust function
//! pointers, owned entirely by this crate, with no C ABI to cross.
//!
//! Nothing in this crate runs as `cargo test` (`test = false` in its
//! manifest, same as every other hardware-touching crate in this
//! workspace): every scenario spawns real kernel threads through
//! `utk-sched` and blocks on `sched_join`, which requires a booted
//! scheduler, interrupts, and a context-switch implementation installed,
//! exactly the environment the `kernel` integration crate's boot sequence
//! provides. `run_suite`/`run_all` are what that boot sequence calls once
//! it reaches the post-init self-test step.

#![no_std]

pub mod harness;
mod scenarios;

pub use harness::{SuiteSummary, TestCase, TestResult, TestSuite, run_all, run_suite};
pub use scenarios::all_suites;

/// Run every suite this crate defines and return the combined summary.
pub fn run_everything() -> SuiteSummary {
    run_all(&all_suites())
}
