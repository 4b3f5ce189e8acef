//! Post-boot self-test step, gated behind the `builtin-tests` feature so
//! release builds never link the test harness in.

#[cfg(feature = "builtin-tests")]
pub fn run_post_boot_tests() -> utk_tests::SuiteSummary {
    let summary = utk_tests::run_everything();
    utk_lib::klog_info!(
        "tests: {} total, {} passed, {} failed, {} panicked, {} skipped",
        summary.total,
        summary.passed,
        summary.failed,
        summary.panicked,
        summary.skipped,
    );
    summary
}

#[cfg(not(feature = "builtin-tests"))]
pub fn run_post_boot_tests() {}
