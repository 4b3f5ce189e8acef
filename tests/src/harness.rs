//! Kernel-side test harness.
//!
//! A suite here is just a Rust slice of named functions, run directly by
//! [`run_suite`], with no C ABI or raw-pointer registry plumbing involved.

use utk_lib::klog_info;

/// Outcome of a single test function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
    /// The test deliberately triggered or survived a panic path it was
    /// asserting on; distinct from `Fail` so a suite summary can report
    /// panics separately.
    Panic,
    /// Skipped because a precondition wasn't met (e.g. a driver scenario
    /// run on a config with no device tree), not a failure.
    Skipped,
}

pub struct TestCase {
    pub name: &'static str,
    pub run: fn() -> TestResult,
}

pub struct TestSuite {
    pub name: &'static str,
    pub cases: &'static [TestCase],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuiteSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub panicked: u32,
    pub skipped: u32,
}

impl SuiteSummary {
    fn record(&mut self, result: TestResult) {
        self.total += 1;
        match result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail => self.failed += 1,
            TestResult::Panic => self.panicked += 1,
            TestResult::Skipped => self.skipped += 1,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.panicked == 0
    }
}

/// Run every case in `suite` in order, logging each result, and return the
/// aggregate summary. Never aborts on a single failure, since the whole point
/// of a suite is to see every case's outcome in one run.
pub fn run_suite(suite: &TestSuite) -> SuiteSummary {
    klog_info!(
        "tests: running suite '{}' ({} cases)",
        suite.name,
        suite.cases.len()
    );
    let mut summary = SuiteSummary::default();
    for case in suite.cases {
        let result = (case.run)();
        klog_info!("tests: {} :: {} -> {:?}", suite.name, case.name, result);
        summary.record(result);
    }
    summary
}

/// Run several suites back to back, returning the sum of their summaries.
pub fn run_all(suites: &[&TestSuite]) -> SuiteSummary {
    let mut total = SuiteSummary::default();
    for suite in suites {
        let s = run_suite(suite);
        total.total += s.total;
        total.passed += s.passed;
        total.failed += s.failed;
        total.panicked += s.panicked;
        total.skipped += s.skipped;
    }
    total
}

/// Assert `$cond`, returning `TestResult::Fail` (logging the failed
/// expression) instead of panicking, so one failing case doesn't abort
/// the whole suite.
#[macro_export]
macro_rules! check {
    ($cond:expr) => {
        if !$cond {
            utk_lib::klog_warn!("tests: assertion failed: {}", stringify!($cond));
            return $crate::harness::TestResult::Fail;
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            utk_lib::klog_warn!("tests: assertion failed: {}", format_args!($($arg)+));
            return $crate::harness::TestResult::Fail;
        }
    };
}

/// Define a single test function with the harness's `fn() -> TestResult`
/// signature and implicit `Pass` on fallthrough.
#[macro_export]
macro_rules! run_test {
    (fn $name:ident() $body:block) => {
        pub fn $name() -> $crate::harness::TestResult {
            #[allow(clippy::needless_return)]
            (|| -> $crate::harness::TestResult {
                $body;
                $crate::harness::TestResult::Pass
            })()
        }
    };
}

/// Define a `TestSuite` constant from a name and a list of case idents
/// defined via [`run_test!`].
#[macro_export]
macro_rules! test_suite {
    ($vis:vis static $suite_name:ident = $name:literal { $($case:ident),+ $(,)? }) => {
        $vis static $suite_name: $crate::harness::TestSuite = $crate::harness::TestSuite {
            name: $name,
            cases: &[
                $($crate::harness::TestCase { name: stringify!($case), run: $case }),+
            ],
        };
    };
}
