//! Ambient kernel configuration. The original spec leaves a
//! handful of parameters as "CPU configuration" or implementation defaults;
//! we gather them into one struct so `utk-tests` can exercise non-default
//! shapes (fewer CPUs, a shorter quantum) without recompiling the crate.

use crate::thread::{MAX_CPUS, MAX_DEFERRED_JOBS, MAX_THREADS};

/// I/O port and value used to request a QEMU shutdown in test-mode builds.
pub const TEST_EXIT_PORT: u16 = 0x604;
pub const TEST_EXIT_VALUE: u16 = 0x2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Number of CPUs actually brought up; must be `<= MAX_CPUS`.
    pub cpu_count: usize,
    /// Preemption quantum in MAIN-timer ticks.
    pub quantum_ticks: u32,
    /// Inclusive interrupt-line range reported by the CPU configuration.
    pub interrupt_line_min: u8,
    pub interrupt_line_max: u8,
    /// Inclusive exception sub-range within the interrupt-line range (spec
    /// §4.3).
    pub exception_line_min: u8,
    pub exception_line_max: u8,
    /// The dedicated panic line.
    pub panic_line: u8,
    /// The dedicated spurious line.
    pub spurious_line: u8,
    /// Sliding window, in nanoseconds, used for CPU-load accounting (spec
    /// §4.7, "e.g. last 1 s").
    pub load_window_ns: u64,
    /// System page size, used to validate thread-stack sizes.
    pub page_size: usize,
    /// Capacity of the TCB arena.
    pub max_threads: usize,
    /// Capacity of the deferred-ISR job queue.
    pub max_deferred_jobs: usize,
}

impl KernelConfig {
    pub const fn default_const() -> KernelConfig {
        KernelConfig {
            cpu_count: MAX_CPUS,
            quantum_ticks: 5,
            interrupt_line_min: 0,
            interrupt_line_max: 255,
            exception_line_min: 0,
            exception_line_max: 31,
            panic_line: 254,
            spurious_line: 255,
            load_window_ns: 1_000_000_000,
            page_size: 4096,
            max_threads: MAX_THREADS,
            max_deferred_jobs: MAX_DEFERRED_JOBS,
        }
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::default_const()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cpu_count_matches_max_cpus() {
        assert_eq!(KernelConfig::default().cpu_count, MAX_CPUS);
    }

    #[test]
    fn panic_and_spurious_lines_are_distinct_and_in_range() {
        let cfg = KernelConfig::default();
        assert_ne!(cfg.panic_line, cfg.spurious_line);
        assert!(
            cfg.panic_line >= cfg.interrupt_line_min && cfg.panic_line <= cfg.interrupt_line_max
        );
    }
}
