//! TSC-based monotonic clock, bound into the LIFETIME slot.
//!
//! Grounded on the invariant-TSC clocksource pattern in
//! `other_examples/..kernel-src-arch-x86_64-time-timer.rs` (`CsTsc`
//! reading `rdtsc()`, a fixed-point cycles→ns scale) but stripped down to
//! just the clocksource: the hrtimer heap, timer wheel, and clockevent
//! machinery in that file belong to a full timer subsystem this core
//! doesn't need: `utk-sched::sleep` already owns the sleep
//! queue. Calibrated against the already-bound MAIN timer's tick count
//! rather than HPET, since that is the only other time source this
//! workspace has.

use core::arch::x86_64::_rdtsc;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use utk_abi::traits::{DayTime, TimerDriverOps};
use utk_abi::{DeviceTreeNode, KernelError, KernelResult};

/// Number of MAIN ticks to observe while calibrating. Small enough to
/// keep boot latency low, large enough that a single tick's jitter
/// doesn't dominate the measurement.
const CALIBRATION_TICKS: u64 = 10;

pub struct Tsc {
    cycles_per_sec: AtomicU64,
    tsc0: AtomicU64,
    ns0: AtomicU64,
    calibrated: AtomicBool,
}

impl Tsc {
    const fn new() -> Tsc {
        Tsc {
            cycles_per_sec: AtomicU64::new(0),
            tsc0: AtomicU64::new(0),
            ns0: AtomicU64::new(0),
            calibrated: AtomicBool::new(false),
        }
    }

    fn calibrate(&self, cpu: usize) {
        let main_freq = utk_timer::main()
            .map(utk_abi::traits::TimerDriverOps::frequency_hz)
            .unwrap_or(0);
        if main_freq == 0 {
            // No MAIN timer bound yet: leave uncalibrated, `time_ns`
            // reports zero until a later `enable()` retries.
            return;
        }

        let start_tick = utk_timer::tick_count(cpu);
        // SAFETY: `rdtsc` is available on every x86_64 CPU this core
        // targets; reading it has no side effects.
        let start_tsc = unsafe { _rdtsc() };
        while utk_timer::tick_count(cpu) < start_tick + CALIBRATION_TICKS {
            core::hint::spin_loop();
        }
        let end_tsc = unsafe { _rdtsc() };

        let cycles = end_tsc.saturating_sub(start_tsc);
        let cycles_per_sec = cycles.saturating_mul(main_freq) / CALIBRATION_TICKS;

        self.tsc0.store(start_tsc, Ordering::SeqCst);
        self.cycles_per_sec.store(cycles_per_sec, Ordering::SeqCst);
        self.calibrated.store(true, Ordering::SeqCst);
    }
}

impl TimerDriverOps for Tsc {
    fn frequency_hz(&self) -> u64 {
        self.cycles_per_sec.load(Ordering::SeqCst)
    }

    fn time_ns(&self) -> u64 {
        let hz = self.cycles_per_sec.load(Ordering::SeqCst);
        if hz == 0 {
            return 0;
        }
        // SAFETY: see `calibrate`.
        let now = unsafe { _rdtsc() };
        let elapsed_cycles = now.saturating_sub(self.tsc0.load(Ordering::SeqCst));
        let elapsed_ns = (elapsed_cycles as u128 * 1_000_000_000u128 / hz as u128) as u64;
        self.ns0.load(Ordering::SeqCst).saturating_add(elapsed_ns)
    }

    /// Rebase this clock's epoch onto `ns` without touching the cycle
    /// counter itself, the supported way to adjust a free-running
    /// clocksource.
    fn set_time_ns(&self, ns: u64) {
        self.ns0.store(ns, Ordering::SeqCst);
        self.tsc0.store(unsafe { _rdtsc() }, Ordering::SeqCst);
    }

    /// LIFETIME carries no calendar information.
    fn date(&self) -> DayTime {
        DayTime::default()
    }

    fn enable(&self) {
        if !self.calibrated.load(Ordering::SeqCst) {
            self.calibrate(utk_lib::current_cpu_id());
        }
    }

    fn disable(&self) {}

    /// LIFETIME is a free-running clocksource, not an interrupt source.
    fn set_tick_handler(&self, _handler: fn()) {}

    fn remove_tick_handler(&self) {}
}

static TSC: Tsc = Tsc::new();

/// `DriverDescriptor::attach` for `compatible = "x86,tsc"`. Requires MAIN
/// to already be bound, since calibration measures TSC cycles per MAIN
/// tick.
pub fn attach(_node: &dyn DeviceTreeNode) -> KernelResult<()> {
    if utk_timer::main().is_none() {
        return Err(KernelError::NotRegistered);
    }
    utk_timer::bind(
        utk_timer::TimerSlot::Lifetime,
        &TSC,
        utk_timer::main_tick_handler,
    )
}
