//! The four timer slots: MAIN (tick
//! source), RTC (wall clock), LIFETIME (monotonic high-resolution), and an
//! AUX set of auxiliary timers registered but enabled on demand.
//!
//! Generalizes the usual single-global-timer-static pattern into one
//! small registry so the fallback chains in [`crate::time`] have one
//! place to query "is MAIN bound" without each call site re-deriving it.

use utk_abi::traits::TimerDriverOps;
use utk_abi::{KernelError, KernelResult};
use utk_lib::ServiceCell;

/// Capacity of the AUX timer set.
pub const MAX_AUX_TIMERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
    Main,
    Rtc,
    Lifetime,
}

static MAIN: ServiceCell<&'static dyn TimerDriverOps> = ServiceCell::new("timer_main");
static RTC: ServiceCell<&'static dyn TimerDriverOps> = ServiceCell::new("timer_rtc");
static LIFETIME: ServiceCell<&'static dyn TimerDriverOps> = ServiceCell::new("timer_lifetime");

struct AuxSet {
    lock: utk_lib::Spinlock,
    slots: core::cell::UnsafeCell<[Option<&'static dyn TimerDriverOps>; MAX_AUX_TIMERS]>,
}
unsafe impl Sync for AuxSet {}

static AUX: AuxSet = AuxSet {
    lock: utk_lib::Spinlock::new(),
    slots: core::cell::UnsafeCell::new([None; MAX_AUX_TIMERS]),
};

/// Validate that a driver bundle has everything §4.6's `time_add_timer`
/// requires before it may be stored (spec: "validates the bundle
/// (required methods present)"). Every method on `TimerDriverOps` is a
/// required trait method already enforced by the compiler, so the one
/// thing left to check dynamically is a non-zero frequency for a MAIN
/// timer, since a zero-Hz tick source can never drive the scheduler.
fn validate_main_candidate(driver: &dyn TimerDriverOps) -> KernelResult<()> {
    if driver.frequency_hz() == 0 {
        return Err(KernelError::IncorrectValue);
    }
    Ok(())
}

/// Bind a driver into MAIN, RTC, or LIFETIME, installing the timer
/// layer's own tick handler for MAIN/RTC and enabling the driver (spec
/// §4.6). Each named slot may only be bound once per system lifetime.
pub fn bind(
    slot: TimerSlot,
    driver: &'static dyn TimerDriverOps,
    tick_handler: fn(),
) -> KernelResult<()> {
    if slot == TimerSlot::Main {
        validate_main_candidate(driver)?;
    }
    match slot {
        TimerSlot::Main => MAIN.register(driver),
        TimerSlot::Rtc => RTC.register(driver),
        TimerSlot::Lifetime => LIFETIME.register(driver),
    }
    if matches!(slot, TimerSlot::Main | TimerSlot::Rtc) {
        driver.set_tick_handler(tick_handler);
    }
    driver.enable();
    Ok(())
}

/// Register an AUX timer. Unlike MAIN/RTC/LIFETIME it is not enabled here.
pub fn register_aux(driver: &'static dyn TimerDriverOps) -> KernelResult<()> {
    AUX.lock.acquire();
    let result = unsafe {
        let slots = &mut *AUX.slots.get();
        match slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(driver);
                Ok(())
            }
            None => Err(KernelError::NoMoreMemory),
        }
    };
    AUX.lock.release();
    result
}

pub fn aux_timers() -> [Option<&'static dyn TimerDriverOps>; MAX_AUX_TIMERS] {
    AUX.lock.acquire();
    let snapshot = unsafe { *AUX.slots.get() };
    AUX.lock.release();
    snapshot
}

pub fn main() -> Option<&'static dyn TimerDriverOps> {
    MAIN.try_get().copied()
}

pub fn rtc() -> Option<&'static dyn TimerDriverOps> {
    RTC.try_get().copied()
}

pub fn lifetime() -> Option<&'static dyn TimerDriverOps> {
    LIFETIME.try_get().copied()
}
