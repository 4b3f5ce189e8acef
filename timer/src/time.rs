//! Time reporting and busy-wait.

use utk_abi::traits::DayTime;

use crate::slots;

/// Fall-back chain: LIFETIME's ns reading if present, else MAIN's ns
/// reading, else zero (neither source bound yet). MAIN's own `time_ns`
/// implementation (see the reference PIT driver) already derives its
/// reading from its internal tick count and frequency, so there is no
/// separate tick-based third tier to compute here.
pub fn uptime_ns() -> u64 {
    if let Some(lifetime) = slots::lifetime() {
        return lifetime.time_ns();
    }
    if let Some(main) = slots::main() {
        return main.time_ns();
    }
    0
}

/// RTC's daytime reading, or zeros if no RTC is bound.
pub fn day_time() -> DayTime {
    slots::rtc().map(|rtc| rtc.daytime()).unwrap_or_default()
}

/// Busy-wait `ns` nanoseconds without going through the scheduler (spec
/// §4.6: "used only before the scheduler is running or inside panic").
/// Reuses [`uptime_ns`]'s own LIFETIME/MAIN-ns fall-back chain so the two
/// stay consistent by construction.
pub fn wait_no_sched(ns: u64) {
    let deadline = uptime_ns().saturating_add(ns);
    while uptime_ns() < deadline {
        core::hint::spin_loop();
    }
}
