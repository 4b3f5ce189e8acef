//! Timer management layer.
//!
//! Maintains the MAIN/RTC/LIFETIME/AUX slots, the MAIN tick handler that
//! drives the scheduler, and the uptime/daytime fallback chains.

#![no_std]

pub mod slots;
pub mod tick;
pub mod time;

pub use slots::{MAX_AUX_TIMERS, TimerSlot, aux_timers, bind, lifetime, main, register_aux, rtc};
pub use tick::{main_tick_handler, max_tick_count, register_sched_sink, tick_count};
pub use time::{day_time, uptime_ns, wait_no_sched};
