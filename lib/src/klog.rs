//! Kernel log sink and level filter.
//!
//! Rather than writing straight to a fixed COM port through a C-style
//! `%`-format interpreter, log text goes through a registered [`LogSink`]
//! written through standard `core::fmt::Write`, so any console/serial
//! driver can back it and the format string is checked by the compiler
//! instead of parsed at runtime.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::service_cell::ServiceCell;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KlogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl KlogLevel {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => KlogLevel::Error,
            1 => KlogLevel::Warn,
            2 => KlogLevel::Info,
            3 => KlogLevel::Debug,
            _ => KlogLevel::Trace,
        }
    }
}

/// Anything that can receive formatted log text. The console driver
/// (`utk-drivers`) and the in-memory sink used by `utk-tests` both
/// implement this.
pub trait LogSink: Sync {
    fn write_str(&self, s: &str);
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(KlogLevel::Info as u8);
static SINK: ServiceCell<&'static dyn LogSink> = ServiceCell::new("klog_sink");

/// Install the log sink. Panics if called twice.
pub fn klog_attach(sink: &'static dyn LogSink) {
    SINK.register(sink);
}

pub fn klog_set_level(level: KlogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn klog_get_level() -> KlogLevel {
    KlogLevel::from_raw(CURRENT_LEVEL.load(Ordering::Relaxed))
}

#[inline]
pub fn klog_is_enabled(level: KlogLevel) -> bool {
    (level as u8) <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

struct SinkWriter<'a>(&'a dyn LogSink);

impl fmt::Write for SinkWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

/// Used by the `klog_*!` macros. Silently drops the line if no sink is
/// registered yet (early boot, before the console driver attaches) or if
/// `level` is below the current filter.
#[doc(hidden)]
pub fn klog_dispatch(level: KlogLevel, args: fmt::Arguments<'_>) {
    if !klog_is_enabled(level) {
        return;
    }
    if let Some(sink) = SINK.try_get() {
        let mut writer = SinkWriter(*sink);
        let _ = fmt::Write::write_fmt(&mut writer, args);
        let _ = fmt::Write::write_str(&mut writer, "\n");
    }
}

#[macro_export]
macro_rules! klog_error {
    ($($arg:tt)*) => {
        $crate::klog::klog_dispatch($crate::klog::KlogLevel::Error, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_warn {
    ($($arg:tt)*) => {
        $crate::klog::klog_dispatch($crate::klog::KlogLevel::Warn, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_info {
    ($($arg:tt)*) => {
        $crate::klog::klog_dispatch($crate::klog::KlogLevel::Info, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_debug {
    ($($arg:tt)*) => {
        $crate::klog::klog_dispatch($crate::klog::KlogLevel::Debug, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_trace {
    ($($arg:tt)*) => {
        $crate::klog::klog_dispatch($crate::klog::KlogLevel::Trace, core::format_args!($($arg)*))
    };
}
