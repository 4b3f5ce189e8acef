//! Console abstraction: a thin, string-atomic pipe
//! between one selected input device and one selected output device, used
//! for log and shell I/O.
//!
//! Each side is a narrow device trait registered exactly once through
//! `utk_lib::ServiceCell`, the same single-install pattern the rest of
//! this workspace uses for its service slots.

#![cfg_attr(not(test), no_std)]

mod input;
mod output;

pub use input::{ConsoleInput, bind_input, console_try_read_byte, is_input_bound};
pub use output::{
    ConsoleOutput, bind_output, console_write, console_write_unlocked, is_output_bound,
};

/// Wires console output into `utk_lib::klog`'s sink slot:
/// once attached with `utk_lib::klog_attach(&CONSOLE_LOG_SINK)`, every
/// `klog_*!` call in the core reaches the bound output device through this
/// adapter.
pub struct ConsoleLogSink;

impl utk_lib::klog::LogSink for ConsoleLogSink {
    fn write_str(&self, s: &str) {
        output::console_write(s);
    }
}

pub static CONSOLE_LOG_SINK: ConsoleLogSink = ConsoleLogSink;

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    struct CountingOutput {
        bytes: AtomicU32,
    }

    impl ConsoleOutput for CountingOutput {
        fn put_byte(&self, _byte: u8) {
            self.bytes.fetch_add(1, Ordering::Relaxed);
        }
    }

    static OUT: CountingOutput = CountingOutput {
        bytes: AtomicU32::new(0),
    };

    #[test]
    fn unbound_write_is_silently_dropped() {
        console_write("never bound to anything");
    }

    #[test]
    fn bound_write_reaches_every_byte() {
        bind_output(&OUT);
        let before = OUT.bytes.load(Ordering::Relaxed);
        console_write("hello");
        assert_eq!(OUT.bytes.load(Ordering::Relaxed), before + 5);
        assert!(is_output_bound());
    }

    struct FixedInput;

    impl ConsoleInput for FixedInput {
        fn try_read_byte(&self) -> Option<u8> {
            Some(b'x')
        }
    }

    static IN: FixedInput = FixedInput;

    #[test]
    fn bound_input_is_polled_through() {
        bind_input(&IN);
        assert_eq!(console_try_read_byte(), Some(b'x'));
        assert!(is_input_bound());
    }
}
