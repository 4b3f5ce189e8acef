//! Console output binding.
//!
//! A single trait object lets a `utk-drivers` UART binding carry its own
//! state (a `uart_16550::SerialPort` behind its own lock) instead of
//! reaching through file-scope statics, registered the same single-install
//! way every other service slot in this workspace is.

use utk_lib::Spinlock;

/// Implemented by whichever device is bound as console output. One byte at
/// a time; [`console_write`] is what gives a whole string its atomicity.
pub trait ConsoleOutput: Sync {
    fn put_byte(&self, byte: u8);
}

static OUTPUT: utk_lib::ServiceCell<&'static dyn ConsoleOutput> =
    utk_lib::ServiceCell::new("console_output");
static WRITE_LOCK: Spinlock = Spinlock::new();

/// Bind the console's output device. Panics if called twice.
pub fn bind_output(device: &'static dyn ConsoleOutput) {
    OUTPUT.register(device);
}

pub fn is_output_bound() -> bool {
    OUTPUT.is_initialized()
}

/// Write a whole string atomically: no other `console_write` caller's
/// bytes can interleave with this one's.
/// Silently drops the text if no output device has been bound yet, same
/// as `utk_lib::klog` does for an unattached sink.
pub fn console_write(s: &str) {
    let Some(device) = OUTPUT.try_get() else {
        return;
    };
    WRITE_LOCK.acquire();
    for byte in s.bytes() {
        device.put_byte(byte);
    }
    WRITE_LOCK.release();
}

/// Used by `utk-panic`: the panic screen writes straight past
/// the write lock and the usual sink plumbing, since a panicking CPU must
/// never block on a lock another CPU might be holding.
pub fn console_write_unlocked(s: &str) {
    let Some(device) = OUTPUT.try_get() else {
        return;
    };
    for byte in s.bytes() {
        device.put_byte(byte);
    }
}
