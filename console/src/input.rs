//! Console input binding.

/// Implemented by whichever device is bound as console input. Polling
/// rather than callback-based: the device buffers scancodes or bytes
/// itself and hands back whatever is pending.
pub trait ConsoleInput: Sync {
    /// Non-blocking: `None` if nothing is pending.
    fn try_read_byte(&self) -> Option<u8>;
}

static INPUT: utk_lib::ServiceCell<&'static dyn ConsoleInput> =
    utk_lib::ServiceCell::new("console_input");

/// Bind the console's input device. Panics if called twice.
pub fn bind_input(device: &'static dyn ConsoleInput) {
    INPUT.register(device);
}

pub fn is_input_bound() -> bool {
    INPUT.is_initialized()
}

/// `None` both when no byte is pending and when no input device has been
/// bound at all; callers that need to tell the two apart should check
/// [`is_input_bound`] first.
pub fn console_try_read_byte() -> Option<u8> {
    INPUT.try_get().and_then(|device| device.try_read_byte())
}
