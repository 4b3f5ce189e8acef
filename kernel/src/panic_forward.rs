//! `#[panic_handler]` forwarding.
//!
//! This crate is an `rlib`, not the final linked binary; the real
//! `#[no_main]`/`_start` entry and its matching `#[panic_handler]` belong
//! to the out-of-scope boot binary. What lives here is the one-line
//! forwarding function that binary is expected to call, kept in this
//! crate so the forwarding itself is tested in the same place as the rest
//! of the boot sequencing.

use core::panic::PanicInfo;

/// Call from the final binary's `#[panic_handler]` function. Never
/// returns.
pub fn forward_panic(info: &PanicInfo) -> ! {
    utk_panic::panic_handler_impl(info)
}
