//! Test-mode exit and the final halt.
//!
//! A raw `outw` to the QEMU/Bochs ACPI-poweroff port, narrowed to just
//! that one port rather than also covering the Bochs/old-QEMU fallback
//! addresses: `utk_abi::config::TEST_EXIT_PORT`/`TEST_EXIT_VALUE` already
//! name the one this workspace standardizes on.

use utk_abi::config::{TEST_EXIT_PORT, TEST_EXIT_VALUE};
use x86_64::instructions::port::Port;

/// Ask the test harness (QEMU's `isa-debug-exit` device) to exit. A no-op
/// outside test-mode builds running under QEMU, where nothing is mapped at
/// this port: the write is simply lost.
pub fn request_test_exit() {
    let mut port: Port<u16> = Port::new(TEST_EXIT_PORT);
    unsafe { port.write(TEST_EXIT_VALUE) };
}

/// Halt forever with interrupts already disabled. Never returns.
pub fn halt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}
