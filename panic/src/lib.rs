//! Unified panic handling.
//!
//! Ties together [`state`] (the one-shot recursion guard and enrichment
//! snapshot an exception stub can leave behind), [`backtrace`] (the
//! frame-pointer walk), [`report`] (field rendering over the console), and
//! [`shutdown`] (the QEMU test-exit sequence and the final halt). The
//! out-of-scope CPU glue calls [`kernel_panic`] directly from an exception
//! stub with a [`state::PanicFrame`] already recorded via
//! [`set_panic_frame`]; ordinary Rust `panic!()` call sites elsewhere in
//! the core reach the same path through the `#[panic_handler]` below.

#![cfg_attr(not(test), no_std)]

pub mod backtrace;
pub mod report;
pub mod shutdown;
pub mod state;

pub use shutdown::{halt_loop, request_test_exit};
pub use state::{PanicFrame, set_panic_code, set_panic_frame};

use core::fmt;

/// `true` in builds where a panic should also signal the QEMU test harness
/// before halting.
/// Plain `cfg!(feature =...)` rather than a runtime flag since whether this
/// binary is a test binary is known at compile time.
fn is_test_mode() -> bool {
    cfg!(feature = "test-mode")
}

/// The single entry point every panic path funnels through:
/// disable interrupts, snapshot what's left to snapshot, render the full
/// report, optionally notify the test harness, then halt forever. Never
/// returns. Safe to call with interrupts already disabled or enabled,
/// since the first action is unconditional.
pub fn kernel_panic(
    location_file: Option<&str>,
    location_line: u32,
    message: fmt::Arguments<'_>,
) -> ! {
    // Never restored: a panic never returns, so there is no matching
    // `critical_exit` and no point capturing the prior state.
    x86_64::instructions::interrupts::disable();

    if state::enter() {
        // Recursive panic: the first panic already owns the console and
        // enrichment state; touching either again could corrupt a
        // half-written report. Go straight to the halt.
        shutdown::halt_loop();
    }

    let (frame, code) = state::take_enrichment();
    let thread = utk_sched::sched_current_thread();
    let cpu = utk_lib::current_cpu_id();
    let uptime_ns = utk_timer::uptime_ns();

    let backtrace_frames;
    let backtrace_count;
    match frame.as_ref().map(|f| f.registers.rbp) {
        Some(rbp) => {
            // SAFETY: `rbp` came from a `VcpuRegisters` snapshot taken by
            // the CPU glue at trap time, which always captures the
            // faulting thread's own frame pointer.
            let (frames, count) = unsafe { backtrace::capture_from(rbp) };
            backtrace_frames = frames;
            backtrace_count = count;
        }
        None => {
            backtrace_frames = [backtrace::Frame {
                frame_pointer: 0,
                return_address: 0,
            }; backtrace::MAX_FRAMES];
            backtrace_count = 0;
        }
    }

    report::render(
        frame.as_ref(),
        thread.as_ref(),
        cpu,
        uptime_ns,
        location_file,
        location_line,
        message,
        code,
        &backtrace_frames,
        backtrace_count,
    );

    if is_test_mode() {
        shutdown::request_test_exit();
    }

    shutdown::halt_loop();
}

/// Rust's own panic entry point. Not registered as `#[panic_handler]` in
/// this crate directly: the top-level `kernel` crate's binary owns that
/// attribute (only one may exist per link unit) and forwards here.
pub fn panic_handler_impl(info: &core::panic::PanicInfo) -> ! {
    let (file, line) = match info.location() {
        Some(loc) => (Some(loc.file()), loc.line()),
        None => (None, 0),
    };
    kernel_panic(file, line, format_args!("{}", info.message()))
}
