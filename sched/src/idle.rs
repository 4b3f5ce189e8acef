//! The per-CPU idle thread body.
//!
//! Loops on a bare `hlt` rather than reaching for a crate-provided
//! wrapper, since it's the one place in this workspace that really is
//! just "the architecture's wait-for-interrupt opcode".

fn halt() {
    unsafe { core::arch::asm!("hlt", options(nomem, nostack, preserves_flags)) };
}

pub(crate) fn idle_loop(_arg: usize) -> u64 {
    loop {
        halt();
    }
}
