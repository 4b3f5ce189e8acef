//! Return-from-interrupt signal dispatch.
//!
//! Before resuming a thread, if its pending mask is non-zero the highest-
//! numbered bit with a non-null handler is cleared and the thread's saved
//! instruction pointer is rewritten to the handler; the original return
//! address is pushed onto the thread's stack so a handler that returns
//! normally resumes the interrupted code. This keeps delivery synchronous
//! with the target thread and needs no IPI.
//!
//! Pushing the return address means writing 8 bytes below the frame's
//! current stack pointer, the same raw-pointer stack manipulation
//! assembly context-switch glue would do, just expressed as one `unsafe`
//! block instead of inline asm.

use utk_abi::{SignalBlock, VcpuFrame};

/// Consult `block`'s pending mask and, if something is dispatchable,
/// rewrite `frame` to enter the handler on the next resume. Returns the
/// signal kind dispatched, if any.
///
/// # Safety
/// `frame`'s current stack pointer must address live, writable stack
/// memory for the owning thread; this is guaranteed for any `VcpuFrame`
/// belonging to a thread that has not yet been reaped.
pub unsafe fn dispatch_on_return(
    block: &mut SignalBlock,
    frame: &mut VcpuFrame,
) -> Option<utk_abi::SignalKind> {
    let (kind, handler) = block.take_highest_dispatchable()?;

    let original_rip = frame.instruction_pointer();
    let new_sp = frame.stack_pointer() - 8;
    unsafe {
        core::ptr::write(new_sp as *mut u64, original_rip);
    }
    frame.set_stack_pointer(new_sp);
    frame.set_instruction_pointer(handler as usize as u64);

    Some(kind)
}
