//! Frame-pointer stack walk.
//!
//! Walks the `rbp` chain, treating each frame as `[saved_rbp,
//! return_address]` at the address `rbp` points to, bounded by a
//! canonical-address check and a sanity check that the chain only ever
//! grows upward by a bounded amount. Built as a safe-looking
//! iterator-free loop returning a fixed-size array instead of writing
//! through a raw `*mut` out-parameter, since this crate has no C ABI to
//! preserve.

/// One captured frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub frame_pointer: u64,
    pub return_address: u64,
}

pub const MAX_FRAMES: usize = 16;

fn is_canonical(address: u64) -> bool {
    let upper = address >> 47;
    upper == 0 || upper == 0x1FFFF
}

fn grows_upward_reasonably(current_rbp: u64, next_rbp: u64) -> bool {
    next_rbp > current_rbp && next_rbp - current_rbp <= (1 << 20)
}

/// Walk the frame-pointer chain starting at `rbp`, stopping at a null
/// frame, a non-canonical address, a misaligned pointer, or `MAX_FRAMES`,
/// whichever comes first.
///
/// # Safety
/// `rbp` must be a value actually captured from the `rbp` register of a
/// thread that maintains the standard `push rbp; mov rbp, rsp` prologue,
/// and the memory it chains through must still be mapped. Called only from
/// the panic path with the faulting thread's own saved frame pointer.
pub unsafe fn capture_from(mut rbp: u64) -> ([Frame; MAX_FRAMES], usize) {
    let mut frames = [Frame {
        frame_pointer: 0,
        return_address: 0,
    }; MAX_FRAMES];
    let mut count = 0;

    while rbp != 0 && count < MAX_FRAMES {
        if rbp % 8 != 0 || !is_canonical(rbp) {
            break;
        }

        let frame_ptr = rbp as *const u64;
        // SAFETY: caller guarantees `rbp` chains through mapped memory.
        let next_rbp = unsafe { frame_ptr.read() };
        let return_address = unsafe { frame_ptr.add(1).read() };

        frames[count] = Frame {
            frame_pointer: rbp,
            return_address,
        };
        count += 1;

        if !is_canonical(next_rbp) || !grows_upward_reasonably(rbp, next_rbp) {
            break;
        }
        rbp = next_rbp;
    }

    (frames, count)
}
