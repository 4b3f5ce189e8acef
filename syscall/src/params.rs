//! Syscall argument passing for `syscall_perform(id, params)`.
//!
//! There is no user-mode ABI to preserve bit-for-bit here, so params are a
//! plain fixed-width array instead of a raw argument struct keyed by
//! syscall family.

/// Up to four `u64` arguments, the common case for every entry registered
/// so far (sleep's one duration, yield's none, fork's entry/arg/stack
/// size).
#[derive(Debug, Clone, Copy, Default)]
pub struct SyscallParams {
    raw: [u64; 4],
}

impl SyscallParams {
    pub const fn new(raw: [u64; 4]) -> SyscallParams {
        SyscallParams { raw }
    }

    pub fn arg(&self, index: usize) -> u64 {
        self.raw[index]
    }
}
