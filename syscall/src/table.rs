//! The static syscall dispatch table and `syscall_perform` entry point.
//!
//! A linear scan over a fixed table of `(id, handler)` pairs. This core
//! has no user-mode trap to marshal, so `syscall_perform` is a direct
//! function call, not a trap handler.

use utk_abi::{KernelError, KernelResult};

use crate::handlers;
use crate::params::SyscallParams;

pub type SyscallId = u32;

pub const SYS_SLEEP: SyscallId = 0;
pub const SYS_YIELD: SyscallId = 1;
pub const SYS_FORK: SyscallId = 2;

type Handler = fn(SyscallParams) -> KernelResult<i64>;

struct Entry {
    id: SyscallId,
    handler: Handler,
}

static TABLE: &[Entry] = &[
    Entry {
        id: SYS_SLEEP,
        handler: handlers::sleep,
    },
    Entry {
        id: SYS_YIELD,
        handler: handlers::r#yield,
    },
    Entry {
        id: SYS_FORK,
        handler: handlers::fork,
    },
];

/// `syscall_perform(id, params)`: looks `id` up in the static
/// table, enforces that the caller is a kernel thread, then calls the
/// matching handler directly; the out-of-scope CPU glue's
/// `cpu_kernel_syscall_raise` is what would save/restore the caller's
/// context and switch to its kernel stack around this call, since that
/// register-level work has no pure-Rust representation here.
///
/// This core has no user mode, so "caller is a kernel
/// thread" reduces to "the scheduler has a current thread on this CPU at
/// all", and the one case where that is false is hard-IRQ context with no
/// thread yet bootstrapped, which must never reach a syscall anyway.
pub fn syscall_perform(id: SyscallId, params: SyscallParams) -> KernelResult<i64> {
    if utk_sched::sched_current_thread().is_none() {
        return Err(KernelError::UnauthorizedAction);
    }
    for entry in TABLE {
        if entry.id == id {
            return (entry.handler)(params);
        }
    }
    Err(KernelError::NoSuchId)
}
