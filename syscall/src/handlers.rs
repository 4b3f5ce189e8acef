//! The scheduler-owned dispatch entries.

use utk_abi::{AffinityMask, KernelError, KernelResult};
use utk_sched::ThreadEntry;

use crate::params::SyscallParams;

/// Default stack size handed to a forked thread when the caller passes
/// zero (spec gives no sizing rule of its own for `fork`; matches
/// `KernelConfig::default_const().page_size * 4`, a generous handful of
/// pages for a kernel-thread stack).
const DEFAULT_FORK_STACK_SIZE: usize = 4096 * 4;

/// `SYS_SLEEP`: `params.arg(0)` is the duration in nanoseconds.
pub fn sleep(params: SyscallParams) -> KernelResult<i64> {
    utk_sched::sched_sleep(params.arg(0))?;
    Ok(0)
}

/// `SYS_YIELD`: give up the remainder of the current quantum without
/// blocking. Takes no arguments.
pub fn r#yield(_params: SyscallParams) -> KernelResult<i64> {
    utk_sched::schedule_no_int();
    Ok(0)
}

/// `SYS_FORK`: spawn a new kernel thread at the caller's own priority.
/// There is no address space to duplicate in this core, so the entry point and its
/// argument are passed explicitly rather than inherited by copying the
/// caller's memory; `params.arg(0)` is the entry function pointer (cast
/// from [`ThreadEntry`]), `arg(1)` its argument, `arg(2)` an optional
/// stack size override (0 selects [`DEFAULT_FORK_STACK_SIZE`]). Returns
/// the new thread's index as the low 32 bits of the result, matching
/// `fork`'s traditional "child id back in the parent" contract.
pub fn fork(params: SyscallParams) -> KernelResult<i64> {
    if params.arg(0) == 0 {
        return Err(KernelError::IncorrectValue);
    }
    // SAFETY: the caller (necessarily a kernel thread, enforced by
    // `crate::table::syscall_perform`) is trusted to have passed a real
    // `ThreadEntry`-shaped function pointer, the same trust boundary every
    // other raw `SyscallParams` argument carries.
    let entry: ThreadEntry =
        unsafe { core::mem::transmute::<usize, ThreadEntry>(params.arg(0) as usize) };
    let arg = params.arg(1) as usize;
    let stack_size = match params.arg(2) {
        0 => DEFAULT_FORK_STACK_SIZE,
        other => other as usize,
    };

    let priority = utk_sched::sched_current_thread()
        .map(|t| t.priority)
        .unwrap_or_default();
    let id = utk_sched::sched_create_kernel_thread(
        "forked",
        priority,
        stack_size,
        AffinityMask::all(),
        entry,
        arg,
    )?;
    Ok(id.index() as i64)
}
