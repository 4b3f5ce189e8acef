//! Exception manager: a thin layer over the same handler
//! table as the regular interrupt dispatcher, constrained to the
//! exception sub-range reported by the CPU configuration.
//!
//! The actual CPU-specific stubs (division-by-zero, illegal instruction,
//! general-protection, page-fault,...) and their translation into a
//! signal on the current thread live above this crate (`utk-sched`/the
//! `kernel` integration crate), since that translation needs the current
//! thread and the signal subsystem, neither of which this crate depends
//! on. What belongs here is just the registration surface, narrowed to
//! the exception range, and the well-known divide-by-zero line number.

use utk_abi::{KernelConfig, KernelError, KernelResult};

use crate::dispatch::{int_register, int_remove};
use crate::handler_table::InterruptHandler;

/// The architecture's divide-error vector (x86: vector 0).
pub const DIV_BY_ZERO_LINE: u8 = 0;

fn in_exception_range(cfg: &KernelConfig, line: u8) -> bool {
    line >= cfg.exception_line_min && line <= cfg.exception_line_max
}

/// Register a CPU exception stub. Rejects lines outside the exception
/// sub-range even though `int_register` would otherwise accept them
/// anywhere in the full interrupt range.
pub fn exception_register(
    cfg: &KernelConfig,
    line: u8,
    handler: InterruptHandler,
) -> KernelResult<()> {
    if !in_exception_range(cfg, line) {
        return Err(KernelError::UnauthorizedInterruptLine);
    }
    int_register(cfg, line, handler)
}

pub fn exception_remove(cfg: &KernelConfig, line: u8) -> KernelResult<()> {
    if !in_exception_range(cfg, line) {
        return Err(KernelError::UnauthorizedInterruptLine);
    }
    int_remove(line)
}

/// Debug assertion: a stub that only fires on divide-by-zero should never
/// observe a different vector. Named so the *intent* (misrouting guard)
/// is unambiguous, rather than phrasing it as an inverted
/// `intId != DIV_BY_ZERO_LINE` check.
#[inline]
pub fn assert_is_div_by_zero_vector(vector: u8) {
    debug_assert_eq!(
        vector, DIV_BY_ZERO_LINE,
        "division-by-zero stub invoked for the wrong vector"
    );
}
