//! The interrupt-handler table.
//!
//! A dense, fixed-size mapping from interrupt-line index to an optional
//! handler, protected by one lock. Access goes through a "run a closure
//! with the table locked" helper backed by `utk_lib::Spinlock`, returning
//! typed `KernelResult`s instead of a raw status code.

use utk_abi::{KernelConfig, KernelError, KernelResult};
use utk_lib::Spinlock;

/// A registered handler: a plain function pointer, with no C ABI attached
/// since nothing outside this Rust workspace calls through it directly.
pub type InterruptHandler = fn(line: u8);

const MAX_LINES: usize = 256;

struct Table {
    handlers: [Option<InterruptHandler>; MAX_LINES],
}

impl Table {
    const fn new() -> Self {
        Table {
            handlers: [None; MAX_LINES],
        }
    }
}

pub struct HandlerTable {
    lock: Spinlock,
    inner: core::cell::UnsafeCell<Table>,
}

// SAFETY: all access to `inner` goes through `lock`.
unsafe impl Sync for HandlerTable {}

impl HandlerTable {
    pub const fn new() -> Self {
        HandlerTable {
            lock: Spinlock::new(),
            inner: core::cell::UnsafeCell::new(Table::new()),
        }
    }

    fn in_range(&self, line: u8, cfg: &KernelConfig) -> bool {
        line >= cfg.interrupt_line_min && line <= cfg.interrupt_line_max
    }

    /// Register a handler for `line`. Fails with
    /// `UnauthorizedInterruptLine` if `line` is outside the CPU-configured
    /// range, `AlreadyExist` if a handler is already registered there.
    pub fn register(
        &self,
        cfg: &KernelConfig,
        line: u8,
        handler: InterruptHandler,
    ) -> KernelResult<()> {
        if !self.in_range(line, cfg) {
            return Err(KernelError::UnauthorizedInterruptLine);
        }
        self.lock.acquire();
        let result = unsafe {
            let table = &mut *self.inner.get();
            if table.handlers[line as usize].is_some() {
                Err(KernelError::AlreadyExist)
            } else {
                table.handlers[line as usize] = Some(handler);
                Ok(())
            }
        };
        self.lock.release();
        result
    }

    /// Remove the handler registered at `line`. `NotRegistered` if the slot
    /// was already empty.
    pub fn remove(&self, line: u8) -> KernelResult<()> {
        self.lock.acquire();
        let result = unsafe {
            let table = &mut *self.inner.get();
            if table.handlers[line as usize].take().is_none() {
                Err(KernelError::NotRegistered)
            } else {
                Ok(())
            }
        };
        self.lock.release();
        result
    }

    /// Look up the handler for `line`, if any. Never held across the
    /// handler call by the caller.
    pub fn get(&self, line: u8) -> Option<InterruptHandler> {
        self.lock.acquire();
        let result = unsafe { (*self.inner.get()).handlers[line as usize] };
        self.lock.release();
        result
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}
