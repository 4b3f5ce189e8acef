//! Spinlock with saved interrupt state.
//!
//! Acquisition order: disable interrupts on the current CPU and remember
//! the previous interrupt-enable bit in a per-CPU slot, then spin on CAS
//! until the lock word transitions 0->1. Release writes 0 and restores
//! the bit from that same per-CPU slot, not from a value the caller
//! carries around, so the release side can't accidentally restore another
//! CPU's state.
//!
//! The flags are stored in a per-CPU slot inside the lock rather than
//! returned to the caller.

use core::hint::spin_loop;
use core::sync::atomic::{AtomicBool, AtomicIsize, Ordering};

use utk_abi::thread::MAX_CPUS;

use crate::cpu_local::current_cpu_id;

const UNOWNED: isize = -1;

pub struct Spinlock {
    locked: AtomicBool,
    owner: AtomicIsize,
    saved_enabled: [AtomicBool; MAX_CPUS],
}

impl Spinlock {
    pub const fn new() -> Self {
        const FALSE: AtomicBool = AtomicBool::new(false);
        Self {
            locked: AtomicBool::new(false),
            owner: AtomicIsize::new(UNOWNED),
            saved_enabled: [FALSE; MAX_CPUS],
        }
    }

    /// Acquire the lock: disable interrupts on this CPU, save the prior
    /// enable bit into this CPU's slot, then spin until the CAS succeeds.
    pub fn acquire(&self) {
        let cpu = current_cpu_id();
        debug_assert!(
            self.owner.load(Ordering::Relaxed) != cpu as isize,
            "nested spinlock acquisition on the same CPU"
        );

        let was_enabled = x86_64::instructions::interrupts::are_enabled();
        x86_64::instructions::interrupts::disable();

        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            spin_loop();
        }

        self.saved_enabled[cpu].store(was_enabled, Ordering::Relaxed);
        self.owner.store(cpu as isize, Ordering::Relaxed);
    }

    /// Release the lock and restore the interrupt-enable bit captured by
    /// the matching [`Spinlock::acquire`] on this same CPU.
    pub fn release(&self) {
        let cpu = current_cpu_id();
        let was_enabled = self.saved_enabled[cpu].load(Ordering::Relaxed);
        self.owner.store(UNOWNED, Ordering::Relaxed);
        self.locked.store(false, Ordering::Release);
        if was_enabled {
            x86_64::instructions::interrupts::enable();
        }
    }

    /// Run `f` with the lock held, releasing it afterwards even on panic
    /// unwind (panic=abort kernels never unwind, but this keeps the call
    /// site simple either way).
    pub fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        self.acquire();
        let result = f();
        self.release();
        result
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl Default for Spinlock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: interior mutability is guarded by the atomic `locked` word; only
// the CPU that wins the CAS touches `saved_enabled[cpu]`/`owner` for its own
// slot.
unsafe impl Sync for Spinlock {}
