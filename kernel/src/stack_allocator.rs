//! A minimal page-bump [`StackAllocator`].
//!
//! A static arena with a monotonically advancing offset and no real free,
//! narrowed to the one operation this core actually needs: handing out
//! page-aligned stacks. A real kernel heap allocator is out of scope here;
//! this exists only so `sched_init`/`sched_create_kernel_thread` have
//! something to call.
//!
//! Stacks are never reclaimed individually: `dealloc_stack` is a no-op.
//! Good enough for a core with no dynamic thread churn in its test
//! scenarios; a real build would swap this for a page-frame-backed
//! allocator from the MMU layer.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use utk_abi::traits::{StackAllocation, StackAllocator};
use utk_abi::{KernelError, KernelResult};
use utk_lib::Spinlock;

/// Total bytes set aside for thread stacks. Sized generously for the
/// handful of kernel threads this core's scenarios ever create at once.
const ARENA_SIZE: usize = 1024 * 1024;
const PAGE_SIZE: usize = 4096;

#[repr(align(4096))]
struct Arena([u8; ARENA_SIZE]);

pub struct BumpStackAllocator {
    lock: Spinlock,
    arena: UnsafeCell<Arena>,
    offset: AtomicUsize,
}

// SAFETY: `arena`'s base address is only ever read to compute pointers;
// `offset` is the sole mutable cursor, itself an atomic, and bumped under
// `lock` alongside the allocation-count bookkeeping.
unsafe impl Sync for BumpStackAllocator {}

impl BumpStackAllocator {
    pub const fn new() -> BumpStackAllocator {
        BumpStackAllocator {
            lock: Spinlock::new(),
            arena: UnsafeCell::new(Arena([0; ARENA_SIZE])),
            offset: AtomicUsize::new(0),
        }
    }
}

impl StackAllocator for BumpStackAllocator {
    fn alloc_stack(&self, size: usize) -> KernelResult<StackAllocation> {
        if size == 0 || size % PAGE_SIZE != 0 {
            return Err(KernelError::IncorrectValue);
        }

        self.lock.acquire();
        let current = self.offset.load(Ordering::Relaxed);
        let result = if current + size > ARENA_SIZE {
            Err(KernelError::NoMoreMemory)
        } else {
            let base = unsafe { (*self.arena.get()).0.as_mut_ptr().add(current) } as usize;
            self.offset.store(current + size, Ordering::Relaxed);
            Ok(StackAllocation {
                base,
                top: base + size,
                size,
            })
        };
        self.lock.release();
        result
    }

    fn dealloc_stack(&self, _allocation: StackAllocation) {
        // No reclamation; see module doc comment.
    }
}

pub static STACK_ALLOCATOR: BumpStackAllocator = BumpStackAllocator::new();
