//! The thread control block and its arena.
//!
//! TCBs live forever once allocated out of a fixed array (no heap here).
//! Every cross-reference (ready-queue links, the sleep queue, a
//! semaphore's wait queue, a joiner waiting on another thread) is a plain
//! `u32` arena index rather than an intrusive pointer, guarded against
//! stale references by a generation counter bumped on free. A
//! [`utk_abi::ThreadId`] is only ever valid if its generation matches the
//! slot it names.

use utk_abi::{
    AffinityMask, CpuId, KernelError, KernelResult, Priority, SignalBlock, StackAllocation,
    TerminationCause, ThreadId, ThreadState, VcpuFrame, WaitResource,
};
use utk_lib::RingBuffer;

/// A thread entry point: receives the creator-supplied argument, returns a
/// value visible to a joiner via `sched_thread_exit(..., retval)`.
pub type ThreadEntry = fn(usize) -> u64;

/// Capacity of a TCB's owned-resource FIFO. Sized generously since a thread rarely
/// holds more than a handful of releasable handles at once.
pub const MAX_RESOURCES_PER_THREAD: usize = 16;

/// One releasable handle owned by a thread, drained in order at exit (spec
/// §4.7 `sched_thread_exit`: "drains its resource list, calling each
/// resource's release hook").
#[derive(Clone, Copy)]
pub struct ResourceHandle {
    pub release: fn(usize),
    pub arg: usize,
}

fn noop_release(_arg: usize) {}

const EMPTY_RESOURCE: ResourceHandle = ResourceHandle {
    release: noop_release,
    arg: 0,
};

/// Outcome recorded on the TCB once a thread reaches `ZOMBIE`.
#[derive(Debug, Clone, Copy)]
pub struct Termination {
    pub cause: TerminationCause,
    pub retval: u64,
}

/// The thread control block. Every cross-structure link (ready
/// queue, sleep queue, semaphore wait queue) is carried in the single
/// `next` field, since the invariant in §3 guarantees a thread is on at
/// most one such structure at a time.
pub struct Tcb {
    pub id: ThreadId,
    pub name: &'static str,
    pub base_priority: Priority,
    pub current_priority: Priority,
    pub affinity: AffinityMask,
    pub home_cpu: CpuId,
    pub state: ThreadState,
    pub wait_resource: WaitResource,
    pub wake_deadline_ns: u64,
    pub vcpu: VcpuFrame,
    pub stack: StackAllocation,
    pub signals: SignalBlock,
    pub resources: RingBuffer<ResourceHandle, MAX_RESOURCES_PER_THREAD>,
    pub entry: ThreadEntry,
    pub entry_arg: usize,
    pub termination: Option<Termination>,
    /// Arena index of a thread parked in `sched_join` on this one, if any.
    pub joiner: Option<u32>,
    /// Intrusive link: whichever queue this TCB currently sits on (a ready
    /// bucket, the sleep queue, or a semaphore's wait queue).
    pub next: Option<u32>,
    /// True for the one per-CPU idle thread.
    pub is_idle: bool,
    /// Set by [`crate::semaphore::sem_destroy`] on a waiter it wakes, so
    /// the resumed `sem_wait` can distinguish a destroyed handle from a
    /// normal hand-off without a second shared state lookup.
    pub wait_wake_destroyed: bool,
}

impl Tcb {
    pub fn is_zombie(&self) -> bool {
        matches!(self.state, ThreadState::Zombie)
    }
}

struct Slot {
    tcb: Option<Tcb>,
    generation: u32,
}

/// Fixed-capacity TCB arena. `MAX_THREADS` slots, each
/// guarded by a generation counter so a stale [`ThreadId`] fails lookup
/// instead of aliasing a reused slot.
pub struct Arena {
    slots: [Slot; utk_abi::thread::MAX_THREADS],
}

impl Arena {
    pub fn new() -> Arena {
        Arena {
            slots: core::array::from_fn(|_| Slot {
                tcb: None,
                generation: 0,
            }),
        }
    }

    /// Allocate a free slot and move `build(id)` into it. `build` receives
    /// the `ThreadId` the new TCB will own, so the entry/trampoline wiring
    /// can be set up before the slot is published.
    pub fn alloc(&mut self, build: impl FnOnce(ThreadId) -> Tcb) -> KernelResult<ThreadId> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.tcb.is_none())
            .ok_or(KernelError::NoMoreMemory)?;
        let generation = self.slots[index].generation;
        let id = ThreadId::new(index as u32, generation);
        self.slots[index].tcb = Some(build(id));
        Ok(id)
    }

    /// Free a slot, bumping its generation so any surviving `ThreadId`
    /// referring to it now fails every lookup.
    pub fn free(&mut self, id: ThreadId) -> Option<Tcb> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let tcb = slot.tcb.take();
        if tcb.is_some() {
            slot.generation = slot.generation.wrapping_add(1);
        }
        tcb
    }

    pub fn get(&self, id: ThreadId) -> Option<&Tcb> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.tcb.as_ref()
    }

    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut Tcb> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.tcb.as_mut()
    }

    pub fn get_by_index_mut(&mut self, index: u32) -> Option<&mut Tcb> {
        self.slots.get_mut(index as usize)?.tcb.as_mut()
    }

    /// Iterate every live TCB and its arena index. Used by the exit path to
    /// find a thread waiting to join the exiting one, and by the sleep
    /// queue's deadline-ordered scan.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut Tcb)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.tcb.as_mut().map(|tcb| (i as u32, tcb)))
    }
}

pub(crate) const fn empty_resource_fill() -> ResourceHandle {
    EMPTY_RESOURCE
}
