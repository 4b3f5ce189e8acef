//! Counting semaphores.
//!
//! Lives in this crate rather than a standalone one because `sem_wait`
//! parks a thread exactly like `sched_sleep`/`sched_join` do: a semaphore's
//! wait queue is just another list threaded through the TCB arena's `next`
//! field, built from the same [`crate::queue`] primitives as the ready
//! buckets and the sleep queue. A counter plus a wait list drained on
//! post, generalized with a FIFO/PRIORITY discipline flag and priority
//! inheritance: unlike a plain always-FIFO semaphore, a waiter here can
//! temporarily bump its holder's priority.

use utk_abi::thread::MAX_THREADS;
use utk_abi::{KernelError, KernelResult, Priority, ThreadState, WaitResource};
use utk_lib::klog_info;

use crate::queue::{list_insert_sorted, list_pop_head, list_push_tail};
use crate::state::{self, SchedulerState};
use crate::tcb::Arena;

/// Upper bound on live semaphores. Destroyed handles are never recycled.
pub const MAX_SEMAPHORES: usize = 64;

/// Waiter ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueDiscipline {
    Fifo,
    Priority,
}

pub type SemaphoreId = u32;

#[derive(Clone, Copy)]
pub(crate) struct Semaphore {
    counter: i32,
    discipline: QueueDiscipline,
    wait_head: Option<u32>,
    wait_tail: Option<u32>,
    destroyed: bool,
    in_use: bool,
    /// Arena index of the thread a `PRIORITY` semaphore currently treats as
    /// its owner, for priority inheritance. Set on a successful acquire
    /// that drains the counter to zero, cleared on the matching post.
    holder: Option<u32>,
}

impl Semaphore {
    pub(crate) const fn empty() -> Semaphore {
        Semaphore {
            counter: 0,
            discipline: QueueDiscipline::Fifo,
            wait_head: None,
            wait_tail: None,
            destroyed: false,
            in_use: false,
            holder: None,
        }
    }
}

pub(crate) const fn empty_pool() -> [Semaphore; MAX_SEMAPHORES] {
    [Semaphore::empty(); MAX_SEMAPHORES]
}

fn lookup(
    semaphores: &mut [Semaphore; MAX_SEMAPHORES],
    id: SemaphoreId,
) -> KernelResult<&mut Semaphore> {
    semaphores
        .get_mut(id as usize)
        .filter(|s| s.in_use)
        .ok_or(KernelError::NoSuchId)
}

fn inherit_priority(arena: &mut Arena, holder_index: u32, waiter_priority: Priority) {
    if let Some(holder) = arena.get_by_index_mut(holder_index) {
        if waiter_priority < holder.current_priority {
            holder.current_priority = waiter_priority;
        }
    }
}

fn restore_priority(arena: &mut Arena, index: u32) {
    if let Some(tcb) = arena.get_by_index_mut(index) {
        tcb.current_priority = tcb.base_priority;
    }
}

/// `sem_init`: allocates a handle with the given starting
/// count and queueing discipline. Handles are never reused, so this is the
/// only call that can exhaust `MAX_SEMAPHORES`.
pub fn sem_init(initial: i32, discipline: QueueDiscipline) -> KernelResult<SemaphoreId> {
    state::with_state(|state| {
        let index = state
            .semaphores
            .iter()
            .position(|s| !s.in_use)
            .ok_or(KernelError::NoMoreMemory)?;
        state.semaphores[index] = Semaphore {
            counter: initial,
            discipline,
            in_use: true,
            ..Semaphore::empty()
        };
        klog_info!("sched: semaphore {} initialized at {}", index, initial);
        Ok(index as u32)
    })
}

enum WaitOutcome {
    Acquired,
    Blocked(u32),
}

/// `sem_wait`: blocks the caller until the count is positive,
/// then consumes one unit. Returns `DESTROYED` immediately, or on wake,
/// if the semaphore is torn down while this call is in flight.
pub fn sem_wait(id: SemaphoreId) -> KernelResult<()> {
    let outcome = state::with_state(|state| -> KernelResult<WaitOutcome> {
        let SchedulerState {
            semaphores,
            arena,
            percpu,
            ..
        } = state;

        let cpu = utk_lib::current_cpu_id();
        let caller_index = percpu[cpu].current.ok_or(KernelError::NoSuchId)?;
        let caller_priority = arena
            .get_by_index_mut(caller_index)
            .ok_or(KernelError::NoSuchId)?
            .current_priority;

        let sem = lookup(semaphores, id)?;
        if sem.destroyed {
            return Err(KernelError::Destroyed);
        }
        if sem.counter > 0 {
            sem.counter -= 1;
            if sem.counter == 0 && sem.discipline == QueueDiscipline::Priority {
                sem.holder = Some(caller_index);
            }
            return Ok(WaitOutcome::Acquired);
        }

        if sem.discipline == QueueDiscipline::Priority {
            if let Some(holder_index) = sem.holder {
                inherit_priority(arena, holder_index, caller_priority);
            }
        }

        if let Some(tcb) = arena.get_by_index_mut(caller_index) {
            tcb.state = ThreadState::Waiting;
            tcb.wait_resource = WaitResource::Semaphore(id);
            tcb.wait_wake_destroyed = false;
        }
        match sem.discipline {
            QueueDiscipline::Fifo => {
                list_push_tail(arena, &mut sem.wait_head, &mut sem.wait_tail, caller_index)
            }
            QueueDiscipline::Priority => {
                list_insert_sorted(arena, &mut sem.wait_head, caller_index, |t| {
                    t.current_priority.get() as u64
                })
            }
        }
        Ok(WaitOutcome::Blocked(caller_index))
    })?;

    match outcome {
        WaitOutcome::Acquired => Ok(()),
        WaitOutcome::Blocked(caller_index) => {
            crate::dispatch::reschedule_after_block(caller_index);
            let destroyed = state::with_state(|state| {
                state
                    .arena
                    .get_by_index_mut(caller_index)
                    .map(|tcb| core::mem::take(&mut tcb.wait_wake_destroyed))
                    .unwrap_or(false)
            });
            if destroyed {
                Err(KernelError::Destroyed)
            } else {
                Ok(())
            }
        }
    }
}

/// `sem_try_wait`: non-blocking acquire. Returns the
/// post-decrement count on success, `BLOCKED` if the count was already
/// zero, `DESTROYED` if the handle was torn down.
pub fn sem_try_wait(id: SemaphoreId) -> KernelResult<i32> {
    state::with_state(|state| {
        let sem = lookup(&mut state.semaphores, id)?;
        if sem.destroyed {
            return Err(KernelError::Destroyed);
        }
        if sem.counter > 0 {
            sem.counter -= 1;
            Ok(sem.counter)
        } else {
            Err(KernelError::Blocked)
        }
    })
}

/// `sem_post`: hands the unit directly to the queue head under
/// the semaphore's discipline if anyone is waiting, otherwise increments
/// the count. Restores the poster's inherited priority first, if it is the
/// current PI holder.
pub fn sem_post(id: SemaphoreId) -> KernelResult<()> {
    let to_wake = state::with_state(|state| -> KernelResult<Option<u32>> {
        let cpu = utk_lib::current_cpu_id();
        let caller_index = state.percpu[cpu].current;

        let SchedulerState {
            semaphores, arena, ..
        } = state;
        let sem = lookup(semaphores, id)?;
        if sem.destroyed {
            return Err(KernelError::Destroyed);
        }

        if let (Some(holder_idx), Some(caller_idx)) = (sem.holder, caller_index) {
            if holder_idx == caller_idx {
                restore_priority(arena, holder_idx);
                sem.holder = None;
            }
        }

        match list_pop_head(arena, &mut sem.wait_head, &mut sem.wait_tail) {
            Some(woken_index) => {
                if sem.discipline == QueueDiscipline::Priority {
                    sem.holder = Some(woken_index);
                }
                Ok(Some(woken_index))
            }
            None => {
                sem.counter += 1;
                Ok(None)
            }
        }
    })?;

    if let Some(index) = to_wake {
        state::with_state(|state| crate::dispatch::wake_thread(state, index));
    }
    Ok(())
}

/// `sem_destroy`: marks the handle permanently destroyed and
/// wakes every current waiter with the distinguished destroyed status.
/// Never reclaims the slot, so any later call against the same id keeps
/// returning `DESTROYED` rather than `NO_SUCH_ID`.
pub fn sem_destroy(id: SemaphoreId) -> KernelResult<()> {
    let mut waiters = [0u32; MAX_THREADS];
    let mut count = 0usize;

    state::with_state(|state| -> KernelResult<()> {
        let SchedulerState {
            semaphores, arena, ..
        } = state;
        let sem = lookup(semaphores, id)?;
        sem.destroyed = true;
        sem.holder = None;
        while let Some(woken_index) = list_pop_head(arena, &mut sem.wait_head, &mut sem.wait_tail) {
            if count < waiters.len() {
                waiters[count] = woken_index;
                count += 1;
            }
        }
        Ok(())
    })?;

    for waiter in &waiters[..count] {
        let index = *waiter;
        state::with_state(|state| {
            if let Some(tcb) = state.arena.get_by_index_mut(index) {
                tcb.wait_wake_destroyed = true;
            }
            crate::dispatch::wake_thread(state, index);
        });
    }
    klog_info!(
        "sched: semaphore {} destroyed, {} waiter(s) released",
        id,
        count
    );
    Ok(())
}
