//! Deferred-ISR work queue.
//!
//! Hard-IRQ handlers enqueue `(fn, arg)` pairs here instead of doing heavy
//! work inline. A consumer (a dedicated highest-priority kernel thread)
//! drains the queue FIFO. That thread (and the semaphore it blocks on)
//! belongs to `utk-sched`, which depends on this crate, so the queue only
//! exposes a push/pop pair plus a one-shot "something was enqueued"
//! notifier hook that `utk-sched` registers to post its semaphore; this
//! avoids a dependency cycle back from here into the scheduler.

use utk_abi::thread::MAX_DEFERRED_JOBS;
use utk_abi::{KernelError, KernelResult};
use utk_lib::{Spinlock, klog_warn};

/// One deferred job: a function pointer plus an opaque argument.
#[derive(Clone, Copy)]
pub struct DeferredJob {
    pub func: fn(usize),
    pub arg: usize,
}

struct Queue {
    jobs: [Option<DeferredJob>; MAX_DEFERRED_JOBS],
    head: usize,
    len: usize,
    jobs_run: u64,
    jobs_dropped: u64,
}

impl Queue {
    const fn new() -> Self {
        Queue {
            jobs: [None; MAX_DEFERRED_JOBS],
            head: 0,
            len: 0,
            jobs_run: 0,
            jobs_dropped: 0,
        }
    }
}

struct QueueCell(core::cell::UnsafeCell<Queue>);

// SAFETY: every access to the inner `Queue` goes through `LOCK`.
unsafe impl Sync for QueueCell {}

static LOCK: Spinlock = Spinlock::new();
static QUEUE: QueueCell = QueueCell(core::cell::UnsafeCell::new(Queue::new()));
static NOTIFY: core::sync::atomic::AtomicPtr<()> =
    core::sync::atomic::AtomicPtr::new(core::ptr::null_mut());

/// Register the callback invoked (outside any lock) each time a job is
/// successfully enqueued, so `utk-sched`'s deferred-ISR worker thread can
/// post its semaphore. Only one notifier may be installed at a time.
pub fn set_notify(notify: fn()) {
    NOTIFY.store(notify as *mut (), core::sync::atomic::Ordering::Release);
}

fn call_notify() {
    let ptr = NOTIFY.load(core::sync::atomic::Ordering::Acquire);
    if !ptr.is_null() {
        let f: fn() = unsafe { core::mem::transmute(ptr) };
        f();
    }
}

/// Enqueue a deferred job. Rust function pointers
/// can't be null, so a "null `fn` is reported and dropped" clause becomes
/// moot by construction; a full queue instead reports `NoMoreMemory`.
pub fn int_defer(func: fn(usize), arg: usize) -> KernelResult<()> {
    LOCK.acquire();
    let result = unsafe {
        let q = &mut *QUEUE.0.get();
        if q.len == MAX_DEFERRED_JOBS {
            q.jobs_dropped += 1;
            Err(KernelError::NoMoreMemory)
        } else {
            let tail = (q.head + q.len) % MAX_DEFERRED_JOBS;
            q.jobs[tail] = Some(DeferredJob { func, arg });
            q.len += 1;
            Ok(())
        }
    };
    LOCK.release();
    match result {
        Ok(()) => call_notify(),
        Err(_) => klog_warn!("deferred-isr: queue full, job dropped"),
    }
    result
}

/// Pop and run the next job, if any. Returns whether a job actually ran.
pub fn run_one() -> bool {
    let job = {
        LOCK.acquire();
        let job = unsafe {
            let q = &mut *QUEUE.0.get();
            if q.len == 0 {
                None
            } else {
                let job = q.jobs[q.head].take();
                q.head = (q.head + 1) % MAX_DEFERRED_JOBS;
                q.len -= 1;
                job
            }
        };
        LOCK.release();
        job
    };
    match job {
        Some(job) => {
            (job.func)(job.arg);
            LOCK.acquire();
            unsafe { (*QUEUE.0.get()).jobs_run += 1 };
            LOCK.release();
            true
        }
        None => false,
    }
}

/// Depth, jobs-run, jobs-dropped snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredStats {
    pub depth: usize,
    pub jobs_run: u64,
    pub jobs_dropped: u64,
}

pub fn stats() -> DeferredStats {
    LOCK.acquire();
    let stats = unsafe {
        let q = &*QUEUE.0.get();
        DeferredStats {
            depth: q.len,
            jobs_run: q.jobs_run,
            jobs_dropped: q.jobs_dropped,
        }
    };
    LOCK.release();
    stats
}
