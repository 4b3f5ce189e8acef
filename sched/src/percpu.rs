//! Per-CPU scheduler state: 64 strict-priority ready buckets, FIFO within a bucket, plus the
//! idle thread and the load-accounting counters.
//!
//! One instance per CPU rather than one global scheduler, with ready
//! buckets threaded as index-linked lists over the arena in
//! [`crate::tcb`] instead of intrusive raw pointers.

use utk_abi::priority::NUM_PRIORITY_LEVELS;

/// One priority bucket: a FIFO of arena indices threaded through each TCB's
/// own `next` field.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    pub head: Option<u32>,
    pub tail: Option<u32>,
    pub len: u32,
}

impl Bucket {
    pub const fn empty() -> Bucket {
        Bucket {
            head: None,
            tail: None,
            len: 0,
        }
    }
}

/// Scheduler state owned by a single CPU.
#[derive(Clone, Copy)]
pub struct PerCpu {
    pub current: Option<u32>,
    pub idle: Option<u32>,
    pub buckets: [Bucket; NUM_PRIORITY_LEVELS as usize],
    pub ticks_since_switch: u32,
    pub active_ns: u64,
    pub idle_ns: u64,
    pub window_start_ns: u64,
}

impl PerCpu {
    pub const fn empty() -> PerCpu {
        PerCpu {
            current: None,
            idle: None,
            buckets: [Bucket::empty(); NUM_PRIORITY_LEVELS as usize],
            ticks_since_switch: 0,
            active_ns: 0,
            idle_ns: 0,
            window_start_ns: 0,
        }
    }

    /// The lowest-numbered non-empty bucket, i.e. the next thread to run.
    pub fn highest_ready_bucket(&self) -> Option<usize> {
        self.buckets.iter().position(|b| b.len > 0)
    }
}
