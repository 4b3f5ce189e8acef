//! Tracing event sink: an orthogonal sink accepting (event-id, nanosecond
//! timestamp, 0-6 payload words). The ring buffer is a single-producer,
//! multiple-consumer circular array protected by one spinlock, with a
//! 2-word header (magic + version) at its base.
//!
//! Gated behind the `tracing` feature; nothing in the rest of the
//! workspace depends on it being compiled in.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::spinlock::Spinlock;

const MAGIC: u64 = 0x55_54_4B_5F_54_52_43_21; // "UTK_TRC!"
const VERSION: u64 = 1;

/// Capacity of the trace ring, in events.
pub const TRACE_CAPACITY: usize = 512;

/// Up to six payload words, per the design note's "0-6 payload words".
pub const MAX_PAYLOAD_WORDS: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct TraceEvent {
    pub event_id: u32,
    pub timestamp_ns: u64,
    pub payload: [u64; MAX_PAYLOAD_WORDS],
    pub payload_len: u8,
}

impl TraceEvent {
    const EMPTY: TraceEvent = TraceEvent {
        event_id: 0,
        timestamp_ns: 0,
        payload: [0; MAX_PAYLOAD_WORDS],
        payload_len: 0,
    };
}

struct Header {
    magic: u64,
    version: u64,
}

struct Ring {
    header: Header,
    slots: [TraceEvent; TRACE_CAPACITY],
    head: usize,
    len: usize,
}

pub struct TraceBuffer {
    lock: Spinlock,
    ring: core::cell::UnsafeCell<Ring>,
    dropped: AtomicUsize,
}

// SAFETY: all access to `ring` goes through `lock`; `dropped` is its own
// atomic.
unsafe impl Sync for TraceBuffer {}

impl TraceBuffer {
    const fn new() -> TraceBuffer {
        TraceBuffer {
            lock: Spinlock::new(),
            ring: core::cell::UnsafeCell::new(Ring {
                header: Header {
                    magic: MAGIC,
                    version: VERSION,
                },
                slots: [TraceEvent::EMPTY; TRACE_CAPACITY],
                head: 0,
                len: 0,
            }),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Record one event. Oldest entry is overwritten once the ring is full
    /// rather than rejecting the write, since a trace log favors staying
    /// current over never losing history, unlike `RingBuffer`'s serial
    /// input queue.
    pub fn record(&self, event_id: u32, timestamp_ns: u64, payload: &[u64]) {
        let len = payload.len().min(MAX_PAYLOAD_WORDS);
        if payload.len() > MAX_PAYLOAD_WORDS {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        let mut event = TraceEvent::EMPTY;
        event.event_id = event_id;
        event.timestamp_ns = timestamp_ns;
        event.payload[..len].copy_from_slice(&payload[..len]);
        event.payload_len = len as u8;

        self.lock.acquire();
        let ring = unsafe { &mut *self.ring.get() };
        let write_at = (ring.head + ring.len) % TRACE_CAPACITY;
        ring.slots[write_at] = event;
        if ring.len < TRACE_CAPACITY {
            ring.len += 1;
        } else {
            ring.head = (ring.head + 1) % TRACE_CAPACITY;
        }
        self.lock.release();
    }

    /// Copy every currently-recorded event, oldest first, into `out`,
    /// returning how many were copied (multiple-consumer: any number of
    /// callers may drain a snapshot without disturbing the others').
    pub fn snapshot(&self, out: &mut [TraceEvent]) -> usize {
        self.lock.acquire();
        let ring = unsafe { &*self.ring.get() };
        let count = ring.len.min(out.len());
        for i in 0..count {
            out[i] = ring.slots[(ring.head + i) % TRACE_CAPACITY];
        }
        self.lock.release();
        count
    }

    pub fn header_words(&self) -> (u64, u64) {
        let ring = unsafe { &*self.ring.get() };
        (ring.header.magic, ring.header.version)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

static TRACE: TraceBuffer = TraceBuffer::new();

pub fn trace_record(event_id: u32, timestamp_ns: u64, payload: &[u64]) {
    TRACE.record(event_id, timestamp_ns, payload);
}

pub fn trace_snapshot(out: &mut [TraceEvent]) -> usize {
    TRACE.snapshot(out)
}

pub fn trace_header_words() -> (u64, u64) {
    TRACE.header_words()
}
