//! Concurrency primitives, logging, and the ambient utilities every other
//! crate in the core leans on.
//!
//! One leaf crate underneath `utk-abi` that the rest of the workspace
//! treats as its standard library.

#![cfg_attr(not(test), no_std)]

pub mod cpu_local;
pub mod critical;
pub mod klog;
pub mod ring_buffer;
pub mod service_cell;
pub mod spinlock;
#[cfg(feature = "tracing")]
pub mod tracing;

pub use cpu_local::current_cpu_id;
pub use critical::{CriticalState, critical_enter, critical_exit};
pub use ring_buffer::RingBuffer;
pub use service_cell::ServiceCell;
pub use spinlock::Spinlock;
#[cfg(feature = "tracing")]
pub use tracing::{TraceBuffer, TraceEvent, trace_header_words, trace_record, trace_snapshot};
