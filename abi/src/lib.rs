//! Shared ABI types for the roOs/UTK kernel core.
//!
//! This crate is the leaf of the workspace: every other crate depends on it,
//! it depends on nothing but `bitflags`. It carries the types that cross
//! subsystem boundaries: error codes, priorities, signal kinds, thread
//! state, the VCPU register frame, and the interface bundles (driver
//! descriptor, interrupt-controller, timer, device-tree node) that let the
//! driver manager, interrupt dispatcher, and timer layer talk about drivers
//! they don't own.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod priority;
pub mod signal;
pub mod thread;
pub mod traits;
pub mod vcpu;

pub use config::KernelConfig;
pub use error::{KernelError, KernelResult};
pub use priority::Priority;
pub use signal::{SignalBlock, SignalHandler, SignalKind};
pub use thread::{AffinityMask, CpuId, TerminationCause, ThreadId, ThreadState, WaitResource};
pub use traits::{
    DayTime, DeviceTreeNode, DriverDescriptor, InterruptController, SpuriousStatus,
    StackAllocation, StackAllocator, TimerDriverOps, compatible_str, node_is_enabled,
};
pub use vcpu::{VcpuFrame, VcpuRegisters};
