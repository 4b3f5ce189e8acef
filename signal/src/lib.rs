//! Signal subsystem.
//!
//! Per-thread pending-signal bitmask and handler table (the `SignalBlock`
//! itself lives in `utk-abi` since it's embedded directly in the TCB);
//! this crate is the logic that mutates it: registration, raising, the
//! return-from-interrupt dispatch point, and the four mandatory
//! terminating default handlers.

#![no_std]

pub mod default_handlers;
pub mod dispatch;
pub mod raise;

pub use default_handlers::{ExitHook, install_default_handlers, register_exit_hook};
pub use dispatch::dispatch_on_return;
pub use raise::{signal_raise, signal_register};
