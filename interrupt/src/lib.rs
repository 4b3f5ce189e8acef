//! Interrupt dispatcher and exception manager.
//!
//! Routes CPU interrupts to registered handlers, delegates masking/EOI/
//! spurious classification to a pluggable [`utk_abi::InterruptController`],
//! and provides the deferred-ISR work queue. Generalizes the usual
//! hard-coded PIC/IOAPIC IRQ plumbing behind the ABI's interface bundles
//! instead of one fixed controller pair.

#![no_std]

pub mod controller;
pub mod deferred;
pub mod dispatch;
pub mod exception;
pub mod handler_table;

pub use controller::{controller, int_set_driver as set_interrupt_controller, is_installed};
pub use deferred::{
    DeferredJob, DeferredStats, int_defer, run_one as deferred_run_one,
    set_notify as deferred_set_notify,
};
pub use dispatch::{
    DispatchOutcome, int_disable, int_init, int_irq_eoi, int_irq_mask, int_irq_register,
    int_irq_remove, int_main_handler, int_register, int_remove, int_restore,
};
pub use exception::{
    DIV_BY_ZERO_LINE, assert_is_div_by_zero_vector, exception_register, exception_remove,
};
pub use handler_table::InterruptHandler;
