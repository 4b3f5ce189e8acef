//! Interrupt dispatcher core: `int_init`, `int_register`/
//! `int_irq_register`, `int_disable`/`int_restore`, `int_irq_mask`,
//! `int_irq_eoi`, and the vector entry `int_main_handler`.
//!
//! Generalizes the usual IRQ dispatch path
//! (`handle_irq`/`mask_irq_line`/`acknowledge_irq`) from one hard-coded
//! PIC/IOAPIC pair to the pluggable [`InterruptController`] bundle, and
//! leans on `utk_lib::critical` for the disable/restore pair.

use utk_abi::{KernelConfig, KernelError, KernelResult, SpuriousStatus};
use utk_lib::{CriticalState, critical_enter, critical_exit};

use crate::controller;
use crate::handler_table::{HandlerTable, InterruptHandler};

static TABLE: HandlerTable = HandlerTable::new();

/// What the vector entry decided to do with the trapping interrupt,
/// returned so the caller (the out-of-scope CPU glue / `utk-panic`) knows
/// whether to resume through the scheduler or hand off to a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The panic line fired; the caller must hand off to `utk-panic` and
    /// never return.
    Panic,
    /// A spurious interrupt was EOI'd with no handler run.
    Spurious,
    /// The registered (or panic-line-default) handler ran.
    Handled,
    /// No handler was registered for a regular interrupt; this is the
    /// "CPU-reported exception with no handler in kernel context" invariant
    /// break, so the caller must hand off to `utk-panic` just as it would
    /// for `Panic`, and never return.
    UnhandledPanicked,
}

/// Reset the handler table to empty. Idempotent; safe to call once at
/// boot before any driver registers.
pub fn int_init() {
    // The table starts empty by construction (`HandlerTable::new`); nothing
    // to do here beyond documenting this entry point's existence.
}

pub fn int_register(cfg: &KernelConfig, line: u8, handler: InterruptHandler) -> KernelResult<()> {
    TABLE.register(cfg, line, handler)
}

pub fn int_remove(line: u8) -> KernelResult<()> {
    TABLE.remove(line)
}

/// IRQ registration is line registration through the controller's
/// `irq_to_line` mapping.
pub fn int_irq_register(
    cfg: &KernelConfig,
    irq: u8,
    handler: InterruptHandler,
) -> KernelResult<()> {
    let ctrl = controller::controller().ok_or(KernelError::NotRegistered)?;
    int_register(cfg, ctrl.irq_to_line(irq), handler)
}

pub fn int_irq_remove(irq: u8) -> KernelResult<()> {
    let ctrl = controller::controller().ok_or(KernelError::NotRegistered)?;
    int_remove(ctrl.irq_to_line(irq))
}

/// Disable interrupts on the current CPU, returning a token that restores
/// the prior state.
#[must_use]
pub fn int_disable() -> CriticalState {
    critical_enter()
}

pub fn int_restore(state: CriticalState) {
    critical_exit(state)
}

pub fn int_irq_mask(irq: u8, enabled: bool) -> KernelResult<()> {
    let ctrl = controller::controller().ok_or(KernelError::NotRegistered)?;
    ctrl.mask(irq, enabled);
    Ok(())
}

pub fn int_irq_eoi(irq: u8) -> KernelResult<()> {
    let ctrl = controller::controller().ok_or(KernelError::NotRegistered)?;
    ctrl.eoi(irq);
    Ok(())
}

/// The vector entry called by CPU glue once it has saved the fault frame
/// into the current thread's VCPU area. `int_number`
/// is the interrupt number the CPU glue read out of that frame.
///
/// This performs classification and handler dispatch only; signal
/// delivery and the `sched_schedule_no_int` resume are the caller's next
/// steps, since both live in crates this one doesn't
/// depend on.
pub fn int_main_handler(cfg: &KernelConfig, int_number: u8) -> DispatchOutcome {
    if int_number == cfg.panic_line {
        return DispatchOutcome::Panic;
    }

    if int_number == cfg.spurious_line {
        if let Some(ctrl) = controller::controller() {
            ctrl.eoi(int_number);
        }
        return DispatchOutcome::Spurious;
    }

    if let Some(ctrl) = controller::controller() {
        if ctrl.spurious_check(int_number) == SpuriousStatus::Spurious {
            ctrl.eoi(int_number);
            return DispatchOutcome::Spurious;
        }
    }

    match TABLE.get(int_number) {
        Some(handler) => {
            handler(int_number);
            DispatchOutcome::Handled
        }
        None => DispatchOutcome::UnhandledPanicked,
    }
}
