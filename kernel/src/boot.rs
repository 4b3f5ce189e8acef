//! Boot-step sequencing.
//!
//! One function, each subsystem's init called once, in the order its own
//! dependencies require. The real GDT/IDT/MMU/Limine bring-up that
//! precedes all of this lives in the surrounding boot binary; this
//! crate's `boot_init` is the first thing that glue calls once a CPU is
//! running in long mode with a stack.

use utk_abi::{DeviceTreeNode, KernelConfig, KernelResult};

/// Bring up every in-scope subsystem in dependency order: the
/// interrupt dispatcher and exception manager first (nothing else may take
/// a trap before a handler table exists), then the driver walk (which
/// installs the interrupt controller and timer drivers the next steps
/// need), then the scheduler.
///
/// `device_tree_root` is supplied by the out-of-scope device-tree blob
/// parser; `kernel_cs` is the code-segment selector the
/// out-of-scope GDT setup established.
pub fn boot_init(
    cfg: KernelConfig,
    device_tree_root: &dyn DeviceTreeNode,
    kernel_cs: u64,
) -> KernelResult<()> {
    utk_interrupt::int_init();
    install_exception_stubs(&cfg)?;

    let report =
        utk_driver::manager::walk_and_attach(device_tree_root, utk_drivers::DRIVER_REGISTRY);
    utk_lib::klog_info!(
        "boot: device tree walk visited {} node(s), {} attached, {} failed, {} unmatched, {} disabled",
        report.visited,
        report.attached,
        report.failed,
        report.unmatched,
        report.disabled,
    );

    utk_sched::sched_init(cfg, kernel_cs, &crate::stack_allocator::STACK_ALLOCATOR)?;
    Ok(())
}

/// Register the exception-range stubs this crate owns. Only divide-by-zero
/// is wired up at the moment; the remaining CPU faults (general
/// protection, page fault, ...) are left to a fuller CPU-glue
/// implementation, since their signal mapping isn't exercised by any
/// scenario here yet.
fn install_exception_stubs(cfg: &KernelConfig) -> KernelResult<()> {
    utk_interrupt::exception_register(
        cfg,
        utk_interrupt::DIV_BY_ZERO_LINE,
        crate::exceptions::divide_by_zero_stub,
    )
}
