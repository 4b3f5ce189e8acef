//! Which CPU is "this" CPU.
//!
//! The real answer (a per-CPU GS-base pointer, set up by the out-of-scope
//! boot glue) lives outside this core. We expose the question as a tiny
//! provider trait registered once through a [`ServiceCell`](crate::ServiceCell).
//! Until something registers a real provider (single-CPU host tests,
//! early boot) every caller is CPU 0.

use utk_abi::CpuId;

use crate::service_cell::ServiceCell;

pub trait CpuIdProvider: Send + Sync {
    fn current_cpu_id(&self) -> usize;
}

struct BootCpu;

impl CpuIdProvider for BootCpu {
    fn current_cpu_id(&self) -> usize {
        0
    }
}

static BOOT_CPU: BootCpu = BootCpu;
static PROVIDER: ServiceCell<&'static dyn CpuIdProvider> = ServiceCell::new("cpu_id_provider");

/// Install the real per-CPU id provider once APs are brought up. Panics if
/// called twice, matching the "install exactly once" discipline used for
/// the interrupt controller.
pub fn register_cpu_id_provider(provider: &'static dyn CpuIdProvider) {
    PROVIDER.register(provider);
}

/// The id of the CPU executing this call.
#[inline]
pub fn current_cpu_id() -> usize {
    match PROVIDER.try_get() {
        Some(provider) => provider.current_cpu_id(),
        None => BOOT_CPU.current_cpu_id(),
    }
}

#[inline]
pub fn current_cpu() -> CpuId {
    CpuId::new_unchecked(current_cpu_id())
}
