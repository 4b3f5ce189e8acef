//! The one CPU-glue contract this crate needs: actually swapping two `VcpuFrame`s.
//!
//! Every other crate in this workspace reaches across a dependency-cycle
//! boundary with a registered callback (`utk-interrupt`'s deferred-ISR
//! notifier, `utk-signal`'s exit hook, `utk-timer`'s tick sink); this is the
//! same shape for the one piece of real machine code the scheduler can
//! decide to invoke but never implement itself: the register-level switch
//! from one thread's saved frame to another's. A real implementation lives
//! in the boot crate's `context_switch.s`-equivalent and is installed once
//! at boot, exactly like the interrupt controller.

use utk_abi::VcpuFrame;
use utk_lib::ServiceCell;

/// Implemented by the out-of-scope CPU/boot layer. `switch` saves `old`'s
/// live registers into `*old`, loads `new`'s into the CPU, and returns,
/// but not necessarily right away: the call returns only once `old`'s
/// thread is itself resumed by some later switch, exactly like a classic
/// kernel `swtch()`.
pub trait ContextSwitch: Send + Sync {
    fn switch(&self, old: &mut VcpuFrame, new: &VcpuFrame);
}

static GLUE: ServiceCell<&'static dyn ContextSwitch> =
    ServiceCell::new("sched_context_switch_glue");

/// Install the real switch routine. Panics if called twice.
pub fn register_context_switch(glue: &'static dyn ContextSwitch) {
    GLUE.register(glue);
}

/// # Safety
/// `old` and `new` must point at live `VcpuFrame`s belonging to threads
/// the scheduler has already transitioned out of / into `Running`.
pub(crate) unsafe fn context_switch(old: *mut VcpuFrame, new: *const VcpuFrame) {
    if let Some(glue) = GLUE.try_get() {
        unsafe { glue.switch(&mut *old, &*new) };
    }
}
