//! Interrupt-controller driver binding.
//!
//! Exactly one [`InterruptController`] may be installed for the system's
//! lifetime; a second `int_set_driver` call aborts with a panic. This is
//! the same "install exactly once" discipline `utk_lib::ServiceCell`
//! already encodes, so we reuse it directly rather than hand-rolling
//! another `AtomicPtr` for the global controller state.

use utk_abi::traits::InterruptController;
use utk_lib::ServiceCell;

static CONTROLLER: ServiceCell<&'static dyn InterruptController> =
    ServiceCell::new("interrupt_controller");

/// Bind the single interrupt-controller driver. Panics if a controller is
/// already installed.
pub fn int_set_driver(controller: &'static dyn InterruptController) {
    CONTROLLER.register(controller);
}

pub fn controller() -> Option<&'static dyn InterruptController> {
    CONTROLLER.try_get().copied()
}

pub fn is_installed() -> bool {
    CONTROLLER.is_initialized()
}
