//! Generic single-registration kernel service slot.
//!
//! Eliminates duplicated `AtomicPtr` boilerplate for "install exactly
//! once" kernel service tables. Built on top of `spin::Once` rather than a
//! raw `AtomicPtr<T>` so it can hold values of any size (including fat
//! pointers like `&'static dyn Trait`), which the interrupt-controller and
//! CPU-id-provider slots both need.

use spin::Once;

/// A cell for single-registration kernel services. `register` panics if
/// called a second time: this is the mechanism behind the "a second
/// attempt aborts with a panic" rule for the interrupt controller.
pub struct ServiceCell<T> {
    cell: Once<T>,
    name: &'static str,
}

impl<T> ServiceCell<T> {
    /// Create an uninitialized cell. `name` appears in panic messages.
    pub const fn new(name: &'static str) -> Self {
        Self {
            cell: Once::new(),
            name,
        }
    }

    /// Register the service. Panics if already registered: `spin::Once`
    /// would otherwise silently ignore the second call, which would hide
    /// a double-install bug that must be fatal.
    pub fn register(&self, value: T) {
        assert!(
            self.cell.get().is_none(),
            "{} already registered",
            self.name
        );
        self.cell.call_once(|| value);
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Get the service. Panics if not initialized.
    pub fn get(&self) -> &T {
        self.cell
            .get()
            .unwrap_or_else(|| panic!("{} not initialized", self.name))
    }

    pub fn try_get(&self) -> Option<&T> {
        self.cell.get()
    }
}
