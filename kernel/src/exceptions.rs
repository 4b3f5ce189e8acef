//! CPU exception stubs.
//!
//! Only the divide-by-zero stub is implemented, the one exercised by the
//! signal-delivery test scenario. A fuller build would add GP/page-fault/
//! invalid-opcode stubs here following the identical shape: assert the
//! vector, raise the matching [`utk_abi::SignalKind`] on the current
//! thread, return.

use utk_abi::SignalKind;

/// Registered against [`utk_interrupt::DIV_BY_ZERO_LINE`] by
/// [`crate::boot::boot_init`]. Raises [`SignalKind::Fpe`] on whatever
/// thread was running when the trap fired; the actual termination (or
/// resumption, if a non-default handler were ever installed) happens at
/// the next return-from-interrupt dispatch point in [`crate::entry`].
pub fn divide_by_zero_stub(vector: u8) {
    utk_interrupt::assert_is_div_by_zero_vector(vector);
    let _ = utk_sched::sched_signal_raise_current(SignalKind::Fpe);
}
