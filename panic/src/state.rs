//! Panic enrichment state: a one-shot recursion guard plus an optional
//! snapshot an exception handler can leave behind before calling
//! `panic!()`.
//!
//! A plain `AtomicBool` pair can't carry a whole register snapshot, so
//! this keeps a "set before panicking, taken exactly once by the handler"
//! shape but stores the richer payload behind a `Spinlock`-guarded cell
//! instead of a handful of separate atomics.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

use utk_abi::VcpuRegisters;
use utk_lib::Spinlock;

/// Left by an exception handler for the panic report to pick up (spec
/// §4.8: "interrupt id, error code, faulting IP... all general + control
/// registers").
#[derive(Clone, Copy)]
pub struct PanicFrame {
    pub interrupt_id: Option<u8>,
    pub error_code: Option<u64>,
    pub registers: VcpuRegisters,
}

struct Enrichment {
    frame: Option<PanicFrame>,
    code: Option<i64>,
}

struct EnrichmentCell(UnsafeCell<Enrichment>);
// SAFETY: every access goes through `FRAME_LOCK`.
unsafe impl Sync for EnrichmentCell {}

static PANIC_IN_PROGRESS: AtomicBool = AtomicBool::new(false);
static FRAME_LOCK: Spinlock = Spinlock::new();
static STATE: EnrichmentCell = EnrichmentCell(UnsafeCell::new(Enrichment {
    frame: None,
    code: None,
}));

/// Record CPU state ahead of a `panic!()` call. Overwrites any previous snapshot;
/// only the most recent exception's state is relevant to the panic it
/// precedes.
pub fn set_panic_frame(frame: PanicFrame) {
    FRAME_LOCK.acquire();
    unsafe { (*STATE.0.get()).frame = Some(frame) };
    FRAME_LOCK.release();
}

/// An optional diagnostic code to accompany the panic message. Most panics carry none; a caller that already
/// knows which tier-3 invariant broke can attach one.
pub fn set_panic_code(code: i64) {
    FRAME_LOCK.acquire();
    unsafe { (*STATE.0.get()).code = Some(code) };
    FRAME_LOCK.release();
}

/// Take both enrichment slots, leaving them empty. Called exactly once, at
/// the top of [`crate::panic_handler_impl`].
pub(crate) fn take_enrichment() -> (Option<PanicFrame>, Option<i64>) {
    FRAME_LOCK.acquire();
    let result = unsafe {
        let state = &mut *STATE.0.get();
        (state.frame.take(), state.code.take())
    };
    FRAME_LOCK.release();
    result
}

/// Mark a panic as in progress. Returns `true` if one already was, and the
/// caller must treat that as a recursive panic and skip straight to the
/// halt loop without touching any of the state a first panic might have
/// left mid-update.
pub(crate) fn enter() -> bool {
    PANIC_IN_PROGRESS.swap(true, Ordering::SeqCst)
}
