//! Default handlers for KILL/SEGV/FPE/ILL. USR1/USR2/EXC have no default handler, matching §4.4's "provided... a handler is installed" gate.
//!
//! `sched_thread_exit` lives in `utk-sched`, which depends on this crate,
//! so the actual termination is reached through a registered hook rather
//! than a direct call, the same inversion-of-control shape as
//! `utk-interrupt`'s deferred-ISR notifier.

use utk_abi::{SignalBlock, SignalKind, TerminationCause};
use utk_lib::ServiceCell;

/// Terminates the calling thread; never returns. Registered once by
/// `utk-sched` at boot.
pub type ExitHook = fn(cause: TerminationCause) -> !;

static EXIT_HOOK: ServiceCell<ExitHook> = ServiceCell::new("signal_exit_hook");

pub fn register_exit_hook(hook: ExitHook) {
    EXIT_HOOK.register(hook);
}

fn terminate(cause: TerminationCause) -> ! {
    match EXIT_HOOK.try_get() {
        Some(hook) => hook(cause),
        // No scheduler wired up yet (e.g. host-side unit exercise of the
        // dispatch path in isolation): park rather than return, preserving
        // "a handler never returns" even without `utk-sched` present.
        None => loop {
            core::hint::spin_loop();
        },
    }
}

fn default_ill() {
    terminate(TerminationCause::Faulted);
}

fn default_fpe() {
    terminate(TerminationCause::Faulted);
}

fn default_segv() {
    terminate(TerminationCause::Faulted);
}

fn default_kill() {
    terminate(TerminationCause::Killed);
}

/// Populate `block` with the mandatory terminating defaults. USR1/USR2/EXC are
/// left with no handler.
pub fn install_default_handlers(block: &mut SignalBlock) {
    block.set_handler(SignalKind::Ill, Some(default_ill));
    block.set_handler(SignalKind::Fpe, Some(default_fpe));
    block.set_handler(SignalKind::Segv, Some(default_segv));
    block.set_handler(SignalKind::Kill, Some(default_kill));
}
