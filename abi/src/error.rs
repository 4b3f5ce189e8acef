//! The stable error taxonomy shared across every subsystem.
//!
//! One enum per subsystem, each with its own generated conversions to/from
//! a C return code, is the usual shape when a C syscall ABI needs
//! preserving bit-for-bit. This core has no such ABI to preserve, so
//! rather than one enum per subsystem there is a single `KernelError`
//! shared everywhere, with `Result<T, KernelError>` carrying the success
//! case as the idiomatic replacement for a `NO_ERR` sentinel.

use core::fmt;

/// Error taxonomy shared by every kernel subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    NullPointer,
    IncorrectValue,
    OutOfBound,
    NoMoreMemory,
    AlreadyExist,
    NotRegistered,
    NoSuchId,
    NoSuchIrq,
    UnauthorizedInterruptLine,
    UnauthorizedAction,
    ForbiddenPriority,
    InterruptAlreadyRegistered,
    Destroyed,
    Blocked,
    NotSupported,
}

pub type KernelResult<T> = Result<T, KernelError>;

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            KernelError::NullPointer => "null pointer",
            KernelError::IncorrectValue => "incorrect value",
            KernelError::OutOfBound => "out of bound",
            KernelError::NoMoreMemory => "no more memory",
            KernelError::AlreadyExist => "already exists",
            KernelError::NotRegistered => "not registered",
            KernelError::NoSuchId => "no such id",
            KernelError::NoSuchIrq => "no such irq",
            KernelError::UnauthorizedInterruptLine => "unauthorized interrupt line",
            KernelError::UnauthorizedAction => "unauthorized action",
            KernelError::ForbiddenPriority => "forbidden priority",
            KernelError::InterruptAlreadyRegistered => "interrupt already registered",
            KernelError::Destroyed => "resource destroyed",
            KernelError::Blocked => "would block",
            KernelError::NotSupported => "not supported",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable_text_not_debug_dump() {
        assert_eq!(KernelError::NoSuchId.to_string(), "no such id");
    }
}
