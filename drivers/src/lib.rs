//! Reference compiled-in drivers: a
//! classic-PIC interrupt controller, a PIT MAIN timer, a CMOS RTC wall
//! clock, a TSC LIFETIME clocksource, and a 16550 UART console, each
//! implementing the trait bundles `utk-abi` defines and registered into
//! [`registry::DRIVER_REGISTRY`] for the `kernel` crate to hand to
//! [`utk_driver::walk_and_attach`].

#![no_std]

mod pic;
mod pit;
mod props;
mod rtc;
mod tsc;
mod uart;

pub mod registry;

pub use registry::DRIVER_REGISTRY;
