//! The compiled-in driver registry. A plain static array,
//! walked by [`utk_driver::walk_and_attach`] in declaration order within
//! each device-tree node's children.

use utk_abi::DriverDescriptor;

pub static DRIVER_REGISTRY: &[DriverDescriptor] = &[
    DriverDescriptor {
        name: "pic8259",
        description: "Legacy dual-8259 programmable interrupt controller",
        compatible: "x86,x86-pic",
        version: 1,
        attach: crate::pic::attach,
    },
    DriverDescriptor {
        name: "pit8254",
        description: "Programmable interval timer, bound as MAIN",
        compatible: "x86,pit",
        version: 1,
        attach: crate::pit::attach,
    },
    DriverDescriptor {
        name: "cmos-rtc",
        description: "CMOS real-time clock, bound as RTC",
        compatible: "x86,cmos-rtc",
        version: 1,
        attach: crate::rtc::attach,
    },
    DriverDescriptor {
        name: "tsc",
        description: "Invariant TSC clocksource, bound as LIFETIME",
        compatible: "x86,tsc",
        version: 1,
        attach: crate::tsc::attach,
    },
    DriverDescriptor {
        name: "uart16550",
        description: "16550 UART, bound as console input and output",
        compatible: "x86,uart16550",
        version: 1,
        attach: crate::uart::attach,
    },
];
