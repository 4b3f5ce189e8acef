//! Interface bundles: the driver manager, interrupt dispatcher,
//! and timer layer all talk to *one* installed implementation through a
//! trait object, never a concrete driver type. These are small
//! `Send + Sync` trait bundles defined in the dependency-free ABI crate so
//! that drivers, the dispatcher, and the scheduler can all depend on
//! `utk-abi` without depending on each other.

use core::fmt;

use crate::error::KernelResult;

/// Result of the controller's spurious-interrupt classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpuriousStatus {
    Spurious,
    Regular,
}

/// The pluggable interrupt-controller driver bundle. Exactly one implementation may be installed
/// for the lifetime of the system.
pub trait InterruptController: Send + Sync {
    fn mask(&self, irq: u8, enabled: bool);
    fn eoi(&self, irq: u8);
    fn spurious_check(&self, interrupt_number: u8) -> SpuriousStatus;
    /// Map a hardware IRQ number to the dense interrupt-line index used by
    /// the handler table.
    fn irq_to_line(&self, irq: u8) -> u8;
}

/// A nanosecond-denominated wall-clock day/time reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// The timer driver interface bundle. A
/// single implementation may be bound into the MAIN, RTC, or LIFETIME slot,
/// or into the AUX set.
pub trait TimerDriverOps: Send + Sync {
    fn frequency_hz(&self) -> u64;
    fn time_ns(&self) -> u64;
    fn set_time_ns(&self, ns: u64);
    fn date(&self) -> DayTime;
    fn daytime(&self) -> DayTime {
        self.date()
    }
    fn enable(&self);
    fn disable(&self);
    /// Install the timer layer's own tick callback as this driver's IRQ
    /// handler.
    fn set_tick_handler(&self, handler: fn());
    fn remove_tick_handler(&self);
}

/// A read-only device-tree node. The concrete blob parser is out
/// of scope; this trait is the contract the driver manager walks.
pub trait DeviceTreeNode {
    fn name(&self) -> &str;
    /// Raw property bytes by name, e.g. `compatible`, `status`, `comm`.
    fn get_prop(&self, name: &str) -> Option<&[u8]>;
    fn phandle(&self) -> Option<u32>;
    fn children(&self) -> &[&dyn DeviceTreeNode];
}

/// Convenience accessor: a node's `compatible` string decoded as UTF-8,
/// trimming a single trailing NUL the way device-tree string properties are
/// conventionally terminated.
pub fn compatible_str<'a>(node: &'a dyn DeviceTreeNode) -> Option<&'a str> {
    let bytes = node.get_prop("compatible")?;
    let bytes = bytes.strip_suffix(&[0u8]).unwrap_or(bytes);
    core::str::from_utf8(bytes).ok()
}

/// A node is attachable unless its `status` property is present and not
/// `"okay"`.
pub fn node_is_enabled(node: &dyn DeviceTreeNode) -> bool {
    match node.get_prop("status") {
        None => true,
        Some(bytes) => {
            let bytes = bytes.strip_suffix(&[0u8]).unwrap_or(bytes);
            bytes == b"okay"
        }
    }
}

/// Static descriptor for a compiled-in driver.
/// The driver registry is a plain static array of these, with no
/// linker-section trick.
pub struct DriverDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub compatible: &'static str,
    pub version: u32,
    pub attach: fn(&dyn DeviceTreeNode) -> KernelResult<()>,
}

impl fmt::Debug for DriverDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverDescriptor")
            .field("name", &self.name)
            .field("compatible", &self.compatible)
            .field("version", &self.version)
            .finish()
    }
}

/// A page-aligned stack allocation, addresses only (the scheduler never
/// touches the memory itself beyond writing the initial `VcpuFrame`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackAllocation {
    /// Lowest address of the allocation (guard-page side, if any).
    pub base: usize,
    /// Initial stack pointer: the highest address, where the stack grows
    /// down from.
    pub top: usize,
    pub size: usize,
}

/// The kernel heap allocator is an external collaborator; the scheduler
/// only needs page-aligned stack memory from it, so that's the one
/// surface exposed here, installed once like the other driver bundles.
pub trait StackAllocator: Send + Sync {
    fn alloc_stack(&self, size: usize) -> KernelResult<StackAllocation>;
    fn dealloc_stack(&self, allocation: StackAllocation);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeNode {
        status: Option<&'static [u8]>,
        compatible: Option<&'static [u8]>,
    }

    impl DeviceTreeNode for FakeNode {
        fn name(&self) -> &str {
            "fake"
        }
        fn get_prop(&self, name: &str) -> Option<&[u8]> {
            match name {
                "status" => self.status,
                "compatible" => self.compatible,
                _ => None,
            }
        }
        fn phandle(&self) -> Option<u32> {
            None
        }
        fn children(&self) -> &[&dyn DeviceTreeNode] {
            &[]
        }
    }

    #[test]
    fn absent_status_means_enabled() {
        let node = FakeNode {
            status: None,
            compatible: None,
        };
        assert!(node_is_enabled(&node));
    }

    #[test]
    fn okay_status_means_enabled() {
        let node = FakeNode {
            status: Some(b"okay\0"),
            compatible: None,
        };
        assert!(node_is_enabled(&node));
    }

    #[test]
    fn disabled_status_is_respected() {
        let node = FakeNode {
            status: Some(b"disabled\0"),
            compatible: None,
        };
        assert!(!node_is_enabled(&node));
    }

    #[test]
    fn compatible_strips_trailing_nul() {
        let node = FakeNode {
            status: None,
            compatible: Some(b"x86,x86-pic\0"),
        };
        assert_eq!(compatible_str(&node), Some("x86,x86-pic"));
    }
}
