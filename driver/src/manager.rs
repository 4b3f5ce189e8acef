//! Driver manager.
//!
//! Walks the device tree in pre-order; for every enabled node it scans
//! the compiled-in driver registry linearly for a first-hit match on
//! `compatible` and invokes that descriptor's `attach` function. A
//! non-success attach is logged and skipped, never fatal to the walk
//!. Grounded on the §9 redesign flag ("linker-collected
//! driver table -> static registry"): the registry here is simply a
//! `&[DriverDescriptor]` slice passed in by the caller (`utk-drivers`'
//! static array), no linker section trick, no registration order
//! dependency.

use utk_abi::traits::{compatible_str, node_is_enabled};
use utk_abi::{DeviceTreeNode, DriverDescriptor};
use utk_lib::klog_warn;

/// Outcome for a single node visited during the walk, recorded for
/// diagnostics and for `utk-tests`' driver-attach scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    /// `status` marks the node disabled; skipped without a `compatible`
    /// lookup.
    Disabled,
    /// No registry entry matched the node's `compatible` string.
    NoDriverMatched,
    /// A driver's `attach` ran and returned an error; logged, not fatal.
    AttachFailed,
    /// A driver's `attach` ran and returned success.
    Attached,
}

/// Summary of a full tree walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkReport {
    pub visited: u32,
    pub attached: u32,
    pub failed: u32,
    pub unmatched: u32,
    pub disabled: u32,
}

/// Walk `root` (inclusive) and its descendants, matching each enabled
/// node against `registry` in order and
/// invoking the matching descriptor's `attach`.
pub fn walk_and_attach(root: &dyn DeviceTreeNode, registry: &[DriverDescriptor]) -> WalkReport {
    let mut report = WalkReport::default();
    visit(root, registry, &mut report);
    report
}

fn visit(node: &dyn DeviceTreeNode, registry: &[DriverDescriptor], report: &mut WalkReport) {
    report.visited += 1;

    if !node_is_enabled(node) {
        report.disabled += 1;
    } else {
        match attach_one(node, registry) {
            NodeOutcome::Attached => report.attached += 1,
            NodeOutcome::AttachFailed => report.failed += 1,
            NodeOutcome::NoDriverMatched => report.unmatched += 1,
            NodeOutcome::Disabled => unreachable!("node_is_enabled already checked"),
        }
    }

    for child in node.children() {
        visit(*child, registry, report);
    }
}

fn attach_one(node: &dyn DeviceTreeNode, registry: &[DriverDescriptor]) -> NodeOutcome {
    let Some(compatible) = compatible_str(node) else {
        return NodeOutcome::NoDriverMatched;
    };

    for descriptor in registry {
        if descriptor.compatible == compatible {
            return match (descriptor.attach)(node) {
                Ok(()) => NodeOutcome::Attached,
                Err(err) => {
                    klog_warn!(
                        "driver '{}' failed to attach to node '{}': {}",
                        descriptor.name,
                        node.name(),
                        err
                    );
                    NodeOutcome::AttachFailed
                }
            };
        }
    }
    NodeOutcome::NoDriverMatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use utk_abi::KernelResult;

    struct FakeNode {
        name: &'static str,
        status: Option<&'static [u8]>,
        compatible: Option<&'static [u8]>,
        children: Vec<&'static dyn DeviceTreeNode>,
    }

    impl DeviceTreeNode for FakeNode {
        fn name(&self) -> &str {
            self.name
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
            &self.children
        }
    }

    static mut ATTACH_COUNT: u32 = 0;

    fn attach_ok(_node: &dyn DeviceTreeNode) -> KernelResult<()> {
        unsafe { ATTACH_COUNT += 1 };
        Ok(())
    }

    fn attach_fails(_node: &dyn DeviceTreeNode) -> KernelResult<()> {
        Err(utk_abi::KernelError::IncorrectValue)
    }

    #[test]
    fn first_hit_wins_and_attach_runs_once() {
        unsafe { ATTACH_COUNT = 0 };
        let leaf = FakeNode {
            name: "pic0",
            status: None,
            compatible: Some(b"x86,x86-pic\0"),
            children: Vec::new(),
        };
        let root = FakeNode {
            name: "root",
            status: None,
            compatible: None,
            children: vec![&leaf as &dyn DeviceTreeNode],
        };
        let registry = [DriverDescriptor {
            name: "pic",
            description: "legacy PIC",
            compatible: "x86,x86-pic",
            version: 1,
            attach: attach_ok,
        }];
        let report = walk_and_attach(&root, &registry);
        assert_eq!(report.attached, 1);
        assert_eq!(report.visited, 2);
        assert_eq!(unsafe { ATTACH_COUNT }, 1);
    }

    #[test]
    fn disabled_node_is_skipped_without_driver_lookup() {
        let leaf = FakeNode {
            name: "dead",
            status: Some(b"disabled\0"),
            compatible: Some(b"x86,x86-pic\0"),
            children: Vec::new(),
        };
        let registry = [DriverDescriptor {
            name: "pic",
            description: "legacy PIC",
            compatible: "x86,x86-pic",
            version: 1,
            attach: attach_ok,
        }];
        let report = walk_and_attach(&leaf, &registry);
        assert_eq!(report.disabled, 1);
        assert_eq!(report.attached, 0);
    }

    #[test]
    fn failed_attach_is_not_fatal_to_the_walk() {
        let second = FakeNode {
            name: "second",
            status: None,
            compatible: Some(b"x86,x86-pic\0"),
            children: Vec::new(),
        };
        let first = FakeNode {
            name: "first",
            status: None,
            compatible: Some(b"bogus\0"),
            children: Vec::new(),
        };
        let root = FakeNode {
            name: "root",
            status: None,
            compatible: None,
            children: vec![
                &first as &dyn DeviceTreeNode,
                &second as &dyn DeviceTreeNode,
            ],
        };
        let registry = [
            DriverDescriptor {
                name: "bogus",
                description: "always fails",
                compatible: "bogus",
                version: 1,
                attach: attach_fails,
            },
            DriverDescriptor {
                name: "pic",
                description: "legacy PIC",
                compatible: "x86,x86-pic",
                version: 1,
                attach: attach_ok,
            },
        ];
        let report = walk_and_attach(&root, &registry);
        assert_eq!(report.failed, 1);
        assert_eq!(report.attached, 1);
    }
}
