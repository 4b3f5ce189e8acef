//! Scenario 5: walking a device tree containing a single enabled
//! `x86,x86-pic` node attaches exactly one driver, via the `utk-driver`
//! manager against `utk-drivers`' compiled-in registry.
//!
//! Uses the same `FakeNode` fixture shape as `utk_driver::manager`'s own
//! unit tests, exercised here against the real compiled-in registry
//! instead of a synthetic one.

use utk_abi::DeviceTreeNode;

use crate::harness::TestResult;
use crate::{check, run_test};

struct FakeNode {
    name: &'static str,
    status: Option<&'static [u8]>,
    compatible: Option<&'static [u8]>,
    props: &'static [(&'static str, &'static [u8])],
    children: &'static [&'static dyn DeviceTreeNode],
}

impl DeviceTreeNode for FakeNode {
    fn name(&self) -> &str {
        self.name
    }

    fn get_prop(&self, name: &str) -> Option<&[u8]> {
        match name {
            "status" => self.status,
            "compatible" => self.compatible,
            _ => self.props.iter().find(|(k, _)| *k == name).map(|(_, v)| *v),
        }
    }

    fn phandle(&self) -> Option<u32> {
        None
    }

    fn children(&self) -> &[&dyn DeviceTreeNode] {
        self.children
    }
}

static PIC_PROPS: [(&str, &[u8]); 4] = [
    ("interrupt-controller", &[1]),
    ("int-offset", &[0x20]),
    ("comm", &[0x20, 0x21, 0xA0, 0xA1]),
    ("is-chained", &[1]),
];

static PIC_NODE: FakeNode = FakeNode {
    name: "pic0",
    status: None,
    compatible: Some(b"x86,x86-pic\0"),
    props: &PIC_PROPS,
    children: &[],
};

static ROOT: FakeNode = FakeNode {
    name: "root",
    status: None,
    compatible: None,
    props: &[],
    children: &[&PIC_NODE],
};

run_test! {
    fn walking_a_tree_with_one_enabled_pic_node_attaches_it_once() {
        let report = utk_driver::manager::walk_and_attach(&ROOT, utk_drivers::DRIVER_REGISTRY);
        check!(report.visited == 2);
        check!(report.attached == 1, "expected exactly one attach, got {}", report.attached);
        check!(report.failed == 0);
    }
}
