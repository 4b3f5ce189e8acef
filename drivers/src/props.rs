//! Small device-tree property helpers shared by the drivers in this crate.
//! These conventions (single byte, byte array, bare presence) are this
//! crate's own, kept intentionally minimal.

use utk_abi::DeviceTreeNode;

/// A property whose value is a single byte, e.g. `int-offset = 0x20`.
pub fn byte_prop(node: &dyn DeviceTreeNode, name: &str) -> Option<u8> {
    node.get_prop(name)?.first().copied()
}

/// A property whose value is a flat byte array, e.g. `comm = [0x20, 0x21,
/// 0xA0, 0xA1]`.
pub fn bytes_prop<'a>(node: &'a dyn DeviceTreeNode, name: &str) -> Option<&'a [u8]> {
    node.get_prop(name)
}

/// A boolean marker property carrying no value of its own, e.g.
/// `is-chained` or `interrupt-controller`: true iff the property is
/// present at all.
pub fn flag_prop(node: &dyn DeviceTreeNode, name: &str) -> bool {
    node.get_prop(name).is_some()
}
