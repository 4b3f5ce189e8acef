//! Driver manager.
//!
//! Enumerates device-tree nodes and matches them against a compiled-in
//! driver registry. `DeviceTreeNode`/`DriverDescriptor` live
//! in `utk-abi`; this crate is only the walk.

#![cfg_attr(not(test), no_std)]

pub mod manager;

pub use manager::{NodeOutcome, WalkReport, walk_and_attach};
