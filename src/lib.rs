//! value-invert - A value-inversion plug-in for grid-data dumps
//!
//! The host application invokes this binary with a two-operation contract:
//! `register` prints the plug-in descriptor (name, menu path, run modes) and
//! `run` loads a grid-data dump, inverts the values under `/0/data` across
//! their own range (`x ↦ min + max − x`), and writes the dump back.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{DataField, PluginDescriptor, RunMode, DESCRIPTOR};
pub use storage::{Dump, DumpValue};
