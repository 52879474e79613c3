//! Core domain types: the plug-in descriptor, run modes, and the grid
//! data field the transform operates on.

mod descriptor;
mod field;

pub use descriptor::{PluginDescriptor, RunMode, DESCRIPTOR};
pub use field::{DataField, FieldError};
