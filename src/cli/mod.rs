//! # Command-Line Interface
//!
//! The host application drives the plug-in through `register` and `run`;
//! `info` is a local convenience on top of the same codec.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `register` | Print the descriptor for the host's registration scan |
//! | `run <mode> <file>` | Invert the values under `/0/data` and persist |
//! | `info <file>` | Inspect a dump without modifying it |
//!
//! All commands support `--format {text,json}`; `--verbose` (or `-v`)
//! enables diagnostics on stderr.
//!
//! Call [`run()`] to parse arguments and execute the requested command.

mod app;
mod info;
mod output;
mod register;
mod run_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
