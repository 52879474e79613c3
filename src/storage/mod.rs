//! # Storage Layer
//!
//! File formats and configuration.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `dump` | Dump container codec (text entries + binary data fields) |
//! | `config` | TOML configuration resolved from the host environment |
//!
//! Dumps are read and rewritten as a unit; writes are atomic (temp file +
//! rename) so the original file survives any failed transform.

mod config;
mod dump;

pub use config::{Config, ConfigError};
pub use dump::{Dump, DumpError, DumpValue};
