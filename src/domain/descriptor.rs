//! Plug-in identity and run modes
//!
//! The descriptor is what the host learns about us during registration:
//! an internal name, a menu placement string, and the run modes we accept.
//! It is a single immutable constant, never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the host invoked the plug-in.
///
/// Only non-interactive modes are supported; the tokens are part of the
/// registration protocol and must match what the host sends back on `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Run without any user interaction
    #[value(name = "noninteractive")]
    Noninteractive,

    /// Run with default parameters instead of saved ones
    #[value(name = "with_defaults")]
    WithDefaults,
}

impl RunMode {
    /// The wire token the host uses for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Noninteractive => "noninteractive",
            RunMode::WithDefaults => "with_defaults",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plug-in descriptor reported to the host at registration
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PluginDescriptor {
    /// Internal identifier
    pub name: &'static str,

    /// Menu placement in the host application
    pub menu_path: &'static str,

    /// Run modes the plug-in accepts
    pub run_modes: &'static [RunMode],
}

impl PluginDescriptor {
    /// Renders the descriptor in the line-oriented format the host parses:
    /// name, menu path, then one run-mode token per line.
    pub fn to_registration_lines(&self) -> String {
        let mut out = String::new();
        out.push_str(self.name);
        out.push('\n');
        out.push_str(self.menu_path);
        out.push('\n');
        for mode in self.run_modes {
            out.push_str(mode.as_str());
            out.push('\n');
        }
        out
    }
}

/// The one descriptor this plug-in registers
pub const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "value_invert",
    menu_path: "/_Test/Value Invert",
    run_modes: &[RunMode::Noninteractive, RunMode::WithDefaults],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_lines_in_order() {
        let lines = DESCRIPTOR.to_registration_lines();
        assert_eq!(
            lines,
            "value_invert\n/_Test/Value Invert\nnoninteractive\nwith_defaults\n"
        );
    }

    #[test]
    fn run_mode_tokens_are_stable() {
        assert_eq!(RunMode::Noninteractive.as_str(), "noninteractive");
        assert_eq!(RunMode::WithDefaults.as_str(), "with_defaults");
    }

    #[test]
    fn run_mode_serde_uses_wire_tokens() {
        let json = serde_json::to_string(&RunMode::WithDefaults).unwrap();
        assert_eq!(json, "\"with_defaults\"");

        let parsed: RunMode = serde_json::from_str("\"noninteractive\"").unwrap();
        assert_eq!(parsed, RunMode::Noninteractive);
    }
}
