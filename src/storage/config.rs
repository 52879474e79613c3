//! Configuration handling
//!
//! The plug-in takes its configuration as an explicit value resolved at
//! startup: the `VALUE_INVERT_CONFIG` environment variable names a TOML
//! file supplied by the host environment, falling back to
//! `config.toml` in the platform config directory. No configuration file
//! at all is fine; everything has a default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Plug-in configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Redirect transformed dumps here instead of overwriting the input
    pub output: Option<PathBuf>,

    /// Enable verbose diagnostics without the `--verbose` flag
    pub verbose: bool,
}

impl Config {
    /// Environment variable naming an explicit config file
    pub const ENV_VAR: &'static str = "VALUE_INVERT_CONFIG";

    /// Loads configuration from the environment-named file or the default
    /// location.
    ///
    /// A file explicitly named by the environment must exist and parse; a
    /// missing default file just yields defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(Self::ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")
    }

    /// The default config file location, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "value-invert", "value-invert")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.output, None);
        assert!(!config.verbose);
    }

    #[test]
    fn parse_config() {
        let toml = r#"
output = "/tmp/result.dump"
verbose = true
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("/tmp/result.dump")));
        assert!(config.verbose);
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "verbose = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.verbose);
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn load_from_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "output = [not toml").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
