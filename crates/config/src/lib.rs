//! runeterm configuration
//!
//! Session configuration: shell resolution, initial grid size, and
//! logging settings.

#![warn(missing_docs)]
#![deny(unsafe_code)]

use runeterm_core::logging::LoggingConfig;
use serde::Deserialize;

/// Terminal session configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell executable to spawn. When unset, `$SHELL` is used, then
    /// `/bin/sh`.
    pub shell: Option<String>,
    /// Initial number of columns
    pub cols: u16,
    /// Initial number of rows
    pub rows: u16,
    /// Logging setup
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: None,
            cols: 80,
            rows: 24,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Resolve the shell executable to launch.
    pub fn shell(&self) -> String {
        if let Some(shell) = &self.shell {
            return shell.clone();
        }
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}
