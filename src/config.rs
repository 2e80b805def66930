//! Configuration for a Minitel session.
//!
//! The configuration file is located at `~/.minitel/config.toml`:
//!
//! ```toml
//! # Wait for the rest of the power-on sequence after CONNEXION_FIN
//! turn_on_timeout_ms = 1000
//!
//! # Give up on a cursor position query (optional, waits forever if unset)
//! cursor_query_timeout_ms = 2000
//!
//! [startup]
//! disable_acknowledgement = true
//! local_echo = false
//! show_cursor = false
//! clear_screen = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MinitelError, Result};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wait for each byte of the power-on sequence, in milliseconds
    pub turn_on_timeout_ms: u64,
    /// Cursor position query timeout, in milliseconds
    pub cursor_query_timeout_ms: Option<u64>,
    /// Commands sent when the session starts
    pub startup: StartupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            turn_on_timeout_ms: 1000,
            cursor_query_timeout_ms: None,
            startup: StartupConfig::default(),
        }
    }
}

/// Startup configuration. The defaults send nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    pub disable_acknowledgement: bool,
    pub local_echo: Option<bool>,
    pub show_cursor: Option<bool>,
    pub clear_screen: bool,
}

impl Config {
    /// Load configuration from the default file, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(config) = Self::load_from(&path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    /// Load configuration from `path`
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(MinitelError::ConfigIo)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn turn_on_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_on_timeout_ms)
    }

    pub fn cursor_query_timeout(&self) -> Option<Duration> {
        self.cursor_query_timeout_ms.map(Duration::from_millis)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".minitel").join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
