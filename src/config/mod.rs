//! Configuration module for softbackup
//!
//! This module handles loading and validating the TOML configuration file.
//!
//! ## Lookup
//!
//! The file is read from `~/.config/softteam/softbackup/softbackup.toml`
//! unless `SOFTBACKUP_CONFIG` names another path.
//!
//! ## Example Usage
//!
//! ```no_run
//! use softbackup::config;
//!
//! let config = config::load_config(config::config_path())?;
//!
//! for target in &config.databases {
//!     println!("Database: {}", target);
//! }
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{load_config, ConfigError, Result};
pub use types::*;

use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "SOFTBACKUP_CONFIG";

/// Config location relative to the home directory
pub const DEFAULT_CONFIG_PATH: &str = ".config/softteam/softbackup/softbackup.toml";

/// Resolve the config file path
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => expand_tilde(Path::new(&path)),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_CONFIG_PATH),
    }
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
