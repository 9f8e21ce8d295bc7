//! Path resolution for config and vault files.

use std::path::{Path, PathBuf};

use crate::config::default_config_path;
use crate::constants::CONFIG_ENV;

/// Resolve the config file path, checking NOTEVAULT_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Error message when the vault database is missing.
pub fn missing_vault_message(path: &Path) -> String {
    format!("No vault found at {}", path.display())
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!("No notevault config found at {}", config_path.display())
}

/// Hint shown with either message.
pub const INIT_HINT: &str =
    "Hint: Run `notevault init` first, or point NOTEVAULT_CONFIG at an existing config.";
