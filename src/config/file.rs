//! Configuration file loading.
//!
//! Reads the bridge configuration from TOML files at project-local and
//! XDG-compliant locations.

use crate::config::types::BridgeConfig;
use crate::error::HostError;
use std::path::{Path, PathBuf};

/// Project-local configuration file name.
const LOCAL_CONFIG_NAME: &str = "wizardry.toml";

/// Configuration file name within the XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
const APP_NAME: &str = "wizardry";

/// Loads configuration from the default search paths.
///
/// Search order:
/// 1. `./wizardry.toml` (project-local)
/// 2. `~/.config/wizardry/config.toml` (XDG config)
///
/// Returns the default configuration if no file is found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load() -> Result<BridgeConfig, HostError> {
    for path in search_paths() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading configuration");
            return from_path(&path);
        }
    }

    Ok(BridgeConfig::default())
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match the schema.
///
/// # Example
///
/// ```rust,no_run
/// use wizardry_bridge::config::from_path;
/// use std::path::Path;
///
/// let config = from_path(Path::new("/etc/wizardry/config.toml"))?;
/// # Ok::<(), wizardry_bridge::error::HostError>(())
/// ```
pub fn from_path(path: &Path) -> Result<BridgeConfig, HostError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        HostError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    from_str(&contents).map_err(|e| {
        HostError::configuration(
            "config_file",
            format!("failed to parse '{}': {}", path.display(), e),
        )
    })
}

/// Parses configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or doesn't match the schema.
///
/// # Example
///
/// ```rust
/// use wizardry_bridge::config::from_str;
///
/// let config = from_str("debug = true\n[logging]\nlevel = \"trace\"\n")?;
/// assert!(config.debug);
/// # Ok::<(), wizardry_bridge::error::HostError>(())
/// ```
pub fn from_str(toml_str: &str) -> Result<BridgeConfig, HostError> {
    toml::from_str(toml_str)
        .map_err(|e| HostError::configuration("config", format!("invalid TOML: {e}")))
}

/// Returns the paths that would be searched for configuration files.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = xdg_config_dir() {
        paths.push(dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns the XDG config directory for wizardry (`~/.config/wizardry`).
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}
