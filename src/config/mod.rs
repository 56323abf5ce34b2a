//! Configuration for the bridge host.
//!
//! # Configuration File Format
//!
//! Configuration is stored in TOML format. The search order is:
//! 1. `./wizardry.toml` (project-local)
//! 2. `~/.config/wizardry/config.toml` (XDG config)
//!
//! ```toml
//! debug = false
//!
//! [logging]
//! enabled = true
//! app_name = "wizardry-bridge"
//! level = "info"
//! # log_dir = "/var/log/wizardry"
//! ```
//!
//! `WIZARDRY_DEBUG=1` turns on debug mode regardless of the file.

mod file;
mod types;

pub use file::{from_path, from_str, load, search_paths, xdg_config_dir};
pub use types::{BridgeConfig, DEBUG_ENV_VAR};
