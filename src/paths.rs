//! Centralized path resolution for bigip-provider
//!
//! # Environment Variables
//!
//! - `BIGIP_PROVIDER_CONFIG_DIR` - Override config directory
//! - `BIGIP_PROVIDER_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_file():
//! 1. `--config` flag
//! 2. `BIGIP_PROVIDER_CONFIG_DIR/config.toml`
//! 3. `XDG_CONFIG_HOME/bigip-provider/config.toml`
//! 4. `~/.config/bigip-provider/config.toml`
//!
//! For state_file():
//! 1. `--state` flag
//! 2. `BIGIP_PROVIDER_STATE_DIR/state.json`
//! 3. `XDG_STATE_HOME/bigip-provider/state.json`
//! 4. `~/.local/state/bigip-provider/state.json`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "BIGIP_PROVIDER_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "BIGIP_PROVIDER_STATE_DIR";

const APP_DIR: &str = "bigip-provider";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.json";

/// Config directory: env override, then XDG, then `~/.config`
pub fn config_dir() -> Result<PathBuf> {
    app_dir(ENV_CONFIG_DIR, "XDG_CONFIG_HOME", &[".config"])
}

/// State directory: env override, then XDG, then `~/.local/state`
pub fn state_dir() -> Result<PathBuf> {
    app_dir(ENV_STATE_DIR, "XDG_STATE_HOME", &[".local", "state"])
}

fn app_dir(override_var: &str, xdg_var: &str, home_relative: &[&str]) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(override_var) {
        let path = expand(&dir);
        log::debug!("Using {override_var}: {}", path.display());
        return Ok(path);
    }

    if let Some(xdg) = std::env::var_os(xdg_var).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(xdg).join(APP_DIR);
        log::debug!("Using {xdg_var}: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home_relative
        .iter()
        .fold(home, |path, part| path.join(part))
        .join(APP_DIR))
}

/// Resolve the config file, preferring an explicit path
pub fn config_file(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

/// Resolve the state file, preferring an explicit path
pub fn state_file(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(state_dir()?.join(STATE_FILE)),
    }
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
