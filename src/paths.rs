//! Well-known locations for netform files
//!
//! - Config: `~/.config/netform/config.toml`
//! - State:  `~/.local/state/netform/state.toml`
//!
//! Both can be overridden from the command line; overrides go through
//! [`expand`] so `~` and `$VARS` work.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the config directory (~/.config/netform)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("netform"))
}

/// Get the default config file path
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the state directory (~/.local/state/netform)
pub fn state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("netform"))
}

/// Get the default state file path
pub fn state_file() -> Result<PathBuf> {
    Ok(state_dir()?.join("state.toml"))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Resolve an optional override against a default location
pub fn resolve(override_path: Option<&str>, default: fn() -> Result<PathBuf>) -> Result<PathBuf> {
    match override_path {
        Some(p) => Ok(expand(p)),
        None => default(),
    }
}
