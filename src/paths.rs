//! Config file location.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "SNIPSTR_CONFIG";

/// Explicit path (tilde-expanded) if given, then `SNIPSTR_CONFIG`, then the
/// platform config dir (`~/.config/snipstr/config.toml` on Linux).
pub fn config_path(explicit: Option<&str>) -> Result<PathBuf> {
    let from_env = std::env::var(CONFIG_ENV).ok();
    resolve(explicit, from_env.as_deref())
}

fn resolve(explicit: Option<&str>, from_env: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit.or(from_env).filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(shellexpand::tilde(path).into_owned()));
    }
    let dirs = ProjectDirs::from("", "", "snipstr")
        .context("Could not determine a config directory; pass --config")?;
    Ok(dirs.config_dir().join("config.toml"))
}
