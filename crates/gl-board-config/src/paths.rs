//! Where gl-board keeps its files
//!
//! Settings and UI state live under the platform config directory
//! (`~/.config/gl-board/` on Linux), the response cache and logs under the
//! cache directory (`~/.cache/gl-board/`). Directories are created on first
//! use.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

const APP_DIR: &str = "gl-board";

const SETTINGS_FILE: &str = "settings.json";
const UI_STATE_FILE: &str = "ui-state.toml";
const API_CACHE_FILE: &str = "api-cache.json";

fn app_dir(base: Option<PathBuf>, what: &str) -> Result<PathBuf> {
    let dir = base
        .with_context(|| format!("No {} directory on this platform", what))?
        .join(APP_DIR);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_dir() -> Result<PathBuf> {
    app_dir(dirs::config_dir(), "config")
}

pub fn cache_dir() -> Result<PathBuf> {
    app_dir(dirs::cache_dir(), "cache")
}

/// Flat key-value store holding `gitlabUrl` and `accessToken`
pub fn settings_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

pub fn ui_state_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(UI_STATE_FILE))
}

pub fn api_cache_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join(API_CACHE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_dir_is_created_below_base() {
        let base = tempfile::tempdir().unwrap();
        let dir = app_dir(Some(base.path().to_path_buf()), "config").unwrap();
        assert_eq!(dir, base.path().join(APP_DIR));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_missing_base_is_an_error() {
        let err = app_dir(None, "cache").unwrap_err();
        assert!(err.to_string().contains("cache"));
    }
}
