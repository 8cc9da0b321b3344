//! Persisted UI state
//!
//! Remembers which filter groups the user collapsed. Groups without a stored
//! value are expanded.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::paths;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Collapsed flag per filter group id (`assignee`, `author`, ...)
    #[serde(default)]
    pub collapsed: BTreeMap<String, bool>,
}

impl UiState {
    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match paths::ui_state_path() {
            Ok(path) if path.exists() => match Self::load_from_path(&path) {
                Ok(state) => {
                    log::info!("Loaded UI state from {:?}", path);
                    state
                }
                Err(e) => {
                    log::warn!("{:#}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read UI state file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse UI state file: {:?}", path))
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&paths::ui_state_path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize UI state")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write UI state file: {:?}", path))?;

        log::debug!("Saved UI state to {:?}", path);
        Ok(())
    }

    pub fn is_collapsed(&self, group_id: &str) -> bool {
        self.collapsed.get(group_id).copied().unwrap_or(false)
    }

    pub fn set_collapsed(&mut self, group_id: &str, collapsed: bool) {
        self.collapsed.insert(group_id.to_string(), collapsed);
    }

    /// Flip a group and return its new state
    pub fn toggle(&mut self, group_id: &str) -> bool {
        let collapsed = !self.is_collapsed(group_id);
        self.set_collapsed(group_id, collapsed);
        collapsed
    }
}
