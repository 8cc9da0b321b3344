//! Flat string-to-string storage backends
//!
//! Settings are persisted as a handful of string keys (`gitlabUrl`,
//! `accessToken`). The backend is swappable so the settings logic can be
//! tested without touching the filesystem.

use crate::settings::SettingsError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable key-value storage
pub trait KeyValueStore {
    /// Read a single value
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Apply a batch of writes at once
    ///
    /// `None` removes the key. Either every change is persisted or none is.
    fn set_many(&mut self, changes: &[(&str, Option<&str>)]) -> Result<(), SettingsError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set_many(&mut self, changes: &[(&str, Option<&str>)]) -> Result<(), SettingsError> {
        apply_changes(&mut self.values, changes);
        Ok(())
    }
}

/// JSON object on disk, e.g. `{"gitlabUrl": "https://gitlab.com"}`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set_many(&mut self, changes: &[(&str, Option<&str>)]) -> Result<(), SettingsError> {
        let mut values = self.read_all()?;
        apply_changes(&mut values, changes);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling file first so a failed write leaves the old values intact
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&values)?)?;
        fs::rename(&tmp, &self.path)?;

        log::info!("Saved settings to {:?}", self.path);
        Ok(())
    }
}

fn apply_changes(values: &mut BTreeMap<String, String>, changes: &[(&str, Option<&str>)]) {
    for (key, value) in changes {
        match value {
            Some(value) => {
                values.insert((*key).to_string(), (*value).to_string());
            }
            None => {
                values.remove(*key);
            }
        }
    }
}
