//! Configuration and file management for gl-board
//!
//! This crate provides:
//! - File path utilities for config and cache files
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig)
//! - GitLab connection settings backed by a flat key-value store
//! - Persisted UI state (collapsed filter groups)

pub mod app_config;
pub mod config_file;
pub mod paths;
pub mod settings;
pub mod storage;
pub mod ui_state;

pub use app_config::AppConfig;
pub use config_file::{load_config_file, ConfigSource};
pub use paths::{api_cache_path, cache_dir, config_dir, settings_path, ui_state_path};
pub use settings::{Settings, SettingsError, SettingsForm, SettingsStore};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use ui_state::UiState;
