//! Application configuration
//!
//! Configuration loaded from `.gl-board.toml`.

use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Application configuration loaded from `.gl-board.toml`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Cache lifetime for projects, boards and board lists
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Cache lifetime for issue listings
    #[serde(default = "default_issues_ttl_secs")]
    pub issues_ttl_secs: u64,

    /// Page size used when listing projects
    #[serde(default = "default_projects_per_page")]
    pub projects_per_page: u32,

    /// Keep the response cache on disk between runs
    #[serde(default = "default_persist_cache")]
    pub persist_cache: bool,
}

fn default_ttl_secs() -> u64 {
    5 * 60
}

fn default_issues_ttl_secs() -> u64 {
    2 * 60
}

fn default_projects_per_page() -> u32 {
    100
}

fn default_persist_cache() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
            issues_ttl_secs: default_issues_ttl_secs(),
            projects_per_page: default_projects_per_page(),
            persist_cache: default_persist_cache(),
        }
    }
}

impl AppConfig {
    /// Config from the first `.gl-board.toml` found, or defaults
    pub fn load() -> Self {
        match crate::load_config_file() {
            Some(source) => Self::parse_or_default(&source.content, &source.path),
            None => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    fn parse_or_default(content: &str, path: &Path) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn issues_ttl(&self) -> Duration {
        Duration::from_secs(self.issues_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.issues_ttl(), Duration::from_secs(120));
        assert_eq!(config.projects_per_page, 100);
        assert!(config.persist_cache);
    }

    #[test]
    fn test_issues_ttl_shorter_than_default() {
        let config = AppConfig::default();
        assert!(config.issues_ttl() < config.default_ttl());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml = r#"
            issues_ttl_secs = 30
            persist_cache = false
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.issues_ttl_secs, 30);
        assert!(!config.persist_cache);
        // Other fields should use defaults
        assert_eq!(config.default_ttl_secs, 300);
        assert_eq!(config.projects_per_page, 100);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config =
            AppConfig::parse_or_default("issues_ttl_secs = \"soon\"", Path::new("x.toml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
