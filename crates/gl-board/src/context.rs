//! Application context
//!
//! Built once at startup and passed to every command: configuration, the
//! settings store, the shared response cache and the way to connect to
//! GitLab.

use anyhow::{Context, Result};
use gl_api_cache::{CacheStats, ResponseCache};
use gl_board_config::{
    api_cache_path, settings_path, AppConfig, JsonFileStore, KeyValueStore, Settings,
    SettingsForm, SettingsStore,
};
use gl_client::{
    cache_scope, CacheMode, CachedGitLabClient, ClientError, GitLabClient, RestClient,
};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Environment variable overriding the stored base URL
pub const GITLAB_URL_ENV: &str = "GITLAB_URL";

/// Environment variable overriding the stored access token
pub const GITLAB_TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Creates the underlying API client for a set of settings
pub trait Connect {
    type Client: GitLabClient;

    fn connect(&self, settings: &Settings, config: &AppConfig) -> gl_client::Result<Self::Client>;
}

/// Connects with the REST v4 client
#[derive(Debug, Clone, Copy, Default)]
pub struct RestConnector;

impl Connect for RestConnector {
    type Client = RestClient;

    fn connect(&self, settings: &Settings, config: &AppConfig) -> gl_client::Result<RestClient> {
        let client = RestClient::new(settings)?.with_projects_per_page(config.projects_per_page);
        debug!("Created GitLab client for {}", client.base_url());
        Ok(client)
    }
}

/// Per-run replacements for the stored settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub gitlab_url: Option<String>,
    pub access_token: Option<String>,
}

impl SettingsOverrides {
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            gitlab_url: read(GITLAB_URL_ENV),
            access_token: read(GITLAB_TOKEN_ENV),
        }
    }

    fn apply(&self, stored: Option<Settings>) -> Result<Option<Settings>> {
        let settings = match (&self.gitlab_url, stored) {
            (Some(url), stored) => {
                let token = stored
                    .as_ref()
                    .and_then(|s| s.access_token())
                    .map(str::to_string);
                Some(
                    Settings::new(url, token.as_deref())
                        .with_context(|| format!("{} is not a usable GitLab URL", GITLAB_URL_ENV))?,
                )
            }
            (None, stored) => stored,
        };

        Ok(match (&self.access_token, settings) {
            (Some(token), Some(settings)) => Some(settings.with_access_token(Some(token.clone()))),
            (_, settings) => settings,
        })
    }
}

pub struct AppContext<S: KeyValueStore = JsonFileStore, N: Connect = RestConnector> {
    config: AppConfig,
    settings: SettingsStore<S>,
    overrides: SettingsOverrides,
    cache: Arc<Mutex<ResponseCache>>,
    connector: N,
}

impl AppContext {
    /// Context backed by the files in the user's config and cache directories
    pub fn open(config: AppConfig) -> Result<Self> {
        let settings = SettingsStore::new(JsonFileStore::new(settings_path()?));

        let cache = if config.persist_cache {
            ResponseCache::open(api_cache_path()?, config.default_ttl())
        } else {
            ResponseCache::new(config.default_ttl())
        };

        Ok(Self::new(
            config,
            settings,
            SettingsOverrides::from_env(),
            cache,
            RestConnector,
        ))
    }
}

impl<S: KeyValueStore, N: Connect> AppContext<S, N> {
    pub fn new(
        config: AppConfig,
        settings: SettingsStore<S>,
        overrides: SettingsOverrides,
        cache: ResponseCache,
        connector: N,
    ) -> Self {
        Self {
            config,
            settings,
            overrides,
            cache: Arc::new(Mutex::new(cache)),
            connector,
        }
    }

    /// Effective settings: stored values with environment overrides applied
    pub fn settings(&self) -> Result<Option<Settings>> {
        let stored = self
            .settings
            .get()
            .context("Failed to read stored settings")?;
        self.overrides.apply(stored)
    }

    /// Validate and store new settings
    pub fn save_settings(&mut self, form: &SettingsForm) -> Result<Settings> {
        let settings = self.settings.set(form)?;
        info!("Saved settings for {}", settings.gitlab_url());
        Ok(settings)
    }

    /// Cached client for the current settings
    pub fn client(&self, mode: CacheMode) -> Result<CachedGitLabClient<N::Client>> {
        let settings = self.settings()?.ok_or_else(|| {
            ClientError::NotConfigured(
                "no GitLab URL saved; run `gl-board settings set <url>`".to_string(),
            )
        })?;
        let inner = self.connector.connect(&settings, &self.config)?;
        let scope = cache_scope(settings.gitlab_url(), settings.access_token());

        Ok(CachedGitLabClient::new(inner, Arc::clone(&self.cache), mode)
            .with_issues_ttl(self.config.issues_ttl())
            .with_scope(scope))
    }

    /// Counters and live entries; expired entries are dropped first
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match self.cache.lock() {
            Ok(mut cache) => {
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!("Purged {} expired cache entries", purged);
                }
                Some(cache.stats())
            }
            Err(_) => {
                warn!("Cache lock poisoned");
                None
            }
        }
    }

    /// Drop every cached response; returns how many were removed
    pub fn clear_cache(&self) -> usize {
        match self.cache.lock() {
            Ok(mut cache) => {
                let removed = cache.len();
                cache.clear();
                removed
            }
            Err(_) => {
                warn!("Cache lock poisoned, nothing cleared");
                0
            }
        }
    }

    /// Write the cache to disk if it has a backing file
    ///
    /// Failures are logged and otherwise ignored.
    pub fn persist_cache(&self) {
        let Ok(cache) = self.cache.lock() else {
            warn!("Cache lock poisoned, not saving");
            return;
        };
        if cache.path().is_none() {
            return;
        }
        match cache.save() {
            Ok(()) => debug!("Saved {} cached responses", cache.len()),
            Err(e) => warn!("Failed to save response cache: {:#}", e),
        }
    }
}
