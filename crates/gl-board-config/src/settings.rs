//! GitLab connection settings
//!
//! Settings are created on the first successful form submission and read on
//! every outbound request. They never expire; only the user replaces them.
//!
//! The only validation is that the base URL is an absolute HTTP/HTTPS URL
//! with a host. An invalid submission fails with
//! [`SettingsError::Validation`] and leaves the stored values untouched.

use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Storage key for the GitLab base URL
pub const GITLAB_URL_KEY: &str = "gitlabUrl";

/// Storage key for the personal access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings: {0}")]
    Validation(String),

    #[error("settings storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("settings file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Raw settings as submitted by the user, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    #[serde(default)]
    pub gitlab_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl SettingsForm {
    pub fn new(gitlab_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            gitlab_url: gitlab_url.into(),
            access_token,
        }
    }
}

/// Validated GitLab connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    gitlab_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

impl Settings {
    /// Validate and normalise a base URL and optional token
    ///
    /// Surrounding whitespace and trailing slashes are stripped from the URL;
    /// an empty token is treated as no token.
    pub fn new(gitlab_url: &str, access_token: Option<&str>) -> Result<Self, SettingsError> {
        let cleaned = gitlab_url.trim().trim_end_matches('/');
        if cleaned.is_empty() {
            return Err(SettingsError::Validation(
                "GitLab URL is required".to_string(),
            ));
        }

        let parsed = Url::parse(cleaned)
            .map_err(|e| SettingsError::Validation(format!("'{}' is not a valid URL: {}", cleaned, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SettingsError::Validation(format!(
                "only HTTP and HTTPS are supported, got '{}'",
                parsed.scheme()
            )));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(SettingsError::Validation(format!(
                "'{}' has no host name",
                cleaned
            )));
        }

        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(SettingsError::Validation(format!(
                "'{}' must not contain a query or fragment",
                cleaned
            )));
        }

        let access_token = access_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        Ok(Self {
            gitlab_url: cleaned.to_string(),
            access_token,
        })
    }

    /// Base URL without a trailing slash, e.g. `https://gitlab.example.com`
    pub fn gitlab_url(&self) -> &str {
        &self.gitlab_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Host permission pattern covering the instance, e.g. `https://gitlab.example.com/*`
    pub fn origin_pattern(&self) -> String {
        match Url::parse(&self.gitlab_url) {
            Ok(url) => format!("{}/*", url.origin().ascii_serialization()),
            Err(_) => format!("{}/*", self.gitlab_url),
        }
    }

    /// Return a copy with the token replaced
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token.filter(|token| !token.trim().is_empty());
        self
    }
}

impl TryFrom<&SettingsForm> for Settings {
    type Error = SettingsError;

    fn try_from(form: &SettingsForm) -> Result<Self, Self::Error> {
        Settings::new(&form.gitlab_url, form.access_token.as_deref())
    }
}

/// Settings persisted in a key-value store
///
/// Constructed once at startup and passed to whoever needs it.
#[derive(Debug)]
pub struct SettingsStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the stored settings
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    pub fn get(&self) -> Result<Option<Settings>, SettingsError> {
        let Some(url) = self.store.get(GITLAB_URL_KEY)? else {
            return Ok(None);
        };
        let token = self.store.get(ACCESS_TOKEN_KEY)?;
        Settings::new(&url, token.as_deref()).map(Some)
    }

    /// Validate and persist a form submission
    ///
    /// On validation failure nothing is written.
    pub fn set(&mut self, form: &SettingsForm) -> Result<Settings, SettingsError> {
        let settings = Settings::try_from(form)?;
        self.save(&settings)?;
        Ok(settings)
    }

    /// Persist already validated settings
    pub fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.store.set_many(&[
            (GITLAB_URL_KEY, Some(settings.gitlab_url())),
            (ACCESS_TOKEN_KEY, settings.access_token()),
        ])
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
