//! Cached GitLab API client (decorator pattern)
//!
//! Wraps any `GitLabClient` implementation to add caching behavior.
//! The cache mode determines whether to read from cache, write to cache, or both.
//!
//! # Cache keys
//!
//! | call                  | key                        | TTL         |
//! |-----------------------|----------------------------|-------------|
//! | `fetch_projects`      | `projects`                 | default     |
//! | `fetch_boards`        | `boards_<pid>`             | default     |
//! | `fetch_board_lists`   | `lists_<pid>_<bid>`        | default     |
//! | `fetch_issues`        | `issues_<pid>_<query>`     | issues TTL  |
//! | `fetch_current_user`  | `user`                     | default     |
//!
//! A successful `update_issue` invalidates every `issues_<pid>_` key.
//!
//! A client built with [`CachedGitLabClient::with_scope`] prefixes each key
//! with `<scope>|`, so responses from different instances or tokens never
//! collide in one cache file.

use crate::client::{CacheMode, GitLabClient};
use crate::error::Result;
use crate::types::{Board, BoardList, Issue, IssueQuery, IssueUpdate, Project, User};
use async_trait::async_trait;
use gl_api_cache::{Clock, ResponseCache, SystemClock, ISSUES_TTL};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cache key for the project list
pub fn projects_key() -> String {
    "projects".to_string()
}

pub fn boards_key(project_id: &str) -> String {
    format!("boards_{}", project_id)
}

pub fn lists_key(project_id: &str, board_id: u64) -> String {
    format!("lists_{}_{}", project_id, board_id)
}

pub fn issues_key(project_id: &str, query: &IssueQuery) -> String {
    format!("{}{}", issues_prefix(project_id), query.to_query_string())
}

/// Prefix shared by all issue listings of a project
///
/// The trailing underscore keeps project `4` from matching project `42`.
pub fn issues_prefix(project_id: &str) -> String {
    format!("issues_{}_", project_id)
}

pub fn current_user_key() -> String {
    "user".to_string()
}

/// Key namespace for one GitLab instance and token
///
/// Only a digest prefix of the token ends up in the cache.
pub fn cache_scope(base_url: &str, access_token: Option<&str>) -> String {
    let token = match access_token {
        Some(token) => hex::encode(&Sha256::digest(token.as_bytes())[..8]),
        None => "anonymous".to_string(),
    };
    format!("{}#{}", base_url.trim_end_matches('/'), token)
}

/// Cached GitLab API client using the decorator pattern
///
/// Wraps an inner `GitLabClient` and adds caching behavior based on the configured
/// `CacheMode`. The cache is best-effort: a poisoned lock or an unparsable
/// cached payload falls through to the inner client.
///
/// # Example
///
/// ```rust,ignore
/// use gl_client::{CachedGitLabClient, RestClient, CacheMode};
/// use gl_api_cache::ResponseCache;
/// use std::sync::{Arc, Mutex};
///
/// let inner = RestClient::new(&settings)?;
/// let cache = Arc::new(Mutex::new(ResponseCache::default()));
/// let client = CachedGitLabClient::new(inner, cache, CacheMode::ReadWrite);
/// ```
#[derive(Debug)]
pub struct CachedGitLabClient<C: GitLabClient, K: Clock = SystemClock> {
    inner: C,
    cache: Arc<Mutex<ResponseCache<K>>>,
    mode: CacheMode,
    issues_ttl: Duration,
    scope: Option<String>,
}

impl<C: GitLabClient + Clone, K: Clock> Clone for CachedGitLabClient<C, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cache: Arc::clone(&self.cache),
            mode: self.mode,
            issues_ttl: self.issues_ttl,
            scope: self.scope.clone(),
        }
    }
}

impl<C: GitLabClient, K: Clock> CachedGitLabClient<C, K> {
    /// Create a new cached client
    ///
    /// # Arguments
    ///
    /// * `inner` - The inner client to delegate API calls to
    /// * `cache` - Shared cache instance
    /// * `mode` - Cache behavior mode
    pub fn new(inner: C, cache: Arc<Mutex<ResponseCache<K>>>, mode: CacheMode) -> Self {
        Self {
            inner,
            cache,
            mode,
            issues_ttl: ISSUES_TTL,
            scope: None,
        }
    }

    /// Keep this client's entries apart from other scopes in the shared cache
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    fn scoped(&self, key: String) -> String {
        match &self.scope {
            Some(scope) => format!("{}|{}", scope, key),
            None => key,
        }
    }

    /// Override the TTL used for issue listings
    pub fn with_issues_ttl(mut self, ttl: Duration) -> Self {
        self.issues_ttl = ttl;
        self
    }

    /// Get the current cache mode
    pub fn cache_mode(&self) -> CacheMode {
        self.mode
    }

    /// Create a new client with a different cache mode sharing the same cache
    pub fn with_mode(&self, mode: CacheMode) -> Self
    where
        C: Clone,
    {
        Self {
            mode,
            ..self.clone()
        }
    }

    /// Get a reference to the inner client
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Shared cache handle
    pub fn cache(&self) -> &Arc<Mutex<ResponseCache<K>>> {
        &self.cache
    }

    /// Run `f` against the cache, skipping it if the lock is poisoned
    fn with_cache<R>(&self, f: impl FnOnce(&mut ResponseCache<K>) -> R) -> Option<R> {
        match self.cache.lock() {
            Ok(mut cache) => Some(f(&mut cache)),
            Err(_) => {
                warn!("Response cache lock is poisoned, bypassing cache");
                None
            }
        }
    }

    fn try_cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.mode.reads() {
            return None;
        }

        let body = self.with_cache(|cache| cache.get(key)).flatten()?;
        match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Failed to parse cached '{}': {}", key, e);
                None
            }
        }
    }

    fn cache_set<T: Serialize>(&self, key: String, value: &T, ttl: Duration) {
        if !self.mode.writes() {
            return;
        }

        match serde_json::to_string(value) {
            Ok(body) => {
                self.with_cache(|cache| cache.set_with_ttl(key, body, ttl));
            }
            Err(e) => debug!("Failed to serialize response for cache: {}", e),
        }
    }

    /// Serve from cache or fetch and remember
    async fn cached<T, F>(&self, key: String, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Future<Output = Result<T>> + Send,
    {
        if let Some(value) = self.try_cache_get(&key) {
            return Ok(value);
        }

        let value = fetch.await?;
        self.cache_set(key, &value, ttl);
        Ok(value)
    }

    fn default_ttl(&self) -> Duration {
        self.with_cache(|cache| cache.default_ttl())
            .unwrap_or(gl_api_cache::DEFAULT_TTL)
    }

    /// Invalidate all cached issue listings of a project
    ///
    /// Returns how many entries were dropped.
    pub fn invalidate_issues(&self, project_id: &str) -> usize {
        let prefix = self.scoped(issues_prefix(project_id));
        debug!("Cache invalidation for issues: pattern '{}'", prefix);
        self.with_cache(|cache| cache.invalidate(&prefix))
            .unwrap_or(0)
    }
}

#[async_trait]
impl<C: GitLabClient, K: Clock> GitLabClient for CachedGitLabClient<C, K> {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let ttl = self.default_ttl();
        self.cached(self.scoped(projects_key()), ttl, self.inner.fetch_projects())
            .await
    }

    async fn fetch_boards(&self, project_id: &str) -> Result<Vec<Board>> {
        let ttl = self.default_ttl();
        self.cached(
            self.scoped(boards_key(project_id)),
            ttl,
            self.inner.fetch_boards(project_id),
        )
        .await
    }

    async fn fetch_board_lists(&self, project_id: &str, board_id: u64) -> Result<Vec<BoardList>> {
        let ttl = self.default_ttl();
        self.cached(
            self.scoped(lists_key(project_id, board_id)),
            ttl,
            self.inner.fetch_board_lists(project_id, board_id),
        )
        .await
    }

    async fn fetch_issues(&self, project_id: &str, query: &IssueQuery) -> Result<Vec<Issue>> {
        self.cached(
            self.scoped(issues_key(project_id, query)),
            self.issues_ttl,
            self.inner.fetch_issues(project_id, query),
        )
        .await
    }

    async fn update_issue(
        &self,
        project_id: &str,
        issue_iid: u64,
        update: &IssueUpdate,
    ) -> Result<Issue> {
        // Mutations are never cached
        let result = self.inner.update_issue(project_id, issue_iid, update).await;

        if result.is_ok() {
            self.invalidate_issues(project_id);
        }

        result
    }

    async fn fetch_current_user(&self) -> Result<User> {
        let ttl = self.default_ttl();
        self.cached(self.scoped(current_user_key()), ttl, self.inner.fetch_current_user())
            .await
    }
}
