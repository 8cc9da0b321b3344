//! GitLab API client with caching support
//!
//! This crate provides a trait-based GitLab API client with optional caching.
//! The design follows the decorator pattern, allowing caching behavior to be
//! composed with the base client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              GitLabClient trait                 │
//! │  - fetch_projects() / fetch_boards()            │
//! │  - fetch_board_lists() / fetch_issues()         │
//! │  - update_issue() / fetch_current_user()        │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │   RestClient    │         │ CachedGitLabClient  │
//! │ (direct API)    │◄────────│ (decorator)         │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gl_client::{CacheMode, CachedGitLabClient, GitLabClient, IssueQuery, RestClient};
//! use gl_api_cache::ResponseCache;
//! use gl_board_config::Settings;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::new("https://gitlab.example.com", Some("glpat-token"))?;
//! let cache = Arc::new(Mutex::new(ResponseCache::default()));
//! let client = CachedGitLabClient::new(RestClient::new(&settings)?, cache, CacheMode::ReadWrite);
//!
//! let issues = client.fetch_issues("team/board", &IssueQuery::opened()).await?;
//! # Ok(())
//! # }
//! ```

pub mod cached_client;
pub mod client;
pub mod error;
pub mod rest_client;
pub mod stats;
pub mod types;

pub use cached_client::{cache_scope, CachedGitLabClient};
pub use client::{CacheMode, GitLabClient};
pub use error::{ClientError, Result};
pub use rest_client::RestClient;
pub use stats::{IssueStatistics, Participant};
pub use types::{
    Board, BoardList, Issue, IssueQuery, IssueState, IssueUpdate, Label, Match, Milestone,
    Project, StateEvent, User,
};

// Re-export cache types for convenience
pub use gl_api_cache::{CacheStats, ResponseCache};
