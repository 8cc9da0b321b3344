//! The `GitLabClient` seam and how a client uses the response cache

use crate::error::Result;
use crate::types::{Board, BoardList, Issue, IssueQuery, IssueUpdate, Project, User};
use async_trait::async_trait;

/// How a [`crate::CachedGitLabClient`] treats the response cache
///
/// Fixed per client; `gl-board --refresh` maps to `WriteOnly` and
/// `--no-cache` to `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Bypass the cache entirely
    None,

    /// Always hit the API, then remember the answer
    WriteOnly,

    /// Serve cached answers, never store new ones
    ReadOnly,

    #[default]
    ReadWrite,
}

impl CacheMode {
    pub fn reads(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    pub fn writes(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

/// GitLab API client trait
///
/// Implementations can be direct (hitting the API) or decorated
/// with caching.
///
/// Project identifiers are either the numeric id (`"42"`) or the full path
/// (`"group/project"`); implementations take care of encoding.
///
/// Errors from the transport are returned as-is. There is no retry policy.
#[async_trait]
pub trait GitLabClient: Send + Sync {
    /// Fetch projects the authenticated user is a member of
    async fn fetch_projects(&self) -> Result<Vec<Project>>;

    /// Fetch the issue boards of a project
    async fn fetch_boards(&self, project_id: &str) -> Result<Vec<Board>>;

    /// Fetch the columns of a board
    ///
    /// # Arguments
    ///
    /// * `project_id` - Project id or path
    /// * `board_id` - Board id
    async fn fetch_board_lists(&self, project_id: &str, board_id: u64) -> Result<Vec<BoardList>>;

    /// Fetch issues of a project matching `query`
    async fn fetch_issues(&self, project_id: &str, query: &IssueQuery) -> Result<Vec<Issue>>;

    /// Update a single issue
    ///
    /// # Arguments
    ///
    /// * `project_id` - Project id or path
    /// * `issue_iid` - Project-scoped issue number
    /// * `update` - Fields to change; unset fields are left alone
    ///
    /// # Returns
    ///
    /// The updated issue.
    async fn update_issue(
        &self,
        project_id: &str,
        issue_iid: u64,
        update: &IssueUpdate,
    ) -> Result<Issue>;

    /// Fetch the user the token belongs to
    async fn fetch_current_user(&self) -> Result<User>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_modes() {
        let table = [
            (CacheMode::None, false, false),
            (CacheMode::WriteOnly, false, true),
            (CacheMode::ReadOnly, true, false),
            (CacheMode::ReadWrite, true, true),
        ];
        for (mode, reads, writes) in table {
            assert_eq!(mode.reads(), reads, "{:?}", mode);
            assert_eq!(mode.writes(), writes, "{:?}", mode);
        }
        assert_eq!(CacheMode::default(), CacheMode::ReadWrite);
    }
}
