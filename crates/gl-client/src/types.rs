//! GitLab API data transfer objects
//!
//! These mirror the subset of the REST v4 payloads the board tooling needs.
//! Unknown fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// A project the user is a member of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// e.g. `group/subgroup/project`
    pub path_with_namespace: String,
    pub web_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An issue board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub lists: Vec<BoardList>,
}

/// A column of a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: u64,
    #[serde(default)]
    pub label: Option<Label>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub max_issue_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// An issue as returned by `GET /projects/:id/issues`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    /// Project-scoped issue number
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    /// `opened` or `closed`
    pub state: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Issue state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Opened,
    Closed,
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Opened => "opened",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

/// Match on a single-valued issue attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Match {
    /// Attribute is unset (no assignee, no milestone)
    None,
    /// Attribute equals the given username or title
    Value(String),
}

/// Parameters for listing issues
///
/// Fields left at `None`/empty add no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueQuery {
    #[serde(default)]
    pub state: Option<IssueState>,
    #[serde(default)]
    pub assignee: Option<Match>,
    #[serde(default)]
    pub author: Option<Match>,
    #[serde(default)]
    pub milestone: Option<Match>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl IssueQuery {
    /// Open issues only
    pub fn opened() -> Self {
        Self {
            state: Some(IssueState::Opened),
            ..Self::default()
        }
    }

    /// REST query parameters in a stable order
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(state) = self.state {
            params.push(("state", state.as_str().to_string()));
        }
        match &self.assignee {
            Some(Match::None) => params.push(("assignee_id", "None".to_string())),
            Some(Match::Value(username)) => params.push(("assignee_username", username.clone())),
            None => {}
        }
        match &self.author {
            Some(Match::None) => params.push(("author_id", "None".to_string())),
            Some(Match::Value(username)) => params.push(("author_username", username.clone())),
            None => {}
        }
        match &self.milestone {
            Some(Match::None) => params.push(("milestone", "None".to_string())),
            Some(Match::Value(title)) => params.push(("milestone", title.clone())),
            None => {}
        }
        if !self.labels.is_empty() {
            params.push(("labels", self.labels.join(",")));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("per_page", per_page.to_string()));
        }

        params
    }

    /// URL-encoded form of [`to_params`](Self::to_params), used in cache keys
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_params() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }
}

/// State transition for an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateEvent {
    Close,
    Reopen,
}

/// Body of `PUT /projects/:id/issues/:iid`
///
/// Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_event: Option<StateEvent>,
    /// Replaces all labels (comma separated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_labels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_labels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
}

impl IssueUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Move an issue between board columns by swapping labels
    pub fn move_between_labels(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            remove_labels: from.map(str::to_string),
            add_labels: to.map(str::to_string),
            ..Self::default()
        }
    }
}
