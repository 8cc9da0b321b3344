//! Issue statistics for filter shortcuts
//!
//! Counts open issues per assignee, author and milestone so that the filter
//! panel can show how many issues each shortcut would match.

use crate::types::{Issue, User};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-attribute issue counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueStatistics {
    pub total: usize,
    pub by_assignee: BTreeMap<String, usize>,
    pub by_author: BTreeMap<String, usize>,
    pub by_milestone: BTreeMap<String, usize>,
    pub by_label: BTreeMap<String, usize>,
    pub without_assignee: usize,
    pub without_author: usize,
    pub without_milestone: usize,
}

impl IssueStatistics {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut stats = Self {
            total: issues.len(),
            ..Self::default()
        };

        for issue in issues {
            match &issue.author {
                Some(author) => *stats.by_author.entry(author.username.clone()).or_default() += 1,
                None => stats.without_author += 1,
            }

            if issue.assignees.is_empty() {
                stats.without_assignee += 1;
            }
            for assignee in &issue.assignees {
                *stats
                    .by_assignee
                    .entry(assignee.username.clone())
                    .or_default() += 1;
            }

            match &issue.milestone {
                Some(milestone) => {
                    *stats
                        .by_milestone
                        .entry(milestone.title.clone())
                        .or_default() += 1
                }
                None => stats.without_milestone += 1,
            }

            for label in &issue.labels {
                *stats.by_label.entry(label.clone()).or_default() += 1;
            }
        }

        stats
    }

    pub fn assignee_count(&self, username: &str) -> usize {
        self.by_assignee.get(username).copied().unwrap_or(0)
    }

    pub fn author_count(&self, username: &str) -> usize {
        self.by_author.get(username).copied().unwrap_or(0)
    }

    pub fn milestone_count(&self, title: &str) -> usize {
        self.by_milestone.get(title).copied().unwrap_or(0)
    }

    pub fn label_count(&self, label: &str) -> usize {
        self.by_label.get(label).copied().unwrap_or(0)
    }
}

/// A user seen on at least one issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub user: User,
    pub is_author: bool,
    pub is_assignee: bool,
}

impl Participant {
    /// Distinct authors and assignees, in order of first appearance
    pub fn collect(issues: &[Issue]) -> Vec<Participant> {
        let mut participants: Vec<Participant> = Vec::new();

        let mut record = |user: &User, author: bool| {
            match participants
                .iter_mut()
                .find(|p| p.user.username == user.username)
            {
                Some(existing) => {
                    existing.is_author |= author;
                    existing.is_assignee |= !author;
                }
                None => participants.push(Participant {
                    user: user.clone(),
                    is_author: author,
                    is_assignee: !author,
                }),
            }
        };

        for issue in issues {
            if let Some(author) = &issue.author {
                record(author, true);
            }
            for assignee in &issue.assignees {
                record(assignee, false);
            }
        }

        participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Milestone;

    fn user(username: &str) -> User {
        User {
            id: username.len() as u64,
            username: username.to_string(),
            name: username.to_uppercase(),
            avatar_url: None,
        }
    }

    fn issue(iid: u64, author: &str, assignees: &[&str], milestone: Option<&str>) -> Issue {
        Issue {
            id: iid,
            iid,
            project_id: 1,
            title: format!("#{}", iid),
            state: "opened".to_string(),
            labels: vec!["board".to_string()],
            assignees: assignees.iter().map(|a| user(a)).collect(),
            author: Some(user(author)),
            milestone: milestone.map(|title| Milestone {
                id: 1,
                title: title.to_string(),
                state: None,
            }),
            web_url: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_statistics() {
        let issues = vec![
            issue(1, "alice", &["bob"], Some("v1")),
            issue(2, "alice", &["bob", "carol"], None),
            issue(3, "bob", &[], Some("v1")),
        ];
        let stats = IssueStatistics::from_issues(&issues);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.author_count("alice"), 2);
        assert_eq!(stats.author_count("bob"), 1);
        assert_eq!(stats.assignee_count("bob"), 2);
        assert_eq!(stats.assignee_count("carol"), 1);
        assert_eq!(stats.assignee_count("dave"), 0);
        assert_eq!(stats.milestone_count("v1"), 2);
        assert_eq!(stats.without_assignee, 1);
        assert_eq!(stats.without_milestone, 1);
        assert_eq!(stats.without_author, 0);
        assert_eq!(stats.label_count("board"), 3);
        assert_eq!(stats.label_count("bug"), 0);
    }

    #[test]
    fn test_statistics_empty() {
        assert_eq!(IssueStatistics::from_issues(&[]), IssueStatistics::default());
    }

    #[test]
    fn test_participants_merge_roles() {
        let issues = vec![
            issue(1, "alice", &["bob"], None),
            issue(2, "bob", &["alice"], None),
            issue(3, "carol", &[], None),
        ];
        let participants = Participant::collect(&issues);

        let names: Vec<_> = participants.iter().map(|p| p.user.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert!(participants[0].is_author && participants[0].is_assignee);
        assert!(participants[1].is_author && participants[1].is_assignee);
        assert!(participants[2].is_author && !participants[2].is_assignee);
    }
}
