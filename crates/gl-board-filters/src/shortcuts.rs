//! Filter shortcut groups for the board side panel
//!
//! Each group offers one-click selections for a filter kind, with the number
//! of open issues the selection would match.

use crate::selection::{FilterKind, FilterSelection, FilterState, FilterValue};
use gl_client::{Issue, IssueStatistics, Participant};
use serde::Serialize;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// A single shortcut
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterItem {
    pub label: String,
    pub value: FilterValue,
    pub count: usize,
    /// Set on the "me" shortcut
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_current_user: bool,
}

impl FilterItem {
    fn new(label: impl Into<String>, value: FilterValue, count: usize) -> Self {
        Self {
            label: label.into(),
            value,
            count,
            is_current_user: false,
        }
    }
}

/// All shortcuts of one filter kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    pub kind: FilterKind,
    pub items: Vec<FilterItem>,
}

impl FilterGroup {
    /// Identifier used to persist the collapsed state
    pub fn id(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn selection(&self, item: &FilterItem) -> FilterSelection {
        FilterSelection {
            kind: self.kind,
            value: item.value.clone(),
        }
    }

    /// Items whose selection is currently active
    pub fn active_items<'a>(
        &'a self,
        state: &'a FilterState,
    ) -> impl Iterator<Item = &'a FilterItem> + 'a {
        self.items
            .iter()
            .filter(move |item| state.is_active(&self.selection(item)))
    }

    pub fn find(&self, value: &FilterValue) -> Option<&FilterItem> {
        self.items.iter().find(|item| item.value == *value)
    }
}

/// Build every shortcut group for a set of open issues
pub fn build_groups(issues: &[Issue], current_user: Option<&str>) -> Vec<FilterGroup> {
    let stats = IssueStatistics::from_issues(issues);
    let participants = Participant::collect(issues);

    vec![
        assignee_group(&stats, &participants, current_user),
        author_group(&stats, &participants, current_user),
        milestone_group(&stats),
        label_group(&stats),
    ]
}

/// Assignee shortcuts
///
/// `All`, then `None` when some issue is unassigned (or there are no
/// issues at all), then the current user, then everyone else by count.
pub fn assignee_group(
    stats: &IssueStatistics,
    participants: &[Participant],
    current_user: Option<&str>,
) -> FilterGroup {
    let mut items = vec![FilterItem::new("All", FilterValue::All, stats.total)];
    if stats.without_assignee > 0 || stats.total == 0 {
        items.push(FilterItem::new(
            "Unassigned",
            FilterValue::None,
            stats.without_assignee,
        ));
    }
    items.extend(user_items(
        participants.iter().filter(|p| p.is_assignee),
        current_user,
        |username| stats.assignee_count(username),
    ));

    FilterGroup {
        kind: FilterKind::Assignee,
        items,
    }
}

/// Author shortcuts
///
/// Same layout as the assignee group; `None` only appears when some issue
/// really has no author.
pub fn author_group(
    stats: &IssueStatistics,
    participants: &[Participant],
    current_user: Option<&str>,
) -> FilterGroup {
    let mut items = vec![FilterItem::new("All", FilterValue::All, stats.total)];
    if stats.without_author > 0 {
        items.push(FilterItem::new(
            "No author",
            FilterValue::None,
            stats.without_author,
        ));
    }
    items.extend(user_items(
        participants.iter().filter(|p| p.is_author),
        current_user,
        |username| stats.author_count(username),
    ));

    FilterGroup {
        kind: FilterKind::Author,
        items,
    }
}

/// Milestone shortcuts, titles in natural order (`v2` before `v10`)
pub fn milestone_group(stats: &IssueStatistics) -> FilterGroup {
    let mut items = vec![FilterItem::new("All", FilterValue::All, stats.total)];
    if stats.without_milestone > 0 || stats.total == 0 {
        items.push(FilterItem::new(
            "No milestone",
            FilterValue::None,
            stats.without_milestone,
        ));
    }

    let mut titles: Vec<(&String, &usize)> = stats.by_milestone.iter().collect();
    titles.sort_by(|(a, _), (b, _)| natural_cmp(a, b).then_with(|| a.cmp(b)));
    items.extend(titles.into_iter().map(|(title, count)| {
        FilterItem::new(title.clone(), FilterValue::Value(title.clone()), *count)
    }));

    FilterGroup {
        kind: FilterKind::Milestone,
        items,
    }
}

/// Label shortcuts, most used first
pub fn label_group(stats: &IssueStatistics) -> FilterGroup {
    let mut items = vec![FilterItem::new("All", FilterValue::All, stats.total)];

    let mut labels: Vec<(&String, &usize)> = stats.by_label.iter().collect();
    labels.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then_with(|| a.cmp(b)));
    items.extend(labels.into_iter().map(|(name, count)| {
        FilterItem::new(name.clone(), FilterValue::parse(name), *count)
    }));

    FilterGroup {
        kind: FilterKind::Label,
        items,
    }
}

fn user_items<'a, I, F>(participants: I, current_user: Option<&str>, count: F) -> Vec<FilterItem>
where
    I: Iterator<Item = &'a Participant>,
    F: Fn(&str) -> usize,
{
    let current_user = current_user.map(|me| me.trim_start_matches('@'));
    let mut items = Vec::new();

    if let Some(me) = current_user {
        items.push(FilterItem {
            is_current_user: true,
            ..FilterItem::new("Me", FilterValue::user(me), count(me))
        });
    }

    let mut others: Vec<FilterItem> = participants
        .filter(|p| Some(p.user.username.as_str()) != current_user)
        .map(|p| {
            let label = if p.user.name.is_empty() {
                format!("@{}", p.user.username)
            } else {
                p.user.name.clone()
            };
            FilterItem::new(
                label,
                FilterValue::user(&p.user.username),
                count(&p.user.username),
            )
        })
        .collect();
    others.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
    });

    items.extend(others);
    items
}

/// Case-insensitive comparison treating digit runs as numbers
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_number(&mut a);
                let right = take_number(&mut b);
                let ord = left.len().cmp(&right.len()).then_with(|| left.cmp(&right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

/// Consume a digit run, without leading zeros
fn take_number(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        digits.push(c);
    }
    digits.trim_start_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_client::{Milestone, User};
    use pretty_assertions::assert_eq;

    fn user(username: &str) -> User {
        User {
            id: username.len() as u64,
            username: username.to_string(),
            name: String::new(),
            avatar_url: None,
        }
    }

    fn issue(author: &str, assignees: &[&str], milestone: Option<&str>, labels: &[&str]) -> Issue {
        Issue {
            id: 1,
            iid: 1,
            project_id: 1,
            title: "issue".to_string(),
            state: "opened".to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
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

    fn values(group: &FilterGroup) -> Vec<&str> {
        group.items.iter().map(|item| item.value.as_str()).collect()
    }

    fn sample() -> Vec<Issue> {
        vec![
            issue("alice", &["bob"], Some("v10"), &["bug"]),
            issue("alice", &["carol"], Some("v2"), &["bug", "ui"]),
            issue("bob", &["carol"], None, &[]),
            issue("dave", &[], Some("v2"), &["ui"]),
            issue("alice", &["me"], None, &["bug"]),
        ]
    }

    #[test]
    fn test_assignee_group_layout() {
        let groups = build_groups(&sample(), Some("me"));
        let assignees = &groups[0];

        assert_eq!(assignees.kind, FilterKind::Assignee);
        assert_eq!(values(assignees), vec!["All", "None", "me", "carol", "bob"]);
        assert_eq!(assignees.items[0].count, 5);
        assert_eq!(assignees.items[1].count, 1);
        assert!(assignees.items[2].is_current_user);
        assert_eq!(assignees.items[2].label, "Me");
        assert_eq!(assignees.items[2].count, 1);
        assert_eq!(assignees.items[3].count, 2);
        assert_eq!(assignees.items[3].label, "@carol");
    }

    #[test]
    fn test_author_group_without_none() {
        let groups = build_groups(&sample(), None);
        let authors = &groups[1];

        // every issue has an author
        assert_eq!(values(authors), vec!["All", "alice", "bob", "dave"]);
        assert_eq!(authors.find(&FilterValue::user("alice")).unwrap().count, 3);
    }

    #[test]
    fn test_me_item_without_issues() {
        let groups = build_groups(&[], Some("@me"));

        assert_eq!(values(&groups[0]), vec!["All", "None", "me"]);
        assert_eq!(groups[0].items[2].count, 0);
        assert_eq!(values(&groups[1]), vec!["All", "me"]);
        assert_eq!(values(&groups[2]), vec!["All", "None"]);
        assert_eq!(values(&groups[3]), vec!["All"]);
    }

    #[test]
    fn test_milestones_natural_order() {
        let groups = build_groups(&sample(), None);
        assert_eq!(values(&groups[2]), vec!["All", "None", "v2", "v10"]);
        assert_eq!(groups[2].items[2].count, 2);
    }

    #[test]
    fn test_labels_by_count() {
        let groups = build_groups(&sample(), None);
        assert_eq!(values(&groups[3]), vec!["All", "bug", "ui"]);
        assert_eq!(groups[3].items[1].count, 3);
    }

    #[test]
    fn test_active_items() {
        let groups = build_groups(&sample(), Some("me"));
        let mut state = FilterState::new();
        state.toggle(FilterSelection::new(FilterKind::Assignee, "carol"));

        let active: Vec<_> = groups[0]
            .active_items(&state)
            .map(|item| item.value.as_str())
            .collect();
        assert_eq!(active, vec!["carol"]);

        let milestones: Vec<_> = groups[2]
            .active_items(&state)
            .map(|item| item.value.as_str())
            .collect();
        assert_eq!(milestones, vec!["All"]);
    }

    #[test]
    fn test_group_ids() {
        let ids: Vec<_> = build_groups(&[], None).iter().map(FilterGroup::id).collect();
        assert_eq!(ids, vec!["assignee", "author", "milestone", "label"]);
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("v2", "v10"), Ordering::Less);
        assert_eq!(natural_cmp("Sprint 9", "sprint 10"), Ordering::Less);
        assert_eq!(natural_cmp("1.10", "1.9"), Ordering::Greater);
        assert_eq!(natural_cmp("v007", "v7"), Ordering::Equal);
        assert_eq!(natural_cmp("beta", "alpha"), Ordering::Greater);
        assert_eq!(natural_cmp("v1", "v1.1"), Ordering::Less);
    }
}
