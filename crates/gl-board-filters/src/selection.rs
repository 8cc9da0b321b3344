//! Filter selections and the combined filter state of a board
//!
//! Assignee, author and milestone are single-select: choosing a value
//! replaces the previous one. Labels are multi-select and accumulate.
//! Selections of different kinds combine conjunctively.

use gl_client::{IssueQuery, Match};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Reserved value meaning "no filter"
pub const ALL: &str = "All";

/// Reserved value meaning "attribute is unset"
pub const NONE: &str = "None";

/// The attribute a filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Assignee,
    Author,
    Milestone,
    Label,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Assignee,
        FilterKind::Author,
        FilterKind::Milestone,
        FilterKind::Label,
    ];

    pub fn is_multi_select(&self) -> bool {
        matches!(self, FilterKind::Label)
    }

    /// Whether values of this kind are usernames
    pub fn is_user(&self) -> bool {
        matches!(self, FilterKind::Assignee | FilterKind::Author)
    }

    /// Stable identifier, also used as the shortcut group id
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Assignee => "assignee",
            FilterKind::Author => "author",
            FilterKind::Milestone => "milestone",
            FilterKind::Label => "label",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "assignee" => Ok(FilterKind::Assignee),
            "author" => Ok(FilterKind::Author),
            "milestone" => Ok(FilterKind::Milestone),
            "label" => Ok(FilterKind::Label),
            other => Err(format!("unknown filter kind: {}", other)),
        }
    }
}

/// Value of a single filter
///
/// Serialized as a plain string: `"All"`, `"None"` or the value itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterValue {
    #[default]
    All,
    None,
    Value(String),
}

impl FilterValue {
    /// Parse a raw value; empty input means no filter
    pub fn parse(raw: &str) -> Self {
        match raw {
            "" | ALL => FilterValue::All,
            NONE => FilterValue::None,
            value => FilterValue::Value(value.to_string()),
        }
    }

    /// Parse a username, dropping any leading `@`
    pub fn user(raw: &str) -> Self {
        Self::parse(raw.trim().trim_start_matches('@'))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterValue::All => ALL,
            FilterValue::None => NONE,
            FilterValue::Value(value) => value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }

    /// Issue query match for this value (`All` adds no filter)
    pub fn to_match(&self) -> Option<Match> {
        match self {
            FilterValue::All => None,
            FilterValue::None => Some(Match::None),
            FilterValue::Value(value) => Some(Match::Value(value.clone())),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FilterValue {
    fn from(raw: String) -> Self {
        FilterValue::parse(&raw)
    }
}

impl From<FilterValue> for String {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Value(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

/// One active choice, e.g. "assignee is alice"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    pub kind: FilterKind,
    pub value: FilterValue,
}

impl FilterSelection {
    /// Build a selection from user input, normalizing `@username`
    pub fn new(kind: FilterKind, raw: &str) -> Self {
        let value = if kind.is_user() {
            FilterValue::user(raw)
        } else {
            FilterValue::parse(raw)
        };
        Self { kind, value }
    }
}

/// The complete set of active filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    assignee: FilterValue,
    author: FilterValue,
    milestone: FilterValue,
    labels: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply selections in order; for single-select kinds the last one wins
    pub fn from_selections<I>(selections: I) -> Self
    where
        I: IntoIterator<Item = FilterSelection>,
    {
        let mut state = Self::new();
        for selection in selections {
            state.select(selection);
        }
        state
    }

    pub fn assignee(&self) -> &FilterValue {
        &self.assignee
    }

    pub fn author(&self) -> &FilterValue {
        &self.author
    }

    pub fn milestone(&self) -> &FilterValue {
        &self.milestone
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    fn single_mut(&mut self, kind: FilterKind) -> Option<&mut FilterValue> {
        match kind {
            FilterKind::Assignee => Some(&mut self.assignee),
            FilterKind::Author => Some(&mut self.author),
            FilterKind::Milestone => Some(&mut self.milestone),
            FilterKind::Label => None,
        }
    }

    /// Value of a single-select kind (`None` for labels)
    pub fn value(&self, kind: FilterKind) -> Option<&FilterValue> {
        match kind {
            FilterKind::Assignee => Some(&self.assignee),
            FilterKind::Author => Some(&self.author),
            FilterKind::Milestone => Some(&self.milestone),
            FilterKind::Label => None,
        }
    }

    /// Make a selection active
    ///
    /// Single-select kinds replace their value. For labels, `All` clears the
    /// set and any other value is added to it.
    pub fn select(&mut self, selection: FilterSelection) {
        let FilterSelection { kind, value } = selection;
        match self.single_mut(kind) {
            Some(slot) => *slot = value,
            None => match value {
                FilterValue::All => self.labels.clear(),
                other => {
                    self.labels.insert(String::from(other));
                }
            },
        }
    }

    /// Click behavior of a filter shortcut
    ///
    /// Selecting the already active value of a single-select kind reverts it
    /// to `All`; labels toggle membership. Returns whether the selection is
    /// active afterwards.
    pub fn toggle(&mut self, selection: FilterSelection) -> bool {
        let FilterSelection { kind, value } = selection;
        match self.single_mut(kind) {
            Some(slot) => {
                if *slot == value {
                    *slot = FilterValue::All;
                } else {
                    *slot = value;
                }
                !slot.is_all()
            }
            None => match value {
                FilterValue::All => {
                    self.labels.clear();
                    false
                }
                other => {
                    let label = String::from(other);
                    if self.labels.remove(&label) {
                        false
                    } else {
                        self.labels.insert(label);
                        true
                    }
                }
            },
        }
    }

    pub fn is_active(&self, selection: &FilterSelection) -> bool {
        match self.value(selection.kind) {
            Some(current) => *current == selection.value,
            None => match &selection.value {
                FilterValue::All => self.labels.is_empty(),
                other => self.labels.contains(other.as_str()),
            },
        }
    }

    /// Active selections in parameter order; `All` values are left out
    pub fn selections(&self) -> Vec<FilterSelection> {
        let singles = [
            (FilterKind::Assignee, &self.assignee),
            (FilterKind::Author, &self.author),
            (FilterKind::Milestone, &self.milestone),
        ];

        let mut selections: Vec<FilterSelection> = singles
            .into_iter()
            .filter(|(_, value)| !value.is_all())
            .map(|(kind, value)| FilterSelection {
                kind,
                value: value.clone(),
            })
            .collect();

        selections.extend(self.labels.iter().map(|label| FilterSelection {
            kind: FilterKind::Label,
            value: FilterValue::parse(label),
        }));

        selections
    }

    pub fn is_empty(&self) -> bool {
        self.assignee.is_all()
            && self.author.is_all()
            && self.milestone.is_all()
            && self.labels.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Open issues matching every active filter
    pub fn to_issue_query(&self) -> IssueQuery {
        IssueQuery {
            assignee: self.assignee.to_match(),
            author: self.author.to_match(),
            milestone: self.milestone.to_match(),
            labels: self.labels.iter().cloned().collect(),
            ..IssueQuery::opened()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(kind: FilterKind, raw: &str) -> FilterSelection {
        FilterSelection::new(kind, raw)
    }

    #[test]
    fn test_value_parsing() {
        assert_eq!(FilterValue::parse(""), FilterValue::All);
        assert_eq!(FilterValue::parse("All"), FilterValue::All);
        assert_eq!(FilterValue::parse("None"), FilterValue::None);
        assert_eq!(
            FilterValue::parse("v1.0"),
            FilterValue::Value("v1.0".to_string())
        );
        assert_eq!(
            FilterValue::user("@alice"),
            FilterValue::Value("alice".to_string())
        );
        assert_eq!(FilterValue::user("@"), FilterValue::All);
        assert_eq!(
            FilterValue::user("@@bob"),
            FilterValue::Value("bob".to_string())
        );
    }

    #[test]
    fn test_value_serializes_as_string() {
        assert_eq!(serde_json::to_string(&FilterValue::None).unwrap(), "\"None\"");
        assert_eq!(
            serde_json::to_string(&FilterValue::Value("bob".into())).unwrap(),
            "\"bob\""
        );
        let parsed: FilterValue = serde_json::from_str("\"All\"").unwrap();
        assert_eq!(parsed, FilterValue::All);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Assignee".parse::<FilterKind>(), Ok(FilterKind::Assignee));
        assert_eq!("label".parse::<FilterKind>(), Ok(FilterKind::Label));
        assert!("reviewer".parse::<FilterKind>().is_err());
    }

    #[test]
    fn test_single_select_replaces() {
        let state = FilterState::from_selections([
            sel(FilterKind::Assignee, "alice"),
            sel(FilterKind::Assignee, "bob"),
        ]);
        assert_eq!(state.assignee(), &FilterValue::Value("bob".to_string()));
    }

    #[test]
    fn test_labels_accumulate() {
        let state = FilterState::from_selections([
            sel(FilterKind::Label, "bug"),
            sel(FilterKind::Label, "urgent"),
            sel(FilterKind::Label, "bug"),
        ]);
        let labels: Vec<_> = state.labels().iter().map(String::as_str).collect();
        assert_eq!(labels, vec!["bug", "urgent"]);
    }

    #[test]
    fn test_select_all_label_clears() {
        let mut state = FilterState::from_selections([sel(FilterKind::Label, "bug")]);
        state.select(sel(FilterKind::Label, "All"));
        assert!(state.labels().is_empty());
    }

    #[test]
    fn test_toggle_single_select() {
        let mut state = FilterState::new();
        assert!(state.toggle(sel(FilterKind::Milestone, "v1")));
        assert_eq!(state.milestone(), &FilterValue::Value("v1".to_string()));

        // another value replaces
        assert!(state.toggle(sel(FilterKind::Milestone, "v2")));
        assert_eq!(state.milestone(), &FilterValue::Value("v2".to_string()));

        // clicking the active value deactivates it
        assert!(!state.toggle(sel(FilterKind::Milestone, "v2")));
        assert!(state.milestone().is_all());
    }

    #[test]
    fn test_toggle_labels() {
        let mut state = FilterState::new();
        assert!(state.toggle(sel(FilterKind::Label, "bug")));
        assert!(state.toggle(sel(FilterKind::Label, "ui")));
        assert!(!state.toggle(sel(FilterKind::Label, "bug")));
        assert_eq!(state.labels().len(), 1);
        assert!(state.is_active(&sel(FilterKind::Label, "ui")));
        assert!(!state.toggle(sel(FilterKind::Label, "All")));
        assert!(state.is_empty());
    }

    #[test]
    fn test_is_active() {
        let state = FilterState::from_selections([sel(FilterKind::Author, "@carol")]);
        assert!(state.is_active(&sel(FilterKind::Author, "carol")));
        assert!(state.is_active(&sel(FilterKind::Assignee, "All")));
        assert!(state.is_active(&sel(FilterKind::Label, "All")));
        assert!(!state.is_active(&sel(FilterKind::Author, "None")));
    }

    #[test]
    fn test_selections_skip_all() {
        let state = FilterState::from_selections([
            sel(FilterKind::Label, "bug"),
            sel(FilterKind::Milestone, "None"),
            sel(FilterKind::Assignee, "@alice"),
        ]);

        assert_eq!(
            state.selections(),
            vec![
                sel(FilterKind::Assignee, "alice"),
                sel(FilterKind::Milestone, "None"),
                sel(FilterKind::Label, "bug"),
            ]
        );
        assert!(FilterState::new().selections().is_empty());
    }

    #[test]
    fn test_to_issue_query() {
        let state = FilterState::from_selections([
            sel(FilterKind::Assignee, "None"),
            sel(FilterKind::Author, "alice"),
            sel(FilterKind::Label, "bug"),
        ]);
        let query = state.to_issue_query();

        assert_eq!(query.assignee, Some(Match::None));
        assert_eq!(query.author, Some(Match::Value("alice".to_string())));
        assert_eq!(query.milestone, None);
        assert_eq!(query.labels, vec!["bug".to_string()]);
        assert_eq!(
            query.to_query_string(),
            "state=opened&assignee_id=None&author_username=alice&labels=bug"
        );
    }

    #[test]
    fn test_clear() {
        let mut state = FilterState::from_selections([sel(FilterKind::Label, "bug")]);
        state.clear();
        assert!(state.is_empty());
    }
}
