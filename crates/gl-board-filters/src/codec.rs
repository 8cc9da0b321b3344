//! URL query codec for board filters
//!
//! The page URL is the single source of truth for the active filters, so
//! they survive reloads and can be shared. The wire format is the one the
//! GitLab boards page understands:
//!
//! | kind      | parameter           | value                               |
//! |-----------|---------------------|-------------------------------------|
//! | assignee  | `assignee_username` | username without `@`, or `None`     |
//! | author    | `author_username`   | username without `@`, or `None`     |
//! | milestone | `milestone_title`   | title, or `None`                    |
//! | label     | `label_name[]`      | label name, repeated per label      |
//!
//! `All` is never written: a kind without a filter has no parameter.
//! Query parameters outside this set are left exactly as they were.

use crate::selection::{FilterKind, FilterSelection, FilterState, FilterValue};
use log::debug;
use url::{form_urlencoded, Url};

pub const ASSIGNEE_PARAM: &str = "assignee_username";
pub const AUTHOR_PARAM: &str = "author_username";
pub const MILESTONE_PARAM: &str = "milestone_title";
pub const LABEL_PARAM: &str = "label_name[]";

/// Accepted on decode, never written
pub const LABEL_PARAM_ALIAS: &str = "label_name";

/// Query parameter written for a filter kind
pub fn param_name(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Assignee => ASSIGNEE_PARAM,
        FilterKind::Author => AUTHOR_PARAM,
        FilterKind::Milestone => MILESTONE_PARAM,
        FilterKind::Label => LABEL_PARAM,
    }
}

fn kind_for_param(param: &str) -> Option<FilterKind> {
    match param {
        ASSIGNEE_PARAM => Some(FilterKind::Assignee),
        AUTHOR_PARAM => Some(FilterKind::Author),
        MILESTONE_PARAM => Some(FilterKind::Milestone),
        LABEL_PARAM | LABEL_PARAM_ALIAS => Some(FilterKind::Label),
        _ => None,
    }
}

/// Read the active filters from a URL
///
/// Unknown parameters are ignored. When a single-select parameter appears
/// more than once the last occurrence wins. Empty or `All` label values are
/// skipped, so they never drop labels collected earlier.
pub fn decode(url: &Url) -> FilterState {
    let mut state = FilterState::new();
    for (param, value) in url.query_pairs() {
        let Some(kind) = kind_for_param(&param) else {
            continue;
        };
        if kind.is_multi_select() && FilterValue::parse(&value).is_all() {
            continue;
        }
        state.select(FilterSelection::new(kind, &value));
    }
    state
}

/// Copy of `url` carrying exactly the filters in `state`
pub fn encode(url: &Url, state: &FilterState) -> Url {
    let mut url = url.clone();
    encode_into(&mut url, state);
    url
}

/// Replace the filter parameters of `url` with those of `state`
///
/// Existing filter parameters are removed first; other parameters keep
/// their position and encoding. The filters are appended in the order
/// assignee, author, milestone, labels.
pub fn encode_into(url: &mut Url, state: &FilterState) {
    let mut segments = retained_segments(url);
    segments.extend(state.selections().iter().map(encode_selection));
    set_segments(url, &segments);
    debug!("Encoded filters into {}", url);
}

/// Remove every filter parameter, leaving all others untouched
pub fn clear_filter_params(url: &mut Url) {
    let segments = retained_segments(url);
    set_segments(url, &segments);
}

/// Whether any filter parameter is present
pub fn has_filter_params(url: &Url) -> bool {
    url.query_pairs()
        .any(|(param, _)| kind_for_param(&param).is_some())
}

fn encode_selection(selection: &FilterSelection) -> String {
    let value: String =
        form_urlencoded::byte_serialize(selection.value.as_str().as_bytes()).collect();
    format!("{}={}", param_name(selection.kind), value)
}

/// Raw `key=value` segments of the query that are not filter parameters
fn retained_segments(url: &Url) -> Vec<String> {
    url.query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| kind_for_param(&segment_param(segment)).is_none())
        .map(str::to_string)
        .collect()
}

fn segment_param(segment: &str) -> String {
    let raw = segment.split('=').next().unwrap_or_default();
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(param, _)| param.into_owned())
        .unwrap_or_default()
}

fn set_segments(url: &mut Url, segments: &[String]) {
    if segments.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&segments.join("&")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOARD: &str = "https://gitlab.example.com/group/project/-/boards/3";

    fn board(query: &str) -> Url {
        let mut url = Url::parse(BOARD).unwrap();
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        url
    }

    fn state(selections: &[(FilterKind, &str)]) -> FilterState {
        FilterState::from_selections(
            selections
                .iter()
                .map(|(kind, raw)| FilterSelection::new(*kind, raw)),
        )
    }

    #[test]
    fn test_encode_assignee_and_milestone() {
        let url = encode(
            &board(""),
            &state(&[
                (FilterKind::Assignee, "@alice"),
                (FilterKind::Milestone, "None"),
            ]),
        );

        let query = url.query().unwrap();
        assert!(query.contains("assignee_username=alice&milestone_title=None"));
        assert!(!query.contains(AUTHOR_PARAM));
        assert!(!query.contains("label_name[]"));
    }

    #[test]
    fn test_encode_empty_state_has_no_filter_params() {
        let url = encode(&board(""), &FilterState::new());
        assert_eq!(url.as_str(), BOARD);
        assert!(!has_filter_params(&url));
    }

    #[test]
    fn test_all_is_never_written() {
        let url = encode(
            &board(""),
            &state(&[(FilterKind::Author, "All"), (FilterKind::Label, "All")]),
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_decode_repeated_labels() {
        let decoded = decode(&board("label_name[]=bug&label_name[]=urgent"));
        let labels: Vec<_> = decoded.labels().iter().map(String::as_str).collect();
        assert_eq!(labels, vec!["bug", "urgent"]);
    }

    #[test]
    fn test_decode_percent_encoded_label_param() {
        let decoded = decode(&board("label_name%5B%5D=bug&label_name=ui+review"));
        assert!(decoded.labels().contains("bug"));
        assert!(decoded.labels().contains("ui review"));
    }

    #[test]
    fn test_decode_strips_at_from_usernames() {
        let decoded = decode(&board("author_username=%40bob"));
        assert_eq!(decoded.author(), &FilterValue::Value("bob".to_string()));
    }

    #[test]
    fn test_all_label_does_not_drop_earlier_labels() {
        let decoded = decode(&board("label_name[]=bug&label_name[]=All&label_name[]=ui"));
        let labels: Vec<&str> = decoded.labels().iter().map(String::as_str).collect();
        assert_eq!(labels, vec!["bug", "ui"]);
    }

    #[test]
    fn test_repeated_at_signs_roundtrip() {
        let state = FilterState::from_selections([FilterSelection::new(
            FilterKind::Assignee,
            "@@bob",
        )]);
        assert_eq!(state.assignee(), &FilterValue::Value("bob".to_string()));
        assert_eq!(decode(&encode(&board(""), &state)), state);
    }

    #[test]
    fn test_decode_without_filters_is_empty() {
        assert!(decode(&board("")).is_empty());
        assert!(decode(&board("scope=all&utf8=%E2%9C%93")).is_empty());
    }

    /// Assumption: conflicting single-select parameters resolve to the last
    /// value in the query.
    #[test]
    fn test_duplicate_single_select_last_wins() {
        let decoded = decode(&board(
            "assignee_username=alice&milestone_title=v1&assignee_username=bob",
        ));
        assert_eq!(decoded.assignee(), &FilterValue::Value("bob".to_string()));
        assert_eq!(decoded.milestone(), &FilterValue::Value("v1".to_string()));
    }

    #[test]
    fn test_decode_encode_roundtrip() {
        let cases = vec![
            state(&[]),
            state(&[(FilterKind::Assignee, "None")]),
            state(&[(FilterKind::Author, "@carol"), (FilterKind::Label, "bug")]),
            state(&[
                (FilterKind::Assignee, "alice"),
                (FilterKind::Author, "None"),
                (FilterKind::Milestone, "Release 2.0 & beyond"),
                (FilterKind::Label, "needs review"),
                (FilterKind::Label, "priority::high"),
                (FilterKind::Label, "None"),
            ]),
        ];

        for case in cases {
            let url = encode(&board("scope=all"), &case);
            assert_eq!(decode(&url), case, "url: {}", url);
        }
    }

    #[test]
    fn test_encode_replaces_previous_filters() {
        let url = encode(
            &board("assignee_username=alice&label_name[]=bug"),
            &state(&[(FilterKind::Label, "ui")]),
        );
        assert_eq!(url.query(), Some("label_name[]=ui"));
    }

    #[test]
    fn test_unknown_params_pass_through() {
        let original = board("scope=all&sort=created_date&utf8=%E2%9C%93");
        let url = encode(&original, &state(&[(FilterKind::Milestone, "v1")]));
        assert_eq!(
            url.query(),
            Some("scope=all&sort=created_date&utf8=%E2%9C%93&milestone_title=v1")
        );
    }

    #[test]
    fn test_clear_filter_params_keeps_other_params() {
        let mut url = board(
            "scope=all&assignee_username=bob&label_name%5B%5D=bug&author_username=None&utf8=%E2%9C%93",
        );
        url.set_fragment(Some("top"));

        clear_filter_params(&mut url);

        assert_eq!(
            url.as_str(),
            format!("{}?scope=all&utf8=%E2%9C%93#top", BOARD)
        );
        assert!(!has_filter_params(&url));
    }

    #[test]
    fn test_clear_only_filters_drops_query() {
        let mut url = board("milestone_title=v1&label_name=bug");
        clear_filter_params(&mut url);
        assert_eq!(url.as_str(), BOARD);
    }

    #[test]
    fn test_param_names() {
        assert_eq!(param_name(FilterKind::Assignee), "assignee_username");
        assert_eq!(param_name(FilterKind::Author), "author_username");
        assert_eq!(param_name(FilterKind::Milestone), "milestone_title");
        assert_eq!(param_name(FilterKind::Label), "label_name[]");
    }
}
