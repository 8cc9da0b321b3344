//! Page adapter
//!
//! The filters never touch a page directly: they read the current URL and
//! push a new one through [`BoardPage`]. A browser-backed implementation
//! would navigate; [`MemoryPage`] keeps a history for the CLI and tests.

use crate::codec;
use crate::selection::{FilterSelection, FilterState};
use log::debug;
use url::Url;

/// Access to the URL of a board page
pub trait BoardPage {
    fn current_url(&self) -> Url;

    /// Navigate to `url`
    fn push_url(&mut self, url: Url);
}

/// Filters currently encoded in the page URL
pub fn read_filters<P: BoardPage + ?Sized>(page: &P) -> FilterState {
    codec::decode(&page.current_url())
}

/// Rewrite the page URL to carry `state`
///
/// Returns `false` without navigating when the URL would not change.
pub fn apply_filters<P: BoardPage + ?Sized>(page: &mut P, state: &FilterState) -> bool {
    let current = page.current_url();
    let next = codec::encode(&current, state);
    navigate(page, current, next)
}

/// Drop every filter parameter from the page URL
pub fn reset_filters<P: BoardPage + ?Sized>(page: &mut P) -> bool {
    let current = page.current_url();
    let mut next = current.clone();
    codec::clear_filter_params(&mut next);
    navigate(page, current, next)
}

/// Toggle one shortcut on the page and return the resulting filters
pub fn toggle_filter<P: BoardPage + ?Sized>(page: &mut P, selection: FilterSelection) -> FilterState {
    let mut state = read_filters(page);
    state.toggle(selection);
    apply_filters(page, &state);
    state
}

fn navigate<P: BoardPage + ?Sized>(page: &mut P, current: Url, next: Url) -> bool {
    if next == current {
        return false;
    }
    debug!("Navigating {} -> {}", current, next);
    page.push_url(next);
    true
}

/// In-memory page with navigation history
#[derive(Debug, Clone)]
pub struct MemoryPage {
    current: Url,
    history: Vec<Url>,
}

impl MemoryPage {
    pub fn new(url: Url) -> Self {
        Self {
            current: url,
            history: Vec::new(),
        }
    }

    /// Previously visited URLs, oldest first
    pub fn history(&self) -> &[Url] {
        &self.history
    }

    /// Go back one step; returns `false` at the start of the history
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }
}

impl BoardPage for MemoryPage {
    fn current_url(&self) -> Url {
        self.current.clone()
    }

    fn push_url(&mut self, url: Url) {
        let previous = std::mem::replace(&mut self.current, url);
        self.history.push(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{FilterKind, FilterValue};

    fn page(query: &str) -> MemoryPage {
        let mut url = Url::parse("https://gitlab.example.com/group/project/-/boards/3").unwrap();
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        MemoryPage::new(url)
    }

    #[test]
    fn test_apply_filters_pushes_url() {
        let mut page = page("scope=all");
        let state = FilterState::from_selections([FilterSelection::new(
            FilterKind::Assignee,
            "@alice",
        )]);

        assert!(apply_filters(&mut page, &state));
        assert_eq!(
            page.current_url().query(),
            Some("scope=all&assignee_username=alice")
        );
        assert_eq!(page.history().len(), 1);
        assert_eq!(read_filters(&page), state);
    }

    #[test]
    fn test_apply_same_filters_does_not_navigate() {
        let mut page = page("assignee_username=alice");
        let state = read_filters(&page);

        assert!(!apply_filters(&mut page, &state));
        assert!(page.history().is_empty());
    }

    #[test]
    fn test_reset_filters_leaves_no_filter_params() {
        let mut page = page("scope=all&label_name[]=bug&label_name[]=ui&milestone_title=None");

        assert!(reset_filters(&mut page));
        let url = page.current_url();
        assert_eq!(url.query(), Some("scope=all"));
        assert!(!codec::has_filter_params(&url));
        assert!(read_filters(&page).is_empty());

        // nothing left to reset
        assert!(!reset_filters(&mut page));
    }

    #[test]
    fn test_toggle_filter_roundtrip_through_url() {
        let mut page = page("");
        let selection = FilterSelection::new(FilterKind::Milestone, "v1");

        let state = toggle_filter(&mut page, selection.clone());
        assert_eq!(state.milestone(), &FilterValue::Value("v1".to_string()));
        assert_eq!(page.current_url().query(), Some("milestone_title=v1"));

        let state = toggle_filter(&mut page, selection);
        assert!(state.is_empty());
        assert_eq!(page.current_url().query(), None);
        assert_eq!(page.history().len(), 2);
    }

    #[test]
    fn test_back() {
        let mut page = page("");
        let original = page.current_url();
        toggle_filter(&mut page, FilterSelection::new(FilterKind::Label, "bug"));

        assert!(page.back());
        assert_eq!(page.current_url(), original);
        assert!(!page.back());
    }
}
