//! Board filters
//!
//! Filter state for a GitLab issue board, its encoding in the page URL and
//! the shortcut groups of the side panel.
//!
//! ```
//! use gl_board_filters::{codec, FilterKind, FilterSelection, FilterState};
//! use url::Url;
//!
//! let board = Url::parse("https://gitlab.example.com/g/p/-/boards/1").unwrap();
//! let state = FilterState::from_selections([
//!     FilterSelection::new(FilterKind::Assignee, "@alice"),
//!     FilterSelection::new(FilterKind::Label, "bug"),
//! ]);
//!
//! let url = codec::encode(&board, &state);
//! assert_eq!(url.query(), Some("assignee_username=alice&label_name[]=bug"));
//! assert_eq!(codec::decode(&url), state);
//! ```

pub mod codec;
pub mod page;
pub mod selection;
pub mod shortcuts;

pub use codec::{clear_filter_params, decode, encode, encode_into, has_filter_params};
pub use page::{apply_filters, read_filters, reset_filters, toggle_filter, BoardPage, MemoryPage};
pub use selection::{FilterKind, FilterSelection, FilterState, FilterValue};
pub use shortcuts::{build_groups, FilterGroup, FilterItem};
