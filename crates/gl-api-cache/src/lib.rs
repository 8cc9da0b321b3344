//! Short-lived response cache for GitLab API calls
//!
//! Maps a request key (e.g. `issues_42_state=opened`) to a timestamped payload.
//! Every entry carries its own TTL; an entry is valid while
//! `now - stored_at < ttl`. Expired entries are evicted lazily on lookup,
//! there is no background sweep.
//!
//! # Example
//!
//! ```rust
//! use gl_api_cache::{ManualClock, ResponseCache};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut cache = ResponseCache::with_clock(Duration::from_secs(300), clock.clone());
//!
//! cache.set_with_ttl("issues_42_", "[]", Duration::from_millis(120_000));
//! clock.advance(Duration::from_millis(119_999));
//! assert!(cache.get("issues_42_").is_some());
//!
//! clock.advance(Duration::from_millis(2));
//! assert!(cache.get("issues_42_").is_none());
//! ```

pub mod cache;
pub mod clock;

pub use cache::{CacheEntry, CacheStats, ResponseCache};
pub use clock::{Clock, ManualClock, SystemClock};

use std::time::Duration;

/// Default TTL for list endpoints (projects, boards, board lists)
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// TTL for issue listings, which change far more often than list metadata
pub const ISSUES_TTL: Duration = Duration::from_secs(2 * 60);
