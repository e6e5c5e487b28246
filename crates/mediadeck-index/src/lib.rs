//! # mediadeck-index
//!
//! In-memory lookup and navigation over a set of [`MediaEntry`] posts.
//!
//! - [`MultiKeyIndex`] owns the canonical id map plus the status, platform
//!   and tag indexes, and answers filtered/sorted view queries.
//! - [`TimelineIndex`] groups a view into year-month buckets, newest first.
//! - [`NavigationCursor`] walks a view back and forth for the media viewer.
//!
//! Timelines and cursors are snapshots: they own clones of the entries they
//! were built from and never reach back into the index.
//!
//! [`MediaEntry`]: mediadeck_shared::MediaEntry

pub mod cursor;
pub mod filter;
pub mod multi_key;
pub mod timeline;

mod error;

pub use cursor::{CursorState, NavigationCursor, NavigationInfo};
pub use error::IndexError;
pub use filter::{SortOrder, ViewFilter};
pub use multi_key::MultiKeyIndex;
pub use timeline::{DateRange, SkippedEntry, TimelineGroup, TimelineIndex, TimelineReport};
