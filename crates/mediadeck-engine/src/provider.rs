//! Contract for the component that fetches posts over the network.
//!
//! The engine never performs I/O itself; hosts implement [`MediaProvider`]
//! on top of their HTTP client and hand it to
//! [`MediaLibrary::load_from_provider`](crate::MediaLibrary::load_from_provider).

use mediadeck_shared::MediaEntry;

/// One page of posts and the cursor for the page after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPage {
    pub entries: Vec<MediaEntry>,
    /// Opaque continuation token; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Supplies posts for an owner, one page at a time.
///
/// Entries are expected to be validated for required fields already; only
/// timestamp parseability is left to the engine.
pub trait MediaProvider {
    fn fetch_page(&self, owner: &str, cursor: Option<&str>) -> anyhow::Result<MediaPage>;
}
