//! View criteria applied by [`MultiKeyIndex::filter`](crate::MultiKeyIndex::filter).

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use mediadeck_shared::MediaEntry;
use serde::{Deserialize, Serialize};

/// Ordering of a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    /// Case-insensitive title order; untitled posts go last.
    TitleAsc,
}

/// What the library screen is currently showing.
///
/// Every criterion is optional and they combine with AND. An empty filter
/// selects the whole library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub status: Option<String>,
    pub platform: Option<String>,
    pub tag: Option<String>,
    /// Free-text query, matched like [`MultiKeyIndex::search`](crate::MultiKeyIndex::search).
    pub query: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ViewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// The query as given, or `None` when it is absent or only whitespace.
    pub(crate) fn effective_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.trim().is_empty())
    }

    /// Whether any narrowing criterion is set.
    pub fn is_unfiltered(&self) -> bool {
        self.status.is_none()
            && self.platform.is_none()
            && self.tag.is_none()
            && self.effective_query().is_none()
    }
}

/// Case-insensitive substring match against title, content and each tag.
/// `needle` must already be lowercased.
pub(crate) fn matches_text(entry: &MediaEntry, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);

    entry.title.as_deref().is_some_and(hit)
        || entry.content.as_deref().is_some_and(hit)
        || entry.tags.iter().any(|tag| hit(tag.as_str()))
}

/// Sort a view in place. Ties (and posts with unparseable timestamps, which
/// go last) are ordered by id so the result is deterministic.
pub(crate) fn sort_view(view: &mut Vec<&MediaEntry>, order: SortOrder) {
    match order {
        SortOrder::NewestFirst | SortOrder::OldestFirst => {
            let mut keyed: Vec<(Option<DateTime<Utc>>, &MediaEntry)> = view
                .drain(..)
                .map(|entry| (entry.created_at_utc().ok(), entry))
                .collect();

            keyed.sort_by(|(ta, a), (tb, b)| {
                let by_time = match (ta, tb) {
                    (Some(ta), Some(tb)) if order == SortOrder::NewestFirst => tb.cmp(ta),
                    (Some(ta), Some(tb)) => ta.cmp(tb),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                by_time.then_with(|| a.id.cmp(&b.id))
            });

            view.extend(keyed.into_iter().map(|(_, entry)| entry));
        }
        SortOrder::TitleAsc => {
            view.sort_by_cached_key(|entry| {
                (
                    entry.title.is_none(),
                    entry.title.as_deref().map(str::to_lowercase),
                    entry.id.clone(),
                )
            });
        }
    }
}
