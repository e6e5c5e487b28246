//! Primary and secondary indexes over the post library.
//!
//! The id map is the source of truth. Three secondary maps (status, platform,
//! tag) hold the ids filed under each key. Because an indexed entry is never
//! mutated in place, its own `status`, `target_platforms` and `tags` always
//! describe exactly which buckets it sits in, so removal only visits those
//! buckets instead of scanning every key.

use std::collections::{BTreeSet, HashMap};

use mediadeck_shared::{MediaEntry, MediaId};
use tracing::{debug, trace};

use crate::error::IndexError;
use crate::filter::{matches_text, sort_view, ViewFilter};

type Buckets = HashMap<String, BTreeSet<MediaId>>;

const STATUS: &str = "status";
const PLATFORM: &str = "platform";
const TAG: &str = "tag";

/// Id lookup plus status/platform/tag indexes and text search.
///
/// Bucket members are kept in id order, so every listing is stable for a
/// given index state.
#[derive(Debug, Clone, Default)]
pub struct MultiKeyIndex {
    entries: HashMap<MediaId, MediaEntry>,
    by_status: Buckets,
    by_platform: Buckets,
    by_tag: Buckets,
}

impl MultiKeyIndex {
    /// Create a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a post. An existing post with the same id is replaced, and its
    /// old bucket memberships are dropped before the new ones are added.
    pub fn add_entry(&mut self, entry: MediaEntry) {
        if self.remove_entry(entry.id.as_str()) {
            debug!(id = %entry.id, "Replacing indexed entry");
        }

        let id = entry.id.clone();
        file_under(&mut self.by_status, &entry.status, &id);
        for platform in &entry.target_platforms {
            file_under(&mut self.by_platform, platform, &id);
        }
        for tag in &entry.tags {
            file_under(&mut self.by_tag, tag, &id);
        }

        trace!(id = %id, status = %entry.status, "Indexed entry");
        self.entries.insert(id, entry);
    }

    /// Index a batch in input order.
    pub fn add_entries<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = MediaEntry>,
    {
        let before = self.entries.len();
        for entry in batch {
            self.add_entry(entry);
        }
        debug!(
            total = self.entries.len(),
            new = self.entries.len().saturating_sub(before),
            "Indexed batch"
        );
    }

    pub fn get_by_id(&self, id: &str) -> Option<&MediaEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get_by_status(&self, status: &str) -> Vec<&MediaEntry> {
        self.resolve(self.by_status.get(status))
    }

    pub fn get_by_platform(&self, platform: &str) -> Vec<&MediaEntry> {
        self.resolve(self.by_platform.get(platform))
    }

    pub fn get_by_tag(&self, tag: &str) -> Vec<&MediaEntry> {
        self.resolve(self.by_tag.get(tag))
    }

    /// Case-insensitive substring search over title, content and tags.
    ///
    /// Each post appears once, however many of its fields match. A blank
    /// query matches nothing; otherwise whitespace in the query is matched
    /// literally.
    pub fn search(&self, query: &str) -> Vec<&MediaEntry> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        let hits: BTreeSet<&MediaId> = self
            .entries
            .values()
            .filter(|entry| matches_text(entry, &needle))
            .map(|entry| &entry.id)
            .collect();

        hits.into_iter()
            .filter_map(|id| self.entries.get(id))
            .collect()
    }

    /// Remove a post from the id map and from every bucket it was filed
    /// under. Buckets left empty are dropped.
    ///
    /// Returns whether the post was present.
    pub fn remove_entry(&mut self, id: &str) -> bool {
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };

        unfile(&mut self.by_status, &entry.status, &entry.id);
        for platform in &entry.target_platforms {
            unfile(&mut self.by_platform, platform, &entry.id);
        }
        for tag in &entry.tags {
            unfile(&mut self.by_tag, tag, &entry.id);
        }

        trace!(id = %entry.id, "Removed entry from index");
        true
    }

    /// Status labels with at least one live post, sorted.
    pub fn all_statuses(&self) -> Vec<String> {
        sorted_keys(&self.by_status)
    }

    /// Platform labels with at least one live post, sorted.
    pub fn all_platforms(&self) -> Vec<String> {
        sorted_keys(&self.by_platform)
    }

    /// Tags with at least one live post, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        sorted_keys(&self.by_tag)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_status.clear();
        self.by_platform.clear();
        self.by_tag.clear();
        debug!("Cleared index");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every indexed post, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &MediaEntry> {
        self.entries.values()
    }

    /// Apply a view filter and sort the result.
    ///
    /// The narrowest keyed criterion seeds the candidate set; the remaining
    /// criteria are checked per entry.
    pub fn filter(&self, filter: &ViewFilter) -> Vec<&MediaEntry> {
        let needle = filter.effective_query().map(str::to_lowercase);

        let keyed = [
            filter.status.as_deref().map(|k| self.by_status.get(k)),
            filter.platform.as_deref().map(|k| self.by_platform.get(k)),
            filter.tag.as_deref().map(|k| self.by_tag.get(k)),
        ];

        let mut view: Vec<&MediaEntry> = if keyed.iter().any(|c| matches!(c, Some(None))) {
            // A requested key with no bucket cannot match anything.
            Vec::new()
        } else {
            let seed = keyed.iter().flatten().flatten().min_by_key(|ids| ids.len());
            let candidates: Box<dyn Iterator<Item = &MediaEntry> + '_> = match seed {
                Some(ids) => Box::new(ids.iter().filter_map(|id| self.entries.get(id))),
                None => Box::new(self.entries.values()),
            };

            candidates
                .filter(|entry| {
                    filter.status.as_ref().map_or(true, |s| &entry.status == s)
                        && filter
                            .platform
                            .as_ref()
                            .map_or(true, |p| entry.target_platforms.contains(p))
                        && filter.tag.as_ref().map_or(true, |t| entry.tags.contains(t))
                        && needle.as_deref().map_or(true, |n| matches_text(entry, n))
                })
                .collect()
        };

        sort_view(&mut view, filter.sort);
        view
    }

    /// Verify that the id map and the secondary maps agree in both
    /// directions, and that no empty bucket is left behind.
    pub fn check_consistency(&self) -> Result<(), IndexError> {
        for (kind, buckets) in self.bucket_maps() {
            for (key, ids) in buckets {
                if ids.is_empty() {
                    return Err(IndexError::EmptyBucket {
                        kind,
                        key: key.clone(),
                    });
                }
                for id in ids {
                    if !self.entries.contains_key(id) {
                        return Err(IndexError::DanglingMember {
                            kind,
                            key: key.clone(),
                            id: id.clone(),
                        });
                    }
                }
            }
        }

        for entry in self.entries.values() {
            let declared = std::iter::once((STATUS, &self.by_status, &entry.status))
                .chain(
                    entry
                        .target_platforms
                        .iter()
                        .map(|p| (PLATFORM, &self.by_platform, p)),
                )
                .chain(entry.tags.iter().map(|t| (TAG, &self.by_tag, t)));

            for (kind, buckets, key) in declared {
                let filed = buckets.get(key).is_some_and(|ids| ids.contains(&entry.id));
                if !filed {
                    return Err(IndexError::MissingMember {
                        kind,
                        key: key.clone(),
                        id: entry.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn bucket_maps(&self) -> [(&'static str, &Buckets); 3] {
        [
            (STATUS, &self.by_status),
            (PLATFORM, &self.by_platform),
            (TAG, &self.by_tag),
        ]
    }

    fn resolve(&self, ids: Option<&BTreeSet<MediaId>>) -> Vec<&MediaEntry> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(id))
            .collect()
    }
}

fn file_under(buckets: &mut Buckets, key: &str, id: &MediaId) {
    buckets.entry(key.to_string()).or_default().insert(id.clone());
}

fn unfile(buckets: &mut Buckets, key: &str, id: &MediaId) {
    if let Some(ids) = buckets.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            buckets.remove(key);
        }
    }
}

fn sorted_keys(buckets: &Buckets) -> Vec<String> {
    let mut keys: Vec<String> = buckets.keys().cloned().collect();
    keys.sort();
    keys
}
