//! Year-month grouping of a post view.
//!
//! The timeline is rebuilt from scratch whenever the filtered view changes.
//! Filters are arbitrary predicates over a small library, so regrouping is
//! simpler than invalidating buckets incrementally.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Month, Utc};
use mediadeck_shared::{MediaEntry, MediaId, TimestampError};
use serde::Serialize;
use tracing::{debug, warn};

/// One (year, month) bucket, entries in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineGroup {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub entries: Vec<MediaEntry>,
}

/// Earliest and latest creation time across all bucketed entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

/// A post left out of the timeline because its timestamp did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub id: MediaId,
    pub raw: String,
    pub reason: TimestampError,
}

/// Outcome of [`TimelineIndex::add_entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineReport {
    pub added: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl TimelineReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Bucketed {
    created_at: DateTime<Utc>,
    entry: MediaEntry,
}

/// Posts grouped by creation month, newest month first.
#[derive(Debug, Clone, Default)]
pub struct TimelineIndex {
    buckets: BTreeMap<(i32, u32), Vec<Bucketed>>,
    total: usize,
}

impl TimelineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a view in one go.
    pub fn from_entries<I>(entries: I) -> (Self, TimelineReport)
    where
        I: IntoIterator<Item = MediaEntry>,
    {
        let mut timeline = Self::new();
        let report = timeline.add_entries(entries);
        (timeline, report)
    }

    /// Bucket each entry under the month of its `created_at`.
    ///
    /// Entries whose timestamp does not parse are skipped and reported; the
    /// rest of the batch is still added.
    pub fn add_entries<I>(&mut self, entries: I) -> TimelineReport
    where
        I: IntoIterator<Item = MediaEntry>,
    {
        let mut report = TimelineReport::default();

        for entry in entries {
            match entry.created_at_utc() {
                Ok(created_at) => {
                    self.buckets
                        .entry((created_at.year(), created_at.month()))
                        .or_default()
                        .push(Bucketed { created_at, entry });
                    self.total += 1;
                    report.added += 1;
                }
                Err(reason) => {
                    warn!(
                        id = %entry.id,
                        created_at = %entry.created_at,
                        error = %reason,
                        "Skipping entry with malformed timestamp"
                    );
                    report.skipped.push(SkippedEntry {
                        id: entry.id,
                        raw: entry.created_at,
                        reason,
                    });
                }
            }
        }

        debug!(
            added = report.added,
            skipped = report.skipped.len(),
            buckets = self.buckets.len(),
            "Updated timeline"
        );
        report
    }

    /// All buckets, year descending then month descending.
    pub fn groups(&self) -> Vec<TimelineGroup> {
        self.buckets
            .iter()
            .rev()
            .map(|(&(year, month), items)| TimelineGroup {
                year,
                month,
                month_name: month_name(month),
                entries: items.iter().map(|b| b.entry.clone()).collect(),
            })
            .collect()
    }

    /// Entries created in the given month, in insertion order. Empty when the
    /// month has no bucket.
    pub fn entries_for_month(&self, year: i32, month: u32) -> Vec<&MediaEntry> {
        self.buckets
            .get(&(year, month))
            .map(|items| items.iter().map(|b| &b.entry).collect())
            .unwrap_or_default()
    }

    pub fn date_range(&self) -> DateRange {
        let mut times = self.buckets.values().flatten().map(|b| b.created_at);
        let Some(first) = times.next() else {
            return DateRange::default();
        };

        let (earliest, latest) =
            times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        DateRange {
            earliest: Some(earliest),
            latest: Some(latest),
        }
    }

    pub fn total_entries(&self) -> usize {
        self.total
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.total = 0;
    }
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, created_at: &str) -> MediaEntry {
        MediaEntry::new(id, "published", created_at).with_image(format!("{id}.jpg"))
    }

    fn labels(groups: &[TimelineGroup]) -> Vec<String> {
        groups
            .iter()
            .map(|g| format!("{}-{:02}", g.year, g.month))
            .collect()
    }

    #[test]
    fn test_groups_newest_first() {
        let (timeline, report) = TimelineIndex::from_entries([
            post("jan", "2024-01-15T10:00:00Z"),
            post("mar", "2024-03-02T08:00:00Z"),
            post("dec", "2023-12-31T23:59:59Z"),
        ]);

        assert!(report.is_complete());
        assert_eq!(report.added, 3);

        let groups = timeline.groups();
        assert_eq!(labels(&groups), ["2024-03", "2024-01", "2023-12"]);
        assert_eq!(groups[0].month_name, "March");
        assert_eq!(groups[2].month_name, "December");
        assert_eq!(timeline.bucket_count(), 3);
        assert_eq!(timeline.total_entries(), 3);
    }

    #[test]
    fn test_bucket_keeps_insertion_order() {
        let (timeline, _) = TimelineIndex::from_entries([
            post("late", "2024-05-30"),
            post("early", "2024-05-01"),
            post("mid", "2024-05-15"),
        ]);

        let may: Vec<&str> = timeline
            .entries_for_month(2024, 5)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(may, ["late", "early", "mid"]);
        assert!(timeline.entries_for_month(2024, 6).is_empty());
    }

    #[test]
    fn test_malformed_timestamp_is_skipped_not_fatal() {
        let mut timeline = TimelineIndex::new();
        let report = timeline.add_entries([
            post("ok-1", "2024-02-10"),
            post("bad", "yesterday"),
            post("ok-2", "2024-02-11"),
            post("empty", ""),
        ]);

        assert_eq!(report.added, 2);
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, ["bad", "empty"]);
        assert_eq!(report.skipped[0].raw, "yesterday");
        assert_eq!(report.skipped[1].reason, TimestampError::Empty);
        assert_eq!(timeline.total_entries(), 2);
    }

    #[test]
    fn test_date_range() {
        let empty = TimelineIndex::new();
        assert_eq!(empty.date_range(), DateRange::default());

        let (timeline, _) = TimelineIndex::from_entries([
            post("b", "2024-03-02T08:00:00Z"),
            post("a", "2023-12-31T23:59:59Z"),
            post("c", "2024-01-15T10:00:00Z"),
        ]);
        let range = timeline.date_range();
        assert_eq!(range.earliest.unwrap().to_rfc3339(), "2023-12-31T23:59:59+00:00");
        assert_eq!(range.latest.unwrap().to_rfc3339(), "2024-03-02T08:00:00+00:00");
    }

    #[test]
    fn test_same_year_sorts_by_month_desc() {
        let (timeline, _) = TimelineIndex::from_entries([
            post("a", "2023-02-01"),
            post("b", "2023-11-01"),
            post("c", "2023-07-01"),
        ]);
        assert_eq!(labels(&timeline.groups()), ["2023-11", "2023-07", "2023-02"]);
    }

    #[test]
    fn test_clear() {
        let (mut timeline, _) = TimelineIndex::from_entries([post("a", "2024-01-01")]);
        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.bucket_count(), 0);
        assert!(timeline.groups().is_empty());
    }
}
