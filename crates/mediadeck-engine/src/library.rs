//! The [`MediaLibrary`] facade: one owner for every engine component.
//!
//! Data flows one way. Provider pages are staged in the batch queue, merged
//! into the index, and the active [`ViewFilter`] is re-applied to rebuild
//! the timeline and the viewer cursor from scratch. Thumbnails and the
//! prompt history hang off the side.
//!
//! All methods are synchronous and take `&mut self` for mutation. A
//! multi-threaded host wraps the library in its own `Mutex` or `RwLock`.

use std::sync::Arc;

use bytes::Bytes;
use mediadeck_buffers::{BatchQueue, Clock, HistoryStack, SystemClock, ThumbnailCache};
use mediadeck_index::{
    MultiKeyIndex, NavigationCursor, NavigationInfo, TimelineIndex, TimelineReport, ViewFilter,
};
use mediadeck_shared::{MediaEntry, MediaId, PromptEntry};
use mediadeck_store::HistorySnapshotStore;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::provider::MediaProvider;

/// Central engine state.
pub struct MediaLibrary {
    config: EngineConfig,
    index: MultiKeyIndex,
    staged: BatchQueue<MediaEntry>,
    filter: ViewFilter,
    timeline: TimelineIndex,
    timeline_report: TimelineReport,
    cursor: NavigationCursor,
    thumbnails: ThumbnailCache,
    history: HistoryStack,
    history_store: Option<Arc<dyn HistorySnapshotStore>>,
}

impl MediaLibrary {
    /// Create an empty library using the system clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty library whose thumbnail expiry follows `clock`.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let thumbnails = ThumbnailCache::with_clock(
            config.thumbnail_cache_size,
            config.thumbnail_max_age,
            clock,
        );

        Self {
            index: MultiKeyIndex::new(),
            staged: BatchQueue::new(config.batch_queue_size),
            filter: ViewFilter::default(),
            timeline: TimelineIndex::new(),
            timeline_report: TimelineReport::default(),
            cursor: NavigationCursor::new(),
            thumbnails,
            history: HistoryStack::new(config.history_size),
            history_store: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    /// Stage posts for a later [`flush_staged`](Self::flush_staged). When
    /// more arrive than the queue holds, the oldest staged posts are dropped.
    ///
    /// Returns the number of posts now waiting.
    pub fn stage_batch<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = MediaEntry>,
    {
        let dropped_before = self.staged.dropped();
        self.staged.enqueue_batch(entries);

        let dropped = self.staged.dropped() - dropped_before;
        if dropped > 0 {
            warn!(dropped, capacity = self.staged.max_size(), "Staging queue overflowed");
        }
        self.staged.size()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.size()
    }

    /// Merge every staged post into the index and rebuild the view.
    /// Returns how many posts were merged.
    pub fn flush_staged(&mut self) -> usize {
        let merged = self.merge_staged();
        if merged > 0 {
            self.refresh_view();
        }
        merged
    }

    /// Index posts directly, bypassing the staging queue, then rebuild the view.
    pub fn ingest<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = MediaEntry>,
    {
        self.index.add_entries(entries);
        self.refresh_view();
    }

    /// Replace (or add) a single post.
    pub fn upsert(&mut self, entry: MediaEntry) {
        self.index.add_entry(entry);
        self.refresh_view();
    }

    /// Remove a post from the library. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.index.remove_entry(id);
        if removed {
            self.refresh_view();
        }
        removed
    }

    /// Pull pages from `provider` until it runs out or `max_pages` pages
    /// have been read. Each page passes through the staging queue in chunks
    /// no larger than its capacity, so nothing is dropped.
    ///
    /// Returns the number of posts merged. If a page fails, the pages read
    /// before it stay merged and the view is rebuilt before the error is
    /// returned.
    pub fn load_from_provider(
        &mut self,
        provider: &dyn MediaProvider,
        owner: &str,
        max_pages: usize,
    ) -> Result<usize> {
        let mut cursor: Option<String> = None;
        let mut merged = 0;

        for page_no in 0..max_pages {
            let page = match provider.fetch_page(owner, cursor.as_deref()) {
                Ok(page) => page,
                Err(e) => {
                    warn!(owner, page = page_no, merged, error = %e, "Provider page failed");
                    if merged > 0 {
                        self.refresh_view();
                    }
                    return Err(EngineError::Provider(e));
                }
            };

            debug!(owner, page = page_no, entries = page.entries.len(), "Fetched page");

            let mut entries = page.entries.into_iter().peekable();
            while entries.peek().is_some() {
                let chunk: Vec<MediaEntry> =
                    entries.by_ref().take(self.staged.max_size()).collect();
                self.staged.enqueue_batch(chunk);
                merged += self.merge_staged();
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        self.refresh_view();
        info!(owner, merged, total = self.index.len(), "Loaded library from provider");
        Ok(merged)
    }

    fn merge_staged(&mut self) -> usize {
        let batch = self.staged.drain();
        let count = batch.len();
        self.index.add_entries(batch);
        count
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn index(&self) -> &MultiKeyIndex {
        &self.index
    }

    /// Cross-check the index's secondary buckets against its primary map.
    pub fn verify_index(&self) -> Result<()> {
        self.index.check_consistency()?;
        Ok(())
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    /// Switch to a new filter and rebuild the timeline and cursor.
    pub fn set_filter(&mut self, filter: ViewFilter) -> &TimelineReport {
        self.filter = filter;
        self.refresh_view();
        &self.timeline_report
    }

    /// Re-apply the active filter. The cursor stays on the post it was on
    /// if that post is still part of the view.
    pub fn refresh_view(&mut self) -> &TimelineReport {
        let current: Option<MediaId> = self.cursor.current().map(|e| e.id.clone());

        let view: Vec<MediaEntry> = self.index.filter(&self.filter).into_iter().cloned().collect();

        let (timeline, report) = TimelineIndex::from_entries(view.iter().cloned());
        self.timeline = timeline;
        self.timeline_report = report;

        self.cursor.load(view);
        if let Some(id) = current {
            self.cursor.move_to(id.as_str());
        }

        debug!(
            visible = self.cursor.len(),
            buckets = self.timeline.bucket_count(),
            skipped = self.timeline_report.skipped.len(),
            "Rebuilt library view"
        );
        &self.timeline_report
    }

    pub fn timeline(&self) -> &TimelineIndex {
        &self.timeline
    }

    /// Result of the last timeline rebuild, including skipped posts.
    pub fn timeline_report(&self) -> &TimelineReport {
        &self.timeline_report
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn cursor(&self) -> &NavigationCursor {
        &self.cursor
    }

    pub fn current(&self) -> Option<&MediaEntry> {
        self.cursor.current()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&MediaEntry> {
        self.cursor.next()
    }

    pub fn previous(&mut self) -> Option<&MediaEntry> {
        self.cursor.previous()
    }

    /// Open a post in the viewer.
    pub fn open(&mut self, id: &str) -> Option<&MediaEntry> {
        self.cursor.move_to(id)
    }

    pub fn navigation(&self) -> NavigationInfo {
        self.cursor.snapshot()
    }

    // -----------------------------------------------------------------------
    // Thumbnails
    // -----------------------------------------------------------------------

    pub fn thumbnail(&mut self, key: &str) -> Option<Bytes> {
        self.thumbnails.get(key)
    }

    pub fn store_thumbnail(&mut self, key: impl Into<String>, payload: impl Into<Bytes>) {
        self.thumbnails.set(key, payload);
    }

    /// Cached thumbnail for the post under the cursor, if any.
    pub fn current_thumbnail(&mut self) -> Option<Bytes> {
        let key = self.cursor.current()?.thumbnail_url()?.to_string();
        self.thumbnails.get(&key)
    }

    /// Drop expired thumbnails. Returns how many were removed.
    pub fn sweep_thumbnails(&mut self) -> usize {
        self.thumbnails.clean_expired()
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    // -----------------------------------------------------------------------
    // Prompt history
    // -----------------------------------------------------------------------

    /// Attach a snapshot store and replace the in-memory history with its
    /// saved contents. Returns how many prompts were restored.
    pub fn attach_history_store(&mut self, store: Arc<dyn HistorySnapshotStore>) -> Result<usize> {
        let saved = store.load()?;
        self.history = HistoryStack::from_snapshot(saved, self.config.history_size);
        self.history_store = Some(store);

        info!(restored = self.history.size(), "Restored prompt history");
        Ok(self.history.size())
    }

    /// Push a prompt onto the history and save a snapshot. A failed save is
    /// logged; the in-memory history is still updated.
    pub fn record_prompt(&mut self, entry: PromptEntry) {
        self.history.push(entry);
        self.persist_history();
    }

    pub fn forget_prompt(&mut self, id: &str) -> bool {
        let removed = self.history.remove(id);
        if removed {
            self.persist_history();
        }
        removed
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    fn persist_history(&self) {
        let Some(store) = &self.history_store else {
            return;
        };
        if let Err(e) = store.save(&self.history.get_all()) {
            warn!(error = %e, "Failed to save prompt history snapshot");
        }
    }
}

impl std::fmt::Debug for MediaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLibrary")
            .field("config", &self.config)
            .field("entries", &self.index.len())
            .field("staged", &self.staged.size())
            .field("filter", &self.filter)
            .field("navigation", &self.cursor.snapshot())
            .field("thumbnails", &self.thumbnails)
            .field("history", &self.history.size())
            .field("history_store", &self.history_store.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use mediadeck_buffers::ManualClock;
    use mediadeck_index::SortOrder;
    use mediadeck_shared::constants::{STATUS_FAILED, STATUS_PUBLISHED};
    use mediadeck_store::{JsonFileHistoryStore, MemoryHistoryStore};

    use super::*;
    use crate::provider::MediaPage;

    fn post(id: &str, status: &str, created_at: &str) -> MediaEntry {
        MediaEntry::new(id, status, created_at).with_image(format!("https://cdn/{id}.jpg"))
    }

    fn library() -> MediaLibrary {
        MediaLibrary::new(EngineConfig::default())
    }

    fn current_id(library: &MediaLibrary) -> Option<&str> {
        library.current().map(|e| e.id.as_str())
    }

    struct PagedProvider {
        pages: Vec<Vec<MediaEntry>>,
        calls: RefCell<Vec<Option<String>>>,
    }

    impl MediaProvider for PagedProvider {
        fn fetch_page(&self, owner: &str, cursor: Option<&str>) -> anyhow::Result<MediaPage> {
            anyhow::ensure!(owner == "owner-1", "unknown owner {owner}");
            self.calls.borrow_mut().push(cursor.map(str::to_string));

            let page_no = cursor.map(str::parse::<usize>).transpose()?.unwrap_or(0);
            let entries = self.pages.get(page_no).cloned().unwrap_or_default();
            let next_cursor =
                (page_no + 1 < self.pages.len()).then(|| (page_no + 1).to_string());
            Ok(MediaPage { entries, next_cursor })
        }
    }

    #[test]
    fn test_ingest_builds_timeline_and_cursor() {
        let mut library = library();
        library.ingest([
            post("jan", STATUS_PUBLISHED, "2024-01-20"),
            post("mar", STATUS_PUBLISHED, "2024-03-05"),
            post("dec", STATUS_PUBLISHED, "2023-12-11"),
        ]);

        let months: Vec<(i32, u32)> = library
            .timeline()
            .groups()
            .iter()
            .map(|g| (g.year, g.month))
            .collect();
        assert_eq!(months, [(2024, 3), (2024, 1), (2023, 12)]);

        assert_eq!(current_id(&library), Some("mar"));
        assert_eq!(library.next().map(|e| e.id.to_string()), Some("jan".into()));
        assert_eq!(library.next().map(|e| e.id.to_string()), Some("dec".into()));
        assert!(library.next().is_none());
        assert_eq!(current_id(&library), Some("dec"));
    }

    #[test]
    fn test_malformed_timestamp_stays_resolvable() {
        let mut library = library();
        library.ingest([
            post("good", STATUS_PUBLISHED, "2024-02-02"),
            post("bad", STATUS_PUBLISHED, "sometime"),
        ]);

        let report = library.timeline_report();
        assert_eq!(report.added, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id.as_str(), "bad");

        assert!(library.index().get_by_id("bad").is_some());
        assert_eq!(library.timeline().total_entries(), 1);
        assert_eq!(library.cursor().len(), 2);
    }

    #[test]
    fn test_filter_keeps_cursor_on_visible_post() {
        let mut library = library();
        library.ingest([
            post("a", STATUS_PUBLISHED, "2024-03-01"),
            post("b", STATUS_FAILED, "2024-02-01"),
            post("c", STATUS_PUBLISHED, "2024-01-01"),
        ]);
        library.open("c");

        library.set_filter(ViewFilter::new().with_status(STATUS_PUBLISHED));
        assert_eq!(library.cursor().len(), 2);
        assert_eq!(current_id(&library), Some("c"));
        assert_eq!(library.navigation().position, Some(1));

        library.set_filter(ViewFilter::new().with_status(STATUS_FAILED));
        assert_eq!(current_id(&library), Some("b"));

        library.set_filter(ViewFilter::new().sorted(SortOrder::OldestFirst));
        assert_eq!(current_id(&library), Some("b"));
        assert_eq!(library.cursor().position_index(), 1);
    }

    #[test]
    fn test_upsert_and_remove_refresh_view() {
        let mut library = library();
        library.ingest([post("a", STATUS_PUBLISHED, "2024-03-01")]);
        library.set_filter(ViewFilter::new().with_status(STATUS_PUBLISHED));

        library.upsert(post("a", STATUS_FAILED, "2024-03-01"));
        assert!(library.cursor().is_empty());
        assert_eq!(library.index().all_statuses(), [STATUS_FAILED]);

        library.set_filter(ViewFilter::new());
        assert!(library.remove("a"));
        assert!(!library.remove("a"));
        assert!(library.timeline().is_empty());
        assert_eq!(library.cursor().position_index(), -1);
    }

    #[test]
    fn test_staging_drops_oldest_on_overflow() {
        let config = EngineConfig {
            batch_queue_size: 2,
            ..EngineConfig::default()
        };
        let mut library = MediaLibrary::new(config);

        let waiting = library.stage_batch([
            post("1", STATUS_PUBLISHED, "2024-01-01"),
            post("2", STATUS_PUBLISHED, "2024-01-02"),
            post("3", STATUS_PUBLISHED, "2024-01-03"),
        ]);
        assert_eq!(waiting, 2);
        assert!(library.index().is_empty());

        assert_eq!(library.flush_staged(), 2);
        assert_eq!(library.staged_len(), 0);
        assert!(library.index().get_by_id("1").is_none());
        assert!(library.index().get_by_id("3").is_some());
        assert_eq!(library.flush_staged(), 0);
    }

    #[test]
    fn test_load_from_provider_follows_cursor() {
        let config = EngineConfig {
            batch_queue_size: 2,
            ..EngineConfig::default()
        };
        let mut library = MediaLibrary::new(config);
        let provider = PagedProvider {
            pages: vec![
                vec![
                    post("p1", STATUS_PUBLISHED, "2024-01-01"),
                    post("p2", STATUS_PUBLISHED, "2024-01-02"),
                    post("p3", STATUS_PUBLISHED, "2024-01-03"),
                ],
                vec![post("p4", STATUS_PUBLISHED, "2024-02-01")],
            ],
            calls: RefCell::new(Vec::new()),
        };

        let merged = library.load_from_provider(&provider, "owner-1", 10).unwrap();
        assert_eq!(merged, 4);
        assert_eq!(library.index().len(), 4);
        assert_eq!(*provider.calls.borrow(), [None, Some("1".to_string())]);
        assert_eq!(current_id(&library), Some("p4"));
    }

    #[test]
    fn test_load_from_provider_respects_page_limit_and_errors() {
        let mut library = library();
        let provider = PagedProvider {
            pages: vec![
                vec![post("p1", STATUS_PUBLISHED, "2024-01-01")],
                vec![post("p2", STATUS_PUBLISHED, "2024-01-02")],
            ],
            calls: RefCell::new(Vec::new()),
        };

        assert_eq!(library.load_from_provider(&provider, "owner-1", 1).unwrap(), 1);
        assert!(library.index().get_by_id("p2").is_none());

        let err = library.load_from_provider(&provider, "stranger", 1).unwrap_err();
        assert!(matches!(err, EngineError::Provider(_)));
    }

    struct FailsAfterFirstPage;

    impl MediaProvider for FailsAfterFirstPage {
        fn fetch_page(&self, _owner: &str, cursor: Option<&str>) -> anyhow::Result<MediaPage> {
            match cursor {
                None => Ok(MediaPage {
                    entries: vec![post("early", STATUS_PUBLISHED, "2024-05-01")],
                    next_cursor: Some("1".to_string()),
                }),
                Some(_) => anyhow::bail!("network down"),
            }
        }
    }

    #[test]
    fn test_failed_page_still_refreshes_view() {
        let mut library = library();

        let err = library
            .load_from_provider(&FailsAfterFirstPage, "owner-1", 5)
            .unwrap_err();
        assert!(matches!(err, EngineError::Provider(_)));
        assert!(err.to_string().contains("network down"));

        assert_eq!(library.index().len(), 1);
        assert_eq!(library.cursor().len(), library.index().len());
        assert_eq!(library.timeline().total_entries(), 1);
        assert_eq!(current_id(&library), Some("early"));
    }

    #[test]
    fn test_thumbnails_for_current_post_expire() {
        let clock = ManualClock::new();
        let config = EngineConfig {
            thumbnail_max_age: Duration::from_secs(60),
            ..EngineConfig::default()
        };
        let mut library = MediaLibrary::with_clock(config, Arc::new(clock.clone()));
        library.ingest([post("a", STATUS_PUBLISHED, "2024-01-01")]);

        assert!(library.current_thumbnail().is_none());
        library.store_thumbnail("https://cdn/a.jpg", vec![0xFF, 0xD8]);
        assert_eq!(library.current_thumbnail().as_deref(), Some(&[0xFF, 0xD8][..]));

        clock.advance(Duration::from_secs(61));
        assert_eq!(library.sweep_thumbnails(), 1);
        assert!(library.thumbnail("https://cdn/a.jpg").is_none());
    }

    #[test]
    fn test_prompt_history_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let config = EngineConfig {
            history_size: 2,
            ..EngineConfig::default()
        };

        let mut library = MediaLibrary::new(config.clone());
        let store: Arc<dyn HistorySnapshotStore> = Arc::new(JsonFileHistoryStore::new(&path));
        assert_eq!(library.attach_history_store(store).unwrap(), 0);

        let first = PromptEntry::new("a lighthouse", "1024x1024", "hd", "vivid");
        let first_id = first.id.clone();
        library.record_prompt(first.clone());
        library.record_prompt(PromptEntry::new("a harbour", "1024x1024", "hd", "natural"));
        library.record_prompt(PromptEntry::new("a storm", "512x512", "standard", "vivid"));
        library.record_prompt(first);

        assert_eq!(library.history().size(), 2);
        assert_eq!(library.history().peek().unwrap().id, first_id);

        let mut restored = MediaLibrary::new(config);
        let store: Arc<dyn HistorySnapshotStore> = Arc::new(JsonFileHistoryStore::new(&path));
        assert_eq!(restored.attach_history_store(store).unwrap(), 2);
        assert_eq!(restored.history().get_all(), library.history().get_all());

        assert!(restored.forget_prompt(&first_id));
        restored.clear_history();
        assert!(JsonFileHistoryStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_history_without_store_stays_in_memory() {
        let mut library = library();
        library.record_prompt(PromptEntry::new("a cat", "256x256", "standard", "natural"));
        assert_eq!(library.history().size(), 1);

        let store = Arc::new(MemoryHistoryStore::new());
        library.attach_history_store(store.clone()).unwrap();
        assert!(library.history().is_empty());

        library.record_prompt(PromptEntry::new("a dog", "256x256", "standard", "natural"));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_index_stays_consistent_through_facade() {
        let mut library = library();
        library.ingest((0..20).map(|i| {
            post(&format!("p{i}"), STATUS_PUBLISHED, "2024-04-01")
                .with_tags([format!("t{}", i % 3)])
                .with_platforms(["youtube"])
        }));
        for i in (0..20).step_by(4) {
            library.remove(&format!("p{i}"));
        }
        library.upsert(post("p1", STATUS_FAILED, "2024-04-01").with_tags(["fresh"]));

        library.verify_index().unwrap();
        assert_eq!(library.index().len(), 15);
    }
}
