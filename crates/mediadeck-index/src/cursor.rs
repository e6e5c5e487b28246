//! Prev/next navigation for the media viewer.
//!
//! The cursor owns a flat copy of the view it was loaded with and an index
//! into it. It never wraps: stepping past either end leaves the position
//! where it was.

use mediadeck_shared::MediaEntry;
use serde::Serialize;
use tracing::trace;

/// Where the cursor currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Empty,
    Positioned(usize),
}

/// Snapshot of the cursor for rendering viewer controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavigationInfo {
    /// Zero-based position, `None` when nothing is loaded.
    pub position: Option<usize>,
    pub total: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// An ordered sequence of posts with a movable current position.
#[derive(Debug, Clone, Default)]
pub struct NavigationCursor {
    entries: Vec<MediaEntry>,
    position: Option<usize>,
}

impl NavigationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cursor positioned on the first entry.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MediaEntry>,
    {
        let mut cursor = Self::new();
        cursor.load(entries);
        cursor
    }

    /// Replace the whole sequence. The cursor lands on the first entry, or
    /// becomes empty when nothing was supplied.
    pub fn load<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = MediaEntry>,
    {
        self.entries = entries.into_iter().collect();
        self.position = if self.entries.is_empty() { None } else { Some(0) };
        trace!(len = self.entries.len(), "Loaded navigation cursor");
    }

    /// Step forward. Returns the new current entry, or `None` (without
    /// moving) when already at the end.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&MediaEntry> {
        let next = self.position? + 1;
        if next >= self.entries.len() {
            return None;
        }
        self.position = Some(next);
        self.entries.get(next)
    }

    /// Step back. Returns the new current entry, or `None` (without moving)
    /// when already at the start.
    pub fn previous(&mut self) -> Option<&MediaEntry> {
        let prev = self.position?.checked_sub(1)?;
        self.position = Some(prev);
        self.entries.get(prev)
    }

    /// Jump to the entry with the given id. On a miss the position is left
    /// unchanged and `None` is returned.
    pub fn move_to(&mut self, id: &str) -> Option<&MediaEntry> {
        let index = self.entries.iter().position(|e| e.id.as_str() == id)?;
        self.position = Some(index);
        self.entries.get(index)
    }

    pub fn current(&self) -> Option<&MediaEntry> {
        self.entries.get(self.position?)
    }

    pub fn peek_next(&self) -> Option<&MediaEntry> {
        self.entries.get(self.position? + 1)
    }

    pub fn peek_previous(&self) -> Option<&MediaEntry> {
        self.entries.get(self.position?.checked_sub(1)?)
    }

    pub fn has_next(&self) -> bool {
        self.peek_next().is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.peek_previous().is_some()
    }

    /// Current index, or -1 when empty.
    pub fn position_index(&self) -> isize {
        self.position
            .and_then(|p| isize::try_from(p).ok())
            .unwrap_or(-1)
    }

    pub fn state(&self) -> CursorState {
        match self.position {
            Some(index) => CursorState::Positioned(index),
            None => CursorState::Empty,
        }
    }

    pub fn snapshot(&self) -> NavigationInfo {
        NavigationInfo {
            position: self.position,
            total: self.entries.len(),
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = None;
    }
}
