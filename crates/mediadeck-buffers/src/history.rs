//! Recent-prompt history for the image generator.
//!
//! Newest entry sits at index 0. Re-submitting a prompt with a known id moves
//! it back to the top instead of adding a second row.

use std::collections::VecDeque;

use mediadeck_shared::PromptEntry;
use tracing::trace;

/// Bounded most-recent-first stack of prompts, unique by id.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<PromptEntry>,
    max_size: usize,
}

impl HistoryStack {
    /// Create an empty history holding at most `max_size` prompts (at least one).
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Rebuild a history from a saved snapshot (newest first). Duplicate ids
    /// keep their first, most recent occurrence; the tail is cut to size.
    pub fn from_snapshot<I>(entries: I, max_size: usize) -> Self
    where
        I: IntoIterator<Item = PromptEntry>,
    {
        let mut history = Self::new(max_size);
        for entry in entries {
            if history.entries.len() == history.max_size {
                break;
            }
            if !history.entries.iter().any(|e| e.id == entry.id) {
                history.entries.push_back(entry);
            }
        }
        history
    }

    /// Put `entry` on top, replacing any entry with the same id, and drop
    /// from the bottom if the stack is over capacity.
    pub fn push(&mut self, entry: PromptEntry) {
        self.remove(&entry.id);
        trace!(id = %entry.id, "Pushed prompt to history");
        self.entries.push_front(entry);
        self.entries.truncate(self.max_size);
    }

    pub fn pop(&mut self) -> Option<PromptEntry> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&PromptEntry> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&PromptEntry> {
        self.entries.get(index)
    }

    /// All entries, newest first.
    pub fn get_all(&self) -> Vec<PromptEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptEntry> {
        self.entries.iter()
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
