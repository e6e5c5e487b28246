//! Staging queue between the page fetcher and the index.
//!
//! Overflow policy is drop-oldest: a producer that outruns the consumer
//! never blocks, it just loses the stalest unconsumed items.

use std::collections::VecDeque;

use tracing::debug;

/// Bounded FIFO ring buffer.
#[derive(Debug, Clone)]
pub struct BatchQueue<T> {
    items: VecDeque<T>,
    max_size: usize,
    dropped: u64,
}

impl<T> BatchQueue<T> {
    /// Create a queue holding at most `max_size` items (at least one).
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            items: VecDeque::with_capacity(max_size),
            max_size,
            dropped: 0,
        }
    }

    /// Append an item, discarding the oldest one first if the queue is full.
    pub fn enqueue(&mut self, item: T) {
        if self.items.len() >= self.max_size && self.items.pop_front().is_some() {
            self.dropped += 1;
            debug!(dropped = self.dropped, "Batch queue full, dropped oldest item");
        }
        self.items.push_back(item);
    }

    /// Enqueue each item in order.
    pub fn enqueue_batch<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.enqueue(item);
        }
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Take every queued item, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Items discarded by overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BatchQueue<T> {
    /// Copy of the queued items, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
